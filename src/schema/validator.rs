//! Schema validator: an interpreter over schema data
//!
//! Evaluation of an object against a schema:
//! 1. Non-objects are a type mismatch
//! 2. Declared fields are evaluated in declaration order; absent required
//!    fields are missing, absent defaulted fields get their default
//! 3. Undeclared keys are handled by the schema's unknown-key policy
//! 4. Cross-field rules run in declaration order once every field passed;
//!    the first failing rule ends evaluation of that object
//!
//! The validator does not mutate its input and keeps no state between
//! calls, so a single instance can be shared across threads.

use super::errors::{SchemaError, SchemaResult, Violation};
use super::fields;
use super::types::{CrossFieldRule, Presence, Rule, Schema, UnknownKeys};
use super::value::{Map, Value};

/// Schema id reported when a bare rule is validated
const FIELD_SCHEMA_ID: &str = "field";

/// Evaluation options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Stop at the first violation. When false, every violation is
    /// collected and reported in evaluation order.
    pub abort_early: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self { abort_early: true }
    }
}

/// Validator that normalizes values against schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    options: ValidateOptions,
}

impl SchemaValidator {
    /// Creates a validator that stops at the first violation.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ValidateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ValidateOptions {
        self.options
    }

    /// Validates a candidate against a schema.
    ///
    /// Returns the normalized value: defaults applied, strings trimmed
    /// where the rule says so, undeclared keys handled per policy.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` naming the first violated constraint (and,
    /// with `abort_early` off, every other one).
    pub fn validate(&self, schema: &Schema, candidate: &Value) -> SchemaResult<Value> {
        let mut pass = Pass::new(self.options);
        let outcome = pass.object(schema, candidate, "");
        pass.finish(&schema.id, outcome)
    }

    /// Validates a candidate against a single rule.
    pub fn validate_rule(&self, rule: &Rule, candidate: &Value) -> SchemaResult<Value> {
        let mut pass = Pass::new(self.options);
        let outcome = pass.rule(rule, candidate, "");
        pass.finish(FIELD_SCHEMA_ID, outcome)
    }
}

/// Evaluation stopped at a violation under `abort_early`.
struct Halt;

/// `Ok(Some)` is a normalized value, `Ok(None)` a recorded violation
/// with evaluation continuing.
type Step = Result<Option<Value>, Halt>;

/// State of one validation call.
struct Pass {
    abort_early: bool,
    violations: Vec<Violation>,
}

impl Pass {
    fn new(options: ValidateOptions) -> Self {
        Self {
            abort_early: options.abort_early,
            violations: Vec::new(),
        }
    }

    fn reject(&mut self, violation: Violation) -> Step {
        self.violations.push(violation);
        if self.abort_early {
            Err(Halt)
        } else {
            Ok(None)
        }
    }

    fn leaf(&mut self, checked: Result<Value, Violation>) -> Step {
        match checked {
            Ok(value) => Ok(Some(value)),
            Err(violation) => self.reject(violation),
        }
    }

    fn finish(self, schema_id: &str, outcome: Step) -> SchemaResult<Value> {
        let mut violations = self.violations.into_iter();
        match (violations.next(), outcome) {
            (None, Ok(Some(value))) => Ok(value),
            (Some(first), _) => Err(SchemaError::new(schema_id, first).with_others(violations.collect())),
            (None, _) => unreachable!("evaluation stopped without recording a violation"),
        }
    }

    fn rule(&mut self, rule: &Rule, value: &Value, path: &str) -> Step {
        match rule {
            Rule::Identifier => self.leaf(fields::check_identifier(value, path)),
            Rule::Text { trim, allow_empty } => {
                self.leaf(fields::check_text(value, path, *trim, *allow_empty))
            }
            Rule::UriOrPath { allow_empty } => {
                self.leaf(fields::check_uri_or_path(value, path, *allow_empty))
            }
            Rule::Number { min, max, .. } => self.leaf(fields::check_number(value, path, *min, *max)),
            Rule::Function => self.leaf(fields::check_function(value, path)),
            Rule::Object { schema } => self.object(schema, value, path),
            Rule::Map {
                values,
                max_entries,
            } => self.map(values, *max_entries, value, path),
            Rule::List { items } => self.list(items, value, path),
        }
    }

    fn object(&mut self, schema: &Schema, value: &Value, path: &str) -> Step {
        let Some(candidate) = value.as_object() else {
            return self.reject(Violation::type_mismatch(path, "object", value));
        };

        let mut normalized = Map::new();
        let mut failed = false;

        for field in &schema.fields {
            let field_path = make_path(path, &field.name);

            let outcome = match (candidate.get(&field.name), &field.presence) {
                (Some(present), _) => self.rule(&field.rule, present, &field_path)?,
                (None, Presence::Required) => self.reject(Violation::missing_field(&field_path))?,
                (None, Presence::Optional) => continue,
                (None, Presence::Default(default)) => self.rule(&field.rule, default, &field_path)?,
            };

            match outcome {
                Some(value) => {
                    normalized.insert(field.name.clone(), value);
                }
                None => failed = true,
            }
        }

        for (key, extra) in candidate {
            if schema.field(key).is_some() {
                continue;
            }
            match schema.unknown_keys {
                UnknownKeys::Strip => {}
                UnknownKeys::Allow => {
                    normalized.insert(key.clone(), extra.clone());
                }
                UnknownKeys::Reject => {
                    failed = true;
                    self.reject(Violation::unknown_key(&make_path(path, key)))?;
                }
            }
        }

        if failed {
            return Ok(None);
        }

        for rule in &schema.cross_field {
            if let Err(violation) = check_cross_field(rule, &normalized, path) {
                return self.reject(violation);
            }
        }

        Ok(Some(Value::Object(normalized)))
    }

    fn map(&mut self, values: &Rule, max_entries: Option<usize>, value: &Value, path: &str) -> Step {
        let Some(entries) = value.as_object() else {
            return self.reject(Violation::type_mismatch(path, "object", value));
        };

        if let Some(max) = max_entries {
            if entries.len() > max {
                return self.reject(Violation::too_many_entries(path, max, entries.len()));
            }
        }

        let mut normalized = Map::new();
        let mut failed = false;
        for (key, entry) in entries {
            match self.rule(values, entry, &make_path(path, key))? {
                Some(value) => {
                    normalized.insert(key.clone(), value);
                }
                None => failed = true,
            }
        }

        Ok(if failed { None } else { Some(Value::Object(normalized)) })
    }

    fn list(&mut self, items: &Rule, value: &Value, path: &str) -> Step {
        let Some(elements) = value.as_array() else {
            return self.reject(Violation::type_mismatch(path, "array", value));
        };

        let mut normalized = Vec::with_capacity(elements.len());
        let mut failed = false;
        for (i, element) in elements.iter().enumerate() {
            match self.rule(items, element, &make_path(path, &i.to_string()))? {
                Some(value) => normalized.push(value),
                None => failed = true,
            }
        }

        Ok(if failed { None } else { Some(Value::Array(normalized)) })
    }
}

/// Applies a cross-field rule to an already normalized object.
fn check_cross_field(rule: &CrossFieldRule, object: &Map, path: &str) -> Result<(), Violation> {
    match rule {
        CrossFieldRule::ExactlyOneOf { fields } => {
            let present: Vec<&str> = fields
                .iter()
                .filter(|f| object.contains_key(f.as_str()))
                .map(String::as_str)
                .collect();
            if present.len() != 1 {
                return Err(Violation::not_exactly_one(path, fields, &present));
            }
        }
        CrossFieldRule::LessThan { field, bound } => {
            let value = object.get(field).and_then(Value::as_f64);
            let limit = object.get(bound).and_then(Value::as_f64);
            if let (Some(value), Some(limit)) = (value, limit) {
                if value >= limit {
                    return Err(Violation::not_less_than(
                        &make_path(path, field),
                        bound,
                        value,
                        limit,
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Creates a field path from prefix and field name.
fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}
