//! Schema type definitions
//!
//! A schema is plain data: an ordered list of field definitions, an
//! unknown-key policy and an ordered list of cross-field rules. The
//! validator interprets it; nothing here executes.
//!
//! Leaf rules:
//! - identifier: trimmed, non-empty, `[A-Za-z0-9_-]` only
//! - text: string, optionally trimmed, optionally allowed to be empty
//! - uri_or_path: absolute http(s) URI or a path starting with `/`
//! - number: bounded number with a unit
//! - function: callable reference
//!
//! Composite rules: object (nested schema), map (uniform values, optional
//! entry cap) and list (uniform items).

use std::collections::HashSet;

use serde::Serialize;

use super::value::Value;

/// Unit attached to a numeric rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Seconds,
}

/// Constraint descriptor for a single value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Restricted-charset identifier, trimmed before the check
    Identifier,
    /// Opaque string
    Text { trim: bool, allow_empty: bool },
    /// Absolute http(s) URI or absolute path
    UriOrPath { allow_empty: bool },
    /// Inclusive numeric range
    Number { min: f64, max: f64, unit: Unit },
    /// Callable reference
    Function,
    /// Nested object with its own schema
    Object { schema: Box<Schema> },
    /// Mapping from arbitrary keys to uniformly validated values
    Map {
        values: Box<Rule>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_entries: Option<usize>,
    },
    /// Sequence of uniformly validated items
    List { items: Box<Rule> },
}

impl Rule {
    /// Returns the name used as "expected" in type errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Rule::Identifier | Rule::Text { .. } | Rule::UriOrPath { .. } => "string",
            Rule::Number { .. } => "number",
            Rule::Function => "function",
            Rule::Object { .. } | Rule::Map { .. } => "object",
            Rule::List { .. } => "array",
        }
    }

    /// Non-empty string, not trimmed
    pub fn string() -> Self {
        Rule::Text {
            trim: false,
            allow_empty: false,
        }
    }

    pub fn object(schema: Schema) -> Self {
        Rule::Object {
            schema: Box::new(schema),
        }
    }

    pub fn map(values: Rule, max_entries: Option<usize>) -> Self {
        Rule::Map {
            values: Box::new(values),
            max_entries,
        }
    }

    pub fn list(items: Rule) -> Self {
        Rule::List {
            items: Box::new(items),
        }
    }
}

/// What happens when a field is absent
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "presence", content = "default", rename_all = "lowercase")]
pub enum Presence {
    /// Absence is a `RequiredFieldMissing` violation
    Required,
    /// Absence leaves the field absent
    Optional,
    /// Absence is replaced by the value, which is then validated by the
    /// field's own rule
    Default(Value),
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDef {
    pub name: String,
    pub rule: Rule,
    pub presence: Presence,
}

impl FieldDef {
    pub fn required(name: &str, rule: Rule) -> Self {
        Self {
            name: name.to_string(),
            rule,
            presence: Presence::Required,
        }
    }

    pub fn optional(name: &str, rule: Rule) -> Self {
        Self {
            name: name.to_string(),
            rule,
            presence: Presence::Optional,
        }
    }

    pub fn with_default(name: &str, rule: Rule, default: impl Into<Value>) -> Self {
        Self {
            name: name.to_string(),
            rule,
            presence: Presence::Default(default.into()),
        }
    }
}

/// Handling of keys a schema does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeys {
    /// Drop them from the normalized output
    #[default]
    Strip,
    /// Report each as an `UnknownKey` violation
    Reject,
    /// Copy them to the normalized output unchanged
    Allow,
}

/// Whole-object predicate evaluated after per-field normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum CrossFieldRule {
    /// Exactly one of the fields is present
    ExactlyOneOf { fields: Vec<String> },
    /// `field < bound` when both are present
    LessThan { field: String, bound: String },
}

impl CrossFieldRule {
    pub fn exactly_one_of(fields: &[&str]) -> Self {
        CrossFieldRule::ExactlyOneOf {
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn less_than(field: &str, bound: &str) -> Self {
        CrossFieldRule::LessThan {
            field: field.to_string(),
            bound: bound.to_string(),
        }
    }

    /// Fields the rule refers to
    pub fn fields(&self) -> Vec<&str> {
        match self {
            CrossFieldRule::ExactlyOneOf { fields } => fields.iter().map(String::as_str).collect(),
            CrossFieldRule::LessThan { field, bound } => vec![field.as_str(), bound.as_str()],
        }
    }
}

/// Composite schema for object values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    /// Schema identifier, reported in errors
    pub id: String,
    /// Field definitions in evaluation order
    pub fields: Vec<FieldDef>,
    /// Policy for undeclared keys
    pub unknown_keys: UnknownKeys,
    /// Cross-field rules in evaluation order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cross_field: Vec<CrossFieldRule>,
}

impl Schema {
    /// Create a schema that strips unknown keys and has no cross-field rules
    pub fn new(id: &str, fields: Vec<FieldDef>) -> Self {
        Self {
            id: id.to_string(),
            fields,
            unknown_keys: UnknownKeys::Strip,
            cross_field: Vec::new(),
        }
    }

    /// Create a free-form object schema: no declared fields, every key kept
    pub fn open(id: &str) -> Self {
        Self {
            unknown_keys: UnknownKeys::Allow,
            ..Self::new(id, Vec::new())
        }
    }

    /// Returns the field definition with the given name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validates the schema structure itself (not a document)
    pub fn validate_structure(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("schema id must not be empty".into());
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err("field names must not be empty".into());
            }
            if !seen.insert(field.name.as_str()) {
                return Err(format!("field '{}' is declared twice", field.name));
            }
            check_rule(&field.name, &field.rule)?;
        }

        for rule in &self.cross_field {
            for name in rule.fields() {
                if !seen.contains(name) {
                    return Err(format!("cross-field rule refers to undeclared field '{}'", name));
                }
            }
        }

        Ok(())
    }
}

/// Checks a field rule, descending into nested schemas, list items and
/// map values.
fn check_rule(field: &str, rule: &Rule) -> Result<(), String> {
    match rule {
        Rule::Object { schema } => schema.validate_structure(),
        Rule::List { items } => check_rule(field, items),
        Rule::Map { values, .. } => check_rule(field, values),
        Rule::Number { min, max, .. } if min > max => {
            Err(format!("field '{}' has min {} above max {}", field, min, max))
        }
        _ => Ok(()),
    }
}
