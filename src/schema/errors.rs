//! Validation error types
//!
//! Error kinds:
//! - PODIUM_TYPE_MISMATCH
//! - PODIUM_INVALID_FORMAT
//! - PODIUM_REQUIRED_FIELD_MISSING
//! - PODIUM_OUT_OF_RANGE
//! - PODIUM_RELATIONAL_CONSTRAINT_VIOLATION
//! - PODIUM_MUTUALLY_EXCLUSIVE_VIOLATION
//! - PODIUM_TOO_MANY_ENTRIES
//! - PODIUM_UNKNOWN_KEY
//!
//! The engine only classifies. Whether a failure is fatal (reject a
//! manifest publish) or recoverable is decided by the caller.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::value::Value;

/// Path reported for violations on the top-level value.
pub const ROOT_PATH: &str = "$root";

/// Classification of a violated constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Value has the wrong type
    TypeMismatch,
    /// Pattern, charset or URI scheme violation
    InvalidFormat,
    /// Required field absent
    RequiredFieldMissing,
    /// Numeric bounds violated
    OutOfRange,
    /// One field not less than its bound (maxDataAge >= maxAge)
    RelationalConstraintViolation,
    /// Not exactly one of a set of fields present (fallback XOR fallbacks)
    MutuallyExclusiveViolation,
    /// Mapping has more entries than allowed
    TooManyEntries,
    /// Undeclared key under the reject policy
    UnknownKey,
}

impl ErrorKind {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::TypeMismatch => "PODIUM_TYPE_MISMATCH",
            ErrorKind::InvalidFormat => "PODIUM_INVALID_FORMAT",
            ErrorKind::RequiredFieldMissing => "PODIUM_REQUIRED_FIELD_MISSING",
            ErrorKind::OutOfRange => "PODIUM_OUT_OF_RANGE",
            ErrorKind::RelationalConstraintViolation => "PODIUM_RELATIONAL_CONSTRAINT_VIOLATION",
            ErrorKind::MutuallyExclusiveViolation => "PODIUM_MUTUALLY_EXCLUSIVE_VIOLATION",
            ErrorKind::TooManyEntries => "PODIUM_TOO_MANY_ENTRIES",
            ErrorKind::UnknownKey => "PODIUM_UNKNOWN_KEY",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single violated constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Constraint kind
    pub kind: ErrorKind,
    /// Dot-delimited field path (e.g., "metadata.resources.0.path")
    pub path: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value or type found
    pub actual: String,
}

impl Violation {
    pub fn new(
        kind: ErrorKind,
        path: &str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        let path = if path.is_empty() { ROOT_PATH } else { path };
        Self {
            kind,
            path: path.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn type_mismatch(path: &str, expected: &str, actual: &Value) -> Self {
        Self::new(ErrorKind::TypeMismatch, path, expected, actual.describe())
    }

    pub fn invalid_format(path: &str, expected: impl Into<String>, actual: &Value) -> Self {
        Self::new(ErrorKind::InvalidFormat, path, expected, actual.describe())
    }

    pub fn missing_field(path: &str) -> Self {
        Self::new(
            ErrorKind::RequiredFieldMissing,
            path,
            "field to be present",
            "missing",
        )
    }

    pub fn out_of_range(path: &str, min: f64, max: f64, actual: &Value) -> Self {
        Self::new(
            ErrorKind::OutOfRange,
            path,
            format!("number between {} and {}", min, max),
            actual.describe(),
        )
    }

    pub fn not_less_than(path: &str, bound: &str, value: f64, bound_value: f64) -> Self {
        Self::new(
            ErrorKind::RelationalConstraintViolation,
            path,
            format!("value less than '{}' ({})", bound, bound_value),
            format!("number {}", value),
        )
    }

    pub fn not_exactly_one(path: &str, fields: &[String], present: &[&str]) -> Self {
        let actual = if present.is_empty() {
            "none present".to_string()
        } else {
            format!("present: {}", present.join(", "))
        };
        Self::new(
            ErrorKind::MutuallyExclusiveViolation,
            path,
            format!("exactly one of {}", fields.join(", ")),
            actual,
        )
    }

    pub fn too_many_entries(path: &str, max: usize, count: usize) -> Self {
        Self::new(
            ErrorKind::TooManyEntries,
            path,
            format!("at most {} entries", max),
            format!("{} entries", count),
        )
    }

    pub fn unknown_key(path: &str) -> Self {
        Self::new(
            ErrorKind::UnknownKey,
            path,
            "no undeclared fields",
            "undeclared field present",
        )
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field '{}': expected {}, got {}",
            self.path, self.expected, self.actual
        )
    }
}

/// A rejected validation call.
///
/// Always carries at least one violation. The first one is the
/// representative error; further ones are only collected when the
/// validator runs with `abort_early` disabled.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    schema: String,
    first: Violation,
    others: Vec<Violation>,
}

impl SchemaError {
    pub fn new(schema: impl Into<String>, first: Violation) -> Self {
        Self {
            schema: schema.into(),
            first,
            others: Vec::new(),
        }
    }

    /// Attaches violations found after the first one
    pub fn with_others(mut self, others: Vec<Violation>) -> Self {
        self.others = others;
        self
    }

    /// Returns the id of the schema that rejected the value
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Returns the kind of the representative violation
    pub fn kind(&self) -> ErrorKind {
        self.first.kind
    }

    /// Returns the path of the representative violation
    pub fn path(&self) -> &str {
        &self.first.path
    }

    /// Returns the representative violation
    pub fn first(&self) -> &Violation {
        &self.first
    }

    /// Returns every collected violation, in evaluation order
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        std::iter::once(&self.first).chain(self.others.iter())
    }

    pub fn count(&self) -> usize {
        1 + self.others.len()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: schema '{}' rejected value: {}",
            self.first.kind, self.schema, self.first
        )?;
        if !self.others.is_empty() {
            write!(f, " (and {} more)", self.others.len())?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// Result type for validation calls
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while assembling a schema registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("schema '{0}' is already registered")]
    Duplicate(String),

    #[error("malformed schema '{id}': {reason}")]
    Malformed { id: String, reason: String },
}
