//! Dynamic values evaluated by the schema engine
//!
//! Podlet documents arrive as JSON, but host options also carry functions
//! (`render`, `resolver`). The engine therefore works over its own value
//! type, where functions are an opaque `Callable` capability that can only
//! be asked whether it is callable.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use thiserror::Error;

/// Object representation, ordered by key for deterministic output.
pub type Map = BTreeMap<String, Value>;

type CallableFn = dyn Fn(&[Value]) -> Value + Send + Sync;

/// Largest integer an `f64` holds exactly (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Longest scalar rendering kept in error descriptions; longer numbers
/// switch to exponent notation.
const MAX_DESCRIBED_LEN: usize = 64;

/// An opaque function reference.
///
/// The engine never invokes it; it is carried through normalization so the
/// host application receives the same reference it passed in.
#[derive(Clone)]
pub struct Callable {
    inner: Arc<CallableFn>,
}

impl Callable {
    /// Wraps a function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Invokes the wrapped function.
    pub fn call(&self, args: &[Value]) -> Value {
        (self.inner)(args)
    }
}

impl PartialEq for Callable {
    /// Two callables are equal only when they share the same allocation.
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable")
    }
}

/// A dynamically typed document value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map),
    Function(Callable),
}

impl Value {
    /// Returns the type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Describes the value for error reports: the type, plus the value
    /// itself for scalars.
    pub fn describe(&self) -> String {
        match self {
            Value::Bool(b) => format!("boolean {}", b),
            Value::Number(n) => {
                let shown = n.to_string();
                if shown.len() > MAX_DESCRIBED_LEN {
                    format!("number {:e}", n)
                } else {
                    format!("number {}", shown)
                }
            }
            Value::String(s) => {
                let mut shown: String = s.chars().take(MAX_DESCRIBED_LEN).collect();
                if shown.len() < s.len() {
                    shown.push_str("...");
                }
                format!("string {:?}", shown)
            }
            Value::Array(items) => format!("array of {} item(s)", items.len()),
            Value::Object(map) => format!("object with {} key(s)", map.len()),
            other => other.type_name().to_string(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// The single predicate the engine applies to function fields.
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Looks up a key when the value is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Callable> for Value {
    fn from(f: Callable) -> Self {
        Value::Function(f)
    }
}

/// Raised when a value has no JSON counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsonConversionError {
    #[error("function values have no JSON representation")]
    Function,

    #[error("number {0} has no JSON representation")]
    NonFiniteNumber(String),
}

impl TryFrom<Value> for serde_json::Value {
    type Error = JsonConversionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => serde_json::Value::Number(json_number(n)?),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => serde_json::Value::Array(
                items
                    .into_iter()
                    .map(serde_json::Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => {
                let mut object = serde_json::Map::new();
                for (key, value) in map {
                    object.insert(key, serde_json::Value::try_from(value)?);
                }
                serde_json::Value::Object(object)
            }
            Value::Function(_) => return Err(JsonConversionError::Function),
        })
    }
}

/// Integral values within the exact range become JSON integers.
fn as_exact_integer(n: f64) -> Option<i64> {
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER {
        Some(n as i64)
    } else {
        None
    }
}

fn json_number(n: f64) -> Result<serde_json::Number, JsonConversionError> {
    match as_exact_integer(n) {
        Some(i) => Ok(serde_json::Number::from(i)),
        None => serde_json::Number::from_f64(n)
            .ok_or_else(|| JsonConversionError::NonFiniteNumber(n.to_string())),
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => match as_exact_integer(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            Value::Function(_) => serializer.serialize_str("[function]"),
        }
    }
}
