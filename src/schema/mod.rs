//! Validation and normalization engine
//!
//! Schemas are data; the validator interprets them.
//!
//! # Design Principles
//!
//! - Field rules are tagged descriptors, not code
//! - Cross-field rules run after per-field normalization
//! - Unknown-key handling is explicit per schema
//! - Validation is pure: no I/O, no logging, no shared mutable state
//! - Deterministic results and error paths

mod errors;
mod fields;
mod registry;
mod types;
mod validator;
mod value;

pub use errors::{ErrorKind, RegistryError, SchemaError, SchemaResult, Violation, ROOT_PATH};
pub use fields::{is_identifier, is_uri_or_path};
pub use registry::SchemaRegistry;
pub use types::{CrossFieldRule, FieldDef, Presence, Rule, Schema, UnknownKeys, Unit};
pub use validator::{SchemaValidator, ValidateOptions};
pub use value::{Callable, JsonConversionError, Map, Value};
