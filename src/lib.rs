//! podium-schema - validation and normalization of podlet documents
//!
//! Podlets publish manifests and answer with content responses; layout
//! servers mount them with host options. This crate checks each of those
//! documents against a fixed, hand-authored schema and returns either the
//! normalized document (defaults applied, strings trimmed, unknown keys
//! stripped) or a structured error naming the violated constraint.

pub mod cli;
pub mod observability;
pub mod podlet;
pub mod schema;

pub use podlet::{
    validate_content, validate_host_options, validate_manifest, validate_metadata,
    validate_response,
};
pub use schema::{ErrorKind, SchemaError, SchemaResult, SchemaValidator, ValidateOptions, Value};
