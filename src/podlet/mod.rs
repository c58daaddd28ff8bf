//! Podlet schemas
//!
//! The fixed schema set exchanged between podlets and layout servers:
//! - manifest: what a podlet publishes about itself
//! - content, metadata, response: what a podlet returns when rendered
//! - host-options: how a layout server mounts a podlet
//!
//! Each schema is built once and exposed as `&'static Schema`. The
//! `validate_*` functions run the engine and decode the normalized value
//! into a typed document.

mod host;
mod manifest;
mod response;

pub use host::{
    host_options_schema, resource_mount_schema, validate_host_options, HostOptions, ResourceMount,
    HOST_OPTIONS_SCHEMA_ID,
};
pub use manifest::{
    manifest_schema, validate_manifest, Assets, Manifest, MANIFEST_SCHEMA_ID, MAX_PROXY_ENTRIES,
};
pub use response::{
    content_schema, metadata_schema, resource_entry_schema, response_schema, validate_content,
    validate_metadata, validate_response, Content, Metadata, ResourceEntry, Response,
    CONTENT_SCHEMA_ID, METADATA_SCHEMA_ID, RESPONSE_SCHEMA_ID,
};

/// Per-field rules of the manifest, for validating single fields.
pub mod fields {
    pub use super::manifest::{content, css, fallback, js, name, proxy, team, uri, version};
}

use serde::de::DeserializeOwned;

use crate::schema::{
    ErrorKind, FieldDef, Rule, Schema, SchemaError, SchemaResult, SchemaValidator, Unit, Value,
    Violation,
};

/// Upper bound for cache ages: 60 hours, in seconds.
pub const MAX_AGE_SECONDS: f64 = 216_000.0;

/// Default HTTP method of a resource entry.
pub const DEFAULT_METHOD: &str = "GET";

/// Returns every built-in schema.
pub fn builtin_schemas() -> [&'static Schema; 5] {
    [
        manifest_schema(),
        content_schema(),
        metadata_schema(),
        response_schema(),
        host_options_schema(),
    ]
}

/// Cache age in seconds, `[0, MAX_AGE_SECONDS]`.
fn seconds() -> Rule {
    Rule::Number {
        min: 0.0,
        max: MAX_AGE_SECONDS,
        unit: Unit::Seconds,
    }
}

/// Fields shared by resource entries and resource mount entries.
fn resource_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::required("path", Rule::string()),
        FieldDef::with_default("method", Rule::string(), DEFAULT_METHOD),
        FieldDef::optional("params", Rule::list(Rule::string())),
    ]
}

/// Validates with default options and decodes the normalized value.
fn validate_into<T: DeserializeOwned>(schema: &Schema, candidate: &Value) -> SchemaResult<T> {
    let normalized = SchemaValidator::new().validate(schema, candidate)?;
    decode(&schema.id, normalized)
}

/// Decodes a normalized, function-free value through serde.
fn decode<T: DeserializeOwned>(schema_id: &str, normalized: Value) -> SchemaResult<T> {
    let described = normalized.describe();
    serde_json::Value::try_from(normalized)
        .map_err(|e| e.to_string())
        .and_then(|json| serde_json::from_value(json).map_err(|e| e.to_string()))
        .map_err(|reason| {
            SchemaError::new(
                schema_id,
                Violation::new(
                    ErrorKind::TypeMismatch,
                    "",
                    format!("document decodable as '{}' ({})", schema_id, reason),
                    described,
                ),
            )
        })
}
