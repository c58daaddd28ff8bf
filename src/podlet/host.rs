//! Host options schema
//!
//! How a layout server mounts a podlet. Unlike the other documents these
//! carry functions (`render` and per-resource `resolver`), so the typed
//! result is read straight from the normalized value instead of going
//! through serde.

use std::sync::OnceLock;

use super::{resource_fields, seconds, DEFAULT_METHOD};
use crate::schema::{
    Callable, CrossFieldRule, ErrorKind, FieldDef, Map, Rule, Schema, SchemaError, SchemaResult,
    SchemaValidator, Value, Violation,
};

pub const HOST_OPTIONS_SCHEMA_ID: &str = "host-options";

static HOST_OPTIONS: OnceLock<Schema> = OnceLock::new();

/// Resource mount entry: a resource entry plus an optional resolver.
pub fn resource_mount_schema() -> Schema {
    let mut fields = resource_fields();
    fields.push(FieldDef::optional("resolver", Rule::Function));
    Schema::new("resource-mount", fields)
}

fn build() -> Schema {
    Schema {
        cross_field: vec![CrossFieldRule::less_than("maxDataAge", "maxAge")],
        ..Schema::new(
            HOST_OPTIONS_SCHEMA_ID,
            vec![
                FieldDef::required("id", Rule::string()),
                FieldDef::required("version", Rule::string()),
                FieldDef::required("maxAge", seconds()),
                FieldDef::optional("maxDataAge", seconds()),
                FieldDef::optional("args", Rule::object(Schema::open("args"))),
                FieldDef::optional("fallbackArgs", Rule::object(Schema::open("fallbackArgs"))),
                FieldDef::optional("entrypoints", Rule::list(Rule::string())),
                FieldDef::with_default(
                    "resources",
                    Rule::list(Rule::object(resource_mount_schema())),
                    Vec::<Value>::new(),
                ),
                FieldDef::required("render", Rule::Function),
            ],
        )
    }
}

pub fn host_options_schema() -> &'static Schema {
    HOST_OPTIONS.get_or_init(build)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceMount {
    pub path: String,
    pub method: String,
    pub params: Option<Vec<String>>,
    pub resolver: Option<Callable>,
}

/// Normalized host options
#[derive(Debug, Clone, PartialEq)]
pub struct HostOptions {
    pub id: String,
    pub version: String,
    pub max_age: f64,
    pub max_data_age: Option<f64>,
    /// Free-form arguments passed to the podlet on every request
    pub args: Option<Map>,
    pub fallback_args: Option<Map>,
    pub entrypoints: Option<Vec<String>>,
    pub resources: Vec<ResourceMount>,
    pub render: Callable,
}

/// Validates host options and returns them typed.
///
/// `render` and each `resolver` are the same references the caller
/// passed in.
pub fn validate_host_options(candidate: &Value) -> SchemaResult<HostOptions> {
    let schema = host_options_schema();
    let normalized = SchemaValidator::new().validate(schema, candidate)?;
    HostOptions::from_normalized(&normalized).map_err(|violation| SchemaError::new(&schema.id, violation))
}

impl HostOptions {
    fn from_normalized(value: &Value) -> Result<Self, Violation> {
        let object = object_at(value, "")?;
        let resources = list_at(object, "resources", "")?
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(i, entry)| ResourceMount::from_normalized(entry, &format!("resources.{}", i)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: required(object, "id", "", Value::as_str)?.to_string(),
            version: required(object, "version", "", Value::as_str)?.to_string(),
            max_age: required(object, "maxAge", "", Value::as_f64)?,
            max_data_age: optional(object, "maxDataAge", "", Value::as_f64)?,
            args: optional(object, "args", "", Value::as_object)?.cloned(),
            fallback_args: optional(object, "fallbackArgs", "", Value::as_object)?.cloned(),
            entrypoints: strings_at(object, "entrypoints", "")?,
            resources,
            render: required(object, "render", "", Value::as_callable)?.clone(),
        })
    }
}

impl ResourceMount {
    fn from_normalized(value: &Value, path: &str) -> Result<Self, Violation> {
        let object = object_at(value, path)?;
        Ok(Self {
            path: required(object, "path", path, Value::as_str)?.to_string(),
            method: optional(object, "method", path, Value::as_str)?
                .unwrap_or(DEFAULT_METHOD)
                .to_string(),
            params: strings_at(object, "params", path)?,
            resolver: optional(object, "resolver", path, Value::as_callable)?.cloned(),
        })
    }
}

fn field_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn object_at<'a>(value: &'a Value, path: &str) -> Result<&'a Map, Violation> {
    value
        .as_object()
        .ok_or_else(|| Violation::type_mismatch(path, "object", value))
}

fn optional<'a, T>(
    object: &'a Map,
    key: &str,
    prefix: &str,
    read: impl Fn(&'a Value) -> Option<T>,
) -> Result<Option<T>, Violation> {
    match object.get(key) {
        None => Ok(None),
        Some(value) => read(value).map(Some).ok_or_else(|| {
            Violation::new(
                ErrorKind::TypeMismatch,
                &field_path(prefix, key),
                "normalized field of the declared type",
                value.describe(),
            )
        }),
    }
}

fn required<'a, T>(
    object: &'a Map,
    key: &str,
    prefix: &str,
    read: impl Fn(&'a Value) -> Option<T>,
) -> Result<T, Violation> {
    optional(object, key, prefix, read)?
        .ok_or_else(|| Violation::missing_field(&field_path(prefix, key)))
}

fn list_at<'a>(object: &'a Map, key: &str, prefix: &str) -> Result<Option<&'a Vec<Value>>, Violation> {
    optional(object, key, prefix, Value::as_array)
}

fn strings_at(object: &Map, key: &str, prefix: &str) -> Result<Option<Vec<String>>, Violation> {
    let Some(items) = list_at(object, key, prefix)? else {
        return Ok(None);
    };
    let list_path = field_path(prefix, key);
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                Violation::type_mismatch(&field_path(&list_path, &i.to_string()), "string", item)
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}
