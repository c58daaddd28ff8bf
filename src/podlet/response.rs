//! Content, metadata and response schemas
//!
//! A rendered podlet answers with a response: its identity, the content
//! it produced, and optional metadata telling the layout server how long
//! the content may be cached, what to show when the podlet is down, and
//! which resource paths its client code talks to.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::{resource_fields, seconds, validate_into};
use crate::schema::{CrossFieldRule, FieldDef, Rule, Schema, SchemaResult, Value};

pub const CONTENT_SCHEMA_ID: &str = "content";
pub const METADATA_SCHEMA_ID: &str = "metadata";
pub const RESPONSE_SCHEMA_ID: &str = "response";

static CONTENT: OnceLock<Schema> = OnceLock::new();
static METADATA: OnceLock<Schema> = OnceLock::new();
static RESPONSE: OnceLock<Schema> = OnceLock::new();

fn build_content() -> Schema {
    Schema::new(
        CONTENT_SCHEMA_ID,
        vec![
            FieldDef::required("html", Rule::string()),
            FieldDef::optional("assetId", Rule::string()),
        ],
    )
}

/// Resource entry: a path the podlet's client code expects the layout
/// server to proxy.
pub fn resource_entry_schema() -> Schema {
    Schema::new("resource", resource_fields())
}

fn build_metadata() -> Schema {
    Schema {
        cross_field: vec![
            CrossFieldRule::exactly_one_of(&["fallback", "fallbacks"]),
            CrossFieldRule::less_than("maxDataAge", "maxAge"),
        ],
        ..Schema::new(
            METADATA_SCHEMA_ID,
            vec![
                FieldDef::optional("fallbacks", Rule::map(Rule::object(build_content()), None)),
                FieldDef::optional("fallback", Rule::object(build_content())),
                FieldDef::optional("maxDataAge", seconds()),
                FieldDef::required("maxAge", seconds()),
                FieldDef::optional("resources", Rule::list(Rule::object(resource_entry_schema()))),
            ],
        )
    }
}

fn build_response() -> Schema {
    Schema::new(
        RESPONSE_SCHEMA_ID,
        vec![
            FieldDef::required("id", Rule::string()),
            FieldDef::required("version", Rule::string()),
            FieldDef::required("data", Rule::object(build_content())),
            FieldDef::optional("metadata", Rule::object(build_metadata())),
        ],
    )
}

pub fn content_schema() -> &'static Schema {
    CONTENT.get_or_init(build_content)
}

pub fn metadata_schema() -> &'static Schema {
    METADATA.get_or_init(build_metadata)
}

pub fn response_schema() -> &'static Schema {
    RESPONSE.get_or_init(build_response)
}

/// Rendered podlet content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub path: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<String>>,
}

/// Caching and fallback metadata. Exactly one of `fallback` and
/// `fallbacks` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallbacks: Option<BTreeMap<String, Content>>,
    pub max_age: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_data_age: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<ResourceEntry>>,
}

/// Response returned by a rendered podlet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: String,
    pub version: String,
    pub data: Content,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

pub fn validate_content(candidate: &Value) -> SchemaResult<Content> {
    validate_into(content_schema(), candidate)
}

pub fn validate_metadata(candidate: &Value) -> SchemaResult<Metadata> {
    validate_into(metadata_schema(), candidate)
}

pub fn validate_response(candidate: &Value) -> SchemaResult<Response> {
    validate_into(response_schema(), candidate)
}
