//! Manifest schema
//!
//! The manifest is the descriptor a podlet publishes: its identity, where
//! its content and fallback live, its assets and the endpoints a layout
//! server should proxy for it.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::validate_into;
use crate::schema::{FieldDef, Map, Rule, Schema, SchemaResult, Value};

pub const MANIFEST_SCHEMA_ID: &str = "manifest";

/// Maximum number of proxy entries a podlet may declare.
pub const MAX_PROXY_ENTRIES: usize = 4;

static MANIFEST: OnceLock<Schema> = OnceLock::new();

/// Podlet name: trimmed identifier.
pub fn name() -> Rule {
    Rule::Identifier
}

/// Podlet version. Any non-empty string; not checked as semver.
pub fn version() -> Rule {
    Rule::Text {
        trim: true,
        allow_empty: false,
    }
}

/// Required URI or path.
pub fn uri() -> Rule {
    Rule::UriOrPath { allow_empty: false }
}

/// Optional URI or path, where "" means unset.
fn optional_uri() -> Rule {
    Rule::UriOrPath { allow_empty: true }
}

pub fn content() -> Rule {
    uri()
}

pub fn fallback() -> Rule {
    optional_uri()
}

pub fn js() -> Rule {
    optional_uri()
}

pub fn css() -> Rule {
    optional_uri()
}

pub fn proxy() -> Rule {
    Rule::map(uri(), Some(MAX_PROXY_ENTRIES))
}

pub fn team() -> Rule {
    Rule::Text {
        trim: true,
        allow_empty: true,
    }
}

fn assets() -> Schema {
    Schema::new(
        "assets",
        vec![
            FieldDef::with_default("js", js(), ""),
            FieldDef::with_default("css", css(), ""),
        ],
    )
}

fn build() -> Schema {
    Schema::new(
        MANIFEST_SCHEMA_ID,
        vec![
            FieldDef::required("name", name()),
            FieldDef::required("version", version()),
            FieldDef::required("content", content()),
            FieldDef::with_default("fallback", fallback(), ""),
            FieldDef::with_default("assets", Rule::object(assets()), Map::new()),
            FieldDef::with_default("proxy", proxy(), Map::new()),
            FieldDef::with_default("team", team(), ""),
        ],
    )
}

/// Returns the manifest schema.
pub fn manifest_schema() -> &'static Schema {
    MANIFEST.get_or_init(build)
}

/// Asset locations; "" when the podlet ships none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assets {
    pub js: String,
    pub css: String,
}

/// Normalized podlet manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    pub content: String,
    pub fallback: String,
    pub assets: Assets,
    pub proxy: BTreeMap<String, String>,
    pub team: String,
}

/// Validates and normalizes a manifest.
pub fn validate_manifest(candidate: &Value) -> SchemaResult<Manifest> {
    validate_into(manifest_schema(), candidate)
}
