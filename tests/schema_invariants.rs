//! Schema Invariant Tests
//!
//! Invariants of the built-in podlet schemas:
//! - Validation is deterministic
//! - Normalization is idempotent
//! - Undeclared fields are stripped, never rejected
//! - Defaults are applied for absent optional fields
//! - fallback XOR fallbacks, maxDataAge < maxAge
//! - Validation is safe to run concurrently

use std::sync::Arc;
use std::thread;

use podium_schema::podlet::{
    host_options_schema, metadata_schema, response_schema, validate_metadata,
};
use podium_schema::schema::{
    Callable, ErrorKind, Map, SchemaRegistry, SchemaValidator, UnknownKeys, ValidateOptions, Value,
};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn sample_response() -> Value {
    Value::from(json!({
        "id": "recommendations",
        "version": "1.2.0",
        "data": {"html": "<section></section>", "assetId": "a-1"},
        "metadata": {
            "fallback": {"html": "<p>unavailable</p>"},
            "maxAge": 600,
            "maxDataAge": 60,
            "resources": [{"path": "/recommendations.json", "params": ["user"]}]
        },
        "trace": "abc"
    }))
}

fn sample_host_options() -> Value {
    let mut resource = Map::new();
    resource.insert("path".into(), Value::from("/api"));
    resource.insert(
        "resolver".into(),
        Value::from(Callable::new(|_| Value::from("resolved"))),
    );

    let mut doc = match Value::from(json!({
        "id": "header",
        "version": "1.0.0",
        "maxAge": 60,
        "args": {"locale": "nb-NO"},
        "extra": true
    })) {
        Value::Object(map) => map,
        _ => unreachable!(),
    };
    doc.insert("resources".into(), Value::Array(vec![Value::Object(resource)]));
    doc.insert(
        "render".into(),
        Value::from(Callable::new(|_| Value::from("<header/>"))),
    );
    Value::Object(doc)
}

fn metadata(doc: serde_json::Value) -> Result<(), ErrorKind> {
    validate_metadata(&Value::from(doc))
        .map(|_| ())
        .map_err(|e| e.kind())
}

// =============================================================================
// Determinism Tests
// =============================================================================

/// Same document validates the same way every time.
#[test]
fn test_validation_is_deterministic() {
    let validator = SchemaValidator::new();
    let doc = sample_response();

    let first = validator.validate(response_schema(), &doc).unwrap();
    for _ in 0..100 {
        assert_eq!(validator.validate(response_schema(), &doc).unwrap(), first);
    }
}

/// Invalid document fails with the same error every time.
#[test]
fn test_invalid_document_fails_consistently() {
    let validator = SchemaValidator::new();
    let doc = Value::from(json!({"id": "x", "version": "1", "data": {"html": 1}}));

    let first = validator.validate(response_schema(), &doc).unwrap_err();
    for _ in 0..100 {
        assert_eq!(validator.validate(response_schema(), &doc).unwrap_err(), first);
    }
}

// =============================================================================
// Normalization Tests
// =============================================================================

/// Validating a normalized value yields the same value.
#[test]
fn test_normalization_is_idempotent() {
    let validator = SchemaValidator::new();
    for schema in SchemaRegistry::global().unwrap().all_schemas() {
        let sample = match schema.id.as_str() {
            "manifest" => Value::from(json!({"name": " a ", "version": " 1 ", "content": "/c"})),
            "content" => Value::from(json!({"html": "<p/>"})),
            "metadata" => Value::from(json!({"fallbacks": {"x": {"html": "a"}}, "maxAge": 1})),
            "response" => Value::from(json!({"id": "a", "version": "1", "data": {"html": "<p/>"}})),
            "host-options" => sample_host_options(),
            other => panic!("no sample for schema '{}'", other),
        };

        let once = validator.validate(schema, &sample).unwrap();
        let twice = validator.validate(schema, &once).unwrap();
        assert_eq!(once, twice, "schema '{}'", schema.id);
    }
}

/// Functions survive repeated normalization as the same references.
#[test]
fn test_host_options_normalization_keeps_functions() {
    let validator = SchemaValidator::new();
    let sample = sample_host_options();

    let once = validator.validate(host_options_schema(), &sample).unwrap();
    let twice = validator.validate(host_options_schema(), &once).unwrap();
    assert_eq!(once, twice);
    assert_eq!(twice.get("render"), sample.get("render"));

    let resolver = |doc: &Value| {
        doc.get("resources")
            .and_then(Value::as_array)
            .and_then(|r| r.first())
            .and_then(|r| r.get("resolver"))
            .cloned()
    };
    assert!(resolver(&twice).is_some());
    assert_eq!(resolver(&twice), resolver(&sample));
}

/// Undeclared fields are removed at every level.
#[test]
fn test_unknown_keys_stripped_at_every_level() {
    let normalized = SchemaValidator::new()
        .validate(response_schema(), &sample_response())
        .unwrap();

    assert!(normalized.get("trace").is_none());
    assert!(normalized.get("data").and_then(|d| d.get("assetId")).is_some());
}

#[test]
fn test_builtin_schemas_strip() {
    for schema in SchemaRegistry::global().unwrap().all_schemas() {
        assert_eq!(schema.unknown_keys, UnknownKeys::Strip, "schema '{}'", schema.id);
    }
}

/// Resource entries get the default method.
#[test]
fn test_resource_method_default() {
    let normalized = SchemaValidator::new()
        .validate(response_schema(), &sample_response())
        .unwrap();
    let resource = normalized
        .get("metadata")
        .and_then(|m| m.get("resources"))
        .and_then(Value::as_array)
        .and_then(|r| r.first())
        .cloned()
        .unwrap();

    assert_eq!(resource.get("method"), Some(&Value::from("GET")));
}

// =============================================================================
// Cross-field Tests
// =============================================================================

#[test]
fn test_fallback_xor_fallbacks() {
    assert!(metadata(json!({"fallback": {"html": "a"}, "maxAge": 1})).is_ok());
    assert!(metadata(json!({"fallbacks": {"d": {"html": "a"}}, "maxAge": 1})).is_ok());
    assert_eq!(
        metadata(json!({"maxAge": 1})),
        Err(ErrorKind::MutuallyExclusiveViolation)
    );
    assert_eq!(
        metadata(json!({
            "fallback": {"html": "a"},
            "fallbacks": {"d": {"html": "a"}},
            "maxAge": 1
        })),
        Err(ErrorKind::MutuallyExclusiveViolation)
    );
}

#[test]
fn test_max_data_age_less_than_max_age() {
    assert_eq!(
        metadata(json!({"fallback": {"html": "a"}, "maxAge": 100, "maxDataAge": 150})),
        Err(ErrorKind::RelationalConstraintViolation)
    );
    assert_eq!(
        metadata(json!({"fallback": {"html": "a"}, "maxAge": 100, "maxDataAge": 100})),
        Err(ErrorKind::RelationalConstraintViolation)
    );
    assert!(metadata(json!({"fallback": {"html": "a"}, "maxAge": 100, "maxDataAge": 50})).is_ok());
}

#[test]
fn test_cache_age_bounds() {
    assert!(metadata(json!({"fallback": {"html": "a"}, "maxAge": 216000})).is_ok());
    assert_eq!(
        metadata(json!({"fallback": {"html": "a"}, "maxAge": 216001})),
        Err(ErrorKind::OutOfRange)
    );
    assert_eq!(
        metadata(json!({"fallback": {"html": "a"}, "maxAge": -1})),
        Err(ErrorKind::OutOfRange)
    );
    assert_eq!(
        metadata(json!({"fallback": {"html": "a"}, "maxAge": "60"})),
        Err(ErrorKind::TypeMismatch)
    );
}

/// Error text stays short for numbers far outside the range.
#[test]
fn test_huge_number_described_compactly() {
    let err = validate_metadata(&Value::from(json!({
        "fallback": {"html": "a"},
        "maxAge": 1e300
    })))
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::OutOfRange);
    assert_eq!(err.first().actual, "number 1e300");
}

/// Field errors win over cross-field errors, even when collecting.
#[test]
fn test_cross_field_rules_skipped_after_field_errors() {
    let validator = SchemaValidator::with_options(ValidateOptions { abort_early: false });
    let err = validator
        .validate(
            metadata_schema(),
            &Value::from(json!({"maxAge": "soon", "maxDataAge": 5})),
        )
        .unwrap_err();

    assert_eq!(err.count(), 1);
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(err.path(), "maxAge");
}

// =============================================================================
// Concurrency Tests
// =============================================================================

/// One validator and the global registry serve many threads.
#[test]
fn test_concurrent_validation() {
    let validator = Arc::new(SchemaValidator::new());
    let expected = validator.validate(response_schema(), &sample_response()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let validator = Arc::clone(&validator);
            thread::spawn(move || {
                let schema = SchemaRegistry::global().unwrap().get("response").unwrap();
                (0..50)
                    .map(|_| validator.validate(schema, &sample_response()).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        for normalized in handle.join().unwrap() {
            assert_eq!(normalized, expected);
        }
    }
}
