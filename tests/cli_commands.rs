//! CLI Command Tests
//!
//! End-to-end runs of the command layer with files on disk:
//! - validate reads input files and honours config and flags
//! - every response is a single JSON object
//! - config errors are reported like any other failure

use std::fs;
use std::path::{Path, PathBuf};

use podium_schema::cli::{run_command, CliError, Command};
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn quiet_config(dir: &TempDir, extra: Value) -> PathBuf {
    let mut config = json!({"log_level": "fatal"});
    if let (Some(config), Some(extra)) = (config.as_object_mut(), extra.as_object()) {
        config.extend(extra.clone());
    }
    write_file(dir, "podium-schema.json", &config.to_string())
}

fn run(config: &Path, cmd: Command) -> (Result<(), CliError>, String) {
    let mut out = Vec::new();
    let result = run_command(Some(config), cmd, "".as_bytes(), &mut out);
    (result, String::from_utf8(out).unwrap())
}

fn validate_file(schema: &str, input: PathBuf, all_errors: bool) -> Command {
    Command::Validate {
        schema: schema.to_string(),
        input: Some(input),
        all_errors,
        pretty: false,
    }
}

// =============================================================================
// validate
// =============================================================================

#[test]
fn test_validate_response_file() {
    let dir = TempDir::new().unwrap();
    let config = quiet_config(&dir, json!({}));
    let input = write_file(
        &dir,
        "response.json",
        &json!({
            "id": "podlet",
            "version": "2.0.0",
            "data": {"html": "<div></div>"},
            "metadata": {
                "fallbacks": {"mobile": {"html": "<p/>"}},
                "maxAge": 60,
                "resources": [{"path": "/api", "method": "POST"}]
            }
        })
        .to_string(),
    );

    let (result, output) = run(&config, validate_file("response", input, false));
    result.unwrap();

    let response: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(response["status"], "ok");
    assert_eq!(response["data"]["metadata"]["maxAge"], 60);
    assert_eq!(response["data"]["metadata"]["resources"][0]["method"], "POST");
    assert_eq!(output.lines().count(), 1);
}

#[test]
fn test_config_disables_abort_early() {
    let dir = TempDir::new().unwrap();
    let config = quiet_config(&dir, json!({"abort_early": false}));
    let input = write_file(&dir, "manifest.json", r#"{"name": 1, "version": "", "content": "x"}"#);

    let (result, output) = run(&config, validate_file("manifest", input, false));
    assert!(matches!(result, Err(CliError::Validation(_))));

    let response: Value = serde_json::from_str(&output).unwrap();
    let kinds: Vec<&str> = response["violations"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v["kind"].as_str())
        .collect();
    assert_eq!(kinds, vec!["TYPE_MISMATCH", "INVALID_FORMAT", "INVALID_FORMAT"]);
}

#[test]
fn test_abort_early_by_default() {
    let dir = TempDir::new().unwrap();
    let config = quiet_config(&dir, json!({}));
    let input = write_file(&dir, "manifest.json", r#"{"name": 1, "version": "", "content": "x"}"#);

    let (_, output) = run(&config, validate_file("manifest", input, false));
    let response: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(response["violations"].as_array().map(Vec::len), Some(1));
    assert_eq!(response["violations"][0]["path"], "name");
}

#[test]
fn test_pretty_output() {
    let dir = TempDir::new().unwrap();
    let config = quiet_config(&dir, json!({"pretty": true}));
    let input = write_file(&dir, "content.json", r#"{"html": "<b>hi</b>"}"#);

    let (result, output) = run(&config, validate_file("content", input, false));
    result.unwrap();
    assert!(output.lines().count() > 1);
}

/// Host options carry a render function, which JSON cannot express.
#[test]
fn test_host_options_from_json_lack_render() {
    let dir = TempDir::new().unwrap();
    let config = quiet_config(&dir, json!({}));
    let input = write_file(&dir, "host.json", r#"{"id": "a", "version": "1", "maxAge": 1}"#);

    let (_, output) = run(&config, validate_file("host-options", input, false));
    let response: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(response["code"], "PODIUM_REQUIRED_FIELD_MISSING");
    assert_eq!(response["violations"][0]["path"], "render");
}

#[test]
fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let config = quiet_config(&dir, json!({}));

    let (result, output) = run(&config, validate_file("content", dir.path().join("absent.json"), false));
    assert!(matches!(result, Err(CliError::Io(_))));

    let response: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(response["code"], "PODIUM_CLI_IO_ERROR");
}

// =============================================================================
// config
// =============================================================================

#[test]
fn test_invalid_config_reported() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "bad.json", r#"{"log_level": "chatty"}"#);

    let (result, output) = run(&config, Command::Schemas);
    assert!(matches!(result, Err(CliError::Config(_))));

    let response: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(response["status"], "error");
    assert_eq!(response["code"], "PODIUM_CLI_CONFIG_ERROR");
}

// =============================================================================
// schemas / describe
// =============================================================================

#[test]
fn test_schemas_command() {
    let dir = TempDir::new().unwrap();
    let config = quiet_config(&dir, json!({}));

    let (result, output) = run(&config, Command::Schemas);
    result.unwrap();

    let response: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(
        response["data"],
        json!(["content", "host-options", "manifest", "metadata", "response"])
    );
}

#[test]
fn test_describe_host_options() {
    let dir = TempDir::new().unwrap();
    let config = quiet_config(&dir, json!({}));

    let cmd = Command::Describe {
        schema: "host-options".into(),
        pretty: false,
    };
    let (result, output) = run(&config, cmd);
    result.unwrap();

    let response: Value = serde_json::from_str(&output).unwrap();
    let fields = response["data"]["fields"].as_array().unwrap();
    let render = fields.iter().find(|f| f["name"] == "render").unwrap();
    assert_eq!(render["rule"]["type"], "function");
    assert_eq!(render["presence"], json!({"presence": "required"}));
}
