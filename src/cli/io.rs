//! JSON I/O handling for CLI
//!
//! - Input: one JSON document, from a file or stdin
//! - Output: one JSON object on stdout, `{"status": "ok", ...}` or
//!   `{"status": "error", ...}`
//! - UTF-8 only

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use serde::Serialize;

use super::errors::{CliError, CliResult};
use crate::schema::{Value, Violation};

#[derive(Serialize)]
struct OkResponse<'a, T: Serialize> {
    status: &'static str,
    data: &'a T,
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    status: &'static str,
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<&'a str>,
    violations: Vec<&'a Violation>,
}

/// Reads the raw document from `input`, or from `stdin` when no path is
/// given.
pub fn read_input<R: Read>(input: Option<&Path>, mut stdin: R) -> CliResult<String> {
    let text = match input {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| CliError::Io(format!("failed to read {}: {}", path.display(), e)))?,
        None => {
            let mut text = String::new();
            stdin.read_to_string(&mut text)?;
            text
        }
    };

    if text.trim().is_empty() {
        return Err(CliError::InvalidInput("empty input".to_string()));
    }
    Ok(text)
}

/// Parses a JSON document into an engine value.
pub fn parse_document(text: &str) -> CliResult<Value> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    Ok(Value::from(json))
}

/// Writes one JSON value followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T, pretty: bool) -> CliResult<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Write a success response
pub fn write_response<W: Write, T: Serialize>(out: &mut W, data: &T, pretty: bool) -> CliResult<()> {
    write_json(out, &OkResponse { status: "ok", data }, pretty)
}

/// Write an error response; schema errors carry their violations.
pub fn write_error<W: Write>(out: &mut W, error: &CliError, pretty: bool) -> CliResult<()> {
    let schema_error = error.schema_error();
    let response = ErrorResponse {
        status: "error",
        code: error.code(),
        message: error.to_string(),
        schema: schema_error.map(|e| e.schema()),
        violations: schema_error
            .map(|e| e.violations().collect())
            .unwrap_or_default(),
    };
    write_json(out, &response, pretty)
}
