//! Leaf field validators
//!
//! Each check is a pure function from a raw value to either the
//! normalized value or the violation it commits. The validator calls
//! these for every leaf rule; composite rules never reach this module.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use super::errors::Violation;
use super::value::Value;

/// Characters allowed in identifiers such as a podlet `name`
const IDENTIFIER_PATTERN: &str = r"^[A-Za-z0-9_-]+$";

/// RFC 3986 unreserved, reserved and percent characters
const URI_CHARS_PATTERN: &str = r"^[A-Za-z0-9\-._~:/?#\[\]@!$&'()*+,;=%]+$";

const URI_SCHEMES: [&str; 2] = ["http", "https"];

static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
static URI_CHARS: OnceLock<Regex> = OnceLock::new();

fn identifier_regex() -> &'static Regex {
    IDENTIFIER.get_or_init(|| Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern compiles"))
}

fn uri_chars_regex() -> &'static Regex {
    URI_CHARS.get_or_init(|| Regex::new(URI_CHARS_PATTERN).expect("URI charset pattern compiles"))
}

/// Returns true if `s` is a non-empty run of `[A-Za-z0-9_-]`.
pub fn is_identifier(s: &str) -> bool {
    identifier_regex().is_match(s)
}

/// Returns true if `s` is an absolute http(s) URI with a host, or a path
/// starting with `/`.
pub fn is_uri_or_path(s: &str) -> bool {
    if !uri_chars_regex().is_match(s) {
        return false;
    }
    if s.starts_with('/') {
        return true;
    }
    match Url::parse(s) {
        Ok(url) => {
            URI_SCHEMES.contains(&url.scheme())
                && url.has_host()
                && s.get(url.scheme().len()..)
                    .is_some_and(|rest| rest.starts_with("://"))
        }
        Err(_) => false,
    }
}

fn expect_string<'a>(value: &'a Value, path: &str) -> Result<&'a str, Violation> {
    value
        .as_str()
        .ok_or_else(|| Violation::type_mismatch(path, "string", value))
}

/// Identifier: trimmed, then matched against `[A-Za-z0-9_-]+`.
pub fn check_identifier(value: &Value, path: &str) -> Result<Value, Violation> {
    let trimmed = expect_string(value, path)?.trim();
    if !is_identifier(trimmed) {
        return Err(Violation::invalid_format(
            path,
            "non-empty string of letters, digits, '-' or '_'",
            value,
        ));
    }
    Ok(Value::from(trimmed))
}

pub fn check_text(
    value: &Value,
    path: &str,
    trim: bool,
    allow_empty: bool,
) -> Result<Value, Violation> {
    let s = expect_string(value, path)?;
    let s = if trim { s.trim() } else { s };
    if s.is_empty() && !allow_empty {
        return Err(Violation::invalid_format(path, "non-empty string", value));
    }
    Ok(Value::from(s))
}

/// URI or path. The empty string bypasses the format check only when the
/// rule allows it.
pub fn check_uri_or_path(value: &Value, path: &str, allow_empty: bool) -> Result<Value, Violation> {
    let s = expect_string(value, path)?;
    if s.is_empty() && allow_empty {
        return Ok(Value::from(""));
    }
    if !is_uri_or_path(s) {
        return Err(Violation::invalid_format(
            path,
            "absolute http(s) URI or path starting with '/'",
            value,
        ));
    }
    Ok(Value::from(s))
}

pub fn check_number(value: &Value, path: &str, min: f64, max: f64) -> Result<Value, Violation> {
    let n = match value.as_f64() {
        Some(n) if !n.is_nan() => n,
        _ => return Err(Violation::type_mismatch(path, "number", value)),
    };
    if n < min || n > max {
        return Err(Violation::out_of_range(path, min, max, value));
    }
    Ok(Value::Number(n))
}

/// Function reference: only the callable predicate is checked.
pub fn check_function(value: &Value, path: &str) -> Result<Value, Violation> {
    if !value.is_callable() {
        return Err(Violation::type_mismatch(path, "function", value));
    }
    Ok(value.clone())
}
