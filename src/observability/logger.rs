//! Structured JSON logger
//!
//! - One log line = one event
//! - `event` and `severity` first, remaining fields sorted by key
//! - Synchronous, no buffering
//! - Written to stderr so stdout only carries command output

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use serde_json::Value as Json;
use thiserror::Error;

use super::events::Event;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Debug-level detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// Unrecoverable, process exits
    Fatal = 4,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unrecognized severity name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level '{0}' (expected trace, info, warn, error or fatal)")]
pub struct UnknownSeverity(pub String);

impl FromStr for Severity {
    type Err = UnknownSeverity;

    /// Parses a level name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Severity::Trace),
            "info" => Ok(Severity::Info),
            "warn" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            _ => Err(UnknownSeverity(s.to_string())),
        }
    }
}

/// A structured logger that drops records below `min_severity`.
#[derive(Debug, Clone, Copy)]
pub struct Logger {
    min_severity: Severity,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(Severity::Info)
    }
}

impl Logger {
    pub fn new(min_severity: Severity) -> Self {
        Self { min_severity }
    }

    pub fn min_severity(&self) -> Severity {
        self.min_severity
    }

    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.min_severity
    }

    /// Logs an event to stderr.
    pub fn log(&self, severity: Severity, event: Event, fields: &[(&str, &str)]) {
        self.log_to_writer(severity, event, fields, &mut io::stderr());
    }

    pub fn info(&self, event: Event, fields: &[(&str, &str)]) {
        self.log(Severity::Info, event, fields);
    }

    pub fn warn(&self, event: Event, fields: &[(&str, &str)]) {
        self.log(Severity::Warn, event, fields);
    }

    pub fn error(&self, event: Event, fields: &[(&str, &str)]) {
        self.log(Severity::Error, event, fields);
    }

    /// Logs an event at INFO, or at WARN when the event reports a failure.
    pub fn event(&self, event: Event, fields: &[(&str, &str)]) {
        if event.is_failure() {
            self.warn(event, fields);
        } else {
            self.info(event, fields);
        }
    }

    pub fn log_to_writer<W: Write>(
        &self,
        severity: Severity,
        event: Event,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        if !self.enabled(severity) {
            return;
        }

        let mut sorted: Vec<_> = fields.iter().collect();
        sorted.sort_by_key(|(k, _)| *k);

        let mut output = String::with_capacity(128);
        output.push('{');
        push_pair(&mut output, "event", event.as_str());
        output.push(',');
        push_pair(&mut output, "severity", severity.as_str());
        for (key, value) in sorted {
            output.push(',');
            push_pair(&mut output, key, value);
        }
        output.push_str("}\n");

        // Logging must never fail the command
        let _ = writer.write_all(output.as_bytes());
        let _ = writer.flush();
    }
}

fn push_pair(output: &mut String, key: &str, value: &str) {
    output.push_str(&Json::from(key).to_string());
    output.push(':');
    output.push_str(&Json::from(value).to_string());
}

#[cfg(test)]
fn capture_log(logger: &Logger, severity: Severity, event: Event, fields: &[(&str, &str)]) -> String {
    let mut buffer = Vec::new();
    logger.log_to_writer(severity, event, fields, &mut buffer);
    String::from_utf8(buffer).unwrap()
}
