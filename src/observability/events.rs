//! Observable events of the command-line front end
//!
//! Events are explicit and typed. The schema engine never emits them;
//! validation stays free of side effects.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration file loaded (or defaults applied)
    ConfigLoaded,
    /// Candidate document read and parsed
    InputRead,
    /// Candidate accepted by the schema
    ValidationPassed,
    /// Candidate rejected by the schema
    ValidationFailed,
    /// Registered schema ids listed
    SchemasListed,
    /// Rule set of a schema printed
    SchemaDescribed,
    /// Command aborted before producing a response
    CommandFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::InputRead => "INPUT_READ",
            Event::ValidationPassed => "VALIDATION_PASSED",
            Event::ValidationFailed => "VALIDATION_FAILED",
            Event::SchemasListed => "SCHEMAS_LISTED",
            Event::SchemaDescribed => "SCHEMA_DESCRIBED",
            Event::CommandFailed => "COMMAND_FAILED",
        }
    }

    /// Returns true if the event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::ValidationFailed | Event::CommandFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
