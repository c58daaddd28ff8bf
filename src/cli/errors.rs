//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::io;

use thiserror::Error;

use crate::schema::{RegistryError, SchemaError};

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file unreadable or invalid
    #[error("config error: {0}")]
    Config(String),

    /// I/O failure on input or output
    #[error("I/O error: {0}")]
    Io(String),

    /// Input is not a JSON document
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown schema '{0}'")]
    UnknownSchema(String),

    /// Built-in schema set failed to load
    #[error("schema registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The document was rejected
    #[error(transparent)]
    Validation(#[from] SchemaError),
}

impl CliError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "PODIUM_CLI_CONFIG_ERROR",
            CliError::Io(_) => "PODIUM_CLI_IO_ERROR",
            CliError::InvalidInput(_) => "PODIUM_CLI_INVALID_INPUT",
            CliError::UnknownSchema(_) => "PODIUM_CLI_UNKNOWN_SCHEMA",
            CliError::Registry(_) => "PODIUM_CLI_REGISTRY_ERROR",
            CliError::Validation(e) => e.kind().code(),
        }
    }

    pub fn schema_error(&self) -> Option<&SchemaError> {
        match self {
            CliError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            CliError::Io(e.to_string())
        } else {
            CliError::InvalidInput(e.to_string())
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
