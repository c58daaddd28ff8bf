//! Command-line front end
//!
//! - validate: validate a JSON document against a registered schema
//! - schemas: list registered schema ids
//! - describe: print the rule set of a schema

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{describe, list_schemas, run, run_command, validate};
pub use config::{Config, DEFAULT_CONFIG_PATH};
pub use errors::{CliError, CliResult};
pub use io::{parse_document, read_input, write_error, write_json, write_response};
