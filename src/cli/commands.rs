//! CLI command implementations
//!
//! Commands resolve the configuration, do their work against the
//! global schema registry and write exactly one JSON response to stdout.
//! Log lines go to stderr.

use std::io::{self, Read, Write};
use std::path::Path;

use crate::observability::{Event, Logger};
use crate::schema::{Schema, SchemaRegistry, SchemaValidator, ValidateOptions, Value};

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{parse_document, read_input, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_command(cli.config.as_deref(), cli.command, stdin.lock(), &mut stdout)
}

/// Runs one command.
///
/// On failure the error response is written to `out` before the error
/// is returned.
pub fn run_command<R: Read, W: Write>(
    config_path: Option<&Path>,
    cmd: Command,
    stdin: R,
    out: &mut W,
) -> CliResult<()> {
    let config = match Config::resolve(config_path) {
        Ok(config) => config,
        Err(e) => {
            write_error(out, &e, false)?;
            return Err(e);
        }
    };
    let logger = Logger::new(config.severity()?);
    logger.info(
        Event::ConfigLoaded,
        &[
            ("abort_early", bool_str(config.abort_early)),
            ("log_level", config.log_level.as_str()),
        ],
    );

    let pretty = config.pretty
        || matches!(
            cmd,
            Command::Validate { pretty: true, .. } | Command::Describe { pretty: true, .. }
        );

    let result = match cmd {
        Command::Validate {
            schema,
            input,
            all_errors,
            ..
        } => {
            let mut options = config.validate_options();
            if all_errors {
                options.abort_early = false;
            }
            validate(&logger, &schema, input.as_deref(), options, stdin)
                .and_then(|normalized| write_response(out, &normalized, pretty))
        }
        Command::Schemas => list_schemas().and_then(|ids| {
            logger.info(Event::SchemasListed, &[("count", &ids.len().to_string())]);
            write_response(out, &ids, pretty)
        }),
        Command::Describe { schema, .. } => describe(&schema).and_then(|schema| {
            logger.info(Event::SchemaDescribed, &[("schema", &schema.id)]);
            write_response(out, schema, pretty)
        }),
    };

    if let Err(e) = &result {
        if e.schema_error().is_none() {
            logger.error(
                Event::CommandFailed,
                &[("code", e.code()), ("message", &e.to_string())],
            );
        }
        write_error(out, e, pretty)?;
    }
    result
}

/// Validates a document read from `input` (or stdin) and returns the
/// normalized value.
pub fn validate<R: Read>(
    logger: &Logger,
    schema_id: &str,
    input: Option<&Path>,
    options: ValidateOptions,
    stdin: R,
) -> CliResult<Value> {
    let schema = describe(schema_id)?;

    let text = read_input(input, stdin)?;
    let candidate = parse_document(&text)?;
    let source = input
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdin".to_string());
    logger.info(
        Event::InputRead,
        &[("bytes", &text.len().to_string()), ("source", &source)],
    );

    match SchemaValidator::with_options(options).validate(schema, &candidate) {
        Ok(normalized) => {
            logger.info(Event::ValidationPassed, &[("schema", schema_id)]);
            Ok(normalized)
        }
        Err(e) => {
            logger.event(
                Event::ValidationFailed,
                &[
                    ("code", e.kind().code()),
                    ("path", e.path()),
                    ("schema", schema_id),
                    ("violations", &e.count().to_string()),
                ],
            );
            Err(e.into())
        }
    }
}

/// Returns the registered schema ids, sorted.
pub fn list_schemas() -> CliResult<Vec<&'static str>> {
    Ok(SchemaRegistry::global()?.ids().collect())
}

/// Looks up a registered schema.
pub fn describe(schema_id: &str) -> CliResult<&'static Schema> {
    SchemaRegistry::global()?
        .get(schema_id)
        .ok_or_else(|| CliError::UnknownSchema(schema_id.to_string()))
}

fn bool_str(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}
