//! CLI argument definitions using clap
//!
//! Commands:
//! - podium-schema validate --schema <id> [--input <path>]
//! - podium-schema schemas
//! - podium-schema describe --schema <id>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Validate and normalize podlet documents
#[derive(Parser, Debug)]
#[command(name = "podium-schema")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults to ./podium-schema.json when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Validate a JSON document against a schema and print the normalized result
    Validate {
        /// Schema id (see `schemas`)
        #[arg(long)]
        schema: String,

        /// Input file; stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,

        /// Report every violation instead of stopping at the first
        #[arg(long)]
        all_errors: bool,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },

    /// List the registered schema ids
    Schemas,

    /// Print the rule set of a schema
    Describe {
        #[arg(long)]
        schema: String,

        #[arg(long)]
        pretty: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
