//! podium-schema CLI entry point
//!
//! Parses arguments and dispatches via `cli::run`. The error response is
//! already on stdout when `run` fails; the error is repeated on stderr
//! and the process exits non-zero.

use podium_schema::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
