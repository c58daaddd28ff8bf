//! Observability for the command-line front end
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle events
//!
//! Observability is read-only: nothing here feeds back into validation.
//!
//! ```ignore
//! use podium_schema::observability::{Event, Logger, Severity};
//!
//! let logger = Logger::new(Severity::Info);
//! logger.info(Event::InputRead, &[("bytes", "512")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity, UnknownSeverity};
