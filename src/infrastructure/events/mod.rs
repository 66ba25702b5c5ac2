//! Event Sink Implementations
//!
//! - JsonEventSink: NDJSON output for CI/automation
//! - ConsoleEventSink: human-readable progress on stderr

mod console;
mod json;

pub use console::{ConsoleEventSink, ConsoleStyle};
pub use json::JsonEventSink;
