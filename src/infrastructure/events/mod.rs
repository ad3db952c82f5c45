//! Event Sink Implementations
//!
//! - JsonEventSink: NDJSON output for CI/automation
//! - ConsoleEventSink: human-readable lines

mod console;
mod json;

pub use console::ConsoleEventSink;
pub use json::{event_to_json, JsonEventSink};
