//! JSON Event Sink
//!
//! Outputs sync events as NDJSON for CI/automation consumption.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::domain::ports::{SyncEvent, SyncEventSink};

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

/// JSON representation of one event
pub fn event_to_json(event: &SyncEvent) -> serde_json::Value {
    match event {
        SyncEvent::Started {
            command,
            destination,
            provider,
        } => serde_json::json!({
            "event": "start",
            "command": command,
            "destination": destination,
            "provider": provider,
        }),

        SyncEvent::FileClassified {
            path,
            status,
            change_count,
        } => serde_json::json!({
            "event": "item",
            "path": path,
            "status": status.as_str(),
            "changes": change_count,
        }),

        SyncEvent::FileError { path, error } => serde_json::json!({
            "event": "item_error",
            "path": path,
            "error": error,
        }),

        SyncEvent::FileRemoved { path } => serde_json::json!({
            "event": "item_removed",
            "path": path,
        }),

        SyncEvent::OrphanDeleted { path } => serde_json::json!({
            "event": "orphan_deleted",
            "path": path,
        }),

        SyncEvent::ValidationFailed { path, issue } => serde_json::json!({
            "event": "validation_failed",
            "path": path,
            "issue": issue,
        }),

        SyncEvent::UpToDate { fingerprint } => serde_json::json!({
            "event": "up_to_date",
            "fingerprint": fingerprint,
        }),

        SyncEvent::Completed {
            command,
            written,
            removed,
            deleted,
            errors,
        } => {
            let status = if *errors == 0 { "success" } else { "partial" };
            serde_json::json!({
                "event": "complete",
                "command": command,
                "status": status,
                "written": written,
                "removed": removed,
                "deleted": deleted,
                "errors": errors,
            })
        }
    }
}

impl SyncEventSink for JsonEventSink {
    fn on_event(&self, event: SyncEvent) {
        self.write_event(event_to_json(&event));
    }
}
