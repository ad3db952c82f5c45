//! Console Event Sink
//!
//! Plain, line-oriented progress for terminals.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::domain::ports::{SyncEvent, SyncEventSink};
use crate::domain::services::FileStatus;

pub struct ConsoleEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
    /// Also print files whose status did not change
    verbose: bool,
}

impl ConsoleEventSink {
    pub fn stdout(verbose: bool) -> Self {
        Self::with_writer(io::stdout(), verbose)
    }

    pub fn with_writer<W: Write + Send + 'static>(writer: W, verbose: bool) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            verbose,
        }
    }

    fn line(&self, text: String) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{text}");
        }
    }
}

impl SyncEventSink for ConsoleEventSink {
    fn on_event(&self, event: SyncEvent) {
        match event {
            SyncEvent::Started { .. } => {}
            SyncEvent::FileClassified {
                path,
                status,
                change_count,
            } => {
                if status == FileStatus::Unchanged && !self.verbose {
                    return;
                }
                if change_count > 0 {
                    self.line(format!("{status:>10}  {path} ({change_count} change regions)"));
                } else {
                    self.line(format!("{status:>10}  {path}"));
                }
            }
            SyncEvent::FileError { path, error } => {
                self.line(format!("{:>10}  {path}: {error}", "error"));
            }
            SyncEvent::FileRemoved { path } => {
                self.line(format!("{:>10}  {path}", "removed"));
            }
            SyncEvent::OrphanDeleted { path } => {
                self.line(format!("{:>10}  {path}", "reaped"));
            }
            SyncEvent::ValidationFailed { path, issue } => {
                self.line(format!("{:>10}  {path}: {issue}", "invalid"));
            }
            SyncEvent::UpToDate { fingerprint } => {
                self.line(format!("Already up to date ({fingerprint})"));
            }
            SyncEvent::Completed {
                command,
                written,
                removed,
                deleted,
                errors,
            } => {
                self.line(format!(
                    "{command}: {written} written, {removed} removed, {deleted} deleted, {errors} errors"
                ));
            }
        }
    }
}
