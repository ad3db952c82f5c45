//! Infrastructure Layer
//!
//! Concrete implementations of the domain ports:
//!
//! - `fs/` - LocalFs (atomic writes, backups)
//! - `repositories/` - JsonStateRepository (`.keepsync.lock`)
//! - `providers/` - built-in remote sources
//! - `events/` - JSON and console event sinks

pub mod events;
pub mod fs;
pub mod providers;
pub mod repositories;

pub use events::{ConsoleEventSink, JsonEventSink};
pub use fs::LocalFs;
pub use providers::{default_registry, DirProvider};
pub use repositories::{JsonStateRepository, STATE_FILE_NAME};
