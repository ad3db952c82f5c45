//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod file_system;
pub mod provider;
pub mod state_repository;
pub mod sync_events;

pub use file_system::{FileSystem, FsError, FsResult};
pub use provider::{Provider, ProviderError, ProviderRegistry, ProviderResult};
pub use state_repository::{StateError, StateRepository, StateResult};
pub use sync_events::{NoopEventSink, SyncEvent, SyncEventSink};
