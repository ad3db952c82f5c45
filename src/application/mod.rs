//! Application Layer
//!
//! Use cases orchestrating the domain through its ports:
//!
//! - `sync` - sync passes and status queries
//! - `clean` - validation and orphan reaping

pub mod clean;
pub mod sync;

pub use clean::{CleanReport, CleanUseCase, ValidationIssue};
pub use sync::{
    FileFailure, FileOutcome, RequestMode, RunOutcome, StatusReport, SyncOptions, SyncReport,
    SyncUseCase,
};
