//! Sync Module
//!
//! Orchestrates sync passes and status queries.
//!
//! ## Structure
//!
//! - `options` - `SyncOptions`, `RequestMode`
//! - `result` - `SyncReport`, `StatusReport`, `FileOutcome`
//! - `use_case` - `SyncUseCase`
//!
//! ## Usage
//!
//! ```ignore
//! use keepsync::application::sync::{SyncOptions, SyncUseCase};
//!
//! let use_case = SyncUseCase::new(state_repo, fs, registry);
//! let report = use_case.sync(&SyncOptions::new(destination, args))?;
//! ```

mod options;
mod result;
mod use_case;

pub use options::{RequestMode, SyncOptions};
pub use result::{FileFailure, FileOutcome, StatusReport, SyncReport};
pub use use_case::{RunOutcome, SyncUseCase};
