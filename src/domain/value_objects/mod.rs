//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod cancel;
mod copy_filter;
mod hash;
pub mod managed_name;
mod source_args;

pub use cancel::CancelToken;
pub use copy_filter::{CopyFilter, Selection};
pub use hash::ContentHash;
pub use source_args::{ArchiveArgs, CopyArgs, SourceArgs};
