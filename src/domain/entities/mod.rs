//! Domain Entities
//!
//! - `StateDocument` - the persisted state of a destination tree
//! - `TrackedFile` - a mirrored file and its customization record
//! - `GeneratedFile`, `ArchiveRecord` - derived artifacts

mod state;

pub use state::{ArchiveRecord, GeneratedFile, StateDocument, TrackedFile, STATE_VERSION};
