//! Domain Services
//!
//! Pure business logic services that operate on domain entities.
//! These services have no I/O dependencies and are easily testable.

mod classifier;
mod differ;
mod orphan_detector;

pub use classifier::{
    classify, Classification, ClassifyError, ClassifyInput, FileStatus, RecordChange,
};
pub use differ::{ChangeRegion, DeltaError, Differ, EditOp, EditScript};
pub use orphan_detector::{referenced_paths, OrphanDetectionResult, OrphanDetector};
