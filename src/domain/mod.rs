//! Domain Layer
//!
//! The core of keepsync - reconciliation logic without direct I/O.
//!
//! ## Structure
//!
//! - `entities/` - The state document and its records
//! - `value_objects/` - Immutable value types (ContentHash, SourceArgs, CopyFilter)
//! - `services/` - Differ, Classifier, OrphanDetector
//! - `ports/` - Interface definitions for infrastructure
//!
//! All I/O goes through the traits in `ports/`.

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
