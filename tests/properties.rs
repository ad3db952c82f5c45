//! Property tests for keepsync.
//!
//! Properties use randomized input generation to protect invariants like
//! "the edit script reproduces its target" and "never panics".
//!
//! Run with: `cargo test --test properties`

#[path = "properties/classifier.rs"]
mod classifier;

#[path = "properties/edit_script.rs"]
mod edit_script;

#[path = "properties/managed_names.rs"]
mod managed_names;
