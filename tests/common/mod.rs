//! Common test utilities for keepsync integration tests.
//!
//! This module provides:
//! - `TestEnv`: isolated source, destination, and home directories plus CLI helpers
//! - `FakeProvider`: in-memory remote for library-level tests
//! - Assertion macros: `assert_status!`

#![allow(dead_code)]

pub mod assertions;
pub mod env;
pub mod fake_provider;

pub use env::*;
pub use fake_provider::*;
