//! Repository Implementations
//!
//! Concrete implementations of the state repository port.

mod state;

pub use state::{marker_path, parse_state, JsonStateRepository, STATE_FILE_NAME};
