//! Configuration module for keepsync
//!
//! Resolution order:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (KEEPSYNC_*)
//! 3. `--config PATH`, else `keepsync.toml` in the working directory,
//!    else the user config (`<config dir>/keepsync/config.toml`)
//! 4. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{discover, load_layered, with_env_overrides, ConfigWarning, CONFIG_FILE_NAME};
pub use types::{Config, SourceConfig, SyncConfig};
