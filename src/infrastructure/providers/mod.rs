//! Provider Implementations
//!
//! Built-in remote sources and the default registry.

mod dir;

use std::sync::Arc;

use crate::domain::ports::ProviderRegistry;

pub use dir::DirProvider;

/// Registry with every built-in provider
pub fn default_registry() -> ProviderRegistry {
    ProviderRegistry::new().with_provider(Arc::new(DirProvider::new()))
}
