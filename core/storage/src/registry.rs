//! Provider registry for dynamic provider resolution.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use portage_common::{Error, Result};

use crate::provider::StorageProvider;

/// Factory function type for creating providers.
///
/// The settings value is the opaque credential/settings mapping supplied
/// by the caller (base URL, access token, root container identifiers);
/// it is treated as already validated.
pub type ProviderFactory = Box<dyn Fn(Value) -> Result<Arc<dyn StorageProvider>> + Send + Sync>;

/// Registry for storage provider factories.
///
/// Allows dynamic registration and resolution of storage providers by
/// name and settings mapping.
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a provider factory under a unique name.
    ///
    /// # Errors
    /// - `Error::InvalidSettings` if the name is already registered
    pub fn register(&mut self, name: impl Into<String>, factory: ProviderFactory) -> Result<()> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(Error::InvalidSettings(format!(
                "provider '{}' is already registered",
                name
            )));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Resolve a provider by name and settings mapping.
    ///
    /// # Errors
    /// - `Error::InvalidSettings` when the provider is unknown or the
    ///   settings do not fit it
    pub fn resolve(&self, name: &str, settings: Value) -> Result<Arc<dyn StorageProvider>> {
        let factory = self.factories.get(name).ok_or_else(|| {
            Error::InvalidSettings(format!("provider '{}' is not registered", name))
        })?;
        factory(settings)
    }

    /// Names of all registered providers.
    pub fn providers(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Check if a provider is registered.
    pub fn has_provider(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry with the built-in backends registered.
pub fn create_default_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();

    registry
        .register(
            "depot",
            Box::new(|settings| {
                Ok(Arc::new(crate::depot::DepotProvider::from_settings(settings)?))
            }),
        )
        .expect("register depot provider");

    registry
        .register(
            "archive",
            Box::new(|settings| {
                Ok(Arc::new(crate::archive::ArchiveProvider::from_settings(settings)?))
            }),
        )
        .expect("register archive provider");

    registry
}
