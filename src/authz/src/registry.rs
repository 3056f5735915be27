//! Name-keyed registry of authorizer factories
//!
//! The backend is picked by configuration (e.g. `AGENT_AUTHORIZER=openfga`)
//! and resolved once at startup. Lookups ignore case, `-`/`_` and a trailing
//! `authorizer`, so `OpenFgaAuthorizer`, `openfga` and `open-fga` all resolve
//! to the same factory.

use crate::authorizer::Authorizer;
use crate::backends::{InMemoryAuthorizer, NullAuthorizer, OpenFgaAuthorizer, OpenFgaConfig};
use crate::error::{AuthzError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Backend selection and backend-specific settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizerConfig {
    /// Registered backend name
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Settings for the `openfga` backend
    #[serde(default)]
    pub openfga: OpenFgaConfig,
}

impl Default for AuthorizerConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            openfga: OpenFgaConfig::default(),
        }
    }
}

fn default_backend() -> String { "null".to_string() }

/// Builds an authorizer from configuration
pub type AuthorizerFactory =
    Arc<dyn Fn(&AuthorizerConfig) -> Result<Arc<dyn Authorizer>> + Send + Sync>;

struct Entry {
    name: String,
    factory: AuthorizerFactory,
}

/// Registry mapping backend names to factories
pub struct AuthorizerRegistry {
    entries: BTreeMap<String, Entry>,
}

impl AuthorizerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Create a registry with the `null`, `in_memory` and `openfga` backends
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register("null", |_| Ok(Arc::new(NullAuthorizer::new()) as Arc<dyn Authorizer>));
        registry.register("in_memory", |_| {
            Ok(Arc::new(InMemoryAuthorizer::new()) as Arc<dyn Authorizer>)
        });
        registry.register("openfga", |config| {
            let authorizer = OpenFgaAuthorizer::new(config.openfga.clone())
                .map_err(|e| AuthzError::Configuration(e.to_string()))?;
            Ok(Arc::new(authorizer) as Arc<dyn Authorizer>)
        });

        registry
    }

    /// Register (or replace) a factory under `name`
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&AuthorizerConfig) -> Result<Arc<dyn Authorizer>> + Send + Sync + 'static,
    {
        self.entries.insert(
            normalize(name),
            Entry {
                name: name.to_string(),
                factory: Arc::new(factory),
            },
        );
    }

    /// Whether a factory is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize(name))
    }

    /// Registered names, in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.entries.values().map(|e| e.name.as_str()).collect()
    }

    /// Build the authorizer selected by `config.backend`
    pub fn create(&self, config: &AuthorizerConfig) -> Result<Arc<dyn Authorizer>> {
        let entry = self.entries.get(&normalize(&config.backend)).ok_or_else(|| {
            AuthzError::UnknownAuthorizer {
                name: config.backend.clone(),
                available: self.names().join(", "),
            }
        })?;

        let authorizer = (entry.factory)(config)?;
        info!("Using authorizer {} ({})", authorizer.name(), entry.name);
        Ok(authorizer)
    }
}

impl Default for AuthorizerRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn normalize(name: &str) -> String {
    let key: String = name
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect();

    match key.strip_suffix("authorizer") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => key,
    }
}
