//! Generator registry keyed by (domain, type).

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::generator::Generator;

/// Identity of a registered generator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescriptor {
    pub domain: String,
    pub generator_type: String,
}

impl ServiceDescriptor {
    pub fn new(domain: impl Into<String>, generator_type: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            generator_type: generator_type.into(),
        }
    }
}

impl std::fmt::Display for ServiceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.domain, self.generator_type)
    }
}

/// Zero-argument constructor producing a fresh generator.
pub type GeneratorConstructor = Arc<dyn Fn() -> anyhow::Result<Box<dyn Generator>> + Send + Sync>;

/// A catalog of generator constructors.
///
/// Registration is expected to finish before the registry is shared; once
/// wrapped in an `Arc` it is only read.
#[derive(Default)]
pub struct GeneratorRegistry {
    constructors: BTreeMap<ServiceDescriptor, GeneratorConstructor>,
}

impl GeneratorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Register a constructor.
    ///
    /// If a constructor with the same key already exists, it will be replaced.
    pub fn register<F>(&mut self, domain: impl Into<String>, generator_type: impl Into<String>, ctor: F)
    where
        F: Fn() -> anyhow::Result<Box<dyn Generator>> + Send + Sync + 'static,
    {
        let descriptor = ServiceDescriptor::new(domain, generator_type);
        debug!("Registering generator: {}", descriptor);
        self.constructors.insert(descriptor, Arc::new(ctor));
    }

    /// Get a constructor by key.
    pub fn get(&self, domain: &str, generator_type: &str) -> Option<GeneratorConstructor> {
        self.constructors
            .get(&ServiceDescriptor::new(domain, generator_type))
            .cloned()
    }

    /// Check if a constructor is registered.
    pub fn has(&self, domain: &str, generator_type: &str) -> bool {
        self.constructors
            .contains_key(&ServiceDescriptor::new(domain, generator_type))
    }

    /// All domains with at least one generator, sorted.
    pub fn list_domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = self
            .constructors
            .keys()
            .map(|d| d.domain.clone())
            .collect();
        domains.dedup();
        domains
    }

    /// Generator types registered for a domain, sorted.
    pub fn list_types(&self, domain: &str) -> Vec<String> {
        self.constructors
            .keys()
            .filter(|d| d.domain == domain)
            .map(|d| d.generator_type.clone())
            .collect()
    }

    /// Get the number of registered constructors.
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("generators", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}
