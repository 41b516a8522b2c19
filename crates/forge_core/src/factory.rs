//! Generator factory: turns registry lookups into live generators.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{CoreError, CoreResult};
use crate::generator::Generator;
use crate::registry::{GeneratorRegistry, ServiceDescriptor};

/// What to do when a generator cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnConstructionFailure {
    /// Log and continue without the generator
    Skip,
    /// Fail with the underlying error
    #[default]
    Abort,
}

/// Creates generator instances from a shared registry.
#[derive(Debug, Clone)]
pub struct GeneratorFactory {
    registry: Arc<GeneratorRegistry>,
}

impl GeneratorFactory {
    pub fn new(registry: Arc<GeneratorRegistry>) -> Self {
        Self { registry }
    }

    /// Create a generator, soft-failing to `None`.
    ///
    /// A missing registration or a failing constructor is logged and yields
    /// `None`; callers must treat `None` as an expected outcome.
    pub fn create(&self, domain: &str, generator_type: &str) -> Option<Box<dyn Generator>> {
        self.try_create(domain, generator_type)
            .map_err(|e| match &e {
                CoreError::GeneratorNotFound(descriptor) => {
                    warn!("No generator registered for {}", descriptor)
                }
                _ => error!("{}", e),
            })
            .ok()
    }

    /// Create a generator under an explicit failure policy.
    ///
    /// `Skip` behaves like [`create`](Self::create) and returns `Ok(None)` on
    /// failure; `Abort` returns the error.
    pub fn create_with_policy(
        &self,
        domain: &str,
        generator_type: &str,
        policy: OnConstructionFailure,
    ) -> CoreResult<Option<Box<dyn Generator>>> {
        match policy {
            OnConstructionFailure::Skip => Ok(self.create(domain, generator_type)),
            OnConstructionFailure::Abort => self.try_create(domain, generator_type).map(Some),
        }
    }

    fn try_create(&self, domain: &str, generator_type: &str) -> CoreResult<Box<dyn Generator>> {
        let descriptor = ServiceDescriptor::new(domain, generator_type);
        let ctor = self
            .registry
            .get(domain, generator_type)
            .ok_or_else(|| CoreError::GeneratorNotFound(descriptor.clone()))?;

        let generator = ctor().map_err(|e| CoreError::GeneratorConstruction {
            descriptor: descriptor.clone(),
            message: format!("{:#}", e),
        })?;

        debug!("Created generator {}", descriptor);
        Ok(generator)
    }

    pub fn has_generator(&self, domain: &str, generator_type: &str) -> bool {
        self.registry.has(domain, generator_type)
    }

    pub fn get_domains(&self) -> Vec<String> {
        self.registry.list_domains()
    }

    pub fn get_generator_types(&self, domain: &str) -> Vec<String> {
        self.registry.list_types(domain)
    }

    /// Domain → generator types, both sorted.
    pub fn get_all_generators(&self) -> BTreeMap<String, Vec<String>> {
        self.get_domains()
            .into_iter()
            .map(|domain| {
                let types = self.get_generator_types(&domain);
                (domain, types)
            })
            .collect()
    }
}
