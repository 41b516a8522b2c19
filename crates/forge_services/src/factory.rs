//! Builds the domain services of a run.

use std::sync::Arc;

use tracing::{debug, info};

use forge_core::{
    BaseConfig, CoreResult, Domain, DomainService, GeneratorFactory, GeneratorRegistry,
    InfrastructureConfig, OnConstructionFailure,
};

use crate::builtin::builtin_registry;
use crate::compute::ComputeService;
use crate::networking::NetworkingService;
use crate::observability::ObservabilityService;
use crate::security::SecurityService;
use crate::storage::StorageService;

/// Creates one service per enabled domain.
#[derive(Debug, Clone)]
pub struct ServiceFactory {
    generators: GeneratorFactory,
    policy: OnConstructionFailure,
}

impl Default for ServiceFactory {
    fn default() -> Self {
        Self::new(OnConstructionFailure::default())
    }
}

impl ServiceFactory {
    /// Factory over the built-in generator catalog.
    pub fn new(policy: OnConstructionFailure) -> Self {
        Self::with_registry(Arc::new(builtin_registry()), policy)
    }

    /// Factory over a caller-supplied registry.
    pub fn with_registry(registry: Arc<GeneratorRegistry>, policy: OnConstructionFailure) -> Self {
        Self {
            generators: GeneratorFactory::new(registry),
            policy,
        }
    }

    pub fn policy(&self) -> OnConstructionFailure {
        self.policy
    }

    pub fn generator_factory(&self) -> &GeneratorFactory {
        &self.generators
    }

    /// Build the services for every supplied and enabled domain, in domain order.
    pub fn create_services(&self, config: &InfrastructureConfig) -> CoreResult<Vec<Box<dyn DomainService>>> {
        let base = Arc::new(config.base.clone());
        let mut services = Vec::new();

        for domain in config.enabled_domains() {
            debug!("Creating {} service", domain);
            services.push(self.create_service(domain, config, Arc::clone(&base))?);
        }

        info!("Created {} domain service(s)", services.len());
        Ok(services)
    }

    fn create_service(
        &self,
        domain: Domain,
        config: &InfrastructureConfig,
        base: Arc<BaseConfig>,
    ) -> CoreResult<Box<dyn DomainService>> {
        let factory = &self.generators;
        let policy = self.policy;

        // enabled_domains() only yields domains whose slice is present
        let service: Box<dyn DomainService> = match domain {
            Domain::Compute => Box::new(ComputeService::new(
                base,
                config.compute.clone().unwrap_or_default(),
                factory,
                policy,
            )?),
            Domain::Storage => Box::new(StorageService::new(
                base,
                config.storage.clone().unwrap_or_default(),
                factory,
                policy,
            )?),
            Domain::Security => Box::new(SecurityService::new(
                base,
                config.security.clone().unwrap_or_default(),
                factory,
                policy,
            )?),
            Domain::Networking => Box::new(NetworkingService::new(
                base,
                config.networking.clone().unwrap_or_default(),
                factory,
                policy,
            )?),
            Domain::Observability => Box::new(ObservabilityService::new(
                base,
                config.observability.clone().unwrap_or_default(),
                factory,
                policy,
            )?),
        };

        Ok(service)
    }
}
