//! The built-in generator catalog.

use std::sync::Arc;

use forge_core::{Domain, Generator, GeneratorFactory, GeneratorRegistry};

use crate::compute::{self, CloudFunctionsGenerator, CloudRunGenerator};
use crate::networking::{self, LoadBalancerGenerator, VpcGenerator};
use crate::observability::{self, LoggingGenerator, MonitoringGenerator};
use crate::security::{self, IamGenerator, KmsGenerator, SecretManagerGenerator};
use crate::storage::{self, CloudStorageGenerator, FirestoreGenerator};

fn construct<G>() -> anyhow::Result<Box<dyn Generator>>
where
    G: Generator + Default + 'static,
{
    Ok(Box::new(G::default()))
}

/// Register every built-in generator into an existing registry.
pub fn register_builtin(registry: &mut GeneratorRegistry) {
    registry.register(Domain::Compute.as_str(), compute::CLOUD_FUNCTIONS, construct::<CloudFunctionsGenerator>);
    registry.register(Domain::Compute.as_str(), compute::CLOUD_RUN, construct::<CloudRunGenerator>);

    registry.register(Domain::Storage.as_str(), storage::CLOUD_STORAGE, construct::<CloudStorageGenerator>);
    registry.register(Domain::Storage.as_str(), storage::FIRESTORE, construct::<FirestoreGenerator>);

    registry.register(Domain::Security.as_str(), security::IAM, construct::<IamGenerator>);
    registry.register(Domain::Security.as_str(), security::SECRET_MANAGER, construct::<SecretManagerGenerator>);
    registry.register(Domain::Security.as_str(), security::KMS, construct::<KmsGenerator>);

    registry.register(Domain::Networking.as_str(), networking::VPC, construct::<VpcGenerator>);
    registry.register(Domain::Networking.as_str(), networking::LOAD_BALANCER, construct::<LoadBalancerGenerator>);

    registry.register(Domain::Observability.as_str(), observability::MONITORING, construct::<MonitoringGenerator>);
    registry.register(Domain::Observability.as_str(), observability::LOGGING, construct::<LoggingGenerator>);
}

/// A registry holding every built-in generator.
pub fn builtin_registry() -> GeneratorRegistry {
    let mut registry = GeneratorRegistry::new();
    register_builtin(&mut registry);
    registry
}

pub fn builtin_factory() -> GeneratorFactory {
    GeneratorFactory::new(Arc::new(builtin_registry()))
}
