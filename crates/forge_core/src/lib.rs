//! # forge_core
//!
//! Core model and contracts for stackforge.
//!
//! This crate defines the configuration model, the in-memory artifact
//! record, validation outcomes and helpers, the [`DomainService`] contract
//! and the generator registry/factory that the domain services resolve their
//! sub-generators through.
//!
//! # Architecture
//!
//! - **Registry**: maps `(domain, type)` to a zero-argument generator constructor
//! - **Factory**: builds generators from the registry, soft-failing or aborting per policy
//! - **Generators**: stateless template renderers for one sub-feature
//! - **Domain services**: validate one configuration slice and run its generators
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use forge_core::{GeneratorFactory, GeneratorRegistry};
//!
//! let mut registry = GeneratorRegistry::new();
//! registry.register("compute", "cloud-run", || Ok(Box::new(CloudRunGenerator)));
//!
//! let factory = GeneratorFactory::new(Arc::new(registry));
//! let generator = factory.create("compute", "cloud-run");
//! ```

pub mod artifact;
pub mod config;
pub mod error;
pub mod factory;
pub mod generator;
pub mod registry;
pub mod service;
pub mod validation;

// Re-export main types for convenience
pub use artifact::{Artifact, ArtifactKind, SecurityLevel};
pub use config::{BaseConfig, Domain, DomainConfigRef, Environment, InfrastructureConfig};
pub use error::{CoreError, CoreResult};
pub use factory::{GeneratorFactory, OnConstructionFailure};
pub use generator::{GenerationRequest, Generator};
pub use registry::{GeneratorConstructor, GeneratorRegistry, ServiceDescriptor};
pub use service::DomainService;
pub use validation::{
    validate_base, validate_enum, validate_range, validate_required, ValidationError,
    ValidationOutcome, ValidationSeverity, ValidationWarning,
};
