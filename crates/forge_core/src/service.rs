//! The contract every domain service implements.
//!
//! A domain service owns one configuration slice (compute, storage, ...),
//! decides whether it is enabled, validates its slice and renders its files.
//!
//! # Service Lifecycle
//!
//! 1. **Construction**: the service factory builds one instance per enabled
//!    domain at the start of a run, bound to the shared [`BaseConfig`] and the
//!    domain's own slice.
//! 2. **Validation**: [`DomainService::validate`] runs the base checks, then
//!    the domain hook [`DomainService::validate_domain`].
//! 3. **Generation**: [`DomainService::generate_files`] renders every enabled
//!    sub-feature and concatenates the results in declaration order.
//!
//! Both phases are idempotent; instances are dropped at the end of the run.
//!
//! # Example
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use forge_core::{Artifact, BaseConfig, CoreResult, Domain, DomainService, ValidationOutcome};
//!
//! struct EchoService { base: BaseConfig }
//!
//! #[async_trait]
//! impl DomainService for EchoService {
//!     fn name(&self) -> &str { "echo" }
//!     fn domain(&self) -> Domain { Domain::Compute }
//!     fn base_config(&self) -> &BaseConfig { &self.base }
//!     fn is_enabled(&self) -> bool { true }
//!     fn validate_domain(&self) -> ValidationOutcome { ValidationOutcome::valid() }
//!
//!     async fn generate_files(&self, _output_dir: &Path) -> CoreResult<Vec<Artifact>> {
//!         Ok(Vec::new())
//!     }
//! }
//! ```

use std::path::Path;

use async_trait::async_trait;

use crate::artifact::Artifact;
use crate::config::{BaseConfig, Domain};
use crate::error::CoreResult;
use crate::validation::{validate_base, ValidationOutcome};

/// A stateless service bound to one domain's configuration.
///
/// # Thread Safety
///
/// Services must be `Send + Sync`: the orchestrator polls all of them
/// concurrently during generation.
#[async_trait]
pub trait DomainService: Send + Sync {
    /// Stable identity used for logging and error-field prefixes.
    fn name(&self) -> &str;

    fn domain(&self) -> Domain;

    fn base_config(&self) -> &BaseConfig;

    /// OR across the domain's sub-feature flags.
    fn is_enabled(&self) -> bool;

    /// Domain-specific rules. Only this hook may add warnings.
    fn validate_domain(&self) -> ValidationOutcome;

    /// Base checks followed by the domain hook, aggregated into one outcome.
    fn validate(&self) -> ValidationOutcome {
        let mut outcome = validate_base(self.base_config());
        outcome.merge(self.validate_domain());
        outcome
    }

    /// Render the files of every enabled sub-feature.
    ///
    /// Sub-generator errors propagate unchanged.
    async fn generate_files(&self, output_dir: &Path) -> CoreResult<Vec<Artifact>>;
}
