//! # forge_services
//!
//! Domain services and their template generators.
//!
//! Each domain service validates one slice of the infrastructure
//! configuration and renders it through the sub-generators it resolved from
//! the generator registry at construction time.
//!
//! | Domain        | Sub-generators                        |
//! |---------------|---------------------------------------|
//! | compute       | `cloud-functions`, `cloud-run`        |
//! | storage       | `cloud-storage`, `firestore`          |
//! | security      | `iam`, `secret-manager`, `kms`        |
//! | networking    | `vpc`, `load-balancer`                |
//! | observability | `monitoring`, `logging`               |
//!
//! # Example
//!
//! ```rust,ignore
//! use forge_core::OnConstructionFailure;
//! use forge_services::ServiceFactory;
//!
//! let services = ServiceFactory::new(OnConstructionFailure::Abort).create_services(&config)?;
//! for service in &services {
//!     let outcome = service.validate();
//!     println!("{}: valid = {}", service.name(), outcome.is_valid());
//! }
//! ```

pub mod builtin;
pub mod compute;
pub mod factory;
pub mod hcl;
pub mod networking;
pub mod observability;
pub mod security;
pub mod storage;

mod support;

pub use builtin::{builtin_factory, builtin_registry, register_builtin};
pub use compute::ComputeService;
pub use factory::ServiceFactory;
pub use networking::NetworkingService;
pub use observability::ObservabilityService;
pub use security::SecurityService;
pub use storage::StorageService;
