//! # forge_engine
//!
//! The generation pipeline for stackforge.
//!
//! The [`Orchestrator`] composes the service factory with a cost calculator
//! and a security analyzer and turns an [`InfrastructureConfig`] into a
//! [`GenerationResult`]:
//!
//! ```text
//! initialize -> validate all -> generate all (concurrent) -> shared -> cost & security
//! ```
//!
//! Validation is a hard barrier: no service starts generating until every
//! service has validated cleanly. Artifacts are kept in memory; writing them
//! out is left to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use forge_engine::{GenerationOptions, Orchestrator};
//!
//! let result = Orchestrator::default()
//!     .generate(&config, &GenerationOptions::new("infrastructure"))
//!     .await?;
//! println!("{} artifacts, {}", result.artifacts.len(), result.cost_report.format_total());
//! ```
//!
//! [`InfrastructureConfig`]: forge_core::InfrastructureConfig

pub mod cost;
pub mod error;
pub mod orchestrator;
pub mod security;
pub mod shared;

pub use cost::{CostCalculator, CostEstimate, CostReport, StaticCostCalculator};
pub use error::{EngineError, EngineResult};
pub use orchestrator::{GenerationOptions, GenerationResult, Orchestrator, ServiceSet};
pub use security::{
    ComplianceStatus, RuleBasedSecurityAnalyzer, SecurityAnalysis, SecurityAnalyzer,
    SecuritySeverity, Vulnerability,
};
