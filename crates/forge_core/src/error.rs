//! Error types for the core module.

use thiserror::Error;

use crate::config::Domain;
use crate::registry::ServiceDescriptor;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while resolving generators or rendering artifacts.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Generator not found: {0}")]
    GeneratorNotFound(ServiceDescriptor),

    #[error("Generator construction failed: {descriptor} - {message}")]
    GeneratorConstruction {
        descriptor: ServiceDescriptor,
        message: String,
    },

    #[error("Generator '{generator}' expected {expected} configuration")]
    ConfigMismatch { generator: String, expected: String },

    #[error("Template rendering failed in {generator}: {message}")]
    Template { generator: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CoreError {
    pub fn config_mismatch(generator: &str, expected: Domain) -> Self {
        CoreError::ConfigMismatch {
            generator: generator.to_string(),
            expected: expected.to_string(),
        }
    }
}
