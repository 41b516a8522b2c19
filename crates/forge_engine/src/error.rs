//! Error types for the generation pipeline.

use std::time::Duration;

use thiserror::Error;

use forge_core::CoreError;

/// Result type alias for pipeline operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can end a generation run.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Every validation error of every service, never just the first.
    #[error("Configuration validation failed:\n  {}", .errors.join("\n  "))]
    ConfigurationValidation { errors: Vec<String> },

    #[error("Generation failed in service '{service}': {source}")]
    Generation {
        service: String,
        #[source]
        source: CoreError,
    },

    #[error("Generation did not finish within {0:?}")]
    GenerationTimeout(Duration),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl EngineError {
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::ConfigurationValidation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_every_error() {
        let err = EngineError::ConfigurationValidation {
            errors: vec![
                "compute.cloudFunctions.timeout: out of range".to_string(),
                "storage.cloudStorage.buckets: required".to_string(),
            ],
        };

        let message = err.to_string();
        assert!(message.contains("compute.cloudFunctions.timeout"));
        assert!(message.contains("storage.cloudStorage.buckets"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_generation_error_keeps_source() {
        let err = EngineError::Generation {
            service: "compute".to_string(),
            source: CoreError::Template {
                generator: "cloud-run".to_string(),
                message: "bad".to_string(),
            },
        };

        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("Generation failed in service 'compute'"));
    }
}
