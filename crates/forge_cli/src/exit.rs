//! CI-friendly exit codes.

use forge_engine::EngineError;

use crate::config::ConfigError;

/// Process exit codes of the `forge` binary.
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const GENERATION_FAILURE: u8 = 4;
}

/// Categorize error to determine exit code
pub fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if cause.downcast_ref::<ConfigError>().is_some() {
            return ExitCodes::INVALID_ARGS;
        }
        if let Some(engine) = cause.downcast_ref::<EngineError>() {
            return match engine {
                EngineError::ConfigurationValidation { .. } => ExitCodes::VALIDATION_FAILURE,
                EngineError::Generation { .. } | EngineError::GenerationTimeout(_) => {
                    ExitCodes::GENERATION_FAILURE
                }
                EngineError::Core(_) => ExitCodes::GENERAL_ERROR,
            };
        }
    }

    ExitCodes::GENERAL_ERROR
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use anyhow::Context;

    use super::*;

    #[test]
    fn test_validation_failure() {
        let err = anyhow::Error::from(EngineError::ConfigurationValidation {
            errors: vec!["compute.cloudFunctions.timeout: out of range".to_string()],
        });
        assert_eq!(categorize_error(&err), ExitCodes::VALIDATION_FAILURE);
    }

    #[test]
    fn test_generation_failure() {
        let err = anyhow::Error::from(EngineError::GenerationTimeout(Duration::from_secs(1)));
        assert_eq!(categorize_error(&err), ExitCodes::GENERATION_FAILURE);
    }

    #[test]
    fn test_config_error_behind_context() {
        let err = Err::<(), _>(ConfigError::NotFound(PathBuf::from("missing.yaml")))
            .context("Failed to load configuration")
            .unwrap_err();
        assert_eq!(categorize_error(&err), ExitCodes::INVALID_ARGS);
    }

    #[test]
    fn test_unknown_error() {
        let err = anyhow::anyhow!("disk full");
        assert_eq!(categorize_error(&err), ExitCodes::GENERAL_ERROR);
    }
}
