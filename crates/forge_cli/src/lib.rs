//! # forge_cli
//!
//! Outer layer of stackforge: loads the infrastructure configuration from
//! disk, drives the [`forge_engine::Orchestrator`] and writes the generated
//! artifacts.
//!
//! The `forge` binary is a thin wrapper over the [`commands`] module.

pub mod commands;
pub mod config;
pub mod exit;
pub mod writer;

pub use config::{load_config, ConfigError, ConfigFormat, ConfigOverrides};
pub use exit::{categorize_error, ExitCodes};
pub use writer::{write_artifacts, WriteSummary};
