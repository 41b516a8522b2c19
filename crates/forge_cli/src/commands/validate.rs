//! Validate command - Check a configuration without generating.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use forge_engine::{EngineError, Orchestrator};

use crate::config::{load_with_overrides, ConfigOverrides};

#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the configuration file (yaml, json or toml)
    #[arg(short, long)]
    pub config: PathBuf,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

pub async fn execute(args: ValidateArgs) -> Result<()> {
    info!("Validating configuration: {}", args.config.display());

    let config = load_with_overrides(&args.config, &args.overrides)?;
    let orchestrator = Orchestrator::default();
    let outcome = orchestrator.validate(&config)?;

    println!("📋 Project {} ({})", config.base.project_id, config.base.environment.as_str());
    for domain in config.enabled_domains() {
        println!("   • {}", domain.as_str());
    }

    for warning in outcome.warnings() {
        println!("   ⚠️  {}: {}", warning.field, warning.message);
    }

    if outcome.is_valid() {
        println!();
        println!("✅ Configuration is valid");
        return Ok(());
    }

    println!("   ❌ Validation failed:");
    for error in outcome.errors() {
        println!("      - {}", error);
    }

    Err(EngineError::ConfigurationValidation {
        errors: outcome.error_messages(),
    }
    .into())
}
