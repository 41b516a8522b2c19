//! Generate command - Run the full pipeline and write the artifacts.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tracing::info;

use forge_core::OnConstructionFailure;
use forge_engine::{GenerationOptions, GenerationResult, Orchestrator};
use forge_services::ServiceFactory;

use crate::config::{load_with_overrides, ConfigOverrides};
use crate::writer::write_artifacts;

#[derive(Args)]
pub struct GenerateArgs {
    /// Path to the configuration file (yaml, json or toml)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Directory the generated tree is written to
    #[arg(short, long, default_value = "infrastructure")]
    pub output: PathBuf,

    /// Generate and report without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Abort generation after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Continue without generators that cannot be constructed
    #[arg(long)]
    pub skip_missing_generators: bool,

    /// Terraform state bucket (defaults to <projectId>-tfstate)
    #[arg(long)]
    pub state_bucket: Option<String>,

    /// Print the full generation result as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

impl GenerateArgs {
    fn policy(&self) -> OnConstructionFailure {
        if self.skip_missing_generators {
            OnConstructionFailure::Skip
        } else {
            OnConstructionFailure::Abort
        }
    }

    fn options(&self) -> GenerationOptions {
        let mut options = GenerationOptions::new(&self.output);
        if let Some(secs) = self.timeout_secs {
            options = options.with_timeout(Duration::from_secs(secs));
        }
        if let Some(bucket) = &self.state_bucket {
            options = options.with_state_bucket(bucket.clone());
        }
        options
    }
}

pub async fn execute(args: GenerateArgs) -> Result<()> {
    info!("Generating infrastructure from {}", args.config.display());

    let config = load_with_overrides(&args.config, &args.overrides)?;
    let orchestrator = Orchestrator::new(ServiceFactory::new(args.policy()));
    let result = orchestrator.generate(&config, &args.options()).await?;

    if args.dry_run {
        info!("Dry run, nothing written");
    } else {
        let summary = write_artifacts(&result.artifacts)?;
        info!(
            "Wrote {} file(s) to {} ({} executable)",
            summary.written.len(),
            args.output.display(),
            summary.executables.len()
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result, args.dry_run);
    }

    Ok(())
}

fn print_summary(result: &GenerationResult, dry_run: bool) {
    let verb = if dry_run { "Would generate" } else { "Generated" };
    println!("🏗️  {} {} artifact(s)", verb, result.artifacts.len());

    if dry_run {
        for artifact in &result.artifacts {
            println!("   {}", artifact.path.display());
        }
    }

    println!("💰 Estimated cost: {}", result.cost_report.format_total());
    println!(
        "🔒 Security level: {} (score {})",
        result.security_level, result.security_analysis.overall_score
    );

    for warning in &result.warnings {
        println!("⚠️  {}: {}", warning.field, warning.message);
    }

    if !result.compliance_features.is_empty() {
        println!();
        println!("Compliance:");
        for feature in &result.compliance_features {
            println!("   ✓ {}", feature);
        }
    }

    println!();
    println!("Next steps:");
    for (i, step) in result.next_steps.iter().enumerate() {
        println!("   {}. {}", i + 1, step);
    }
}
