//! CLI command definitions.
//!
//! Each subcommand maps to one entry point of the generation pipeline.

use clap::{Parser, Subcommand, ValueEnum};

pub mod generate;
pub mod generators;
pub mod validate;

/// stackforge - GCP infrastructure generator
#[derive(Parser)]
#[command(name = "forge")]
#[command(version, about = "stackforge - GCP infrastructure generator")]
#[command(long_about = r#"
stackforge turns a declarative infrastructure description into a
deployable tree of Terraform modules, scripts and documentation.

COMMANDS:
  generate    → Validate the configuration and write every artifact
  validate    → Validate the configuration without generating
  generators  → List the registered template generators

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or configuration file
  3 - Validation failure
  4 - Generation failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate infrastructure files from a configuration
    Generate(generate::GenerateArgs),

    /// Validate a configuration without generating files
    Validate(validate::ValidateArgs),

    /// List the available template generators
    Generators(generators::GeneratorsArgs),
}
