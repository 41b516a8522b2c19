//! Configuration loading.
//!
//! The infrastructure configuration is read from a YAML, JSON or TOML file,
//! picked by extension, and then patched with command-line or environment
//! overrides for the base fields.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use thiserror::Error;
use tracing::debug;

use forge_core::{Environment, InfrastructureConfig};

/// Errors caused by the user-supplied configuration file or overrides.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported configuration format '{0}' (expected yaml, yml, json or toml)")]
    UnsupportedFormat(String),

    #[error("Invalid {format} configuration: {message}")]
    Parse { format: ConfigFormat, message: String },

    #[error("Invalid environment '{0}' (expected development, staging or production)")]
    InvalidEnvironment(String),
}

/// On-disk configuration formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    /// Detect the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            "toml" => Ok(ConfigFormat::Toml),
            _ => Err(ConfigError::UnsupportedFormat(ext)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Json => "JSON",
            ConfigFormat::Toml => "TOML",
        }
    }

    /// Parse a configuration document in this format.
    pub fn parse(&self, content: &str) -> Result<InfrastructureConfig, ConfigError> {
        let parsed = match self {
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|message| ConfigError::Parse {
            format: *self,
            message,
        })
    }
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Load an [`InfrastructureConfig`] from a file.
pub fn load_config(path: &Path) -> anyhow::Result<InfrastructureConfig> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()).into());
    }

    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;

    let config = format
        .parse(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    debug!(
        "Loaded {} configuration from {} (domains: {:?})",
        format,
        path.display(),
        config.enabled_domains()
    );
    Ok(config)
}

/// Base-field overrides, from flags or `FORGE_*` environment variables.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override the GCP project id
    #[arg(long, env = "FORGE_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Override the default region
    #[arg(long, env = "FORGE_REGION")]
    pub region: Option<String>,

    /// Override the deployment environment (development, staging, production)
    #[arg(long, env = "FORGE_ENVIRONMENT")]
    pub environment: Option<String>,
}

impl ConfigOverrides {
    /// Apply the overrides that are set, leaving the rest untouched.
    pub fn apply(&self, config: &mut InfrastructureConfig) -> Result<(), ConfigError> {
        if let Some(project_id) = &self.project_id {
            config.base.project_id = project_id.clone();
        }
        if let Some(region) = &self.region {
            config.base.region = region.clone();
        }
        if let Some(environment) = &self.environment {
            config.base.environment = Environment::from_str(environment)
                .ok_or_else(|| ConfigError::InvalidEnvironment(environment.clone()))?;
        }
        Ok(())
    }
}

/// Load a configuration file and apply the overrides.
pub fn load_with_overrides(path: &Path, overrides: &ConfigOverrides) -> anyhow::Result<InfrastructureConfig> {
    let mut config = load_config(path)?;
    overrides.apply(&mut config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use forge_core::Domain;
    use tempfile::{Builder, TempDir};

    use super::*;

    const YAML: &str = r#"
projectId: demo-project
region: us-central1
environment: staging
labels:
  team: platform
compute:
  cloudFunctions:
    enabled: true
    triggers:
      - type: http
      - type: schedule
        schedule: "0 * * * *"
storage:
  cloudStorage:
    enabled: true
    buckets:
      - name: demo-assets
        location: US
"#;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.yaml")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.YML")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")).unwrap(), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")).unwrap(), ConfigFormat::Toml);
        assert!(matches!(
            ConfigFormat::from_path(Path::new("a.ini")),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "ini"
        ));
    }

    #[test]
    fn test_load_yaml() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "infra.yaml", YAML);

        let config = load_config(&path).unwrap();
        assert_eq!(config.base.project_id, "demo-project");
        assert_eq!(config.base.environment, Environment::Staging);
        assert_eq!(config.base.labels.get("team").map(String::as_str), Some("platform"));
        assert_eq!(config.enabled_domains(), vec![Domain::Compute, Domain::Storage]);

        let functions = config.compute.unwrap().cloud_functions.unwrap();
        assert_eq!(functions.triggers.len(), 2);
        assert_eq!(functions.timeout, 60);
    }

    #[test]
    fn test_load_json() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "infra.json",
            r#"{"projectId": "demo-project", "region": "europe-west1", "environment": "prod"}"#,
        );

        let config = load_config(&path).unwrap();
        assert_eq!(config.base.region, "europe-west1");
        assert!(config.base.environment.is_production());
        assert!(config.enabled_domains().is_empty());
    }

    #[test]
    fn test_load_toml() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "infra.toml",
            r#"
projectId = "demo-project"
region = "us-east1"

[storage.cloudStorage]
enabled = true

[[storage.cloudStorage.buckets]]
name = "demo-logs"
location = "US"
storageClass = "NEARLINE"
"#,
        );

        let config = load_config(&path).unwrap();
        let buckets = config.storage.unwrap().cloud_storage.unwrap().buckets;
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].storage_class, "NEARLINE");
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/infra.yaml")).unwrap_err();
        assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_parse_error_keeps_path_context() {
        let file = Builder::new().suffix(".json").tempfile().unwrap();
        std::fs::write(file.path(), "{ not json").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse"));
        assert!(err.chain().any(|c| matches!(
            c.downcast_ref::<ConfigError>(),
            Some(ConfigError::Parse { format: ConfigFormat::Json, .. })
        )));
    }

    #[test]
    fn test_overrides() {
        let mut config = InfrastructureConfig::default();
        let overrides = ConfigOverrides {
            project_id: Some("other-project".to_string()),
            region: None,
            environment: Some("prod".to_string()),
        };

        overrides.apply(&mut config).unwrap();
        assert_eq!(config.base.project_id, "other-project");
        assert_eq!(config.base.region, "");
        assert_eq!(config.base.environment, Environment::Production);
    }

    #[test]
    fn test_invalid_environment_override() {
        let mut config = InfrastructureConfig::default();
        let overrides = ConfigOverrides {
            environment: Some("qa".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            overrides.apply(&mut config),
            Err(ConfigError::InvalidEnvironment(env)) if env == "qa"
        ));
    }
}
