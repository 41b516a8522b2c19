//! Integration tests for the forge commands.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use forge_cli::commands::generate::{self, GenerateArgs};
use forge_cli::commands::validate::{self, ValidateArgs};
use forge_cli::{categorize_error, ConfigOverrides, ExitCodes};

const CONFIG: &str = r#"
projectId: demo-project
region: us-central1
environment: production
compute:
  cloudRun:
    enabled: true
    services:
      - name: api
        image: gcr.io/demo-project/api:1.0
storage:
  cloudStorage:
    enabled: true
    buckets:
      - name: demo-project-assets
        location: US
        versioning: true
security:
  iam:
    enabled: true
"#;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("infra.yaml");
    std::fs::write(&path, content).unwrap();
    path
}

fn generate_args(config: &Path, output: &Path) -> GenerateArgs {
    GenerateArgs {
        config: config.to_path_buf(),
        output: output.to_path_buf(),
        dry_run: false,
        timeout_secs: Some(30),
        skip_missing_generators: false,
        state_bucket: None,
        json: false,
        overrides: ConfigOverrides::default(),
    }
}

/// Test that generate writes the whole tree.
#[tokio::test]
async fn test_generate_writes_tree() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, CONFIG);
    let output = dir.path().join("out");

    generate::execute(generate_args(&config, &output)).await.unwrap();

    for file in [
        "compute/cloud-run/main.tf",
        "storage/cloud-storage/main.tf",
        "security/iam/main.tf",
        "terraform/main.tf",
        "terraform/backend.tf",
        "scripts/deploy.sh",
        ".env.template",
        "README.md",
    ] {
        assert!(output.join(file).is_file(), "missing {}", file);
    }

    let backend = std::fs::read_to_string(output.join("terraform/backend.tf")).unwrap();
    assert!(backend.contains("demo-project-tfstate"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(output.join("scripts/deploy.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}

/// Test that a dry run leaves the output directory untouched.
#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, CONFIG);
    let output = dir.path().join("out");

    let args = GenerateArgs {
        dry_run: true,
        ..generate_args(&config, &output)
    };
    generate::execute(args).await.unwrap();

    assert!(!output.exists());
}

/// Test that overrides take precedence over the file.
#[tokio::test]
async fn test_project_override() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, CONFIG);
    let output = dir.path().join("out");

    let args = GenerateArgs {
        overrides: ConfigOverrides {
            project_id: Some("other-project".to_string()),
            ..Default::default()
        },
        ..generate_args(&config, &output)
    };
    generate::execute(args).await.unwrap();

    let variables = std::fs::read_to_string(output.join("terraform/variables.tf")).unwrap();
    assert!(variables.contains("default     = \"other-project\""));
}

/// Test the exit code of an invalid configuration.
#[tokio::test]
async fn test_invalid_configuration_exit_code() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        r#"
projectId: demo-project
region: us-central1
storage:
  cloudStorage:
    enabled: true
"#,
    );

    let err = validate::execute(ValidateArgs {
        config: config.clone(),
        overrides: ConfigOverrides::default(),
    })
    .await
    .unwrap_err();
    assert_eq!(categorize_error(&err), ExitCodes::VALIDATION_FAILURE);

    let output = dir.path().join("out");
    let err = generate::execute(generate_args(&config, &output)).await.unwrap_err();
    assert_eq!(categorize_error(&err), ExitCodes::VALIDATION_FAILURE);
    assert!(!output.exists());
}

/// Test the exit code of a missing configuration file.
#[tokio::test]
async fn test_missing_config_exit_code() {
    let dir = TempDir::new().unwrap();

    let err = validate::execute(ValidateArgs {
        config: dir.path().join("absent.yaml"),
        overrides: ConfigOverrides::default(),
    })
    .await
    .unwrap_err();

    assert_eq!(categorize_error(&err), ExitCodes::INVALID_ARGS);
}
