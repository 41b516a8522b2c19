//! Integration tests for the full generation pipeline.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use forge_core::config::{
    BucketConfig, CloudFunctionsConfig, CloudRunConfig, CloudRunService, CloudStorageConfig,
    ComputeConfig, IamConfig, LoggingConfig, ObservabilityConfig, SecurityConfig, StorageConfig,
    Trigger,
};
use forge_core::{BaseConfig, Environment, GeneratorRegistry, InfrastructureConfig, OnConstructionFailure};
use forge_engine::{EngineError, GenerationOptions, Orchestrator};
use forge_services::ServiceFactory;

fn full_config() -> InfrastructureConfig {
    InfrastructureConfig::new(BaseConfig::new("demo-project", "us-central1").with_environment(Environment::Staging))
        .with_observability(ObservabilityConfig {
            monitoring: None,
            logging: Some(LoggingConfig {
                enabled: true,
                ..Default::default()
            }),
        })
        .with_storage(
            StorageConfig::default()
                .with_cloud_storage(CloudStorageConfig::new().with_bucket(BucketConfig::new("demo-assets", "US"))),
        )
        .with_compute(
            ComputeConfig::default()
                .with_cloud_functions(CloudFunctionsConfig::default().with_trigger(Trigger::Http))
                .with_cloud_run(CloudRunConfig::new().with_service(CloudRunService::new("api", "gcr.io/demo/api"))),
        )
        .with_security(SecurityConfig {
            iam: Some(IamConfig {
                enabled: true,
                ..Default::default()
            }),
            ..Default::default()
        })
}

fn domain_of(path: &Path) -> String {
    path.strip_prefix("out")
        .ok()
        .and_then(|p| p.components().next())
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Test the end-to-end run and the artifact merge order.
#[tokio::test]
async fn test_full_pipeline() {
    let result = Orchestrator::default()
        .generate(&full_config(), &GenerationOptions::new("out"))
        .await
        .unwrap();

    assert_eq!(result.services, vec!["compute", "storage", "security", "observability"]);

    let mut seen: Vec<String> = Vec::new();
    for artifact in &result.artifacts {
        let domain = domain_of(&artifact.path);
        if seen.last() != Some(&domain) {
            seen.push(domain);
        }
    }
    assert_eq!(
        seen,
        vec!["compute", "storage", "security", "observability", "terraform", "scripts", ".env.template", "README.md"]
    );

    assert!(result.estimated_cost > 0.0);
    assert_eq!(result.estimated_cost, result.cost_report.total_cost);
    assert!(result.compliance_features.contains(&"Data access audit logging".to_string()));
    assert!(result.compliance_features.contains(&"Least-privilege service accounts".to_string()));
}

/// Test that two identical runs produce identical results.
#[tokio::test]
async fn test_runs_are_idempotent() {
    let orchestrator = Orchestrator::default();
    let options = GenerationOptions::new("out");

    let first = orchestrator.generate(&full_config(), &options).await.unwrap();
    let second = orchestrator.generate(&full_config(), &options).await.unwrap();

    assert_eq!(first.artifacts, second.artifacts);
    assert_eq!(first.cost_report, second.cost_report);
    assert_eq!(first.security_analysis, second.security_analysis);
    assert_eq!(first.next_steps, second.next_steps);
}

/// Test that a configuration with no enabled domain still gets the shared scaffold.
#[tokio::test]
async fn test_empty_configuration() {
    let config = InfrastructureConfig::new(BaseConfig::new("demo-project", "us-central1"));

    let result = Orchestrator::default()
        .generate(&config, &GenerationOptions::new("out"))
        .await
        .unwrap();

    assert!(result.services.is_empty());
    assert_eq!(result.artifacts.len(), 6);
    assert_eq!(result.estimated_cost, 0.0);
}

/// Test that errors from every service are reported together.
#[tokio::test]
async fn test_validation_errors_aggregated() {
    let config = InfrastructureConfig::new(BaseConfig::new("demo-project", "us-central1"))
        .with_compute(ComputeConfig::default().with_cloud_functions(CloudFunctionsConfig::default().with_timeout(900)))
        .with_storage(StorageConfig::default().with_cloud_storage(CloudStorageConfig::new()));

    let err = Orchestrator::default()
        .generate(&config, &GenerationOptions::new("out"))
        .await
        .unwrap_err();

    match err {
        EngineError::ConfigurationValidation { errors } => {
            assert_eq!(errors.len(), 3);
            assert!(errors[0].starts_with("compute.cloudFunctions.timeout"));
            assert!(errors[1].starts_with("compute.cloudFunctions.triggers"));
            assert!(errors[2].starts_with("storage.cloudStorage.buckets"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

/// Test that a missing generator aborts initialization under the default policy.
#[tokio::test]
async fn test_missing_generator_aborts() {
    let factory = ServiceFactory::with_registry(Arc::new(GeneratorRegistry::new()), OnConstructionFailure::Abort);

    let err = Orchestrator::new(factory)
        .generate(&full_config(), &GenerationOptions::new("out"))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Core(_)));
}

/// Test that a generous timeout does not change the result.
#[tokio::test]
async fn test_generous_timeout() {
    let options = GenerationOptions::new("out").with_timeout(Duration::from_secs(30));

    let result = Orchestrator::default().generate(&full_config(), &options).await.unwrap();
    assert!(!result.artifacts.is_empty());
}

/// Test that every artifact lands under the output directory.
#[tokio::test]
async fn test_artifacts_stay_under_output_dir() {
    let config = full_config().with_compute(ComputeConfig::default().with_cloud_run(
        CloudRunConfig::new()
            .with_service(CloudRunService::new("api", "gcr.io/demo/api"))
            .with_service(CloudRunService::new("worker", "gcr.io/demo/worker")),
    ));
    let options = GenerationOptions::new("out");

    let result = Orchestrator::default().generate(&config, &options).await.unwrap();

    let mut paths = std::collections::BTreeSet::new();
    for artifact in &result.artifacts {
        assert!(artifact.path.starts_with(&options.output_dir), "{}", artifact.path.display());
        assert!(paths.insert(artifact.path.clone()), "duplicate {}", artifact.path.display());
    }
}

/// Test that service names which would leave the output directory are rejected.
#[tokio::test]
async fn test_path_like_service_names_rejected() {
    for name in ["/tmp/escape", "../escape"] {
        let config = InfrastructureConfig::new(BaseConfig::new("demo-project", "us-central1")).with_compute(
            ComputeConfig::default()
                .with_cloud_run(CloudRunConfig::new().with_service(CloudRunService::new(name, "img"))),
        );

        let err = Orchestrator::default()
            .generate(&config, &GenerationOptions::new("out"))
            .await
            .unwrap_err();

        match err {
            EngineError::ConfigurationValidation { errors } => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].starts_with("compute.cloudRun.services[0].name"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}

/// Test that a repeated service name blocks generation.
#[tokio::test]
async fn test_duplicate_service_names_rejected() {
    let config = InfrastructureConfig::new(BaseConfig::new("demo-project", "us-central1")).with_compute(
        ComputeConfig::default().with_cloud_run(
            CloudRunConfig::new()
                .with_service(CloudRunService::new("api", "gcr.io/demo/api"))
                .with_service(CloudRunService::new("api", "gcr.io/demo/api-v2")),
        ),
    );

    let err = Orchestrator::default()
        .generate(&config, &GenerationOptions::new("out"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::ConfigurationValidation { ref errors }
            if errors == &vec!["compute.cloudRun.services[1].name: Duplicate service name 'api'".to_string()]
    ));
}
