//! Compute domain: Cloud Functions and Cloud Run.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use tracing::info;

use forge_core::config::{CloudFunctionsConfig, CloudRunConfig, ComputeConfig};
use forge_core::{
    validate_enum, validate_range, validate_required, Artifact, BaseConfig, CoreResult, Domain,
    DomainConfigRef, DomainService, GenerationRequest, Generator, GeneratorFactory,
    OnConstructionFailure, ValidationError, ValidationOutcome, ValidationWarning,
};

use crate::hcl::identifier;
use crate::support::{resolve_generators, run_generators};

pub mod functions;
pub mod run;

pub use functions::CloudFunctionsGenerator;
pub use run::CloudRunGenerator;

pub const CLOUD_FUNCTIONS: &str = "cloud-functions";
pub const CLOUD_RUN: &str = "cloud-run";

/// Runtimes accepted for Cloud Functions.
pub const SUPPORTED_RUNTIMES: &[&str] = &[
    "nodejs18", "nodejs20", "nodejs22", "python39", "python310", "python311", "python312",
    "go121", "go122", "java17", "java21", "dotnet8", "ruby32",
];

/// Memory sizes accepted for Cloud Functions.
pub const MEMORY_SIZES: &[&str] = &[
    "128MB", "256MB", "512MB", "1GB", "2GB", "4GB", "8GB", "16GB", "32GB",
];

pub const MIN_TIMEOUT_SECONDS: u32 = 1;
pub const MAX_TIMEOUT_SECONDS: u32 = 540;
pub const MAX_INSTANCES: u32 = 1000;

/// Cloud Run service names: lowercase letters, digits and dashes, starting
/// with a letter, not ending with a dash, at most 49 characters.
pub const SERVICE_NAME_PATTERN: &str = r"^[a-z](?:[a-z0-9-]{0,47}[a-z0-9])?$";

/// Service for the compute slice.
pub struct ComputeService {
    base: Arc<BaseConfig>,
    config: ComputeConfig,
    generators: Vec<Box<dyn Generator>>,
}

impl ComputeService {
    pub const NAME: &'static str = "compute";

    /// Build the service and resolve the generators of its enabled sub-features.
    pub fn new(
        base: Arc<BaseConfig>,
        config: ComputeConfig,
        factory: &GeneratorFactory,
        policy: OnConstructionFailure,
    ) -> CoreResult<Self> {
        let generators = resolve_generators(
            factory,
            Domain::Compute,
            &[
                (CLOUD_FUNCTIONS, cloud_functions_enabled(&config)),
                (CLOUD_RUN, cloud_run_enabled(&config)),
            ],
            policy,
        )?;

        Ok(Self {
            base,
            config,
            generators,
        })
    }

    pub fn config(&self) -> &ComputeConfig {
        &self.config
    }

    fn validate_cloud_functions(&self, config: &CloudFunctionsConfig, outcome: &mut ValidationOutcome) {
        outcome.check(validate_required(&config.name, "cloudFunctions.name"));
        outcome.check(validate_enum(
            &config.runtime,
            SUPPORTED_RUNTIMES,
            "cloudFunctions.runtime",
        ));
        outcome.check(validate_enum(&config.memory, MEMORY_SIZES, "cloudFunctions.memory"));
        outcome.check(validate_range(
            config.timeout,
            MIN_TIMEOUT_SECONDS,
            MAX_TIMEOUT_SECONDS,
            "cloudFunctions.timeout",
        ));

        if config.triggers.is_empty() {
            outcome.add_error(ValidationError::new(
                "cloudFunctions.triggers",
                "At least one trigger is required",
            ));
        }
    }

    fn validate_cloud_run(&self, config: &CloudRunConfig, outcome: &mut ValidationOutcome) {
        if config.services.is_empty() {
            outcome.add_error(ValidationError::new(
                "cloudRun.services",
                "At least one Cloud Run service is required",
            ));
            return;
        }

        let production = self.base.environment.is_production();
        let name_pattern = Regex::new(SERVICE_NAME_PATTERN).ok();
        let mut seen = BTreeSet::new();

        for (i, service) in config.services.iter().enumerate() {
            let prefix = format!("cloudRun.services[{}]", i);
            let name_field = format!("{}.name", prefix);

            match validate_required(&service.name, &name_field) {
                Some(error) => outcome.add_error(error),
                None if !name_pattern.as_ref().map_or(false, |p| p.is_match(&service.name)) => {
                    outcome.add_error(ValidationError::new(
                        name_field,
                        format!(
                            "Invalid service name '{}': use lowercase letters, digits and dashes, start with a letter, at most 49 characters",
                            service.name
                        ),
                    ));
                }
                None if !seen.insert(identifier(&service.name)) => {
                    outcome.add_error(ValidationError::new(
                        name_field,
                        format!("Duplicate service name '{}'", service.name),
                    ));
                }
                None => {}
            }

            outcome.check(validate_required(&service.image, &format!("{}.image", prefix)));
            outcome.check(validate_range(
                service.min_instances,
                0,
                MAX_INSTANCES,
                &format!("{}.minInstances", prefix),
            ));
            outcome.check(validate_range(
                service.max_instances,
                1,
                MAX_INSTANCES,
                &format!("{}.maxInstances", prefix),
            ));

            if service.min_instances > service.max_instances {
                outcome.add_error(ValidationError::new(
                    format!("{}.minInstances", prefix),
                    "minInstances cannot be greater than maxInstances",
                ));
            }

            if production && service.allow_unauthenticated {
                outcome.add_warning(
                    ValidationWarning::new(
                        format!("{}.allowUnauthenticated", prefix),
                        format!("Service '{}' is publicly invokable in production", service.name),
                    )
                    .with_suggestion("Put the service behind a load balancer with Cloud Armor or require IAM authentication"),
                );
            }

            if production && service.min_instances == 0 {
                outcome.add_warning(
                    ValidationWarning::new(
                        format!("{}.minInstances", prefix),
                        format!("Service '{}' scales to zero in production", service.name),
                    )
                    .with_suggestion("Set minInstances to at least 1 to avoid cold starts"),
                );
            }
        }
    }
}

fn cloud_functions_enabled(config: &ComputeConfig) -> bool {
    config.cloud_functions.as_ref().map_or(false, |c| c.enabled)
}

fn cloud_run_enabled(config: &ComputeConfig) -> bool {
    config.cloud_run.as_ref().map_or(false, |c| c.enabled)
}

#[async_trait]
impl DomainService for ComputeService {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn domain(&self) -> Domain {
        Domain::Compute
    }

    fn base_config(&self) -> &BaseConfig {
        &self.base
    }

    fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    fn validate_domain(&self) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::valid();

        if let Some(functions) = self.config.cloud_functions.as_ref().filter(|c| c.enabled) {
            self.validate_cloud_functions(functions, &mut outcome);
        }

        if let Some(run) = self.config.cloud_run.as_ref().filter(|c| c.enabled) {
            self.validate_cloud_run(run, &mut outcome);
        }

        outcome
    }

    async fn generate_files(&self, output_dir: &Path) -> CoreResult<Vec<Artifact>> {
        info!("Generating compute files ({} generators)", self.generators.len());
        let request = GenerationRequest::new(
            &self.base,
            output_dir,
            DomainConfigRef::Compute(&self.config),
        );
        run_generators(&self.generators, &request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::builtin_factory;
    use forge_core::config::{CloudRunService, Trigger};
    use forge_core::Environment;

    fn service_with(config: ComputeConfig, environment: Environment) -> ComputeService {
        let base = Arc::new(BaseConfig::new("demo-project", "us-central1").with_environment(environment));
        ComputeService::new(base, config, &builtin_factory(), OnConstructionFailure::Abort).unwrap()
    }

    fn functions(config: CloudFunctionsConfig) -> ComputeService {
        service_with(
            ComputeConfig::default().with_cloud_functions(config),
            Environment::Development,
        )
    }

    fn cloud_run(service: CloudRunService) -> ComputeService {
        service_with(
            ComputeConfig::default().with_cloud_run(CloudRunConfig::new().with_service(service)),
            Environment::Development,
        )
    }

    fn valid_function() -> CloudFunctionsConfig {
        CloudFunctionsConfig::default().with_trigger(Trigger::Http)
    }

    #[test]
    fn test_valid_function() {
        assert!(functions(valid_function()).validate().is_valid());
    }

    #[test]
    fn test_timeout_bounds() {
        let outcome = functions(valid_function().with_timeout(0)).validate();
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors()[0].field, "cloudFunctions.timeout");

        assert!(functions(valid_function().with_timeout(540)).validate().is_valid());
        assert!(!functions(valid_function().with_timeout(541)).validate().is_valid());
    }

    #[test]
    fn test_memory_enum() {
        let outcome = functions(valid_function().with_memory("16MB")).validate();
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors().len(), 1);
        assert_eq!(outcome.errors()[0].field, "cloudFunctions.memory");

        assert!(functions(valid_function().with_memory("16GB")).validate().is_valid());
    }

    #[test]
    fn test_runtime_enum() {
        let outcome = functions(valid_function().with_runtime("cobol85")).validate();
        assert_eq!(outcome.errors()[0].field, "cloudFunctions.runtime");
    }

    #[test]
    fn test_triggers_required() {
        let outcome = functions(CloudFunctionsConfig::default()).validate();
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors().len(), 1);
        assert_eq!(outcome.errors()[0].message, "At least one trigger is required");
    }

    #[test]
    fn test_min_greater_than_max_is_single_error() {
        let outcome = cloud_run(CloudRunService::new("api", "gcr.io/p/api").with_instances(5, 2)).validate();

        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors().len(), 1);
        assert_eq!(outcome.errors()[0].field, "cloudRun.services[0].minInstances");
        assert_eq!(
            outcome.errors()[0].message,
            "minInstances cannot be greater than maxInstances"
        );
    }

    #[test]
    fn test_service_name_format() {
        for name in ["/tmp/escape", "../up", "API", "1api", "api-", "a_b"] {
            let outcome = cloud_run(CloudRunService::new(name, "gcr.io/p/api")).validate();
            assert_eq!(outcome.errors().len(), 1, "{}", name);
            assert_eq!(outcome.errors()[0].field, "cloudRun.services[0].name");
        }

        let too_long = format!("a{}", "b".repeat(49));
        assert!(!cloud_run(CloudRunService::new(too_long, "gcr.io/p/api")).validate().is_valid());

        let longest = format!("a{}", "b".repeat(48));
        assert!(cloud_run(CloudRunService::new(longest, "gcr.io/p/api")).validate().is_valid());
        assert!(cloud_run(CloudRunService::new("api-v2", "gcr.io/p/api")).validate().is_valid());
    }

    #[test]
    fn test_duplicate_service_names() {
        let service = service_with(
            ComputeConfig::default().with_cloud_run(
                CloudRunConfig::new()
                    .with_service(CloudRunService::new("api", "gcr.io/p/api"))
                    .with_service(CloudRunService::new("worker", "gcr.io/p/worker"))
                    .with_service(CloudRunService::new("api", "gcr.io/p/api2")),
            ),
            Environment::Development,
        );

        let outcome = service.validate();
        assert_eq!(outcome.errors().len(), 1);
        assert_eq!(outcome.errors()[0].field, "cloudRun.services[2].name");
        assert_eq!(outcome.errors()[0].message, "Duplicate service name 'api'");
    }

    #[test]
    fn test_instance_range_valid() {
        let outcome = cloud_run(CloudRunService::new("api", "gcr.io/p/api").with_instances(0, 100)).validate();
        assert!(outcome.is_valid());
        assert!(outcome.warnings().is_empty());
    }

    #[test]
    fn test_max_instances_out_of_range() {
        let outcome = cloud_run(CloudRunService::new("api", "gcr.io/p/api").with_instances(0, 0)).validate();
        assert_eq!(outcome.errors().len(), 1);
        assert_eq!(outcome.errors()[0].field, "cloudRun.services[0].maxInstances");
    }

    #[test]
    fn test_empty_service_list() {
        let service = service_with(
            ComputeConfig::default().with_cloud_run(CloudRunConfig::new()),
            Environment::Development,
        );
        let outcome = service.validate();
        assert_eq!(outcome.errors()[0].field, "cloudRun.services");
    }

    #[test]
    fn test_production_warnings() {
        let service = service_with(
            ComputeConfig::default().with_cloud_run(
                CloudRunConfig::new().with_service(CloudRunService::new("api", "img").public()),
            ),
            Environment::Production,
        );

        let outcome = service.validate();
        assert!(outcome.is_valid());
        assert_eq!(outcome.warnings().len(), 2);
    }

    #[test]
    fn test_disabled_sub_feature_not_validated() {
        let mut disabled = CloudFunctionsConfig::default().with_timeout(0);
        disabled.enabled = false;

        let service = service_with(
            ComputeConfig::default()
                .with_cloud_functions(disabled)
                .with_cloud_run(CloudRunConfig::new().with_service(CloudRunService::new("api", "img"))),
            Environment::Development,
        );

        assert!(service.validate().is_valid());
    }

    #[tokio::test]
    async fn test_generate_files_in_declaration_order() {
        let service = service_with(
            ComputeConfig::default()
                .with_cloud_functions(valid_function())
                .with_cloud_run(CloudRunConfig::new().with_service(CloudRunService::new("api", "img"))),
            Environment::Development,
        );

        let artifacts = service.generate_files(Path::new("out")).await.unwrap();
        let first_run = artifacts
            .iter()
            .position(|a| a.path.starts_with("out/compute/cloud-run"))
            .unwrap();
        let last_function = artifacts
            .iter()
            .rposition(|a| a.path.starts_with("out/compute/cloud-functions"))
            .unwrap();
        assert!(last_function < first_run);
    }
}
