//! The generation pipeline.
//!
//! A run goes through fixed phases:
//!
//! 1. **Initialize**: build one service per enabled domain
//! 2. **Validate**: validate every service; any error stops the run
//! 3. **Generate**: run all services concurrently and join all-or-nothing
//! 4. **Shared**: add the cross-cutting artifacts
//! 5. **Assess**: cost report and security analysis
//!
//! All run state lives in locals, so one [`Orchestrator`] can serve any
//! number of runs, including concurrent ones.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use forge_core::{
    Artifact, BaseConfig, Domain, DomainService, InfrastructureConfig, SecurityLevel,
    ValidationOutcome, ValidationWarning,
};
use forge_services::ServiceFactory;

use crate::cost::{CostCalculator, CostReport, StaticCostCalculator};
use crate::error::{EngineError, EngineResult};
use crate::security::{RuleBasedSecurityAnalyzer, SecurityAnalysis, SecurityAnalyzer};
use crate::shared::shared_artifacts;

/// The services of one run, keyed and ordered by domain.
pub type ServiceSet = BTreeMap<Domain, Box<dyn DomainService>>;

/// Per-run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    /// Root every artifact path is placed under
    pub output_dir: PathBuf,
    /// Upper bound on the generation phase. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Terraform state bucket, defaults to `<projectId>-tfstate`
    pub state_bucket: Option<String>,
}

impl GenerationOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            timeout: None,
            state_bucket: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_state_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.state_bucket = Some(bucket.into());
        self
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// Domain artifacts in domain order, then shared artifacts
    pub artifacts: Vec<Artifact>,
    /// Names of the services that took part
    pub services: Vec<String>,
    pub warnings: Vec<ValidationWarning>,
    pub next_steps: Vec<String>,
    /// Expected monthly cost in the report currency
    pub estimated_cost: f64,
    pub cost_report: CostReport,
    pub security_level: SecurityLevel,
    pub security_analysis: SecurityAnalysis,
    pub compliance_features: Vec<String>,
}

/// Drives a configuration through the full pipeline.
pub struct Orchestrator {
    service_factory: ServiceFactory,
    cost_calculator: Arc<dyn CostCalculator>,
    security_analyzer: Arc<dyn SecurityAnalyzer>,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(ServiceFactory::default())
    }
}

impl Orchestrator {
    /// Orchestrator with the static cost table and rule-based analyzer.
    pub fn new(service_factory: ServiceFactory) -> Self {
        Self {
            service_factory,
            cost_calculator: Arc::new(StaticCostCalculator::new()),
            security_analyzer: Arc::new(RuleBasedSecurityAnalyzer::new()),
        }
    }

    pub fn with_cost_calculator(mut self, calculator: Arc<dyn CostCalculator>) -> Self {
        self.cost_calculator = calculator;
        self
    }

    pub fn with_security_analyzer(mut self, analyzer: Arc<dyn SecurityAnalyzer>) -> Self {
        self.security_analyzer = analyzer;
        self
    }

    pub fn service_factory(&self) -> &ServiceFactory {
        &self.service_factory
    }

    /// Build the services of every enabled domain.
    pub fn initialize_services(&self, config: &InfrastructureConfig) -> EngineResult<ServiceSet> {
        let services = self
            .service_factory
            .create_services(config)?
            .into_iter()
            .map(|service| (service.domain(), service))
            .collect::<ServiceSet>();

        debug!(
            "Initialized services: {:?}",
            services.values().map(|s| s.name()).collect::<Vec<_>>()
        );
        Ok(services)
    }

    /// Validate every service and aggregate the results.
    ///
    /// Fields are prefixed with the owning service name, e.g.
    /// `compute.cloudFunctions.timeout`.
    pub fn validate_all_configurations(&self, services: &ServiceSet) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::valid();

        for service in services.values() {
            let result = service.validate();
            debug!(
                "Validated {}: {} error(s), {} warning(s)",
                service.name(),
                result.errors().len(),
                result.warnings().len()
            );
            outcome.merge(result.prefixed(service.name()));
        }

        outcome
    }

    /// Generate every service's files concurrently.
    ///
    /// The first failing service fails the whole call and no partial list is
    /// returned. Artifacts are concatenated in domain order regardless of
    /// completion order.
    pub async fn generate_all_service_files(
        &self,
        services: &ServiceSet,
        output_dir: &Path,
        timeout: Option<Duration>,
    ) -> EngineResult<Vec<Artifact>> {
        let tasks = services.values().map(|service| async move {
            service
                .generate_files(output_dir)
                .await
                .map_err(|source| EngineError::Generation {
                    service: service.name().to_string(),
                    source,
                })
        });

        let joined = try_join_all(tasks);
        let per_service = match timeout {
            Some(limit) => tokio::time::timeout(limit, joined)
                .await
                .map_err(|_| EngineError::GenerationTimeout(limit))??,
            None => joined.await?,
        };

        Ok(per_service.into_iter().flatten().collect())
    }

    /// Cross-cutting artifacts, independent of the enabled domains.
    pub fn generate_shared_infrastructure(&self, base: &BaseConfig, options: &GenerationOptions) -> Vec<Artifact> {
        shared_artifacts(base, &options.output_dir, options.state_bucket.as_deref())
    }

    /// Map a 0-100 security score onto a level.
    pub fn security_level(&self, score: u8) -> SecurityLevel {
        SecurityLevel::from_score(score)
    }

    /// Initialize and validate without generating anything.
    pub fn validate(&self, config: &InfrastructureConfig) -> EngineResult<ValidationOutcome> {
        let services = self.initialize_services(config)?;
        Ok(self.validate_all_configurations(&services))
    }

    /// Run the full pipeline.
    ///
    /// Failures are logged once here and returned unchanged.
    pub async fn generate(
        &self,
        config: &InfrastructureConfig,
        options: &GenerationOptions,
    ) -> EngineResult<GenerationResult> {
        self.run(config, options).await.map_err(|e| {
            error!("Infrastructure generation failed: {}", e);
            e
        })
    }

    async fn run(&self, config: &InfrastructureConfig, options: &GenerationOptions) -> EngineResult<GenerationResult> {
        info!(
            "Generating infrastructure for project {} ({})",
            config.base.project_id,
            config.base.environment.as_str()
        );

        let services = self.initialize_services(config)?;

        info!("Validating {} service(s)", services.len());
        let outcome = self.validate_all_configurations(&services);
        if !outcome.is_valid() {
            return Err(EngineError::ConfigurationValidation {
                errors: outcome.error_messages(),
            });
        }
        let (_, warnings) = outcome.into_parts();
        for warning in &warnings {
            warn!("{}: {}", warning.field, warning.message);
        }

        info!("Generating files into {}", options.output_dir.display());
        let mut artifacts = self
            .generate_all_service_files(&services, &options.output_dir, options.timeout)
            .await?;
        artifacts.extend(self.generate_shared_infrastructure(&config.base, options));

        let cost_report = self.cost_calculator.generate_cost_report(config);
        let security_analysis = self.security_analyzer.analyze_security_configuration(config);
        let security_level = self.security_level(security_analysis.overall_score);

        info!(
            "Generated {} artifact(s), estimated {}, security level {}",
            artifacts.len(),
            cost_report.format_total(),
            security_level.as_str()
        );

        Ok(GenerationResult {
            next_steps: next_steps(config, &services),
            compliance_features: compliance_features(config, &artifacts),
            services: services.values().map(|s| s.name().to_string()).collect(),
            estimated_cost: cost_report.total_cost,
            artifacts,
            warnings,
            cost_report,
            security_level,
            security_analysis,
        })
    }
}

fn next_steps(config: &InfrastructureConfig, services: &ServiceSet) -> Vec<String> {
    let mut steps = vec![
        "Review the generated files and commit them to version control".to_string(),
        format!(
            "Authenticate with gcloud and select the project: gcloud config set project {}",
            config.base.project_id
        ),
        "Create the Terraform state bucket referenced in terraform/backend.tf".to_string(),
    ];

    for domain in services.keys() {
        match domain {
            Domain::Compute => {
                let compute = config.compute.as_ref();
                if compute.and_then(|c| c.cloud_run.as_ref()).map_or(false, |r| r.enabled) {
                    steps.push("Build and push the container images referenced by the Cloud Run services".to_string());
                }
                if compute.and_then(|c| c.cloud_functions.as_ref()).map_or(false, |f| f.enabled) {
                    steps.push("Add your function source code before deploying Cloud Functions".to_string());
                }
            }
            Domain::Storage => {
                if config
                    .storage
                    .as_ref()
                    .and_then(|s| s.firestore.as_ref())
                    .map_or(false, |f| f.enabled)
                {
                    steps.push("Deploy Firestore rules and indexes with the Firebase CLI".to_string());
                }
            }
            Domain::Security => {
                if config.security.as_ref().map_or(false, |s| s.secret_manager_enabled()) {
                    steps.push("Add secret values with gcloud secrets versions add".to_string());
                }
            }
            Domain::Networking => {
                if config.networking.as_ref().map_or(false, |n| n.load_balancer_enabled()) {
                    steps.push("Point your DNS records at the load balancer IP address".to_string());
                }
            }
            Domain::Observability => {
                steps.push("Send a test notification to confirm alert routing".to_string());
            }
        }
    }

    steps.push("Run ./scripts/deploy.sh to apply every module".to_string());
    steps
}

fn compliance_features(config: &InfrastructureConfig, artifacts: &[Artifact]) -> Vec<String> {
    let mut features = vec!["Infrastructure as code".to_string()];

    if config.storage.as_ref().map_or(false, |s| s.is_enabled()) {
        features.push("Encryption at rest".to_string());
    }
    if config.base.environment.is_production() {
        features.push("Remote state with change history".to_string());
        features.push("Deletion protection for stateful resources".to_string());
    }

    for feature in artifacts.iter().flat_map(|a| a.compliance_features.iter()) {
        if !features.contains(feature) {
            features.push(feature.clone());
        }
    }

    features
}
