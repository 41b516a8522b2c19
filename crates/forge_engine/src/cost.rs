//! Monthly cost estimation for generated infrastructure.
//!
//! Estimates are rough, list-price based and carry a min/expected/max range.
//! They exist to make the order of magnitude of a configuration visible
//! before anything is deployed, not to replace the GCP pricing calculator.

use serde::{Deserialize, Serialize};

use forge_core::config::{ComputeConfig, NetworkingConfig, ObservabilityConfig, SecurityConfig, StorageConfig};
use forge_core::InfrastructureConfig;

/// Estimated monthly cost of one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    /// Owning domain service
    pub service: String,
    /// Resource or sub-feature the estimate is for
    pub resource: String,
    pub min: f64,
    pub expected: f64,
    pub max: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CostEstimate {
    pub fn fixed(service: &str, resource: impl Into<String>, amount: f64) -> Self {
        Self::range(service, resource, amount, amount, amount)
    }

    pub fn range(service: &str, resource: impl Into<String>, min: f64, expected: f64, max: f64) -> Self {
        Self {
            service: service.to_string(),
            resource: resource.into(),
            min,
            expected,
            max,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }
}

/// Cost estimates for a whole configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostReport {
    /// Sum of the expected monthly costs
    pub total_cost: f64,
    pub currency: String,
    pub services: Vec<CostEstimate>,
    pub recommendations: Vec<String>,
}

impl CostReport {
    pub fn new(services: Vec<CostEstimate>, recommendations: Vec<String>) -> Self {
        let total = services.iter().map(|s| s.expected).sum::<f64>();
        Self {
            total_cost: round_cents(total),
            currency: "USD".to_string(),
            services,
            recommendations,
        }
    }

    /// Format the total for display, e.g. `$42.10/month`.
    pub fn format_total(&self) -> String {
        match self.currency.as_str() {
            "USD" => format!("${:.2}/month", self.total_cost),
            other => format!("{:.2} {}/month", self.total_cost, other),
        }
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Produces a cost report for a configuration.
#[cfg_attr(test, mockall::automock)]
pub trait CostCalculator: Send + Sync {
    fn generate_cost_report(&self, config: &InfrastructureConfig) -> CostReport;
}

// List prices in USD per month
const FUNCTION_BASE: f64 = 2.0;
const FUNCTION_PER_TRIGGER: f64 = 1.5;
const RUN_REQUEST_BASED: f64 = 5.0;
const RUN_ALWAYS_ON_INSTANCE: f64 = 45.0;
const FIRESTORE_BASE: f64 = 1.0;
const FIRESTORE_PER_COLLECTION: f64 = 0.5;
const SECRET_PER_VERSION: f64 = 0.06;
const KMS_PER_KEY: f64 = 0.06;
const NAT_GATEWAY: f64 = 32.0;
const LB_FORWARDING_RULE: f64 = 18.0;
const CDN_BASELINE: f64 = 5.0;
const CLOUD_ARMOR_POLICY: f64 = 5.0;
const ALERT_POLICY: f64 = 0.10;
const LOG_SINK: f64 = 1.0;

/// Assumed stored data per bucket when pricing storage classes.
const ASSUMED_BUCKET_GB: f64 = 100.0;

/// Price per GB-month by storage class.
fn storage_class_price(class: &str) -> f64 {
    match class {
        "NEARLINE" => 0.010,
        "COLDLINE" => 0.004,
        "ARCHIVE" => 0.0012,
        _ => 0.026,
    }
}

/// Fixed price table calculator.
///
/// Deterministic: the same configuration always yields the same report.
#[derive(Debug, Clone, Default)]
pub struct StaticCostCalculator;

impl StaticCostCalculator {
    pub fn new() -> Self {
        Self
    }

    fn compute(&self, config: &ComputeConfig, production: bool, out: &mut Vec<CostEstimate>, tips: &mut Vec<String>) {
        if let Some(functions) = config.cloud_functions.as_ref().filter(|c| c.enabled) {
            let expected = FUNCTION_BASE + FUNCTION_PER_TRIGGER * functions.triggers.len() as f64;
            out.push(
                CostEstimate::range("compute", format!("cloud-functions/{}", functions.name), 0.0, expected, expected * 4.0)
                    .with_notes("Invocation-based; the free tier often covers development traffic"),
            );
        }

        if let Some(run) = config.cloud_run.as_ref().filter(|c| c.enabled) {
            for service in &run.services {
                let always_on = RUN_ALWAYS_ON_INSTANCE * f64::from(service.min_instances);
                out.push(CostEstimate::range(
                    "compute",
                    format!("cloud-run/{}", service.name),
                    always_on,
                    RUN_REQUEST_BASED + always_on,
                    RUN_REQUEST_BASED + RUN_ALWAYS_ON_INSTANCE * f64::from(service.max_instances),
                ));

                if !production && service.min_instances > 0 {
                    tips.push(format!(
                        "Cloud Run service '{}' keeps {} instance(s) warm outside production; set minInstances to 0",
                        service.name, service.min_instances
                    ));
                }
            }
        }
    }

    fn storage(&self, config: &StorageConfig, out: &mut Vec<CostEstimate>, tips: &mut Vec<String>) {
        if let Some(storage) = config.cloud_storage.as_ref().filter(|c| c.enabled) {
            for bucket in &storage.buckets {
                let expected = storage_class_price(&bucket.storage_class) * ASSUMED_BUCKET_GB;
                out.push(
                    CostEstimate::range("storage", format!("cloud-storage/{}", bucket.name), 0.0, expected, expected * 10.0)
                        .with_notes("Assumes 100 GB stored"),
                );

                if bucket.storage_class == "STANDARD" && bucket.lifecycle_delete_after_days.is_none() {
                    tips.push(format!(
                        "Bucket '{}' has no lifecycle rule; expire or downgrade old objects",
                        bucket.name
                    ));
                }
            }
        }

        if let Some(firestore) = config.firestore.as_ref().filter(|c| c.enabled) {
            let expected = FIRESTORE_BASE + FIRESTORE_PER_COLLECTION * firestore.collections.len() as f64;
            out.push(CostEstimate::range("storage", "firestore", 0.0, expected, expected * 5.0));
        }
    }

    fn security(&self, config: &SecurityConfig, out: &mut Vec<CostEstimate>) {
        if config.iam_enabled() {
            out.push(CostEstimate::fixed("security", "iam", 0.0).with_notes("IAM is free"));
        }

        if let Some(secrets) = config.secret_manager.as_ref().filter(|c| c.enabled) {
            out.push(CostEstimate::fixed(
                "security",
                "secret-manager",
                SECRET_PER_VERSION * secrets.secrets.len() as f64,
            ));
        }

        if let Some(kms) = config.kms.as_ref().filter(|c| c.enabled) {
            out.push(CostEstimate::fixed("security", "kms", KMS_PER_KEY * kms.keys.len() as f64));
        }
    }

    fn networking(&self, config: &NetworkingConfig, out: &mut Vec<CostEstimate>, tips: &mut Vec<String>) {
        if let Some(vpc) = config.vpc.as_ref().filter(|c| c.enabled) {
            let nat = if vpc.enable_nat { NAT_GATEWAY } else { 0.0 };
            out.push(CostEstimate::fixed("networking", format!("vpc/{}", vpc.name), nat));
        }

        if let Some(lb) = config.load_balancer.as_ref().filter(|c| c.enabled) {
            let mut expected = LB_FORWARDING_RULE;
            if lb.enable_cdn {
                expected += CDN_BASELINE;
            }
            if lb.cloud_armor {
                expected += CLOUD_ARMOR_POLICY;
            }
            out.push(CostEstimate::range(
                "networking",
                format!("load-balancer/{}", lb.name),
                LB_FORWARDING_RULE,
                expected,
                expected * 3.0,
            ));

            if !lb.enable_cdn {
                tips.push(format!(
                    "Enable Cloud CDN on load balancer '{}' to cut egress for cacheable content",
                    lb.name
                ));
            }
        }
    }

    fn observability(&self, config: &ObservabilityConfig, out: &mut Vec<CostEstimate>) {
        if let Some(monitoring) = config.monitoring.as_ref().filter(|c| c.enabled) {
            out.push(CostEstimate::fixed(
                "observability",
                "monitoring",
                ALERT_POLICY * monitoring.alert_policies.len() as f64,
            ));
        }

        if let Some(logging) = config.logging.as_ref().filter(|c| c.enabled) {
            out.push(
                CostEstimate::range("observability", "logging", 0.0, LOG_SINK * logging.sinks.len() as f64, 50.0)
                    .with_notes("First 50 GiB of ingestion per month are free"),
            );
        }
    }
}

impl CostCalculator for StaticCostCalculator {
    fn generate_cost_report(&self, config: &InfrastructureConfig) -> CostReport {
        let production = config.base.environment.is_production();
        let mut services = Vec::new();
        let mut tips = Vec::new();

        if let Some(compute) = config.compute.as_ref().filter(|c| c.is_enabled()) {
            self.compute(compute, production, &mut services, &mut tips);
        }
        if let Some(storage) = config.storage.as_ref().filter(|c| c.is_enabled()) {
            self.storage(storage, &mut services, &mut tips);
        }
        if let Some(security) = config.security.as_ref().filter(|c| c.is_enabled()) {
            self.security(security, &mut services);
        }
        if let Some(networking) = config.networking.as_ref().filter(|c| c.is_enabled()) {
            self.networking(networking, &mut services, &mut tips);
        }
        if let Some(observability) = config.observability.as_ref().filter(|c| c.is_enabled()) {
            self.observability(observability, &mut services);
        }

        if config.base.billing_account_id.is_none() {
            tips.push("Link a billing account and set a budget alert before deploying".to_string());
        }

        CostReport::new(services, tips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::config::{
        BucketConfig, CloudRunConfig, CloudRunService, CloudStorageConfig, LoadBalancerConfig,
    };
    use forge_core::BaseConfig;

    fn config() -> InfrastructureConfig {
        InfrastructureConfig::new(BaseConfig::new("demo-project", "us-central1").with_billing_account("000000-000000-000000"))
    }

    #[test]
    fn test_empty_config_costs_nothing() {
        let report = StaticCostCalculator::new().generate_cost_report(&config());
        assert_eq!(report.total_cost, 0.0);
        assert!(report.services.is_empty());
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_cloud_run_always_on_instances() {
        let config = config().with_compute(
            ComputeConfig::default().with_cloud_run(
                CloudRunConfig::new().with_service(CloudRunService::new("api", "img").with_instances(2, 10)),
            ),
        );

        let report = StaticCostCalculator::new().generate_cost_report(&config);
        assert_eq!(report.services.len(), 1);
        assert_eq!(report.services[0].expected, 95.0);
        assert_eq!(report.total_cost, 95.0);
        assert!(report.recommendations[0].contains("minInstances to 0"));
    }

    #[test]
    fn test_storage_class_pricing() {
        let config = config().with_storage(
            StorageConfig::default().with_cloud_storage(
                CloudStorageConfig::new()
                    .with_bucket(BucketConfig::new("hot", "US"))
                    .with_bucket(BucketConfig::new("cold", "US").with_storage_class("ARCHIVE")),
            ),
        );

        let report = StaticCostCalculator::new().generate_cost_report(&config);
        assert!(report.services[0].expected > report.services[1].expected);
        assert_eq!(report.total_cost, 2.72);
    }

    #[test]
    fn test_deterministic() {
        let config = config().with_networking(NetworkingConfig {
            vpc: None,
            load_balancer: Some(LoadBalancerConfig {
                enabled: true,
                cloud_armor: true,
                ..Default::default()
            }),
        });

        let calculator = StaticCostCalculator::new();
        assert_eq!(
            calculator.generate_cost_report(&config),
            calculator.generate_cost_report(&config)
        );
    }

    #[test]
    fn test_format_total() {
        let report = CostReport::new(vec![CostEstimate::fixed("compute", "x", 42.1)], Vec::new());
        assert_eq!(report.format_total(), "$42.10/month");
    }
}
