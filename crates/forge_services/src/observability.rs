//! Observability domain: Cloud Monitoring and Cloud Logging.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use forge_core::config::{LoggingConfig, MonitoringConfig, ObservabilityConfig};
use forge_core::{
    Artifact, ArtifactKind, BaseConfig, CoreError, CoreResult, Domain, DomainConfigRef,
    DomainService, GenerationRequest, Generator, GeneratorFactory, OnConstructionFailure,
    ValidationOutcome,
};

use crate::hcl::{header, identifier, quote};
use crate::support::{resolve_generators, run_generators};

pub const MONITORING: &str = "monitoring";
pub const LOGGING: &str = "logging";

pub struct ObservabilityService {
    base: Arc<BaseConfig>,
    config: ObservabilityConfig,
    generators: Vec<Box<dyn Generator>>,
}

impl ObservabilityService {
    pub const NAME: &'static str = "observability";

    pub fn new(
        base: Arc<BaseConfig>,
        config: ObservabilityConfig,
        factory: &GeneratorFactory,
        policy: OnConstructionFailure,
    ) -> CoreResult<Self> {
        let generators = resolve_generators(
            factory,
            Domain::Observability,
            &[
                (MONITORING, config.monitoring_enabled()),
                (LOGGING, config.logging_enabled()),
            ],
            policy,
        )?;

        Ok(Self {
            base,
            config,
            generators,
        })
    }

    pub fn config(&self) -> &ObservabilityConfig {
        &self.config
    }
}

#[async_trait]
impl DomainService for ObservabilityService {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn domain(&self) -> Domain {
        Domain::Observability
    }

    fn base_config(&self) -> &BaseConfig {
        &self.base
    }

    fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    fn validate_domain(&self) -> ValidationOutcome {
        ValidationOutcome::valid()
    }

    /// Observability configuration is not validated yet; every slice is accepted.
    ///
    /// This replaces the whole two-phase check, so the base `projectId` and
    /// `region` checks are skipped as well.
    fn validate(&self) -> ValidationOutcome {
        ValidationOutcome::valid()
    }

    async fn generate_files(&self, output_dir: &Path) -> CoreResult<Vec<Artifact>> {
        info!("Generating observability files ({} generators)", self.generators.len());
        let request = GenerationRequest::new(
            &self.base,
            output_dir,
            DomainConfigRef::Observability(&self.config),
        );
        run_generators(&self.generators, &request)
    }
}

fn observability_slice<'a>(
    request: &GenerationRequest<'a>,
    generator: &str,
) -> CoreResult<&'a ObservabilityConfig> {
    request
        .config
        .observability()
        .ok_or_else(|| CoreError::config_mismatch(generator, Domain::Observability))
}

/// Notification channels, alert policies and uptime checks.
#[derive(Debug, Default)]
pub struct MonitoringGenerator;

impl Generator for MonitoringGenerator {
    fn name(&self) -> &str {
        MONITORING
    }

    fn description(&self) -> &str {
        "Cloud Monitoring alert policies, uptime checks and email notification channels"
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> CoreResult<Vec<Artifact>> {
        let config = match observability_slice(request, self.name())?
            .monitoring
            .as_ref()
            .filter(|c| c.enabled)
        {
            Some(config) => config,
            None => return Ok(Vec::new()),
        };

        let dir = request.feature_dir(MONITORING);

        Ok(vec![
            Artifact::new(dir.join("main.tf"), monitoring_tf(request.base, config), ArtifactKind::Terraform)
                .with_description("Monitoring alerting and uptime checks")
                .with_compliance("Alerting on service health"),
            Artifact::new(dir.join("alert-policies.yaml"), alert_policies_yaml(config)?, ArtifactKind::Yaml)
                .with_description("Alert policy summary")
                .with_instruction("Import individual policies with: gcloud alpha monitoring policies create --policy-from-file"),
        ])
    }
}

fn monitoring_tf(base: &BaseConfig, config: &MonitoringConfig) -> String {
    let mut out = header("Cloud Monitoring", &base.project_id, base.environment.as_str());

    for (i, email) in config.notification_emails.iter().enumerate() {
        out.push_str(&format!(
            r#"
resource "google_monitoring_notification_channel" "email_{i}" {{
  display_name = {email}
  type         = "email"
  labels = {{
    email_address = {email}
  }}
}}
"#,
            i = i,
            email = quote(email),
        ));
    }

    let channels: Vec<String> = (0..config.notification_emails.len())
        .map(|i| format!("google_monitoring_notification_channel.email_{}.id", i))
        .collect();

    for policy in &config.alert_policies {
        out.push_str(&format!(
            r#"
resource "google_monitoring_alert_policy" "{id}" {{
  display_name          = {name}
  combiner              = "OR"
  notification_channels = [{channels}]

  conditions {{
    display_name = {name}
    condition_threshold {{
      filter          = "metric.type=\"{metric}\""
      comparison      = {comparison}
      threshold_value = {threshold}
      duration        = "{duration}s"
    }}
  }}
}}
"#,
            id = identifier(&policy.name),
            name = quote(&policy.name),
            channels = channels.join(", "),
            metric = policy.metric,
            comparison = quote(&policy.comparison),
            threshold = policy.threshold,
            duration = policy.duration_seconds,
        ));
    }

    for check in &config.uptime_checks {
        out.push_str(&format!(
            r#"
resource "google_monitoring_uptime_check_config" "{id}" {{
  display_name = {name}
  timeout      = "10s"
  period       = "60s"

  http_check {{
    path    = {path}
    port    = 443
    use_ssl = true
  }}

  monitored_resource {{
    type = "uptime_url"
    labels = {{
      project_id = var.project_id
      host       = {host}
    }}
  }}
}}
"#,
            id = identifier(&check.name),
            name = quote(&check.name),
            path = quote(&check.path),
            host = quote(&check.host),
        ));
    }

    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AlertPolicySummary<'a> {
    display_name: &'a str,
    metric: &'a str,
    comparison: &'a str,
    threshold: f64,
    duration: String,
    notify: &'a [String],
}

fn alert_policies_yaml(config: &MonitoringConfig) -> CoreResult<String> {
    let summaries: Vec<AlertPolicySummary<'_>> = config
        .alert_policies
        .iter()
        .map(|policy| AlertPolicySummary {
            display_name: &policy.name,
            metric: &policy.metric,
            comparison: &policy.comparison,
            threshold: policy.threshold,
            duration: format!("{}s", policy.duration_seconds),
            notify: &config.notification_emails,
        })
        .collect();

    Ok(serde_yaml::to_string(&summaries)?)
}

/// Log retention, export sinks and data access audit logs.
#[derive(Debug, Default)]
pub struct LoggingGenerator;

impl Generator for LoggingGenerator {
    fn name(&self) -> &str {
        LOGGING
    }

    fn description(&self) -> &str {
        "Cloud Logging retention, export sinks and audit log configuration"
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> CoreResult<Vec<Artifact>> {
        let config = match observability_slice(request, self.name())?
            .logging
            .as_ref()
            .filter(|c| c.enabled)
        {
            Some(config) => config,
            None => return Ok(Vec::new()),
        };

        let mut artifact = Artifact::new(
            request.feature_dir(LOGGING).join("main.tf"),
            logging_tf(request.base, config),
            ArtifactKind::Terraform,
        )
        .with_description(format!("Log retention of {} days", config.retention_days));

        if config.audit_logs {
            artifact = artifact.with_compliance("Data access audit logging");
        }

        Ok(vec![artifact])
    }
}

fn logging_tf(base: &BaseConfig, config: &LoggingConfig) -> String {
    let mut out = header("Cloud Logging", &base.project_id, base.environment.as_str());

    out.push_str(&format!(
        r#"
resource "google_logging_project_bucket_config" "default" {{
  project        = var.project_id
  location       = "global"
  bucket_id      = "_Default"
  retention_days = {retention}
}}
"#,
        retention = config.retention_days,
    ));

    for sink in &config.sinks {
        out.push_str(&format!(
            r#"
resource "google_logging_project_sink" "{id}" {{
  name                   = {name}
  destination            = {destination}
  filter                 = {filter}
  unique_writer_identity = true
}}
"#,
            id = identifier(&sink.name),
            name = quote(&sink.name),
            destination = quote(&sink.destination),
            filter = quote(&sink.filter),
        ));
    }

    if config.audit_logs {
        out.push_str(
            r#"
resource "google_project_iam_audit_config" "all_services" {
  project = var.project_id
  service = "allServices"

  audit_log_config {
    log_type = "ADMIN_READ"
  }
  audit_log_config {
    log_type = "DATA_READ"
  }
  audit_log_config {
    log_type = "DATA_WRITE"
  }
}
"#,
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::builtin_factory;
    use forge_core::config::{AlertPolicyConfig, UptimeCheckConfig};

    fn monitoring() -> MonitoringConfig {
        MonitoringConfig {
            enabled: true,
            notification_emails: vec!["ops@example.com".to_string()],
            alert_policies: vec![AlertPolicyConfig {
                name: "High latency".to_string(),
                metric: "run.googleapis.com/request_latencies".to_string(),
                threshold: 500.0,
                duration_seconds: 300,
                comparison: "COMPARISON_GT".to_string(),
            }],
            uptime_checks: vec![UptimeCheckConfig {
                name: "api".to_string(),
                host: "api.example.com".to_string(),
                path: "/healthz".to_string(),
            }],
        }
    }

    fn service(config: ObservabilityConfig) -> ObservabilityService {
        let base = Arc::new(BaseConfig::new("demo-project", "us-central1"));
        ObservabilityService::new(base, config, &builtin_factory(), OnConstructionFailure::Abort).unwrap()
    }

    #[test]
    fn test_alert_policy_yaml() {
        let yaml = alert_policies_yaml(&monitoring()).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(parsed[0]["displayName"].as_str(), Some("High latency"));
        assert_eq!(parsed[0]["duration"].as_str(), Some("300s"));
        assert_eq!(parsed[0]["notify"][0].as_str(), Some("ops@example.com"));
    }

    #[test]
    fn test_monitoring_channels_wired_into_policies() {
        let content = monitoring_tf(&BaseConfig::new("p", "r"), &monitoring());
        assert!(content.contains("notification_channels = [google_monitoring_notification_channel.email_0.id]"));
        assert!(content.contains("google_monitoring_uptime_check_config"));
    }

    #[test]
    fn test_audit_logs_toggle() {
        let mut config = LoggingConfig {
            enabled: true,
            ..Default::default()
        };
        assert!(logging_tf(&BaseConfig::new("p", "r"), &config).contains("google_project_iam_audit_config"));

        config.audit_logs = false;
        assert!(!logging_tf(&BaseConfig::new("p", "r"), &config).contains("google_project_iam_audit_config"));
    }

    #[tokio::test]
    async fn test_generate_monitoring_then_logging() {
        let svc = service(ObservabilityConfig {
            monitoring: Some(monitoring()),
            logging: Some(LoggingConfig {
                enabled: true,
                ..Default::default()
            }),
        });

        assert!(svc.validate().is_valid());

        let artifacts = svc.generate_files(Path::new("out")).await.unwrap();
        let paths: Vec<_> = artifacts.iter().map(|a| a.path.to_string_lossy().into_owned()).collect();
        assert_eq!(
            paths,
            vec![
                "out/observability/monitoring/main.tf",
                "out/observability/monitoring/alert-policies.yaml",
                "out/observability/logging/main.tf",
            ]
        );
    }
}
