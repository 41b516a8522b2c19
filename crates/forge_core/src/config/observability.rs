//! Observability slice: Cloud Monitoring and Cloud Logging.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservabilityConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring: Option<MonitoringConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

impl ObservabilityConfig {
    pub fn is_enabled(&self) -> bool {
        self.monitoring_enabled() || self.logging_enabled()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map_or(false, |c| c.enabled)
    }

    pub fn logging_enabled(&self) -> bool {
        self.logging.as_ref().map_or(false, |c| c.enabled)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringConfig {
    pub enabled: bool,
    #[serde(default)]
    pub notification_emails: Vec<String>,
    #[serde(default)]
    pub alert_policies: Vec<AlertPolicyConfig>,
    #[serde(default)]
    pub uptime_checks: Vec<UptimeCheckConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPolicyConfig {
    pub name: String,
    /// Metric type, e.g. `run.googleapis.com/request_latencies`
    pub metric: String,
    pub threshold: f64,
    #[serde(default = "default_duration")]
    pub duration_seconds: u32,
    #[serde(default = "default_comparison")]
    pub comparison: String,
}

fn default_duration() -> u32 {
    300
}

fn default_comparison() -> String {
    "COMPARISON_GT".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UptimeCheckConfig {
    pub name: String,
    pub host: String,
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_path() -> String {
    "/".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    pub enabled: bool,
    #[serde(default = "default_retention")]
    pub retention_days: u32,
    #[serde(default)]
    pub sinks: Vec<LogSinkConfig>,
    #[serde(default = "default_audit_logs")]
    pub audit_logs: bool,
}

fn default_retention() -> u32 {
    30
}

fn default_audit_logs() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            retention_days: default_retention(),
            sinks: Vec::new(),
            audit_logs: default_audit_logs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSinkConfig {
    pub name: String,
    /// Sink destination, e.g. `storage.googleapis.com/my-bucket`
    pub destination: String,
    #[serde(default)]
    pub filter: String,
}
