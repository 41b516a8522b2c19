//! Compute slice: Cloud Functions and Cloud Run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_functions: Option<CloudFunctionsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_run: Option<CloudRunConfig>,
}

impl ComputeConfig {
    pub fn is_enabled(&self) -> bool {
        self.cloud_functions.as_ref().map_or(false, |c| c.enabled)
            || self.cloud_run.as_ref().map_or(false, |c| c.enabled)
    }

    pub fn with_cloud_functions(mut self, config: CloudFunctionsConfig) -> Self {
        self.cloud_functions = Some(config);
        self
    }

    pub fn with_cloud_run(mut self, config: CloudRunConfig) -> Self {
        self.cloud_run = Some(config);
        self
    }
}

/// A single Cloud Function (2nd gen) deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudFunctionsConfig {
    pub enabled: bool,
    #[serde(default = "default_function_name")]
    pub name: String,
    #[serde(default = "default_runtime")]
    pub runtime: String,
    /// Memory size, e.g. `256MB` or `1GB`
    #[serde(default = "default_function_memory")]
    pub memory: String,
    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u32,
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
    #[serde(default = "default_source_dir")]
    pub source_dir: String,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment_variables: BTreeMap<String, String>,
}

fn default_function_name() -> String {
    "function".to_string()
}

fn default_runtime() -> String {
    "nodejs20".to_string()
}

fn default_function_memory() -> String {
    "256MB".to_string()
}

fn default_timeout() -> u32 {
    60
}

fn default_entry_point() -> String {
    "handler".to_string()
}

fn default_source_dir() -> String {
    "src/functions".to_string()
}

impl Default for CloudFunctionsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: default_function_name(),
            runtime: default_runtime(),
            memory: default_function_memory(),
            timeout: default_timeout(),
            entry_point: default_entry_point(),
            source_dir: default_source_dir(),
            triggers: Vec::new(),
            environment_variables: BTreeMap::new(),
        }
    }
}

impl CloudFunctionsConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }

    pub fn with_memory(mut self, memory: impl Into<String>) -> Self {
        self.memory = memory.into();
        self
    }

    pub fn with_timeout(mut self, timeout: u32) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment_variables.insert(key.into(), value.into());
        self
    }
}

/// Event source that invokes a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trigger {
    Http,
    Pubsub {
        topic: String,
    },
    Storage {
        bucket: String,
        #[serde(default = "default_storage_event")]
        event: String,
    },
    Firestore {
        document: String,
        #[serde(default = "default_firestore_event")]
        event: String,
    },
    Schedule {
        schedule: String,
        #[serde(default, rename = "timeZone", skip_serializing_if = "Option::is_none")]
        time_zone: Option<String>,
    },
}

fn default_storage_event() -> String {
    "google.cloud.storage.object.v1.finalized".to_string()
}

fn default_firestore_event() -> String {
    "google.cloud.firestore.document.v1.written".to_string()
}

impl Trigger {
    pub fn kind(&self) -> &'static str {
        match self {
            Trigger::Http => "http",
            Trigger::Pubsub { .. } => "pubsub",
            Trigger::Storage { .. } => "storage",
            Trigger::Firestore { .. } => "firestore",
            Trigger::Schedule { .. } => "schedule",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudRunConfig {
    pub enabled: bool,
    #[serde(default)]
    pub services: Vec<CloudRunService>,
}

impl CloudRunConfig {
    pub fn new() -> Self {
        Self {
            enabled: true,
            services: Vec::new(),
        }
    }

    pub fn with_service(mut self, service: CloudRunService) -> Self {
        self.services.push(service);
        self
    }
}

/// One containerized Cloud Run service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudRunService {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cpu")]
    pub cpu: String,
    #[serde(default = "default_run_memory")]
    pub memory: String,
    #[serde(default)]
    pub min_instances: u32,
    #[serde(default = "default_max_instances")]
    pub max_instances: u32,
    #[serde(default)]
    pub allow_unauthenticated: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

fn default_port() -> u16 {
    8080
}

fn default_cpu() -> String {
    "1".to_string()
}

fn default_run_memory() -> String {
    "512Mi".to_string()
}

fn default_max_instances() -> u32 {
    10
}

impl CloudRunService {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            port: default_port(),
            cpu: default_cpu(),
            memory: default_run_memory(),
            min_instances: 0,
            max_instances: default_max_instances(),
            allow_unauthenticated: false,
            env: BTreeMap::new(),
        }
    }

    pub fn with_instances(mut self, min: u32, max: u32) -> Self {
        self.min_instances = min;
        self.max_instances = max;
        self
    }

    pub fn public(mut self) -> Self {
        self.allow_unauthenticated = true;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_enabled_is_or_of_sub_features() {
        let mut config = ComputeConfig::default();
        assert!(!config.is_enabled());

        config.cloud_run = Some(CloudRunConfig::default());
        assert!(!config.is_enabled());

        config.cloud_functions = Some(CloudFunctionsConfig::default());
        assert!(config.is_enabled());
    }

    #[test]
    fn test_trigger_deserialization() {
        let yaml = r#"
- type: http
- type: pubsub
  topic: orders
- type: schedule
  schedule: "0 * * * *"
  timeZone: Europe/Brussels
"#;
        let triggers: Vec<Trigger> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(triggers.len(), 3);
        assert_eq!(triggers[1], Trigger::Pubsub { topic: "orders".to_string() });
        assert_eq!(triggers[2].kind(), "schedule");
    }

    #[test]
    fn test_cloud_run_service_defaults() {
        let json = r#"{"name": "api", "image": "gcr.io/p/api:1"}"#;
        let service: CloudRunService = serde_json::from_str(json).unwrap();
        assert_eq!(service.port, 8080);
        assert_eq!(service.min_instances, 0);
        assert_eq!(service.max_instances, 10);
        assert!(!service.allow_unauthenticated);
    }
}
