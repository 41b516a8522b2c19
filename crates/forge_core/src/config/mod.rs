//! Infrastructure configuration model.
//!
//! An [`InfrastructureConfig`] is the full input of a generation run: the
//! shared [`BaseConfig`] fields at the top level plus one optional slice per
//! capability [`Domain`]. The slices are plain data; only the owning domain
//! service interprets them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod compute;
pub mod networking;
pub mod observability;
pub mod security;
pub mod storage;

pub use compute::{CloudFunctionsConfig, CloudRunConfig, CloudRunService, ComputeConfig, Trigger};
pub use networking::{FirewallRule, LoadBalancerConfig, NetworkingConfig, SubnetConfig, VpcConfig};
pub use observability::{
    AlertPolicyConfig, LogSinkConfig, LoggingConfig, MonitoringConfig, ObservabilityConfig,
    UptimeCheckConfig,
};
pub use security::{
    CustomRoleConfig, IamConfig, KmsConfig, KmsKeyConfig, SecretConfig, SecretManagerConfig,
    SecurityConfig, ServiceAccountConfig,
};
pub use storage::{
    BucketConfig, CloudStorageConfig, CollectionConfig, FieldConfig, FirestoreConfig,
    StorageConfig,
};

/// Infrastructure capability areas, in construction order.
///
/// The derived ordering is the merge order of generated artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Compute,
    Storage,
    Security,
    Networking,
    Observability,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Compute => "compute",
            Domain::Storage => "storage",
            Domain::Security => "security",
            Domain::Networking => "networking",
            Domain::Observability => "observability",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "compute" => Some(Domain::Compute),
            "storage" => Some(Domain::Storage),
            "security" => Some(Domain::Security),
            "networking" => Some(Domain::Networking),
            "observability" => Some(Domain::Observability),
            _ => None,
        }
    }

    /// All domains in construction order.
    pub fn all() -> Vec<Domain> {
        vec![
            Domain::Compute,
            Domain::Storage,
            Domain::Security,
            Domain::Networking,
            Domain::Observability,
        ]
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    #[serde(alias = "dev")]
    Development,
    Staging,
    #[serde(alias = "prod")]
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// Short form used in resource names and file names.
    pub fn short_name(&self) -> &'static str {
        match self {
            Environment::Development => "dev",
            Environment::Staging => "staging",
            Environment::Production => "prod",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "staging" => Some(Environment::Staging),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Context shared by every domain service of a run.
///
/// Never mutated once a run has started; services hold it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseConfig {
    /// GCP project identifier
    #[serde(default)]
    pub project_id: String,
    /// Default region for regional resources
    #[serde(default)]
    pub region: String,
    /// Optional default zone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default)]
    pub environment: Environment,
    /// Labels applied to every labelable resource
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_account_id: Option<String>,
}

impl BaseConfig {
    pub fn new(project_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            region: region.into(),
            ..Default::default()
        }
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_billing_account(mut self, account: impl Into<String>) -> Self {
        self.billing_account_id = Some(account.into());
        self
    }

    /// Labels merged with the standard `environment` and `managed-by` labels.
    pub fn resource_labels(&self) -> BTreeMap<String, String> {
        let mut labels = self.labels.clone();
        labels
            .entry("environment".to_string())
            .or_insert_with(|| self.environment.short_name().to_string());
        labels
            .entry("managed-by".to_string())
            .or_insert_with(|| "stackforge".to_string());
        labels
    }
}

/// Full input of a generation run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureConfig {
    #[serde(flatten)]
    pub base: BaseConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute: Option<ComputeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networking: Option<NetworkingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observability: Option<ObservabilityConfig>,
}

impl InfrastructureConfig {
    pub fn new(base: BaseConfig) -> Self {
        Self {
            base,
            ..Default::default()
        }
    }

    pub fn with_compute(mut self, compute: ComputeConfig) -> Self {
        self.compute = Some(compute);
        self
    }

    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = Some(security);
        self
    }

    pub fn with_networking(mut self, networking: NetworkingConfig) -> Self {
        self.networking = Some(networking);
        self
    }

    pub fn with_observability(mut self, observability: ObservabilityConfig) -> Self {
        self.observability = Some(observability);
        self
    }

    /// Borrow the slice supplied for a domain, if any.
    pub fn domain(&self, domain: Domain) -> Option<DomainConfigRef<'_>> {
        match domain {
            Domain::Compute => self.compute.as_ref().map(DomainConfigRef::Compute),
            Domain::Storage => self.storage.as_ref().map(DomainConfigRef::Storage),
            Domain::Security => self.security.as_ref().map(DomainConfigRef::Security),
            Domain::Networking => self.networking.as_ref().map(DomainConfigRef::Networking),
            Domain::Observability => self
                .observability
                .as_ref()
                .map(DomainConfigRef::Observability),
        }
    }

    /// Domains whose slice is supplied and enabled, in construction order.
    pub fn enabled_domains(&self) -> Vec<Domain> {
        Domain::all()
            .into_iter()
            .filter(|d| self.domain(*d).map(|c| c.is_enabled()).unwrap_or(false))
            .collect()
    }
}

/// A borrowed, domain-tagged configuration slice.
///
/// This is the only shape in which sub-generators receive configuration.
#[derive(Debug, Clone, Copy)]
pub enum DomainConfigRef<'a> {
    Compute(&'a ComputeConfig),
    Storage(&'a StorageConfig),
    Security(&'a SecurityConfig),
    Networking(&'a NetworkingConfig),
    Observability(&'a ObservabilityConfig),
}

impl<'a> DomainConfigRef<'a> {
    pub fn compute(&self) -> Option<&'a ComputeConfig> {
        match *self {
            DomainConfigRef::Compute(c) => Some(c),
            _ => None,
        }
    }

    pub fn storage(&self) -> Option<&'a StorageConfig> {
        match *self {
            DomainConfigRef::Storage(c) => Some(c),
            _ => None,
        }
    }

    pub fn security(&self) -> Option<&'a SecurityConfig> {
        match *self {
            DomainConfigRef::Security(c) => Some(c),
            _ => None,
        }
    }

    pub fn networking(&self) -> Option<&'a NetworkingConfig> {
        match *self {
            DomainConfigRef::Networking(c) => Some(c),
            _ => None,
        }
    }

    pub fn observability(&self) -> Option<&'a ObservabilityConfig> {
        match *self {
            DomainConfigRef::Observability(c) => Some(c),
            _ => None,
        }
    }

    pub fn domain(&self) -> Domain {
        match self {
            DomainConfigRef::Compute(_) => Domain::Compute,
            DomainConfigRef::Storage(_) => Domain::Storage,
            DomainConfigRef::Security(_) => Domain::Security,
            DomainConfigRef::Networking(_) => Domain::Networking,
            DomainConfigRef::Observability(_) => Domain::Observability,
        }
    }

    /// OR across the slice's sub-feature flags.
    pub fn is_enabled(&self) -> bool {
        match self {
            DomainConfigRef::Compute(c) => c.is_enabled(),
            DomainConfigRef::Storage(c) => c.is_enabled(),
            DomainConfigRef::Security(c) => c.is_enabled(),
            DomainConfigRef::Networking(c) => c.is_enabled(),
            DomainConfigRef::Observability(c) => c.is_enabled(),
        }
    }
}
