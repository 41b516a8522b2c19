//! Networking slice: VPC and HTTPS load balancing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc: Option<VpcConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancer: Option<LoadBalancerConfig>,
}

impl NetworkingConfig {
    pub fn is_enabled(&self) -> bool {
        self.vpc_enabled() || self.load_balancer_enabled()
    }

    pub fn vpc_enabled(&self) -> bool {
        self.vpc.as_ref().map_or(false, |c| c.enabled)
    }

    pub fn load_balancer_enabled(&self) -> bool {
        self.load_balancer.as_ref().map_or(false, |c| c.enabled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VpcConfig {
    pub enabled: bool,
    #[serde(default = "default_vpc_name")]
    pub name: String,
    #[serde(default)]
    pub subnets: Vec<SubnetConfig>,
    #[serde(default)]
    pub enable_nat: bool,
    #[serde(default)]
    pub firewall_rules: Vec<FirewallRule>,
}

fn default_vpc_name() -> String {
    "main-vpc".to_string()
}

impl Default for VpcConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            name: default_vpc_name(),
            subnets: Vec::new(),
            enable_nat: false,
            firewall_rules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetConfig {
    pub name: String,
    pub cidr: String,
    /// Falls back to the base region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default = "default_true")]
    pub private_google_access: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirewallRule {
    pub name: String,
    #[serde(default = "default_direction")]
    pub direction: String,
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default)]
    pub source_ranges: Vec<String>,
}

fn default_direction() -> String {
    "INGRESS".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerConfig {
    pub enabled: bool,
    #[serde(default = "default_lb_name")]
    pub name: String,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default = "default_true")]
    pub ssl: bool,
    #[serde(default)]
    pub enable_cdn: bool,
    #[serde(default)]
    pub cloud_armor: bool,
}

fn default_lb_name() -> String {
    "app-lb".to_string()
}

impl Default for LoadBalancerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            name: default_lb_name(),
            domains: Vec::new(),
            ssl: true,
            enable_cdn: false,
            cloud_armor: false,
        }
    }
}
