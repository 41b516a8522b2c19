//! Security slice: IAM, Secret Manager and Cloud KMS.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam: Option<IamConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_manager: Option<SecretManagerConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms: Option<KmsConfig>,
}

impl SecurityConfig {
    pub fn is_enabled(&self) -> bool {
        self.iam.as_ref().map_or(false, |c| c.enabled)
            || self.secret_manager.as_ref().map_or(false, |c| c.enabled)
            || self.kms.as_ref().map_or(false, |c| c.enabled)
    }

    pub fn iam_enabled(&self) -> bool {
        self.iam.as_ref().map_or(false, |c| c.enabled)
    }

    pub fn secret_manager_enabled(&self) -> bool {
        self.secret_manager.as_ref().map_or(false, |c| c.enabled)
    }

    pub fn kms_enabled(&self) -> bool {
        self.kms.as_ref().map_or(false, |c| c.enabled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IamConfig {
    pub enabled: bool,
    #[serde(default)]
    pub service_accounts: Vec<ServiceAccountConfig>,
    #[serde(default)]
    pub custom_roles: Vec<CustomRoleConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRoleConfig {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretManagerConfig {
    pub enabled: bool,
    #[serde(default)]
    pub secrets: Vec<SecretConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KmsConfig {
    pub enabled: bool,
    #[serde(default = "default_key_ring")]
    pub key_ring: String,
    #[serde(default)]
    pub keys: Vec<KmsKeyConfig>,
}

fn default_key_ring() -> String {
    "app-keyring".to_string()
}

impl Default for KmsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            key_ring: default_key_ring(),
            keys: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KmsKeyConfig {
    pub name: String,
    #[serde(default = "default_rotation_days")]
    pub rotation_period_days: u32,
}

fn default_rotation_days() -> u32 {
    90
}
