//! Rule-based security posture analysis.

use serde::{Deserialize, Serialize};

use forge_core::{InfrastructureConfig, SecurityLevel};

/// Security severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecuritySeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl SecuritySeverity {
    /// Points subtracted from the score per finding.
    fn penalty(&self) -> i32 {
        match self {
            SecuritySeverity::Critical => 25,
            SecuritySeverity::High => 15,
            SecuritySeverity::Medium => 8,
            SecuritySeverity::Low => 3,
        }
    }
}

/// A weakness found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    pub severity: SecuritySeverity,
    /// Configuration path of the offending resource
    pub resource: String,
    pub description: String,
    pub remediation: String,
}

/// Whether the configuration meets a compliance framework's controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceStatus {
    pub framework: String,
    pub compliant: bool,
    /// Missing controls
    pub gaps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityAnalysis {
    /// 0-100, higher is better
    pub overall_score: u8,
    pub vulnerabilities: Vec<Vulnerability>,
    pub recommendations: Vec<String>,
    pub compliance_status: Vec<ComplianceStatus>,
}

impl SecurityAnalysis {
    pub fn security_level(&self) -> SecurityLevel {
        SecurityLevel::from_score(self.overall_score)
    }
}

/// Scores the security posture of a configuration.
#[cfg_attr(test, mockall::automock)]
pub trait SecurityAnalyzer: Send + Sync {
    fn analyze_security_configuration(&self, config: &InfrastructureConfig) -> SecurityAnalysis;
}

const BASELINE_SCORE: i32 = 60;
const IAM_BONUS: i32 = 10;
const SECRET_MANAGER_BONUS: i32 = 10;
const KMS_BONUS: i32 = 10;
const AUDIT_LOG_BONUS: i32 = 5;
const PRIVATE_NETWORK_BONUS: i32 = 5;
const CLOUD_ARMOR_BONUS: i32 = 5;

/// Controls present in a configuration.
#[derive(Debug, Default)]
struct Controls {
    iam: bool,
    secret_manager: bool,
    kms: bool,
    audit_logs: bool,
    private_network: bool,
    cloud_armor: bool,
    tls: bool,
}

impl Controls {
    fn detect(config: &InfrastructureConfig) -> Self {
        let mut controls = Controls::default();

        if let Some(security) = &config.security {
            controls.iam = security.iam_enabled();
            controls.secret_manager = security.secret_manager_enabled();
            controls.kms = security.kms_enabled();
        }

        if let Some(observability) = &config.observability {
            controls.audit_logs = observability
                .logging
                .as_ref()
                .map_or(false, |l| l.enabled && l.audit_logs);
        }

        if let Some(networking) = &config.networking {
            controls.private_network = networking.vpc.as_ref().map_or(false, |v| {
                v.enabled && v.subnets.iter().all(|s| s.private_google_access)
            });
            if let Some(lb) = networking.load_balancer.as_ref().filter(|lb| lb.enabled) {
                controls.cloud_armor = lb.cloud_armor;
                controls.tls = lb.ssl;
            }
        }

        controls
    }

    fn bonus(&self) -> i32 {
        [
            (self.iam, IAM_BONUS),
            (self.secret_manager, SECRET_MANAGER_BONUS),
            (self.kms, KMS_BONUS),
            (self.audit_logs, AUDIT_LOG_BONUS),
            (self.private_network, PRIVATE_NETWORK_BONUS),
            (self.cloud_armor, CLOUD_ARMOR_BONUS),
        ]
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, points)| points)
        .sum()
    }
}

/// Baseline score adjusted by enabled controls and detected exposures.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedSecurityAnalyzer;

impl RuleBasedSecurityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn find_vulnerabilities(&self, config: &InfrastructureConfig) -> Vec<Vulnerability> {
        let mut findings = Vec::new();
        let production = config.base.environment.is_production();

        if let Some(run) = config.compute.as_ref().and_then(|c| c.cloud_run.as_ref()).filter(|r| r.enabled) {
            for (i, service) in run.services.iter().enumerate() {
                if service.allow_unauthenticated {
                    findings.push(Vulnerability {
                        severity: if production { SecuritySeverity::High } else { SecuritySeverity::Medium },
                        resource: format!("compute.cloudRun.services[{}]", i),
                        description: format!("Cloud Run service '{}' allows unauthenticated invocation", service.name),
                        remediation: "Require IAM authentication or front the service with a load balancer and Cloud Armor".to_string(),
                    });
                }
            }
        }

        if let Some(storage) = config.storage.as_ref().and_then(|s| s.cloud_storage.as_ref()).filter(|s| s.enabled) {
            for (i, bucket) in storage.buckets.iter().enumerate() {
                if bucket.public_access {
                    findings.push(Vulnerability {
                        severity: SecuritySeverity::Critical,
                        resource: format!("storage.cloudStorage.buckets[{}]", i),
                        description: format!("Bucket '{}' grants read access to allUsers", bucket.name),
                        remediation: "Enforce public access prevention and serve content through signed URLs".to_string(),
                    });
                }
                if production && !bucket.versioning {
                    findings.push(Vulnerability {
                        severity: SecuritySeverity::Low,
                        resource: format!("storage.cloudStorage.buckets[{}]", i),
                        description: format!("Bucket '{}' cannot recover overwritten objects", bucket.name),
                        remediation: "Enable object versioning".to_string(),
                    });
                }
            }
        }

        if let Some(vpc) = config.networking.as_ref().and_then(|n| n.vpc.as_ref()).filter(|v| v.enabled) {
            for (i, rule) in vpc.firewall_rules.iter().enumerate() {
                let open = rule.source_ranges.is_empty() || rule.source_ranges.iter().any(|r| r == "0.0.0.0/0");
                if open && rule.ports.iter().any(|p| p == "22" || p == "3389") {
                    findings.push(Vulnerability {
                        severity: SecuritySeverity::High,
                        resource: format!("networking.vpc.firewallRules[{}]", i),
                        description: format!("Firewall rule '{}' exposes remote administration ports to the internet", rule.name),
                        remediation: "Restrict source ranges or use Identity-Aware Proxy for SSH/RDP".to_string(),
                    });
                }
            }
        }

        if let Some(lb) = config.networking.as_ref().and_then(|n| n.load_balancer.as_ref()).filter(|l| l.enabled) {
            if !lb.ssl {
                findings.push(Vulnerability {
                    severity: SecuritySeverity::High,
                    resource: "networking.loadBalancer".to_string(),
                    description: format!("Load balancer '{}' serves plain HTTP", lb.name),
                    remediation: "Enable ssl to provision a managed certificate".to_string(),
                });
            }
        }

        findings
    }

    fn recommendations(&self, controls: &Controls) -> Vec<String> {
        let mut tips = Vec::new();
        if !controls.iam {
            tips.push("Create dedicated service accounts with least-privilege roles".to_string());
        }
        if !controls.secret_manager {
            tips.push("Store credentials in Secret Manager instead of environment variables".to_string());
        }
        if !controls.kms {
            tips.push("Use customer-managed encryption keys for sensitive data".to_string());
        }
        if !controls.audit_logs {
            tips.push("Enable data access audit logs".to_string());
        }
        if !controls.private_network {
            tips.push("Place workloads in a VPC with Private Google Access".to_string());
        }
        tips
    }

    fn compliance(&self, controls: &Controls, findings: &[Vulnerability]) -> Vec<ComplianceStatus> {
        let no_public_data = !findings.iter().any(|f| f.severity == SecuritySeverity::Critical);

        let frameworks: [(&str, Vec<(bool, &str)>); 3] = [
            (
                "CIS GCP Foundations",
                vec![
                    (controls.iam, "Dedicated service accounts"),
                    (controls.audit_logs, "Audit logging"),
                    (controls.private_network, "Private network access"),
                    (no_public_data, "No publicly accessible buckets"),
                ],
            ),
            (
                "SOC 2",
                vec![
                    (controls.audit_logs, "Audit logging"),
                    (controls.secret_manager, "Managed secrets"),
                    (controls.iam, "Access control"),
                ],
            ),
            (
                "GDPR",
                vec![
                    (controls.kms, "Encryption with managed keys"),
                    (no_public_data, "No publicly accessible personal data"),
                    (controls.audit_logs, "Access logging"),
                ],
            ),
        ];

        frameworks
            .iter()
            .map(|(framework, checks)| {
                let gaps: Vec<String> = checks
                    .iter()
                    .filter(|(met, _)| !met)
                    .map(|(_, control)| control.to_string())
                    .collect();
                ComplianceStatus {
                    framework: framework.to_string(),
                    compliant: gaps.is_empty(),
                    gaps,
                }
            })
            .collect()
    }
}

impl SecurityAnalyzer for RuleBasedSecurityAnalyzer {
    fn analyze_security_configuration(&self, config: &InfrastructureConfig) -> SecurityAnalysis {
        let controls = Controls::detect(config);
        let vulnerabilities = self.find_vulnerabilities(config);

        let penalty: i32 = vulnerabilities.iter().map(|v| v.severity.penalty()).sum();
        let score = (BASELINE_SCORE + controls.bonus() - penalty).clamp(0, 100);

        let mut recommendations = self.recommendations(&controls);
        recommendations.extend(vulnerabilities.iter().map(|v| v.remediation.clone()));
        if controls.tls && !controls.cloud_armor {
            recommendations.push("Attach a Cloud Armor policy to the load balancer".to_string());
        }

        SecurityAnalysis {
            overall_score: score as u8,
            compliance_status: self.compliance(&controls, &vulnerabilities),
            vulnerabilities,
            recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::config::{
        BucketConfig, CloudStorageConfig, IamConfig, KmsConfig, LoggingConfig, ObservabilityConfig,
        SecretManagerConfig, SecurityConfig, StorageConfig,
    };
    use forge_core::BaseConfig;

    fn config() -> InfrastructureConfig {
        InfrastructureConfig::new(BaseConfig::new("demo-project", "us-central1"))
    }

    fn hardened() -> InfrastructureConfig {
        config()
            .with_security(SecurityConfig {
                iam: Some(IamConfig {
                    enabled: true,
                    ..Default::default()
                }),
                secret_manager: Some(SecretManagerConfig {
                    enabled: true,
                    secrets: Vec::new(),
                }),
                kms: Some(KmsConfig {
                    enabled: true,
                    ..Default::default()
                }),
            })
            .with_observability(ObservabilityConfig {
                monitoring: None,
                logging: Some(LoggingConfig {
                    enabled: true,
                    ..Default::default()
                }),
            })
    }

    #[test]
    fn test_baseline_score() {
        let analysis = RuleBasedSecurityAnalyzer::new().analyze_security_configuration(&config());
        assert_eq!(analysis.overall_score, 60);
        assert_eq!(analysis.security_level(), SecurityLevel::Basic);
        assert_eq!(analysis.compliance_status.len(), 3);
        assert!(analysis.compliance_status.iter().all(|c| !c.compliant));
    }

    #[test]
    fn test_controls_raise_score() {
        let analysis = RuleBasedSecurityAnalyzer::new().analyze_security_configuration(&hardened());
        assert_eq!(analysis.overall_score, 95);
        assert_eq!(analysis.security_level(), SecurityLevel::Enterprise);

        let soc2 = analysis
            .compliance_status
            .iter()
            .find(|c| c.framework == "SOC 2")
            .unwrap();
        assert!(soc2.compliant);
    }

    #[test]
    fn test_public_bucket_is_critical() {
        let config = hardened().with_storage(
            StorageConfig::default()
                .with_cloud_storage(CloudStorageConfig::new().with_bucket(BucketConfig::new("site", "US").public())),
        );

        let analysis = RuleBasedSecurityAnalyzer::new().analyze_security_configuration(&config);
        assert_eq!(analysis.vulnerabilities.len(), 1);
        assert_eq!(analysis.vulnerabilities[0].severity, SecuritySeverity::Critical);
        assert_eq!(analysis.overall_score, 70);

        let gdpr = analysis.compliance_status.iter().find(|c| c.framework == "GDPR").unwrap();
        assert_eq!(gdpr.gaps, vec!["No publicly accessible personal data"]);
    }

    #[test]
    fn test_score_clamped_at_zero() {
        let mut storage = CloudStorageConfig::new();
        for i in 0..5 {
            storage = storage.with_bucket(BucketConfig::new(format!("b{}", i), "US").public());
        }
        let config = config().with_storage(StorageConfig::default().with_cloud_storage(storage));

        let analysis = RuleBasedSecurityAnalyzer::new().analyze_security_configuration(&config);
        assert_eq!(analysis.overall_score, 0);
    }
}
