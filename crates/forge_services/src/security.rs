//! Security domain: IAM, Secret Manager and Cloud KMS.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use forge_core::config::{IamConfig, KmsConfig, SecretManagerConfig, SecurityConfig};
use forge_core::{
    Artifact, ArtifactKind, BaseConfig, CoreError, CoreResult, Domain, DomainConfigRef,
    DomainService, GenerationRequest, Generator, GeneratorFactory, OnConstructionFailure,
    SecurityLevel, ValidationOutcome,
};

use crate::hcl::{header, identifier, map_block, quote};
use crate::support::{resolve_generators, run_generators};

pub const IAM: &str = "iam";
pub const SECRET_MANAGER: &str = "secret-manager";
pub const KMS: &str = "kms";

const SECONDS_PER_DAY: u64 = 86_400;

/// Service for the security slice.
pub struct SecurityService {
    base: Arc<BaseConfig>,
    config: SecurityConfig,
    generators: Vec<Box<dyn Generator>>,
}

impl SecurityService {
    pub const NAME: &'static str = "security";

    pub fn new(
        base: Arc<BaseConfig>,
        config: SecurityConfig,
        factory: &GeneratorFactory,
        policy: OnConstructionFailure,
    ) -> CoreResult<Self> {
        let generators = resolve_generators(
            factory,
            Domain::Security,
            &[
                (IAM, config.iam_enabled()),
                (SECRET_MANAGER, config.secret_manager_enabled()),
                (KMS, config.kms_enabled()),
            ],
            policy,
        )?;

        Ok(Self {
            base,
            config,
            generators,
        })
    }

    pub fn config(&self) -> &SecurityConfig {
        &self.config
    }
}

#[async_trait]
impl DomainService for SecurityService {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn domain(&self) -> Domain {
        Domain::Security
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

    /// Security configuration is not validated yet; every slice is accepted.
    ///
    /// This replaces the whole two-phase check, so the base `projectId` and
    /// `region` checks are skipped as well.
    fn validate(&self) -> ValidationOutcome {
        ValidationOutcome::valid()
    }

    async fn generate_files(&self, output_dir: &Path) -> CoreResult<Vec<Artifact>> {
        info!("Generating security files ({} generators)", self.generators.len());
        let request = GenerationRequest::new(
            &self.base,
            output_dir,
            DomainConfigRef::Security(&self.config),
        );
        run_generators(&self.generators, &request)
    }
}

fn security_slice<'a>(request: &GenerationRequest<'a>, generator: &str) -> CoreResult<&'a SecurityConfig> {
    request
        .config
        .security()
        .ok_or_else(|| CoreError::config_mismatch(generator, Domain::Security))
}

/// Service accounts, their project role bindings and custom roles.
#[derive(Debug, Default)]
pub struct IamGenerator;

impl Generator for IamGenerator {
    fn name(&self) -> &str {
        IAM
    }

    fn description(&self) -> &str {
        "Service accounts, role bindings and custom IAM roles"
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> CoreResult<Vec<Artifact>> {
        let config = match security_slice(request, self.name())?.iam.as_ref().filter(|c| c.enabled) {
            Some(config) => config,
            None => return Ok(Vec::new()),
        };

        Ok(vec![Artifact::new(
            request.feature_dir(IAM).join("main.tf"),
            iam_tf(request.base, config),
            ArtifactKind::Terraform,
        )
        .with_description("IAM service accounts and bindings")
        .with_security_level(SecurityLevel::Enhanced)
        .with_compliance("Least-privilege service accounts")])
    }
}

fn iam_tf(base: &BaseConfig, config: &IamConfig) -> String {
    let mut out = header("IAM", &base.project_id, base.environment.as_str());

    for account in &config.service_accounts {
        let id = identifier(&account.name);
        out.push_str(&format!(
            r#"
resource "google_service_account" "{id}" {{
  account_id   = {name}
  display_name = {display}
}}
"#,
            id = id,
            name = quote(&account.name),
            display = quote(account.display_name.as_deref().unwrap_or(&account.name)),
        ));

        for role in &account.roles {
            out.push_str(&format!(
                r#"
resource "google_project_iam_member" "{id}_{role_id}" {{
  project = var.project_id
  role    = {role}
  member  = "serviceAccount:${{google_service_account.{id}.email}}"
}}
"#,
                id = id,
                role_id = identifier(role.trim_start_matches("roles/")),
                role = quote(role),
            ));
        }
    }

    for role in &config.custom_roles {
        out.push_str(&format!(
            r#"
resource "google_project_iam_custom_role" "{id}" {{
  role_id     = {role_id}
  title       = {title}
  permissions = {permissions}
}}
"#,
            id = identifier(&role.id),
            role_id = quote(&role.id),
            title = quote(&role.title),
            permissions = crate::hcl::string_list(&role.permissions),
        ));
    }

    out
}

/// Secret containers with automatic replication. Secret values are never rendered.
#[derive(Debug, Default)]
pub struct SecretManagerGenerator;

impl Generator for SecretManagerGenerator {
    fn name(&self) -> &str {
        SECRET_MANAGER
    }

    fn description(&self) -> &str {
        "Secret Manager secrets with automatic replication"
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> CoreResult<Vec<Artifact>> {
        let config = match security_slice(request, self.name())?
            .secret_manager
            .as_ref()
            .filter(|c| c.enabled)
        {
            Some(config) => config,
            None => return Ok(Vec::new()),
        };

        Ok(vec![Artifact::new(
            request.feature_dir(SECRET_MANAGER).join("main.tf"),
            secrets_tf(request.base, config),
            ArtifactKind::Terraform,
        )
        .with_description(format!("{} secret(s)", config.secrets.len()))
        .with_instruction("Add secret versions with: gcloud secrets versions add <name> --data-file=-")
        .with_security_level(SecurityLevel::Enhanced)
        .with_compliance("Centralized secret storage")])
    }
}

fn secrets_tf(base: &BaseConfig, config: &SecretManagerConfig) -> String {
    let mut out = header("Secret Manager", &base.project_id, base.environment.as_str());

    for secret in &config.secrets {
        let mut labels = base.resource_labels();
        if let Some(days) = secret.rotation_days {
            labels.insert("rotation-days".to_string(), days.to_string());
        }

        out.push_str(&format!(
            r#"
resource "google_secret_manager_secret" "{id}" {{
  secret_id = {name}
  labels    = {labels}

  replication {{
    auto {{}}
  }}
}}
"#,
            id = identifier(&secret.name),
            name = quote(&secret.name),
            labels = map_block(&labels, 2),
        ));
    }

    out
}

/// Key ring and symmetric keys with scheduled rotation.
#[derive(Debug, Default)]
pub struct KmsGenerator;

impl Generator for KmsGenerator {
    fn name(&self) -> &str {
        KMS
    }

    fn description(&self) -> &str {
        "Cloud KMS key ring and rotating encryption keys"
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> CoreResult<Vec<Artifact>> {
        let config = match security_slice(request, self.name())?.kms.as_ref().filter(|c| c.enabled) {
            Some(config) => config,
            None => return Ok(Vec::new()),
        };

        Ok(vec![Artifact::new(
            request.feature_dir(KMS).join("main.tf"),
            kms_tf(request.base, config),
            ArtifactKind::Terraform,
        )
        .with_description(format!("Key ring '{}'", config.key_ring))
        .with_security_level(SecurityLevel::Enterprise)
        .with_compliance("Customer-managed encryption keys")
        .with_compliance("Automatic key rotation")])
    }
}

fn kms_tf(base: &BaseConfig, config: &KmsConfig) -> String {
    let ring_id = identifier(&config.key_ring);
    let mut out = header("Cloud KMS", &base.project_id, base.environment.as_str());

    out.push_str(&format!(
        r#"
resource "google_kms_key_ring" "{id}" {{
  name     = {name}
  location = {region}
}}
"#,
        id = ring_id,
        name = quote(&config.key_ring),
        region = quote(&base.region),
    ));

    for key in &config.keys {
        out.push_str(&format!(
            r#"
resource "google_kms_crypto_key" "{id}" {{
  name            = {name}
  key_ring        = google_kms_key_ring.{ring}.id
  rotation_period = "{period}s"

  lifecycle {{
    prevent_destroy = true
  }}
}}
"#,
            id = identifier(&key.name),
            name = quote(&key.name),
            ring = ring_id,
            period = u64::from(key.rotation_period_days) * SECONDS_PER_DAY,
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::builtin_factory;
    use forge_core::config::{KmsKeyConfig, SecretConfig, ServiceAccountConfig};

    fn service(config: SecurityConfig) -> SecurityService {
        let base = Arc::new(BaseConfig::new("demo-project", "us-central1"));
        SecurityService::new(base, config, &builtin_factory(), OnConstructionFailure::Abort).unwrap()
    }

    fn full_config() -> SecurityConfig {
        SecurityConfig {
            iam: Some(IamConfig {
                enabled: true,
                service_accounts: vec![ServiceAccountConfig {
                    name: "api-runner".to_string(),
                    display_name: None,
                    roles: vec!["roles/run.invoker".to_string()],
                }],
                custom_roles: Vec::new(),
            }),
            secret_manager: Some(SecretManagerConfig {
                enabled: true,
                secrets: vec![SecretConfig {
                    name: "db-password".to_string(),
                    rotation_days: Some(30),
                }],
            }),
            kms: Some(KmsConfig {
                enabled: true,
                keys: vec![KmsKeyConfig {
                    name: "data".to_string(),
                    rotation_period_days: 90,
                }],
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_validation_skips_base_checks() {
        let base = BaseConfig::default();
        assert!(base.project_id.is_empty() && base.region.is_empty());
        let service = SecurityService::new(
            Arc::new(base),
            full_config(),
            &builtin_factory(),
            OnConstructionFailure::Abort,
        )
        .unwrap();

        let outcome = service.validate();
        assert!(outcome.is_valid());
        assert!(outcome.errors().is_empty());
        assert!(outcome.warnings().is_empty());
    }

    #[test]
    fn test_enablement_is_or_of_sub_features() {
        assert!(!service(SecurityConfig::default()).is_enabled());

        let kms_only = SecurityConfig {
            kms: Some(KmsConfig {
                enabled: true,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(service(kms_only).is_enabled());
    }

    #[tokio::test]
    async fn test_generate_in_declaration_order() {
        let artifacts = service(full_config())
            .generate_files(Path::new("out"))
            .await
            .unwrap();

        let dirs: Vec<_> = artifacts
            .iter()
            .filter_map(|a| a.path.parent().and_then(|p| p.file_name()).and_then(|n| n.to_str()))
            .collect();
        assert_eq!(dirs, vec!["iam", "secret-manager", "kms"]);
    }

    #[test]
    fn test_kms_rotation_in_seconds() {
        let config = full_config();
        let content = kms_tf(&BaseConfig::new("p", "us-central1"), config.kms.as_ref().unwrap());
        assert!(content.contains("rotation_period = \"7776000s\""));
        assert!(content.contains("prevent_destroy = true"));
    }

    #[test]
    fn test_iam_binding_per_role() {
        let config = full_config();
        let content = iam_tf(&BaseConfig::new("p", "r"), config.iam.as_ref().unwrap());
        assert!(content.contains("resource \"google_project_iam_member\" \"api_runner_run_invoker\""));
    }
}
