//! Cloud Storage bucket templates.

use forge_core::config::BucketConfig;
use forge_core::{Artifact, ArtifactKind, BaseConfig, CoreError, CoreResult, Domain, GenerationRequest, Generator};

use super::CLOUD_STORAGE;
use crate::hcl::{header, identifier, map_block, quote};

#[derive(Debug, Default)]
pub struct CloudStorageGenerator;

impl Generator for CloudStorageGenerator {
    fn name(&self) -> &str {
        CLOUD_STORAGE
    }

    fn description(&self) -> &str {
        "Cloud Storage buckets with versioning, lifecycle rules and access control"
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> CoreResult<Vec<Artifact>> {
        let storage = request
            .config
            .storage()
            .ok_or_else(|| CoreError::config_mismatch(self.name(), Domain::Storage))?;

        let config = match storage.cloud_storage.as_ref().filter(|c| c.enabled) {
            Some(config) => config,
            None => return Ok(Vec::new()),
        };

        let mut content = header("Cloud Storage buckets", &request.base.project_id, request.base.environment.as_str());
        for bucket in &config.buckets {
            content.push_str(&bucket_resource(request.base, bucket));
        }

        Ok(vec![Artifact::new(
            request.feature_dir(CLOUD_STORAGE).join("main.tf"),
            content,
            ArtifactKind::Terraform,
        )
        .with_description(format!("{} Cloud Storage bucket(s)", config.buckets.len()))
        .with_dependency("terraform >= 1.6")])
    }
}

fn bucket_resource(base: &BaseConfig, bucket: &BucketConfig) -> String {
    let id = identifier(&bucket.name);

    let lifecycle = match bucket.lifecycle_delete_after_days {
        Some(days) => format!(
            r#"
  lifecycle_rule {{
    condition {{
      age = {days}
    }}
    action {{
      type = "Delete"
    }}
  }}
"#,
            days = days
        ),
        None => String::new(),
    };

    let mut out = format!(
        r#"
resource "google_storage_bucket" "{id}" {{
  name                        = {name}
  location                    = {location}
  storage_class               = {class}
  uniform_bucket_level_access = true
  public_access_prevention    = {prevention}
  labels                      = {labels}

  versioning {{
    enabled = {versioning}
  }}
{lifecycle}}}
"#,
        id = id,
        name = quote(&bucket.name),
        location = quote(&bucket.location),
        class = quote(&bucket.storage_class),
        prevention = quote(if bucket.public_access { "inherited" } else { "enforced" }),
        labels = map_block(&base.resource_labels(), 2),
        versioning = bucket.versioning,
        lifecycle = lifecycle,
    );

    if bucket.public_access {
        out.push_str(&format!(
            r#"
resource "google_storage_bucket_iam_member" "{id}_public_read" {{
  bucket = google_storage_bucket.{id}.name
  role   = "roles/storage.objectViewer"
  member = "allUsers"
}}
"#,
            id = id
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::config::{CloudStorageConfig, StorageConfig};
    use forge_core::DomainConfigRef;
    use std::path::Path;

    fn render(config: &StorageConfig) -> Vec<Artifact> {
        let base = BaseConfig::new("demo-project", "us-central1");
        let request = GenerationRequest::new(&base, Path::new("out"), DomainConfigRef::Storage(config));
        CloudStorageGenerator.generate(&request).unwrap()
    }

    #[test]
    fn test_bucket_resource() {
        let mut bucket = BucketConfig::new("demo-assets", "US").with_versioning();
        bucket.lifecycle_delete_after_days = Some(30);
        let config = StorageConfig::default().with_cloud_storage(CloudStorageConfig::new().with_bucket(bucket));

        let artifacts = render(&config);
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].path, Path::new("out/storage/cloud-storage/main.tf"));

        let content = &artifacts[0].content;
        assert!(content.contains("resource \"google_storage_bucket\" \"demo_assets\""));
        assert!(content.contains("enabled = true"));
        assert!(content.contains("age = 30"));
        assert!(content.contains("\"enforced\""));
    }

    #[test]
    fn test_public_bucket_binding() {
        let config = StorageConfig::default().with_cloud_storage(
            CloudStorageConfig::new().with_bucket(BucketConfig::new("site", "EU").public()),
        );

        assert!(render(&config)[0].content.contains("google_storage_bucket_iam_member"));
    }
}
