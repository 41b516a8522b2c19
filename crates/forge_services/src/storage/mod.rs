//! Storage domain: Cloud Storage buckets and Firestore.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use tracing::info;

use forge_core::config::{CloudStorageConfig, FirestoreConfig, StorageConfig};
use forge_core::{
    validate_enum, validate_required, Artifact, BaseConfig, CoreResult, Domain, DomainConfigRef,
    DomainService, GenerationRequest, Generator, GeneratorFactory, OnConstructionFailure,
    ValidationError, ValidationOutcome, ValidationWarning,
};

use crate::support::{resolve_generators, run_generators};

pub mod buckets;
pub mod firestore;

pub use buckets::CloudStorageGenerator;
pub use firestore::FirestoreGenerator;

pub const CLOUD_STORAGE: &str = "cloud-storage";
pub const FIRESTORE: &str = "firestore";

pub const STORAGE_CLASSES: &[&str] = &["STANDARD", "NEARLINE", "COLDLINE", "ARCHIVE"];

/// GCS bucket naming rules: 3-63 chars, lowercase letters, digits, dashes,
/// underscores and dots, starting and ending with a letter or digit.
const BUCKET_NAME_PATTERN: &str = r"^[a-z0-9][a-z0-9._-]{1,61}[a-z0-9]$";

/// Service for the storage slice.
pub struct StorageService {
    base: Arc<BaseConfig>,
    config: StorageConfig,
    generators: Vec<Box<dyn Generator>>,
}

impl StorageService {
    pub const NAME: &'static str = "storage";

    pub fn new(
        base: Arc<BaseConfig>,
        config: StorageConfig,
        factory: &GeneratorFactory,
        policy: OnConstructionFailure,
    ) -> CoreResult<Self> {
        let generators = resolve_generators(
            factory,
            Domain::Storage,
            &[
                (
                    CLOUD_STORAGE,
                    config.cloud_storage.as_ref().map_or(false, |c| c.enabled),
                ),
                (FIRESTORE, config.firestore.as_ref().map_or(false, |c| c.enabled)),
            ],
            policy,
        )?;

        Ok(Self {
            base,
            config,
            generators,
        })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn validate_buckets(&self, config: &CloudStorageConfig, outcome: &mut ValidationOutcome) {
        if config.buckets.is_empty() {
            outcome.add_error(ValidationError::new(
                "cloudStorage.buckets",
                "At least one bucket is required",
            ));
            return;
        }

        let production = self.base.environment.is_production();
        let name_pattern = Regex::new(BUCKET_NAME_PATTERN).ok();

        for (i, bucket) in config.buckets.iter().enumerate() {
            let prefix = format!("cloudStorage.buckets[{}]", i);

            outcome.check(validate_required(&bucket.name, &format!("{}.name", prefix)));
            outcome.check(validate_required(&bucket.location, &format!("{}.location", prefix)));
            outcome.check(validate_enum(
                &bucket.storage_class,
                STORAGE_CLASSES,
                &format!("{}.storageClass", prefix),
            ));

            if let Some(pattern) = &name_pattern {
                if !bucket.name.is_empty()
                    && (!pattern.is_match(&bucket.name) || bucket.name.contains(".."))
                {
                    outcome.add_warning(
                        ValidationWarning::new(
                            format!("{}.name", prefix),
                            format!("Bucket name '{}' does not follow GCS naming rules", bucket.name),
                        )
                        .with_suggestion("Use 3-63 lowercase letters, digits, dashes, underscores or dots"),
                    );
                }
            }

            if bucket.public_access {
                outcome.add_warning(
                    ValidationWarning::new(
                        format!("{}.publicAccess", prefix),
                        format!("Bucket '{}' is publicly readable", bucket.name),
                    )
                    .with_suggestion("Serve public content through Cloud CDN with signed URLs instead"),
                );
            }

            if production && !bucket.versioning {
                outcome.add_warning(
                    ValidationWarning::new(
                        format!("{}.versioning", prefix),
                        format!("Bucket '{}' has versioning disabled in production", bucket.name),
                    )
                    .with_suggestion("Enable versioning to recover from accidental deletes"),
                );
            }
        }
    }

    fn validate_firestore(&self, config: &FirestoreConfig, outcome: &mut ValidationOutcome) {
        if config.collections.is_empty() {
            outcome.add_error(ValidationError::new(
                "firestore.collections",
                "At least one collection is required",
            ));
            return;
        }

        for (i, collection) in config.collections.iter().enumerate() {
            let prefix = format!("firestore.collections[{}]", i);

            outcome.check(validate_required(&collection.name, &format!("{}.name", prefix)));

            if collection.fields.is_empty() {
                outcome.add_error(ValidationError::new(
                    format!("{}.fields", prefix),
                    "At least one field is required",
                ));
            }
        }
    }
}

#[async_trait]
impl DomainService for StorageService {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn domain(&self) -> Domain {
        Domain::Storage
    }

    fn base_config(&self) -> &BaseConfig {
        &self.base
    }

    fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    fn validate_domain(&self) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::valid();

        if let Some(buckets) = self.config.cloud_storage.as_ref().filter(|c| c.enabled) {
            self.validate_buckets(buckets, &mut outcome);
        }

        if let Some(firestore) = self.config.firestore.as_ref().filter(|c| c.enabled) {
            self.validate_firestore(firestore, &mut outcome);
        }

        outcome
    }

    async fn generate_files(&self, output_dir: &Path) -> CoreResult<Vec<Artifact>> {
        info!("Generating storage files ({} generators)", self.generators.len());
        let request = GenerationRequest::new(
            &self.base,
            output_dir,
            DomainConfigRef::Storage(&self.config),
        );
        run_generators(&self.generators, &request)
    }
}
