//! Storage slice: Cloud Storage buckets and Firestore.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_storage: Option<CloudStorageConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firestore: Option<FirestoreConfig>,
}

impl StorageConfig {
    pub fn is_enabled(&self) -> bool {
        self.cloud_storage.as_ref().map_or(false, |c| c.enabled)
            || self.firestore.as_ref().map_or(false, |c| c.enabled)
    }

    pub fn with_cloud_storage(mut self, config: CloudStorageConfig) -> Self {
        self.cloud_storage = Some(config);
        self
    }

    pub fn with_firestore(mut self, config: FirestoreConfig) -> Self {
        self.firestore = Some(config);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudStorageConfig {
    pub enabled: bool,
    #[serde(default)]
    pub buckets: Vec<BucketConfig>,
}

impl CloudStorageConfig {
    pub fn new() -> Self {
        Self {
            enabled: true,
            buckets: Vec::new(),
        }
    }

    pub fn with_bucket(mut self, bucket: BucketConfig) -> Self {
        self.buckets.push(bucket);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_storage_class")]
    pub storage_class: String,
    #[serde(default)]
    pub versioning: bool,
    #[serde(default)]
    pub public_access: bool,
    /// Delete objects older than this many days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_delete_after_days: Option<u32>,
}

fn default_storage_class() -> String {
    "STANDARD".to_string()
}

impl BucketConfig {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            storage_class: default_storage_class(),
            versioning: false,
            public_access: false,
            lifecycle_delete_after_days: None,
        }
    }

    pub fn with_storage_class(mut self, class: impl Into<String>) -> Self {
        self.storage_class = class.into();
        self
    }

    pub fn with_versioning(mut self) -> Self {
        self.versioning = true;
        self
    }

    pub fn public(mut self) -> Self {
        self.public_access = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreConfig {
    pub enabled: bool,
    #[serde(default = "default_firestore_location")]
    pub location: String,
    #[serde(default)]
    pub collections: Vec<CollectionConfig>,
}

fn default_firestore_location() -> String {
    "nam5".to_string()
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            location: default_firestore_location(),
            collections: Vec::new(),
        }
    }
}

impl FirestoreConfig {
    pub fn with_collection(mut self, collection: CollectionConfig) -> Self {
        self.collections.push(collection);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

impl CollectionConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldConfig) -> Self {
        self.fields.push(field);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    pub name: String,
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    #[serde(default)]
    pub indexed: bool,
}

fn default_field_type() -> String {
    "string".to_string()
}

impl FieldConfig {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            indexed: false,
        }
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }
}
