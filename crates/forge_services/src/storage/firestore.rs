//! Firestore database, composite indexes and security rules.

use serde_json::json;

use forge_core::config::FirestoreConfig;
use forge_core::{Artifact, ArtifactKind, BaseConfig, CoreError, CoreResult, Domain, GenerationRequest, Generator};

use super::FIRESTORE;
use crate::hcl::{header, quote};

#[derive(Debug, Default)]
pub struct FirestoreGenerator;

impl Generator for FirestoreGenerator {
    fn name(&self) -> &str {
        FIRESTORE
    }

    fn description(&self) -> &str {
        "Firestore native database with indexes and default-deny security rules"
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> CoreResult<Vec<Artifact>> {
        let storage = request
            .config
            .storage()
            .ok_or_else(|| CoreError::config_mismatch(self.name(), Domain::Storage))?;

        let config = match storage.firestore.as_ref().filter(|c| c.enabled) {
            Some(config) => config,
            None => return Ok(Vec::new()),
        };

        let dir = request.feature_dir(FIRESTORE);

        Ok(vec![
            Artifact::new(dir.join("main.tf"), main_tf(request.base, config), ArtifactKind::Terraform)
                .with_description("Firestore database")
                .with_dependency("terraform >= 1.6"),
            Artifact::new(dir.join("firestore.indexes.json"), indexes_json(config)?, ArtifactKind::Json)
                .with_description("Firestore index definitions")
                .with_instruction("Deploy indexes with: firebase deploy --only firestore:indexes"),
            Artifact::new(dir.join("firestore.rules"), rules(config), ArtifactKind::Rules)
                .with_description("Firestore security rules")
                .with_instruction("Review the rules, then deploy with: firebase deploy --only firestore:rules"),
        ])
    }
}

fn main_tf(base: &BaseConfig, config: &FirestoreConfig) -> String {
    let mut out = header("Firestore", &base.project_id, base.environment.as_str());
    out.push_str(&format!(
        r#"
resource "google_firestore_database" "default" {{
  name                    = "(default)"
  location_id             = {location}
  type                    = "FIRESTORE_NATIVE"
  delete_protection_state = {protection}
}}
"#,
        location = quote(&config.location),
        protection = quote(if base.environment.is_production() {
            "DELETE_PROTECTION_ENABLED"
        } else {
            "DELETE_PROTECTION_DISABLED"
        }),
    ));
    out
}

/// One ascending single-collection index per indexed field.
fn indexes_json(config: &FirestoreConfig) -> CoreResult<String> {
    let indexes: Vec<_> = config
        .collections
        .iter()
        .flat_map(|collection| {
            collection.fields.iter().filter(|f| f.indexed).map(move |field| {
                json!({
                    "collectionGroup": collection.name,
                    "queryScope": "COLLECTION",
                    "fields": [
                        { "fieldPath": field.name, "order": "ASCENDING" }
                    ]
                })
            })
        })
        .collect();

    let document = json!({ "indexes": indexes, "fieldOverrides": [] });
    Ok(serde_json::to_string_pretty(&document)? + "\n")
}

fn rules(config: &FirestoreConfig) -> String {
    let mut out = String::from(
        "rules_version = '2';\n\nservice cloud.firestore {\n  match /databases/{database}/documents {\n",
    );

    for collection in &config.collections {
        out.push_str(&format!(
            "    match /{name}/{{docId}} {{\n      allow read, write: if request.auth != null;\n    }}\n\n",
            name = collection.name
        ));
    }

    out.push_str("    match /{document=**} {\n      allow read, write: if false;\n    }\n  }\n}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::config::{CollectionConfig, FieldConfig, StorageConfig};
    use forge_core::DomainConfigRef;
    use std::path::Path;

    fn config() -> StorageConfig {
        StorageConfig::default().with_firestore(
            FirestoreConfig::default().with_collection(
                CollectionConfig::new("users")
                    .with_field(FieldConfig::new("email", "string").indexed())
                    .with_field(FieldConfig::new("age", "number")),
            ),
        )
    }

    #[test]
    fn test_three_artifacts() {
        let base = BaseConfig::new("demo-project", "us-central1");
        let storage = config();
        let request = GenerationRequest::new(&base, Path::new("out"), DomainConfigRef::Storage(&storage));

        let artifacts = FirestoreGenerator.generate(&request).unwrap();
        let names: Vec<_> = artifacts
            .iter()
            .filter_map(|a| a.path.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["main.tf", "firestore.indexes.json", "firestore.rules"]);
        assert_eq!(artifacts[2].kind, ArtifactKind::Rules);
    }

    #[test]
    fn test_only_indexed_fields_get_indexes() {
        let storage = config();
        let json = indexes_json(storage.firestore.as_ref().unwrap()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        let indexes = parsed["indexes"].as_array().unwrap();
        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes[0]["fields"][0]["fieldPath"], "email");
    }

    #[test]
    fn test_rules_default_deny() {
        let storage = config();
        let rules = rules(storage.firestore.as_ref().unwrap());
        assert!(rules.contains("match /users/{docId}"));
        assert!(rules.contains("allow read, write: if false;"));
    }
}
