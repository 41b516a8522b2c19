//! Sub-generator contract.
//!
//! A generator renders the files for one sub-feature of a domain (for
//! example `compute/cloud-run`). Generators are stateless and built by a
//! zero-argument constructor registered in a [`GeneratorRegistry`].
//!
//! For any configuration that passed its service's `validate()`, a generator
//! must return complete file contents and must not fail.
//!
//! [`GeneratorRegistry`]: crate::registry::GeneratorRegistry

use std::path::{Path, PathBuf};

use crate::artifact::Artifact;
use crate::config::{BaseConfig, DomainConfigRef};
use crate::error::CoreResult;

/// Everything a generator may read.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub base: &'a BaseConfig,
    pub output_dir: &'a Path,
    pub config: DomainConfigRef<'a>,
}

impl<'a> GenerationRequest<'a> {
    pub fn new(base: &'a BaseConfig, output_dir: &'a Path, config: DomainConfigRef<'a>) -> Self {
        Self {
            base,
            output_dir,
            config,
        }
    }

    /// `<output_dir>/<domain>/<sub_feature>`
    pub fn feature_dir(&self, sub_feature: &str) -> PathBuf {
        self.output_dir
            .join(self.config.domain().as_str())
            .join(sub_feature)
    }
}

/// Renders the artifacts of one sub-feature.
pub trait Generator: Send + Sync {
    /// Sub-feature name, also the last path segment of its output directory.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn generate(&self, request: &GenerationRequest<'_>) -> CoreResult<Vec<Artifact>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;

    #[test]
    fn test_feature_dir() {
        let base = BaseConfig::new("p", "r");
        let storage = StorageConfig::default();
        let request = GenerationRequest::new(&base, Path::new("out"), DomainConfigRef::Storage(&storage));

        assert_eq!(
            request.feature_dir("firestore"),
            PathBuf::from("out").join("storage").join("firestore")
        );
    }
}
