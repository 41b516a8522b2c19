//! Generated file records.
//!
//! Artifacts only exist in memory. Writing them to disk is the job of the
//! caller (see the `forge` CLI).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// An in-memory generated file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub path: PathBuf,
    pub content: String,
    pub kind: ArtifactKind,
    pub description: String,
    /// Other artifacts or tools this file needs
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub post_install_instructions: Vec<String>,
    /// Monthly cost attributed to the resources in this file (USD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_level: Option<SecurityLevel>,
    #[serde(default)]
    pub compliance_features: Vec<String>,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>, kind: ArtifactKind) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            kind,
            description: String::new(),
            dependencies: Vec::new(),
            post_install_instructions: Vec::new(),
            estimated_cost: None,
            security_level: None,
            compliance_features: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.post_install_instructions.push(instruction.into());
        self
    }

    pub fn with_estimated_cost(mut self, monthly: f64) -> Self {
        self.estimated_cost = Some(monthly);
        self
    }

    pub fn with_security_level(mut self, level: SecurityLevel) -> Self {
        self.security_level = Some(level);
        self
    }

    pub fn with_compliance(mut self, feature: impl Into<String>) -> Self {
        self.compliance_features.push(feature.into());
        self
    }

    /// Whether the file should be marked executable when written.
    pub fn is_executable(&self) -> bool {
        self.kind == ArtifactKind::Script
    }
}

/// Classification of a generated file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Terraform,
    Yaml,
    Json,
    Dockerfile,
    Script,
    Source,
    Environment,
    Markdown,
    Rules,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Terraform => "terraform",
            ArtifactKind::Yaml => "yaml",
            ArtifactKind::Json => "json",
            ArtifactKind::Dockerfile => "dockerfile",
            ArtifactKind::Script => "script",
            ArtifactKind::Source => "source",
            ArtifactKind::Environment => "environment",
            ArtifactKind::Markdown => "markdown",
            ArtifactKind::Rules => "rules",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Security tier derived from a 0-100 security score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    Basic,
    Enhanced,
    Enterprise,
}

impl SecurityLevel {
    /// `>= 90` is enterprise, `>= 70` enhanced, anything lower basic.
    pub fn from_score(score: u8) -> Self {
        if score >= 90 {
            SecurityLevel::Enterprise
        } else if score >= 70 {
            SecurityLevel::Enhanced
        } else {
            SecurityLevel::Basic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityLevel::Basic => "basic",
            SecurityLevel::Enhanced => "enhanced",
            SecurityLevel::Enterprise => "enterprise",
        }
    }
}

impl std::fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_level_thresholds() {
        assert_eq!(SecurityLevel::from_score(95), SecurityLevel::Enterprise);
        assert_eq!(SecurityLevel::from_score(90), SecurityLevel::Enterprise);
        assert_eq!(SecurityLevel::from_score(89), SecurityLevel::Enhanced);
        assert_eq!(SecurityLevel::from_score(70), SecurityLevel::Enhanced);
        assert_eq!(SecurityLevel::from_score(69), SecurityLevel::Basic);
        assert_eq!(SecurityLevel::from_score(0), SecurityLevel::Basic);
    }

    #[test]
    fn test_artifact_builder() {
        let artifact = Artifact::new("out/deploy.sh", "#!/bin/bash", ArtifactKind::Script)
            .with_description("Deploy script")
            .with_dependency("gcloud")
            .with_instruction("chmod +x deploy.sh")
            .with_security_level(SecurityLevel::Enhanced);

        assert!(artifact.is_executable());
        assert_eq!(artifact.dependencies, vec!["gcloud"]);
        assert_eq!(artifact.security_level, Some(SecurityLevel::Enhanced));
        assert!(artifact.estimated_cost.is_none());
    }

    #[test]
    fn test_artifact_serializes_camel_case() {
        let artifact = Artifact::new("a.tf", "", ArtifactKind::Terraform).with_instruction("x");
        let json = serde_json::to_value(&artifact).unwrap();
        assert_eq!(json["kind"], "terraform");
        assert!(json.get("postInstallInstructions").is_some());
    }
}
