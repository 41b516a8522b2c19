//! Cross-cutting artifacts emitted on every run.

use std::path::Path;

use forge_core::{Artifact, ArtifactKind, BaseConfig, Domain};

/// Root Terraform scaffold, deploy script, env template and README.
///
/// The set is the same whichever domains are enabled.
pub fn shared_artifacts(base: &BaseConfig, output_dir: &Path, state_bucket: Option<&str>) -> Vec<Artifact> {
    let terraform = output_dir.join("terraform");
    let default_bucket = format!("{}-tfstate", base.project_id);
    let bucket = state_bucket.unwrap_or(&default_bucket);

    vec![
        Artifact::new(terraform.join("main.tf"), main_tf(base), ArtifactKind::Terraform)
            .with_description("Provider configuration and required APIs")
            .with_dependency("terraform >= 1.6")
            .with_dependency("hashicorp/google ~> 5.0"),
        Artifact::new(terraform.join("variables.tf"), variables_tf(base), ArtifactKind::Terraform)
            .with_description("Input variables shared by every module"),
        Artifact::new(terraform.join("backend.tf"), backend_tf(bucket, base), ArtifactKind::Terraform)
            .with_description("Remote state in Cloud Storage")
            .with_instruction(format!(
                "Create the state bucket first: gsutil mb -p {} -l {} gs://{}",
                base.project_id, base.region, bucket
            )),
        Artifact::new(output_dir.join("scripts").join("deploy.sh"), deploy_sh(base), ArtifactKind::Script)
            .with_description("Applies every generated Terraform module in order")
            .with_dependency("gcloud")
            .with_instruction("Run ./scripts/deploy.sh from the output directory"),
        Artifact::new(output_dir.join(".env.template"), env_template(base), ArtifactKind::Environment)
            .with_description("Environment variables for local tooling")
            .with_instruction("Copy .env.template to .env and fill in the blanks"),
        Artifact::new(output_dir.join("README.md"), readme(base), ArtifactKind::Markdown)
            .with_description("Overview of the generated infrastructure"),
    ]
}

fn main_tf(base: &BaseConfig) -> String {
    format!(
        r#"# Root configuration for {project} ({env})
# Generated by stackforge.

terraform {{
  required_version = ">= 1.6"

  required_providers {{
    google = {{
      source  = "hashicorp/google"
      version = "~> 5.0"
    }}
  }}
}}

provider "google" {{
  project = var.project_id
  region  = var.region
}}

locals {{
  apis = [
    "cloudresourcemanager.googleapis.com",
    "iam.googleapis.com",
    "serviceusage.googleapis.com",
  ]
}}

resource "google_project_service" "apis" {{
  for_each           = toset(local.apis)
  service            = each.value
  disable_on_destroy = false
}}
"#,
        project = base.project_id,
        env = base.environment.as_str(),
    )
}

fn variables_tf(base: &BaseConfig) -> String {
    format!(
        r#"variable "project_id" {{
  description = "GCP project identifier"
  type        = string
  default     = "{project}"
}}

variable "region" {{
  description = "Default region for regional resources"
  type        = string
  default     = "{region}"
}}

variable "environment" {{
  description = "Deployment environment"
  type        = string
  default     = "{env}"
}}
"#,
        project = base.project_id,
        region = base.region,
        env = base.environment.as_str(),
    )
}

fn backend_tf(bucket: &str, base: &BaseConfig) -> String {
    format!(
        r#"terraform {{
  backend "gcs" {{
    bucket = "{bucket}"
    prefix = "stackforge/{env}"
  }}
}}
"#,
        bucket = bucket,
        env = base.environment.short_name(),
    )
}

fn deploy_sh(base: &BaseConfig) -> String {
    let domains: Vec<&str> = Domain::all().iter().map(|d| d.as_str()).collect();

    format!(
        r#"#!/usr/bin/env bash
# Deploy {project} ({env})
set -euo pipefail

ROOT="$(cd "$(dirname "${{BASH_SOURCE[0]}}")/.." && pwd)"
PROJECT_ID="${{PROJECT_ID:-{project}}}"
REGION="${{REGION:-{region}}}"

gcloud config set project "$PROJECT_ID"

apply() {{
  local dir="$1"
  echo "==> $dir"
  terraform -chdir="$dir" init -input=false
  terraform -chdir="$dir" apply -input=false -auto-approve \
    -var "project_id=$PROJECT_ID" -var "region=$REGION"
}}

apply "$ROOT/terraform"

for domain in {domains}; do
  [ -d "$ROOT/$domain" ] || continue
  for module in "$ROOT/$domain"/*/; do
    [ -f "$module/main.tf" ] && apply "$module"
  done
done

echo "Deployment complete."
"#,
        project = base.project_id,
        env = base.environment.as_str(),
        region = base.region,
        domains = domains.join(" "),
    )
}

fn env_template(base: &BaseConfig) -> String {
    format!(
        "GOOGLE_CLOUD_PROJECT={project}\nGOOGLE_CLOUD_REGION={region}\nENVIRONMENT={env}\nGOOGLE_APPLICATION_CREDENTIALS=\n",
        project = base.project_id,
        region = base.region,
        env = base.environment.as_str(),
    )
}

fn readme(base: &BaseConfig) -> String {
    format!(
        r#"# {project} infrastructure

Environment: **{env}**, region **{region}**.

## Layout

- `terraform/`: provider, variables and remote state backend
- `<domain>/<feature>/`: one Terraform module per enabled feature
- `scripts/deploy.sh`: applies the root module and every feature module

## Deploying

```bash
cp .env.template .env
./scripts/deploy.sh
```
"#,
        project = base.project_id,
        env = base.environment.as_str(),
        region = base.region,
    )
}
