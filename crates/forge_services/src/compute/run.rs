//! Cloud Run service templates.

use forge_core::config::{CloudRunConfig, CloudRunService};
use forge_core::{Artifact, ArtifactKind, BaseConfig, CoreError, CoreResult, Domain, GenerationRequest, Generator};

use super::CLOUD_RUN;
use crate::hcl::{header, identifier, quote};

/// Renders a `google_cloud_run_v2_service` per service plus a Dockerfile each.
#[derive(Debug, Default)]
pub struct CloudRunGenerator;

impl Generator for CloudRunGenerator {
    fn name(&self) -> &str {
        CLOUD_RUN
    }

    fn description(&self) -> &str {
        "Cloud Run services with autoscaling bounds and optional public invocation"
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> CoreResult<Vec<Artifact>> {
        let compute = request
            .config
            .compute()
            .ok_or_else(|| CoreError::config_mismatch(self.name(), Domain::Compute))?;

        let config = match compute.cloud_run.as_ref().filter(|c| c.enabled) {
            Some(config) => config,
            None => return Ok(Vec::new()),
        };

        let dir = request.feature_dir(CLOUD_RUN);
        let mut artifacts = vec![Artifact::new(
            dir.join("main.tf"),
            main_tf(request.base, config),
            ArtifactKind::Terraform,
        )
        .with_description(format!("{} Cloud Run service(s)", config.services.len()))
        .with_dependency("terraform >= 1.6")];

        for service in &config.services {
            artifacts.push(
                Artifact::new(
                    dir.join(&service.name).join("Dockerfile"),
                    dockerfile(service),
                    ArtifactKind::Dockerfile,
                )
                .with_description(format!("Container image for '{}'", service.name))
                .with_instruction(format!(
                    "Build and push the image: docker build -t {} . && docker push {}",
                    service.image, service.image
                )),
            );
        }

        Ok(artifacts)
    }
}

fn main_tf(base: &BaseConfig, config: &CloudRunConfig) -> String {
    let mut out = header("Cloud Run services", &base.project_id, base.environment.as_str());

    for service in &config.services {
        out.push_str(&service_resource(base, service));
    }

    out
}

fn service_resource(base: &BaseConfig, service: &CloudRunService) -> String {
    let id = identifier(&service.name);

    let mut env = String::new();
    for (key, value) in &service.env {
        env.push_str(&format!(
            "\n      env {{\n        name  = {}\n        value = {}\n      }}\n",
            quote(key),
            quote(value)
        ));
    }

    let labels = crate::hcl::map_block(&base.resource_labels(), 2);

    let mut out = format!(
        r#"
resource "google_cloud_run_v2_service" "{id}" {{
  name     = {name}
  location = {region}
  ingress  = "INGRESS_TRAFFIC_ALL"
  labels   = {labels}

  template {{
    scaling {{
      min_instance_count = {min}
      max_instance_count = {max}
    }}

    containers {{
      image = {image}

      ports {{
        container_port = {port}
      }}

      resources {{
        limits = {{
          cpu    = {cpu}
          memory = {memory}
        }}
      }}
{env}    }}
  }}
}}
"#,
        id = id,
        name = quote(&service.name),
        region = quote(&base.region),
        labels = labels,
        min = service.min_instances,
        max = service.max_instances,
        image = quote(&service.image),
        port = service.port,
        cpu = quote(&service.cpu),
        memory = quote(&service.memory),
        env = env,
    );

    if service.allow_unauthenticated {
        out.push_str(&format!(
            r#"
resource "google_cloud_run_v2_service_iam_member" "{id}_public" {{
  name     = google_cloud_run_v2_service.{id}.name
  location = google_cloud_run_v2_service.{id}.location
  role     = "roles/run.invoker"
  member   = "allUsers"
}}
"#,
            id = id
        ));
    }

    out.push_str(&format!(
        r#"
output "{id}_url" {{
  value = google_cloud_run_v2_service.{id}.uri
}}
"#,
        id = id
    ));

    out
}

fn dockerfile(service: &CloudRunService) -> String {
    format!(
        r#"# Container for Cloud Run service '{name}'
FROM gcr.io/distroless/base-debian12

WORKDIR /app
COPY . /app

ENV PORT={port}
EXPOSE {port}

USER nonroot
ENTRYPOINT ["/app/server"]
"#,
        name = service.name,
        port = service.port
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::config::ComputeConfig;
    use forge_core::DomainConfigRef;
    use std::path::Path;

    fn render(config: &ComputeConfig) -> Vec<Artifact> {
        let base = BaseConfig::new("demo-project", "europe-west1");
        let request = GenerationRequest::new(&base, Path::new("out"), DomainConfigRef::Compute(config));
        CloudRunGenerator.generate(&request).unwrap()
    }

    #[test]
    fn test_dockerfile_per_service() {
        let config = ComputeConfig::default().with_cloud_run(
            CloudRunConfig::new()
                .with_service(CloudRunService::new("api", "gcr.io/p/api"))
                .with_service(CloudRunService::new("worker", "gcr.io/p/worker")),
        );

        let artifacts = render(&config);
        let paths: Vec<_> = artifacts.iter().map(|a| a.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                Path::new("out/compute/cloud-run/main.tf").to_path_buf(),
                Path::new("out/compute/cloud-run/api/Dockerfile").to_path_buf(),
                Path::new("out/compute/cloud-run/worker/Dockerfile").to_path_buf(),
            ]
        );
        assert_eq!(artifacts[1].kind, ArtifactKind::Dockerfile);
    }

    #[test]
    fn test_scaling_and_public_access() {
        let config = ComputeConfig::default().with_cloud_run(
            CloudRunConfig::new().with_service(
                CloudRunService::new("api", "gcr.io/p/api")
                    .with_instances(1, 20)
                    .public(),
            ),
        );

        let main_tf = &render(&config)[0].content;
        assert!(main_tf.contains("min_instance_count = 1"));
        assert!(main_tf.contains("max_instance_count = 20"));
        assert!(main_tf.contains("\"allUsers\""));
    }

    #[test]
    fn test_private_service_has_no_invoker_binding() {
        let config = ComputeConfig::default()
            .with_cloud_run(CloudRunConfig::new().with_service(CloudRunService::new("api", "img")));

        assert!(!render(&config)[0].content.contains("allUsers"));
    }
}
