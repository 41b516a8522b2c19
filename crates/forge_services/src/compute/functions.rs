//! Cloud Functions (2nd gen) templates.

use forge_core::config::{CloudFunctionsConfig, Trigger};
use forge_core::{Artifact, ArtifactKind, BaseConfig, CoreError, CoreResult, Domain, GenerationRequest, Generator};

use super::CLOUD_FUNCTIONS;
use crate::hcl::{header, identifier, map_block, quote};

/// Renders one function resource per trigger plus a source skeleton.
#[derive(Debug, Default)]
pub struct CloudFunctionsGenerator;

impl Generator for CloudFunctionsGenerator {
    fn name(&self) -> &str {
        CLOUD_FUNCTIONS
    }

    fn description(&self) -> &str {
        "Cloud Functions (2nd gen) with HTTP, Pub/Sub, Storage, Firestore and scheduled triggers"
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> CoreResult<Vec<Artifact>> {
        let compute = request
            .config
            .compute()
            .ok_or_else(|| CoreError::config_mismatch(self.name(), Domain::Compute))?;

        let config = match compute.cloud_functions.as_ref().filter(|c| c.enabled) {
            Some(config) => config,
            None => return Ok(Vec::new()),
        };

        let dir = request.feature_dir(CLOUD_FUNCTIONS);
        let mut artifacts = vec![Artifact::new(
            dir.join("main.tf"),
            main_tf(request.base, config),
            ArtifactKind::Terraform,
        )
        .with_description(format!("Cloud Function '{}' and its triggers", config.name))
        .with_dependency("terraform >= 1.6")
        .with_instruction(format!(
            "Place the function source in {} before running terraform apply",
            config.source_dir
        ))];

        artifacts.extend(source_skeleton(&dir, config));
        Ok(artifacts)
    }
}

/// `256MB` → `256M`, the unit format the v2 API expects.
fn available_memory(memory: &str) -> String {
    memory.trim_end_matches('B').to_string()
}

fn main_tf(base: &BaseConfig, config: &CloudFunctionsConfig) -> String {
    let labels = map_block(&base.resource_labels(), 2);
    let env = map_block(&config.environment_variables, 4);
    let fn_id = identifier(&config.name);

    let mut out = header(
        &format!("Cloud Functions: {}", config.name),
        &base.project_id,
        base.environment.as_str(),
    );

    out.push_str(&format!(
        r#"
resource "google_storage_bucket" "{id}_source" {{
  name                        = "${{var.project_id}}-{name}-source"
  location                    = {region}
  uniform_bucket_level_access = true
  labels                      = {labels}
}}

data "archive_file" "{id}_source" {{
  type        = "zip"
  source_dir  = {source_dir}
  output_path = "${{path.module}}/.build/{name}.zip"
}}

resource "google_storage_bucket_object" "{id}_source" {{
  name   = "{name}-${{data.archive_file.{id}_source.output_md5}}.zip"
  bucket = google_storage_bucket.{id}_source.name
  source = data.archive_file.{id}_source.output_path
}}
"#,
        id = fn_id,
        name = config.name,
        region = quote(&base.region),
        labels = labels,
        source_dir = quote(&config.source_dir),
    ));

    for (i, trigger) in config.triggers.iter().enumerate() {
        // Repeated trigger kinds get a positional suffix to keep resource names unique.
        let repeats = config.triggers[..i]
            .iter()
            .filter(|t| t.kind() == trigger.kind())
            .count();
        let suffix = if repeats == 0 {
            trigger.kind().to_string()
        } else {
            format!("{}-{}", trigger.kind(), repeats + 1)
        };
        out.push_str(&function_resource(base, config, trigger, &suffix, &env));
    }

    out
}

fn function_resource(
    base: &BaseConfig,
    config: &CloudFunctionsConfig,
    trigger: &Trigger,
    suffix: &str,
    env: &str,
) -> String {
    let fn_id = identifier(&config.name);
    let res_id = format!("{}_{}", fn_id, identifier(suffix));
    let fn_name = format!("{}-{}", config.name, suffix);

    let (prelude, event_block) = match trigger {
        Trigger::Http => (String::new(), String::new()),
        Trigger::Pubsub { topic } => (
            format!(
                "\nresource \"google_pubsub_topic\" \"{res}\" {{\n  name = {topic}\n}}\n",
                res = res_id,
                topic = quote(topic)
            ),
            format!(
                r#"
  event_trigger {{
    trigger_region = {region}
    event_type     = "google.cloud.pubsub.topic.v1.messagePublished"
    pubsub_topic   = google_pubsub_topic.{res}.id
    retry_policy   = "RETRY_POLICY_RETRY"
  }}
"#,
                region = quote(&base.region),
                res = res_id
            ),
        ),
        Trigger::Storage { bucket, event } => (
            String::new(),
            format!(
                r#"
  event_trigger {{
    trigger_region = {region}
    event_type     = {event}
    event_filters {{
      attribute = "bucket"
      value     = {bucket}
    }}
  }}
"#,
                region = quote(&base.region),
                event = quote(event),
                bucket = quote(bucket)
            ),
        ),
        Trigger::Firestore { document, event } => (
            String::new(),
            format!(
                r#"
  event_trigger {{
    trigger_region = {region}
    event_type     = {event}
    event_filters {{
      attribute = "database"
      value     = "(default)"
    }}
    event_filters {{
      attribute = "document"
      value     = {document}
      operator  = "match-path-pattern"
    }}
  }}
"#,
                region = quote(&base.region),
                event = quote(event),
                document = quote(document)
            ),
        ),
        Trigger::Schedule { schedule, time_zone } => (
            format!(
                r#"
resource "google_pubsub_topic" "{res}" {{
  name = "{name}"
}}

resource "google_cloud_scheduler_job" "{res}" {{
  name      = "{name}"
  region    = {region}
  schedule  = {schedule}
  time_zone = {tz}

  pubsub_target {{
    topic_name = google_pubsub_topic.{res}.id
    data       = base64encode("{{}}")
  }}
}}
"#,
                res = res_id,
                name = fn_name,
                region = quote(&base.region),
                schedule = quote(schedule),
                tz = quote(time_zone.as_deref().unwrap_or("Etc/UTC"))
            ),
            format!(
                r#"
  event_trigger {{
    trigger_region = {region}
    event_type     = "google.cloud.pubsub.topic.v1.messagePublished"
    pubsub_topic   = google_pubsub_topic.{res}.id
  }}
"#,
                region = quote(&base.region),
                res = res_id
            ),
        ),
    };

    format!(
        r#"{prelude}
resource "google_cloudfunctions2_function" "{res}" {{
  name     = {fn_name}
  location = {region}
  labels   = {labels}

  build_config {{
    runtime     = {runtime}
    entry_point = {entry}
    source {{
      storage_source {{
        bucket = google_storage_bucket.{fn_id}_source.name
        object = google_storage_bucket_object.{fn_id}_source.name
      }}
    }}
  }}

  service_config {{
    available_memory      = {memory}
    timeout_seconds       = {timeout}
    environment_variables = {env}
  }}
{event_block}}}
"#,
        prelude = prelude,
        res = res_id,
        fn_name = quote(&fn_name),
        region = quote(&base.region),
        labels = map_block(&base.resource_labels(), 2),
        runtime = quote(&config.runtime),
        entry = quote(&config.entry_point),
        fn_id = fn_id,
        memory = quote(&available_memory(&config.memory)),
        timeout = config.timeout,
        env = env,
        event_block = event_block,
    )
}

fn source_skeleton(dir: &std::path::Path, config: &CloudFunctionsConfig) -> Vec<Artifact> {
    let src = dir.join("src");
    let entry = &config.entry_point;

    if config.runtime.starts_with("nodejs") {
        vec![
            Artifact::new(
                src.join("index.js"),
                format!(
                    r#"const functions = require('@google-cloud/functions-framework');

functions.http('{entry}', (req, res) => {{
  res.json({{ status: 'ok', function: '{name}' }});
}});

functions.cloudEvent('{entry}Event', (event) => {{
  console.log(`Received ${{event.type}} for ${{event.subject}}`);
}});
"#,
                    entry = entry,
                    name = config.name
                ),
                ArtifactKind::Source,
            )
            .with_description("Node.js function entry point"),
            Artifact::new(
                src.join("package.json"),
                format!(
                    r#"{{
  "name": "{name}",
  "version": "1.0.0",
  "main": "index.js",
  "dependencies": {{
    "@google-cloud/functions-framework": "^3.4.0"
  }}
}}
"#,
                    name = config.name
                ),
                ArtifactKind::Json,
            )
            .with_description("Node.js package manifest")
            .with_instruction("Run npm install in the function source directory"),
        ]
    } else if config.runtime.starts_with("python") {
        vec![
            Artifact::new(
                src.join("main.py"),
                format!(
                    r#"import functions_framework


@functions_framework.http
def {entry}(request):
    return {{"status": "ok", "function": "{name}"}}


@functions_framework.cloud_event
def {entry}_event(cloud_event):
    print(f"Received {{cloud_event['type']}} for {{cloud_event['subject']}}")
"#,
                    entry = entry,
                    name = config.name
                ),
                ArtifactKind::Source,
            )
            .with_description("Python function entry point"),
            Artifact::new(
                src.join("requirements.txt"),
                "functions-framework==3.*\n",
                ArtifactKind::Source,
            )
            .with_description("Python dependencies"),
        ]
    } else if config.runtime.starts_with("go") {
        vec![Artifact::new(
            src.join("function.go"),
            format!(
                r#"package function

import (
	"encoding/json"
	"net/http"

	"github.com/GoogleCloudPlatform/functions-framework-go/functions"
)

func init() {{
	functions.HTTP("{entry}", {entry})
}}

func {entry}(w http.ResponseWriter, r *http.Request) {{
	json.NewEncoder(w).Encode(map[string]string{{"status": "ok", "function": "{name}"}})
}}
"#,
                entry = entry,
                name = config.name
            ),
            ArtifactKind::Source,
        )
        .with_description("Go function entry point")]
    } else {
        vec![Artifact::new(
            src.join("README.md"),
            format!(
                "# {name}\n\nAdd the {runtime} source for entry point `{entry}` here.\n",
                name = config.name,
                runtime = config.runtime,
                entry = entry
            ),
            ArtifactKind::Markdown,
        )
        .with_description("Source placeholder")]
    }
}
