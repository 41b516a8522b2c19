//! Networking domain: VPC and global HTTPS load balancing.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use forge_core::config::{LoadBalancerConfig, NetworkingConfig, VpcConfig};
use forge_core::{
    Artifact, ArtifactKind, BaseConfig, CoreError, CoreResult, Domain, DomainConfigRef,
    DomainService, GenerationRequest, Generator, GeneratorFactory, OnConstructionFailure,
    SecurityLevel, ValidationOutcome,
};

use crate::hcl::{header, identifier, quote, string_list};
use crate::support::{resolve_generators, run_generators};

pub const VPC: &str = "vpc";
pub const LOAD_BALANCER: &str = "load-balancer";

pub struct NetworkingService {
    base: Arc<BaseConfig>,
    config: NetworkingConfig,
    generators: Vec<Box<dyn Generator>>,
}

impl NetworkingService {
    pub const NAME: &'static str = "networking";

    pub fn new(
        base: Arc<BaseConfig>,
        config: NetworkingConfig,
        factory: &GeneratorFactory,
        policy: OnConstructionFailure,
    ) -> CoreResult<Self> {
        let generators = resolve_generators(
            factory,
            Domain::Networking,
            &[
                (VPC, config.vpc_enabled()),
                (LOAD_BALANCER, config.load_balancer_enabled()),
            ],
            policy,
        )?;

        Ok(Self {
            base,
            config,
            generators,
        })
    }

    pub fn config(&self) -> &NetworkingConfig {
        &self.config
    }
}

#[async_trait]
impl DomainService for NetworkingService {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn domain(&self) -> Domain {
        Domain::Networking
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

    /// Networking configuration is not validated yet; every slice is accepted.
    ///
    /// This replaces the whole two-phase check, so the base `projectId` and
    /// `region` checks are skipped as well.
    fn validate(&self) -> ValidationOutcome {
        ValidationOutcome::valid()
    }

    async fn generate_files(&self, output_dir: &Path) -> CoreResult<Vec<Artifact>> {
        info!("Generating networking files ({} generators)", self.generators.len());
        let request = GenerationRequest::new(
            &self.base,
            output_dir,
            DomainConfigRef::Networking(&self.config),
        );
        run_generators(&self.generators, &request)
    }
}

fn networking_slice<'a>(request: &GenerationRequest<'a>, generator: &str) -> CoreResult<&'a NetworkingConfig> {
    request
        .config
        .networking()
        .ok_or_else(|| CoreError::config_mismatch(generator, Domain::Networking))
}

/// Custom-mode VPC with subnets, firewall rules and optional Cloud NAT.
#[derive(Debug, Default)]
pub struct VpcGenerator;

impl Generator for VpcGenerator {
    fn name(&self) -> &str {
        VPC
    }

    fn description(&self) -> &str {
        "Custom-mode VPC with subnets, firewall rules and Cloud NAT"
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> CoreResult<Vec<Artifact>> {
        let config = match networking_slice(request, self.name())?.vpc.as_ref().filter(|c| c.enabled) {
            Some(config) => config,
            None => return Ok(Vec::new()),
        };

        let mut artifact = Artifact::new(
            request.feature_dir(VPC).join("main.tf"),
            vpc_tf(request.base, config),
            ArtifactKind::Terraform,
        )
        .with_description(format!("VPC '{}' with {} subnet(s)", config.name, config.subnets.len()))
        .with_compliance("Network segmentation");

        if config.subnets.iter().all(|s| s.private_google_access) {
            artifact = artifact.with_compliance("Private Google Access");
        }

        Ok(vec![artifact])
    }
}

fn vpc_tf(base: &BaseConfig, config: &VpcConfig) -> String {
    let vpc_id = identifier(&config.name);
    let mut out = header(&format!("VPC: {}", config.name), &base.project_id, base.environment.as_str());

    out.push_str(&format!(
        r#"
resource "google_compute_network" "{id}" {{
  name                    = {name}
  auto_create_subnetworks = false
  routing_mode            = "REGIONAL"
}}
"#,
        id = vpc_id,
        name = quote(&config.name),
    ));

    for subnet in &config.subnets {
        out.push_str(&format!(
            r#"
resource "google_compute_subnetwork" "{id}" {{
  name                     = {name}
  ip_cidr_range            = {cidr}
  region                   = {region}
  network                  = google_compute_network.{vpc}.id
  private_ip_google_access = {pga}
}}
"#,
            id = identifier(&subnet.name),
            name = quote(&subnet.name),
            cidr = quote(&subnet.cidr),
            region = quote(subnet.region.as_deref().unwrap_or(&base.region)),
            vpc = vpc_id,
            pga = subnet.private_google_access,
        ));
    }

    for rule in &config.firewall_rules {
        let sources = if rule.source_ranges.is_empty() {
            string_list(&["0.0.0.0/0"])
        } else {
            string_list(&rule.source_ranges)
        };

        out.push_str(&format!(
            r#"
resource "google_compute_firewall" "{id}" {{
  name          = {name}
  network       = google_compute_network.{vpc}.name
  direction     = {direction}
  source_ranges = {sources}

  allow {{
    protocol = "tcp"
    ports    = {ports}
  }}
}}
"#,
            id = identifier(&rule.name),
            name = quote(&rule.name),
            vpc = vpc_id,
            direction = quote(&rule.direction),
            sources = sources,
            ports = string_list(&rule.ports),
        ));
    }

    if config.enable_nat {
        out.push_str(&format!(
            r#"
resource "google_compute_router" "{id}_router" {{
  name    = "{name}-router"
  region  = {region}
  network = google_compute_network.{id}.id
}}

resource "google_compute_router_nat" "{id}_nat" {{
  name                               = "{name}-nat"
  router                             = google_compute_router.{id}_router.name
  region                             = {region}
  nat_ip_allocate_option             = "AUTO_ONLY"
  source_subnetwork_ip_ranges_to_nat = "ALL_SUBNETWORKS_ALL_IP_RANGES"

  log_config {{
    enable = true
    filter = "ERRORS_ONLY"
  }}
}}
"#,
            id = vpc_id,
            name = config.name,
            region = quote(&base.region),
        ));
    }

    out
}

/// Global external HTTPS load balancer with managed certificates.
#[derive(Debug, Default)]
pub struct LoadBalancerGenerator;

impl Generator for LoadBalancerGenerator {
    fn name(&self) -> &str {
        LOAD_BALANCER
    }

    fn description(&self) -> &str {
        "Global HTTPS load balancer with managed certificates, CDN and Cloud Armor"
    }

    fn generate(&self, request: &GenerationRequest<'_>) -> CoreResult<Vec<Artifact>> {
        let config = match networking_slice(request, self.name())?
            .load_balancer
            .as_ref()
            .filter(|c| c.enabled)
        {
            Some(config) => config,
            None => return Ok(Vec::new()),
        };

        let mut artifact = Artifact::new(
            request.feature_dir(LOAD_BALANCER).join("main.tf"),
            load_balancer_tf(request.base, config),
            ArtifactKind::Terraform,
        )
        .with_description(format!("Load balancer '{}'", config.name))
        .with_instruction("Point the DNS records of your domains at the load balancer IP output");

        if config.ssl {
            artifact = artifact.with_compliance("TLS termination with managed certificates");
        }
        if config.cloud_armor {
            artifact = artifact
                .with_security_level(SecurityLevel::Enterprise)
                .with_compliance("Cloud Armor WAF policy");
        }

        Ok(vec![artifact])
    }
}

fn load_balancer_tf(base: &BaseConfig, config: &LoadBalancerConfig) -> String {
    let id = identifier(&config.name);
    let mut out = header(
        &format!("Load balancer: {}", config.name),
        &base.project_id,
        base.environment.as_str(),
    );

    out.push_str(&format!(
        r#"
resource "google_compute_global_address" "{id}" {{
  name = "{name}-ip"
}}

resource "google_compute_backend_bucket" "{id}_default" {{
  name        = "{name}-default-backend"
  bucket_name = "${{var.project_id}}-{name}-default"
  enable_cdn  = {cdn}
}}

resource "google_compute_url_map" "{id}" {{
  name            = {quoted}
  default_service = google_compute_backend_bucket.{id}_default.id
}}
"#,
        id = id,
        name = config.name,
        quoted = quote(&config.name),
        cdn = config.enable_cdn,
    ));

    if config.ssl {
        out.push_str(&format!(
            r#"
resource "google_compute_managed_ssl_certificate" "{id}" {{
  name = "{name}-cert"

  managed {{
    domains = {domains}
  }}
}}

resource "google_compute_target_https_proxy" "{id}" {{
  name             = "{name}-https-proxy"
  url_map          = google_compute_url_map.{id}.id
  ssl_certificates = [google_compute_managed_ssl_certificate.{id}.id]
}}

resource "google_compute_global_forwarding_rule" "{id}_https" {{
  name       = "{name}-https"
  target     = google_compute_target_https_proxy.{id}.id
  ip_address = google_compute_global_address.{id}.address
  port_range = "443"
}}
"#,
            id = id,
            name = config.name,
            domains = string_list(&config.domains),
        ));
    } else {
        out.push_str(&format!(
            r#"
resource "google_compute_target_http_proxy" "{id}" {{
  name    = "{name}-http-proxy"
  url_map = google_compute_url_map.{id}.id
}}

resource "google_compute_global_forwarding_rule" "{id}_http" {{
  name       = "{name}-http"
  target     = google_compute_target_http_proxy.{id}.id
  ip_address = google_compute_global_address.{id}.address
  port_range = "80"
}}
"#,
            id = id,
            name = config.name,
        ));
    }

    if config.cloud_armor {
        out.push_str(&format!(
            r#"
resource "google_compute_security_policy" "{id}" {{
  name = "{name}-armor"

  rule {{
    action   = "allow"
    priority = 2147483647
    match {{
      versioned_expr = "SRC_IPS_V1"
      config {{
        src_ip_ranges = ["*"]
      }}
    }}
    description = "Default allow"
  }}
}}
"#,
            id = id,
            name = config.name,
        ));
    }

    out.push_str(&format!(
        r#"
output "{id}_ip" {{
  value = google_compute_global_address.{id}.address
}}
"#,
        id = id
    ));

    out
}
