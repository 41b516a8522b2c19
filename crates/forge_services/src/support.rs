//! Sub-generator resolution and execution shared by the domain services.

use tracing::{debug, info};

use forge_core::{
    Artifact, CoreResult, Domain, GenerationRequest, Generator, GeneratorFactory,
    OnConstructionFailure,
};

/// Resolve the generators of every enabled sub-feature, in declaration order.
///
/// Disabled sub-features are never constructed. Under
/// [`OnConstructionFailure::Skip`] an unavailable generator is left out.
pub(crate) fn resolve_generators(
    factory: &GeneratorFactory,
    domain: Domain,
    sub_features: &[(&str, bool)],
    policy: OnConstructionFailure,
) -> CoreResult<Vec<Box<dyn Generator>>> {
    let mut generators = Vec::new();

    for (name, enabled) in sub_features {
        if !enabled {
            continue;
        }

        match factory.create_with_policy(domain.as_str(), name, policy)? {
            Some(generator) => {
                debug!("Resolved generator {}/{}", domain, name);
                generators.push(generator);
            }
            None => info!("Skipping {}/{}: generator unavailable", domain, name),
        }
    }

    Ok(generators)
}

/// Run generators in order and concatenate their artifacts.
pub(crate) fn run_generators(
    generators: &[Box<dyn Generator>],
    request: &GenerationRequest<'_>,
) -> CoreResult<Vec<Artifact>> {
    let mut artifacts = Vec::new();

    for generator in generators {
        debug!("Running generator: {}", generator.name());
        artifacts.extend(generator.generate(request)?);
    }

    Ok(artifacts)
}
