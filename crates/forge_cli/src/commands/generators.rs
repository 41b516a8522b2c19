//! Generators command - List the registered template generators.

use anyhow::Result;
use clap::Args;

use forge_services::builtin_registry;

#[derive(Args)]
pub struct GeneratorsArgs {
    /// Only list generators of this domain
    #[arg(short, long)]
    pub domain: Option<String>,
}

pub async fn execute(args: GeneratorsArgs) -> Result<()> {
    let registry = builtin_registry();

    let domains = match &args.domain {
        Some(domain) if registry.list_types(domain).is_empty() => {
            anyhow::bail!("Unknown domain: {}", domain);
        }
        Some(domain) => vec![domain.clone()],
        None => registry.list_domains(),
    };

    for domain in domains {
        println!("{}", domain);
        for generator_type in registry.list_types(&domain) {
            println!("  - {}", generator_type);
        }
    }

    Ok(())
}
