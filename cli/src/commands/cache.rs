use std::path::Path;

use skillwave_core::api::{refresh_embeddings, AppConfig, CliError, MatchCache};
use skillwave_plugins::factory;

use super::cli::CacheCommands;
use super::input::read_registry;

pub async fn run_cache(cfg: AppConfig, cmd: CacheCommands) -> Result<i32, CliError> {
    let path = Path::new(&cfg.cache.path);
    match cmd {
        CacheCommands::Refresh(args) => {
            let registry = read_registry(&args.skills)?;
            let embedder = factory::build_embedding(&cfg)?;
            let mut cache = MatchCache::try_load(path)?;
            let summary = refresh_embeddings(
                &mut cache,
                registry.skills(),
                embedder.as_ref(),
                factory::batch_options(&cfg),
            )
            .await?;
            cache.save_to(path)?;
            println!(
                "embedded {} of {} skills in {} batches ({})",
                summary.embedded,
                registry.len(),
                summary.batches,
                path.display()
            );
        }
        CacheCommands::Status(args) => {
            let registry = read_registry(&args.skills)?;
            let cache = MatchCache::load(path);
            let status = cache.status(registry.skills());
            println!(
                "{}: {} skills, {} fresh, {} stale, {} missing",
                path.display(),
                status.total,
                status.fresh,
                status.stale,
                status.missing
            );
        }
        CacheCommands::Clear => {
            let mut cache = MatchCache::load(path);
            let removed = cache.len();
            cache.clear();
            cache.save_to(path)?;
            println!("removed {removed} entries from {}", path.display());
        }
    }
    Ok(0)
}
