use clap::Parser;
use skillwave_cli::commands::{cache, cli, plan};
use skillwave_cli::logging::init_tracing;
use skillwave_core::api::{AppConfig, CliError};
use skillwave_core::config;

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            e.exit_code()
        }
    };

    std::process::exit(exit);
}

fn load_config(explicit: Option<&std::path::Path>) -> Result<AppConfig, CliError> {
    let loaded = match explicit {
        Some(path) => config::load_from(path).map(|mut cfg| {
            config::apply_env_overrides(&mut cfg, |k| std::env::var(k).ok());
            cfg
        }),
        None => config::load_default(),
    };
    let mut cfg = loaded.map_err(|e| CliError::Config(e.to_string()))?;
    if cfg.cache.path.trim().is_empty() {
        let dir = config::get_data_dir().map_err(|e| CliError::Config(e.to_string()))?;
        cfg.cache.path = dir.join("embeddings.json").to_string_lossy().to_string();
    }
    Ok(cfg)
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let cfg = load_config(args.config.as_deref())?;
    init_tracing(&cfg.logging)?;

    tracing::debug!(target: "skillwave.cli", strategy = ?cfg.matcher.strategy, "config loaded");
    dispatch(args.command, cfg).await
}

async fn dispatch(cmd: cli::Commands, cfg: AppConfig) -> Result<i32, CliError> {
    match cmd {
        cli::Commands::Plan(args) => plan::run_plan(cfg, args).await,
        cli::Commands::Decompose(args) => plan::run_decompose(cfg, args).await,
        cli::Commands::Cache(cmd) => cache::run_cache(cfg, cmd).await,
    }
}
