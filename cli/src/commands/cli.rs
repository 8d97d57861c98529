use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use skillwave_core::api::StrategyKind;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    Lexical,
    Vector,
    Blended,
    Rerank,
}

impl From<StrategyArg> for StrategyKind {
    fn from(s: StrategyArg) -> Self {
        match s {
            StrategyArg::Lexical => StrategyKind::Lexical,
            StrategyArg::Vector => StrategyKind::Vector,
            StrategyArg::Blended => StrategyKind::Blended,
            StrategyArg::Rerank => StrategyKind::Rerank,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "skillwave", version, about = "Wave-ordered execution planning with skill matching")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file; defaults to ~/.skillwave/config.toml, then ./skillwave.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Options shared by every command that matches skills.
#[derive(ClapArgs, Debug, Clone)]
pub struct MatchArgs {
    /// Skill registry (JSON array of skill descriptors).
    #[arg(long)]
    pub skills: PathBuf,

    /// Override `matcher.strategy`.
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Override `matcher.min_confidence`.
    #[arg(long)]
    pub min_confidence: Option<f64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long)]
    pub pretty: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub matching: MatchArgs,

    /// Subtasks (JSON array, or an object with a `subtasks` field). `-` reads stdin.
    #[arg(long)]
    pub subtasks: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct DecomposeArgs {
    #[command(flatten)]
    pub matching: MatchArgs,

    #[arg(long, group = "input")]
    pub task: Option<String>,

    #[arg(long, group = "input")]
    pub task_file: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CacheSkillsArgs {
    #[arg(long)]
    pub skills: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Embed missing or stale skills and save the cache.
    Refresh(CacheSkillsArgs),
    /// Count fresh, stale and missing entries.
    Status(CacheSkillsArgs),
    /// Delete every cache entry.
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan a list of subtasks.
    Plan(PlanArgs),
    /// Decompose a task with the decomposition service, then plan it.
    Decompose(DecomposeArgs),
    #[command(subcommand)]
    Cache(CacheCommands),
}
