use std::io::Write;

use skillwave_core::api::{
    AppConfig, CliError, PlanOutput, PlanReport, PlanningEngine, PlanningError, SkillRegistry,
};
use skillwave_plugins::factory;

use super::cli::{DecomposeArgs, MatchArgs, OutputFormat, PlanArgs};
use super::input::{read_registry, read_subtasks};

/// Fold command-line matcher overrides into the loaded config.
pub fn apply_match_overrides(cfg: &mut AppConfig, args: &MatchArgs) {
    if let Some(strategy) = args.strategy {
        cfg.matcher.strategy = strategy.into();
    }
    if let Some(min) = args.min_confidence {
        cfg.matcher.min_confidence = min;
    }
}

async fn build_engine(cfg: &AppConfig, registry: &SkillRegistry) -> Result<PlanningEngine, CliError> {
    let matcher = factory::build_matcher(cfg, registry).await?;
    Ok(PlanningEngine::new(matcher).with_singleton_tags(cfg.exclusivity.singleton_tags.clone()))
}

/// Write the plan (or the failure shape) to `out`; return the process exit code.
pub fn emit<W: Write>(
    out: &mut W,
    result: Result<PlanReport, PlanningError>,
    args: &MatchArgs,
) -> Result<i32, CliError> {
    let (output, exit) = match result {
        Ok(report) => (PlanOutput::from_report(&report), 0),
        Err(err) => {
            tracing::error!(target: "skillwave.cli", error = %err, "planning failed");
            let output = PlanOutput::from_error(&err);
            (output, CliError::Planning(err).exit_code())
        }
    };

    match args.format {
        OutputFormat::Json => output.write_json(&mut *out, args.pretty)?,
        OutputFormat::Text => out.write_all(output.render_text().as_bytes())?,
    }
    out.flush()?;
    Ok(exit)
}

pub async fn run_plan(mut cfg: AppConfig, args: PlanArgs) -> Result<i32, CliError> {
    apply_match_overrides(&mut cfg, &args.matching);
    let registry = read_registry(&args.matching.skills)?;
    let subtasks = read_subtasks(&args.subtasks)?;

    let engine = build_engine(&cfg, &registry).await?;
    let result = engine.plan_subtasks(subtasks, &registry).await;
    emit(&mut std::io::stdout().lock(), result, &args.matching)
}

pub async fn run_decompose(mut cfg: AppConfig, args: DecomposeArgs) -> Result<i32, CliError> {
    apply_match_overrides(&mut cfg, &args.matching);
    let task = match (&args.task, &args.task_file) {
        (Some(t), _) => t.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => {
            return Err(CliError::Command(
                "decompose needs --task or --task-file".into(),
            ))
        }
    };
    if task.trim().is_empty() {
        return Err(CliError::Command("task description is empty".into()));
    }

    let decomposer = factory::build_decomposition(&cfg)?
        .ok_or_else(|| CliError::Config("decomposition.base_url is not set".into()))?;
    let registry = read_registry(&args.matching.skills)?;

    let engine = build_engine(&cfg, &registry).await?;
    let result = engine
        .decompose_and_plan(task.trim(), &registry, decomposer.as_ref())
        .await;
    emit(&mut std::io::stdout().lock(), result, &args.matching)
}
