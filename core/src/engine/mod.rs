//! End-to-end planning: validate, match, resolve, plan.

use std::collections::HashMap;

use serde::Serialize;

use crate::conflict::{ExclusivityRegistry, DEFAULT_SINGLETON_TAG};
use crate::error::{MatchError, PlanningError};
use crate::graph::{Dag, NodeResolution, Subtask};
use crate::matcher::{MatchResult, SkillMatcher};
use crate::planner::{ExecutionPlan, ExecutionPlanner};
use crate::services::{Decomposition, DecompositionRequest, DecompositionService};
use crate::skill::SkillRegistry;

/// Everything one planning request produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub plan: ExecutionPlan,
    /// One per subtask, in declaration order.
    pub matches: Vec<MatchResult>,
    #[serde(skip)]
    pub match_errors: Vec<MatchError>,
    /// Set when the subtasks came from the decomposition service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<f64>,
}

impl PlanReport {
    pub fn unmatched(&self) -> Vec<&str> {
        self.match_errors.iter().map(MatchError::subtask_id).collect()
    }
}

pub struct PlanningEngine {
    matcher: SkillMatcher,
    singleton_tags: Vec<String>,
}

impl PlanningEngine {
    pub fn new(matcher: SkillMatcher) -> Self {
        Self {
            matcher,
            singleton_tags: vec![DEFAULT_SINGLETON_TAG.to_string()],
        }
    }

    pub fn with_singleton_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.singleton_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn matcher(&self) -> &SkillMatcher {
        &self.matcher
    }

    pub async fn plan_subtasks(
        &self,
        subtasks: Vec<Subtask>,
        registry: &SkillRegistry,
    ) -> Result<PlanReport, PlanningError> {
        // Validation failures abort before any matching work.
        let dag = Dag::build(subtasks)?;
        tracing::info!(
            target: "skillwave.engine",
            nodes = dag.len(),
            edges = dag.edge_count(),
            skills = registry.len(),
            strategy = self.matcher.strategy_name(),
            "planning request"
        );

        let subtasks: Vec<Subtask> = dag.nodes().map(|n| n.subtask.clone()).collect();
        let matches = self.matcher.match_all(&subtasks, registry.skills()).await?;

        let mut resolutions = HashMap::with_capacity(matches.len());
        let mut match_errors = Vec::new();
        for result in &matches {
            if let Some(err) = result.as_error() {
                tracing::warn!(
                    target: "skillwave.engine",
                    subtask = %result.subtask_id,
                    reason = %result.reasoning,
                    "{err}"
                );
                match_errors.push(err);
            }
            let skill_write_paths = result
                .skill_id
                .as_deref()
                .and_then(|id| registry.get(id))
                .map(|skill| skill.write_paths.clone())
                .unwrap_or_default();
            resolutions.insert(
                result.subtask_id.clone(),
                NodeResolution {
                    skill_id: result.skill_id.clone(),
                    skill_write_paths,
                },
            );
        }
        let dag = dag.with_resolutions(&resolutions);

        let exclusivity =
            ExclusivityRegistry::from_skills(registry.skills(), self.singleton_tags.iter().cloned());
        let plan = ExecutionPlanner::new(exclusivity).plan(&dag)?;

        tracing::info!(
            target: "skillwave.engine",
            waves = plan.waves.len(),
            unmatched = match_errors.len(),
            "plan ready"
        );
        Ok(PlanReport {
            plan,
            matches,
            match_errors,
            strategy: None,
            complexity: None,
        })
    }

    /// Ask the decomposition service for subtasks, then plan them.
    pub async fn decompose_and_plan(
        &self,
        task: &str,
        registry: &SkillRegistry,
        decomposer: &dyn DecompositionService,
    ) -> Result<PlanReport, PlanningError> {
        let request = DecompositionRequest {
            task: task.to_string(),
            skills: registry.skills().to_vec(),
        };
        let Decomposition {
            subtasks,
            strategy,
            complexity,
        } = decomposer.decompose(&request).await?;
        tracing::info!(
            target: "skillwave.engine",
            subtasks = subtasks.len(),
            "task decomposed"
        );

        let mut report = self.plan_subtasks(subtasks, registry).await?;
        report.strategy = Some(strategy).filter(|s| !s.is_empty());
        report.complexity = Some(complexity);
        Ok(report)
    }
}
