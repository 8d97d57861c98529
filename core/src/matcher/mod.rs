//! Skill matching.
//!
//! One [`MatchStrategy`] is chosen when the [`SkillMatcher`] is built:
//! - [`LexicalStrategy`]: token overlap, no external calls
//! - [`VectorStrategy`]: cosine similarity of embeddings
//! - [`BlendedStrategy`]: weighted sum of lexical and vector scores
//! - [`RerankStrategy`]: shortlist by a cheaper strategy, external pick
//!
//! Every strategy yields exactly one [`MatchResult`] per subtask, with
//! confidence in `[0, 1]`. Ties go to the first-registered skill.

mod blended;
mod lexical;
mod rerank;
mod select;
pub mod text;
mod vector;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{ExternalServiceError, MatchError};
use crate::graph::Subtask;
use crate::skill::SkillDescriptor;

pub use blended::{BlendWeights, BlendedStrategy};
pub use lexical::LexicalStrategy;
pub use rerank::RerankStrategy;
pub use select::{rank, select_best};
pub use vector::{similarity_to_confidence, VectorStrategy};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub subtask_id: String,
    pub skill_id: Option<String>,
    pub confidence: f64,
    pub reasoning: String,
}

impl MatchResult {
    pub fn no_match(subtask_id: &str, reasoning: impl Into<String>) -> Self {
        Self {
            subtask_id: subtask_id.to_string(),
            skill_id: None,
            confidence: 0.0,
            reasoning: reasoning.into(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.skill_id.is_some()
    }

    pub fn as_error(&self) -> Option<MatchError> {
        if self.is_match() {
            None
        } else {
            Some(MatchError::NoQualifyingSkill {
                subtask_id: self.subtask_id.clone(),
            })
        }
    }
}

/// Selection threshold shared by every strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionPolicy {
    /// Scores below this never produce a match. Zero scores never do either.
    pub min_confidence: f64,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            min_confidence: 0.0,
        }
    }
}

impl SelectionPolicy {
    pub fn qualifies(&self, score: f64) -> bool {
        score > 0.0 && score >= self.min_confidence
    }
}

/// Matching strategy plugin.
#[async_trait]
pub trait MatchStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// One score in `[0, 1]` per candidate, in candidate order.
    async fn score(
        &self,
        subtask: &Subtask,
        candidates: &[SkillDescriptor],
    ) -> Result<Vec<f64>, ExternalServiceError>;

    async fn find_best_match(
        &self,
        subtask: &Subtask,
        candidates: &[SkillDescriptor],
        policy: &SelectionPolicy,
    ) -> Result<MatchResult, ExternalServiceError> {
        let scores = self.score(subtask, candidates).await?;
        Ok(select_best(self.name(), subtask, candidates, &scores, policy))
    }
}

/// Strategy + selection policy, fixed at construction.
pub struct SkillMatcher {
    strategy: Box<dyn MatchStrategy>,
    policy: SelectionPolicy,
}

impl SkillMatcher {
    pub fn new(strategy: Box<dyn MatchStrategy>, policy: SelectionPolicy) -> Self {
        Self { strategy, policy }
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    pub async fn find_best_match(
        &self,
        subtask: &Subtask,
        candidates: &[SkillDescriptor],
    ) -> Result<MatchResult, ExternalServiceError> {
        let mut result = self
            .strategy
            .find_best_match(subtask, candidates, &self.policy)
            .await?;

        // Keep the result shape honest whatever the strategy returned.
        result.confidence = text::clamp_unit(result.confidence);
        if result.skill_id.is_none() {
            result.confidence = 0.0;
        }

        tracing::debug!(
            target: "skillwave.matcher",
            strategy = self.strategy.name(),
            subtask = %subtask.id,
            skill = ?result.skill_id,
            confidence = result.confidence,
            "match resolved"
        );
        Ok(result)
    }

    /// One result per subtask, in subtask order.
    pub async fn match_all(
        &self,
        subtasks: &[Subtask],
        candidates: &[SkillDescriptor],
    ) -> Result<Vec<MatchResult>, ExternalServiceError> {
        let mut results = Vec::with_capacity(subtasks.len());
        for subtask in subtasks {
            results.push(self.find_best_match(subtask, candidates).await?);
        }
        Ok(results)
    }
}
