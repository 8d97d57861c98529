use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ExternalServiceError;
use crate::graph::Subtask;
use crate::services::{RerankRequest, RerankService};
use crate::skill::SkillDescriptor;

use super::select::rank;
use super::text::clamp_unit;
use super::{MatchResult, MatchStrategy, SelectionPolicy};

/// Shortlist with a cheaper strategy, then let the external reranker pick.
///
/// The reranker's answer is adopted verbatim. A skill id outside the
/// shortlist fails closed to a no-match result.
pub struct RerankStrategy {
    shortlist: Box<dyn MatchStrategy>,
    reranker: Arc<dyn RerankService>,
    top_k: usize,
}

impl RerankStrategy {
    pub const DEFAULT_TOP_K: usize = 10;

    pub fn new(
        shortlist: Box<dyn MatchStrategy>,
        reranker: Arc<dyn RerankService>,
        top_k: usize,
    ) -> Self {
        Self {
            shortlist,
            reranker,
            top_k: top_k.max(1),
        }
    }

    pub async fn shortlist(
        &self,
        subtask: &Subtask,
        candidates: &[SkillDescriptor],
    ) -> Result<Vec<SkillDescriptor>, ExternalServiceError> {
        let scores = self.shortlist.score(subtask, candidates).await?;
        Ok(rank(&scores)
            .into_iter()
            .take(self.top_k)
            .map(|idx| candidates[idx].clone())
            .collect())
    }
}

#[async_trait]
impl MatchStrategy for RerankStrategy {
    fn name(&self) -> &str {
        "rerank"
    }

    async fn score(
        &self,
        subtask: &Subtask,
        candidates: &[SkillDescriptor],
    ) -> Result<Vec<f64>, ExternalServiceError> {
        self.shortlist.score(subtask, candidates).await
    }

    async fn find_best_match(
        &self,
        subtask: &Subtask,
        candidates: &[SkillDescriptor],
        policy: &SelectionPolicy,
    ) -> Result<MatchResult, ExternalServiceError> {
        let shortlist = self.shortlist(subtask, candidates).await?;
        if shortlist.is_empty() {
            return Ok(MatchResult::no_match(
                &subtask.id,
                "rerank: no candidate skills",
            ));
        }

        let request = RerankRequest {
            subtask: subtask.clone(),
            candidates: shortlist,
        };
        tracing::debug!(
            target: "skillwave.matcher",
            subtask = %subtask.id,
            shortlist = request.candidates.len(),
            "sending shortlist to reranker"
        );
        let choice = self.reranker.rerank(&request).await?;

        let Some(skill_id) = choice.skill_id else {
            return Ok(MatchResult::no_match(
                &subtask.id,
                format!("rerank: no skill chosen: {}", choice.reasoning),
            ));
        };

        if !request.candidates.iter().any(|s| s.id == skill_id) {
            tracing::warn!(
                target: "skillwave.matcher",
                subtask = %subtask.id,
                skill = %skill_id,
                "reranker chose a skill outside the shortlist, rejecting"
            );
            return Ok(MatchResult::no_match(
                &subtask.id,
                format!("rerank: rejected '{skill_id}', not in shortlist"),
            ));
        }

        let confidence = clamp_unit(choice.confidence);
        if !policy.qualifies(confidence) {
            return Ok(MatchResult::no_match(
                &subtask.id,
                format!(
                    "rerank: '{skill_id}' confidence {confidence:.3} below threshold {:.3}",
                    policy.min_confidence
                ),
            ));
        }

        Ok(MatchResult {
            subtask_id: subtask.id.clone(),
            skill_id: Some(skill_id),
            confidence,
            reasoning: choice.reasoning,
        })
    }
}
