use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::MatchCache;
use crate::error::{ExternalServiceError, ServiceKind};
use crate::graph::Subtask;
use crate::services::EmbeddingService;
use crate::skill::SkillDescriptor;

use super::text::{clamp_unit, cosine_similarity};
use super::MatchStrategy;

/// Map cosine similarity from `[-1, 1]` onto `[0, 1]` via `(s + 1) / 2`.
pub fn similarity_to_confidence(similarity: f64) -> f64 {
    clamp_unit((similarity + 1.0) / 2.0)
}

/// Embedding similarity matching.
///
/// Skill vectors come from the [`MatchCache`] when fresh; anything missing or
/// stale is fetched in one batch per call and not written back (the cache is
/// read-only while matching).
pub struct VectorStrategy {
    embedder: Arc<dyn EmbeddingService>,
    cache: Arc<MatchCache>,
}

impl VectorStrategy {
    pub fn new(embedder: Arc<dyn EmbeddingService>, cache: Arc<MatchCache>) -> Self {
        Self { embedder, cache }
    }

    async fn skill_vectors(
        &self,
        candidates: &[SkillDescriptor],
    ) -> Result<Vec<Option<Vec<f32>>>, ExternalServiceError> {
        let mut vectors: Vec<Option<Vec<f32>>> = candidates
            .iter()
            .map(|skill| self.cache.get_fresh(skill).map(<[f32]>::to_vec))
            .collect();

        let missing: Vec<usize> = vectors
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_none())
            .map(|(idx, _)| idx)
            .collect();
        if missing.is_empty() {
            return Ok(vectors);
        }

        tracing::debug!(
            target: "skillwave.matcher",
            missing = missing.len(),
            "fetching uncached skill embeddings"
        );
        let texts: Vec<String> = missing
            .iter()
            .map(|idx| candidates[*idx].embedding_text())
            .collect();
        let fetched = self.embedder.embed_batch(&texts).await?;
        if fetched.len() != missing.len() {
            return Err(ExternalServiceError::malformed(
                ServiceKind::Embedding,
                format!("expected {} embeddings, got {}", missing.len(), fetched.len()),
            ));
        }
        for (idx, emb) in missing.into_iter().zip(fetched) {
            vectors[idx] = Some(emb.vector);
        }
        Ok(vectors)
    }
}

#[async_trait]
impl MatchStrategy for VectorStrategy {
    fn name(&self) -> &str {
        "vector"
    }

    async fn score(
        &self,
        subtask: &Subtask,
        candidates: &[SkillDescriptor],
    ) -> Result<Vec<f64>, ExternalServiceError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(&subtask.embedding_text()).await?;
        let vectors = self.skill_vectors(candidates).await?;

        Ok(vectors
            .iter()
            .map(|v| match v {
                Some(v) if v.len() == query.vector.len() && !v.is_empty() => {
                    similarity_to_confidence(cosine_similarity(&query.vector, v))
                }
                _ => 0.0,
            })
            .collect())
    }
}
