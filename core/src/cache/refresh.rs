use std::time::Duration;

use crate::error::{ExternalServiceError, ServiceKind};
use crate::services::EmbeddingService;
use crate::skill::SkillDescriptor;

use super::store::{CacheEntry, MatchCache};

/// Batching knobs for embedding requests (rate-limit spacing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub batch_size: usize,
    pub batch_delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 100,
            batch_delay: Duration::from_millis(1_000),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub requested: usize,
    pub embedded: usize,
    pub batches: usize,
}

/// Fetch embeddings for every skill whose cached vector is missing, stale, or
/// produced by a different model, and store them in `cache`.
///
/// Batches run strictly one after another with `batch_delay` between them.
/// On failure, batches that already completed stay in the cache.
pub async fn refresh_embeddings(
    cache: &mut MatchCache,
    skills: &[SkillDescriptor],
    embedder: &dyn EmbeddingService,
    opts: BatchOptions,
) -> Result<RefreshSummary, ExternalServiceError> {
    let model_id = embedder.model_id().to_string();
    let pending: Vec<&SkillDescriptor> = skills
        .iter()
        .filter(|skill| match cache.entry(&skill.id) {
            Some(entry) => !entry.is_fresh_for(skill) || entry.model_id != model_id,
            None => true,
        })
        .collect();

    let mut summary = RefreshSummary {
        requested: pending.len(),
        ..RefreshSummary::default()
    };
    if pending.is_empty() {
        tracing::debug!(target: "skillwave.cache", "cache up to date");
        return Ok(summary);
    }

    let batch_size = opts.batch_size.max(1);
    for (idx, chunk) in pending.chunks(batch_size).enumerate() {
        if idx > 0 && !opts.batch_delay.is_zero() {
            tokio::time::sleep(opts.batch_delay).await;
        }

        let texts: Vec<String> = chunk.iter().map(|s| s.embedding_text()).collect();
        tracing::debug!(
            target: "skillwave.cache",
            batch = idx,
            size = texts.len(),
            "requesting embeddings"
        );
        let embeddings = embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunk.len() {
            return Err(ExternalServiceError::malformed(
                ServiceKind::Embedding,
                format!(
                    "expected {} embeddings, got {}",
                    chunk.len(),
                    embeddings.len()
                ),
            ));
        }

        let entries = chunk
            .iter()
            .zip(embeddings)
            .map(|(skill, emb)| CacheEntry::for_skill(skill, emb.vector, &model_id))
            .collect::<Vec<_>>();
        summary.embedded += entries.len();
        summary.batches += 1;
        cache.set_batch(entries);
    }

    tracing::info!(
        target: "skillwave.cache",
        embedded = summary.embedded,
        batches = summary.batches,
        "cache refreshed"
    );
    Ok(summary)
}
