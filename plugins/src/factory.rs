use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use skillwave_core::api::{
    refresh_embeddings, AppConfig, BatchOptions, BlendWeights, BlendedStrategy, CliError,
    DecompositionService, EmbeddingProvider, EmbeddingService, LexicalStrategy, MatchCache,
    MatchStrategy, MatcherConfig, RerankService, RerankStrategy, SelectionPolicy, SkillMatcher,
    SkillRegistry, StrategyKind, VectorStrategy,
};

use crate::decompose::HttpDecompositionService;
use crate::embedding::{OllamaEmbeddingService, OpenAIEmbeddingService};
use crate::rerank::HttpRerankService;

pub fn build_embedding(cfg: &AppConfig) -> anyhow::Result<Arc<dyn EmbeddingService>> {
    let e = &cfg.embedding;
    match e.provider {
        EmbeddingProvider::Ollama => Ok(Arc::new(OllamaEmbeddingService::new(
            &e.base_url,
            e.model.clone(),
            e.timeout_ms,
        )?)),
        EmbeddingProvider::OpenAI => Ok(Arc::new(OpenAIEmbeddingService::new(
            &e.base_url,
            e.api_key.clone(),
            e.model.clone(),
            e.timeout_ms,
        )?)),
    }
}

pub fn build_rerank(cfg: &AppConfig) -> anyhow::Result<Option<Arc<dyn RerankService>>> {
    let r = &cfg.rerank;
    if r.base_url.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(Arc::new(HttpRerankService::new(
        &r.base_url,
        r.api_key.clone(),
        r.timeout_ms,
    )?)))
}

pub fn build_decomposition(cfg: &AppConfig) -> anyhow::Result<Option<Box<dyn DecompositionService>>> {
    let d = &cfg.decomposition;
    if d.base_url.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(Box::new(HttpDecompositionService::new(
        &d.base_url,
        d.api_key.clone(),
        d.timeout_ms,
    )?)))
}

pub fn batch_options(cfg: &AppConfig) -> BatchOptions {
    BatchOptions {
        batch_size: cfg.cache.batch_size.max(1),
        batch_delay: Duration::from_millis(cfg.cache.batch_delay_ms),
    }
}

/// Load the match cache, embed whatever is missing or stale, and persist it.
///
/// The returned cache is what the matcher reads; it is not written again
/// during planning.
pub async fn prepare_cache(
    cfg: &AppConfig,
    registry: &SkillRegistry,
    embedder: &dyn EmbeddingService,
) -> Result<MatchCache, CliError> {
    let mut cache = MatchCache::load(Path::new(&cfg.cache.path));
    let summary =
        refresh_embeddings(&mut cache, registry.skills(), embedder, batch_options(cfg)).await?;
    if summary.embedded > 0 {
        cache.save()?;
    }
    tracing::info!(
        target: "skillwave.cache",
        path = %cfg.cache.path,
        entries = cache.len(),
        embedded = summary.embedded,
        "match cache ready"
    );
    Ok(cache)
}

/// What a strategy may need besides its own settings.
#[derive(Clone)]
pub struct StrategyDeps {
    pub embedder: Option<Arc<dyn EmbeddingService>>,
    pub cache: Arc<MatchCache>,
    pub reranker: Option<Arc<dyn RerankService>>,
}

impl StrategyDeps {
    fn vector(&self) -> Result<VectorStrategy, CliError> {
        let embedder = self.embedder.clone().ok_or_else(|| {
            CliError::Config("vector matching requires an embedding service".into())
        })?;
        Ok(VectorStrategy::new(embedder, self.cache.clone()))
    }
}

pub fn build_strategy(
    kind: StrategyKind,
    cfg: &MatcherConfig,
    deps: &StrategyDeps,
) -> Result<Box<dyn MatchStrategy>, CliError> {
    match kind {
        StrategyKind::Lexical => Ok(Box::new(LexicalStrategy::new())),
        StrategyKind::Vector => Ok(Box::new(deps.vector()?)),
        StrategyKind::Blended => Ok(Box::new(BlendedStrategy::new(
            deps.vector()?,
            BlendWeights::new(cfg.lexical_weight, cfg.vector_weight),
        ))),
        StrategyKind::Rerank => {
            if cfg.shortlist_strategy == StrategyKind::Rerank {
                return Err(CliError::Config(
                    "matcher.shortlist_strategy cannot be rerank".into(),
                ));
            }
            let reranker = deps.reranker.clone().ok_or_else(|| {
                CliError::Config("rerank strategy requires rerank.base_url".into())
            })?;
            let shortlist = build_strategy(cfg.shortlist_strategy, cfg, deps)?;
            Ok(Box::new(RerankStrategy::new(shortlist, reranker, cfg.top_k)))
        }
    }
}

fn needs_embeddings(cfg: &MatcherConfig) -> bool {
    cfg.strategy.needs_embeddings()
        || (cfg.strategy == StrategyKind::Rerank && cfg.shortlist_strategy.needs_embeddings())
}

/// Build the configured matcher, refreshing the match cache first when the
/// strategy reads embeddings.
pub async fn build_matcher(cfg: &AppConfig, registry: &SkillRegistry) -> Result<SkillMatcher, CliError> {
    let m = &cfg.matcher;
    if !(0.0..=1.0).contains(&m.min_confidence) {
        return Err(CliError::Config(format!(
            "matcher.min_confidence must be within [0, 1], got {}",
            m.min_confidence
        )));
    }

    let mut deps = StrategyDeps {
        embedder: None,
        cache: Arc::new(MatchCache::new()),
        reranker: None,
    };
    if needs_embeddings(m) {
        let embedder = build_embedding(cfg)?;
        let cache = prepare_cache(cfg, registry, embedder.as_ref()).await?;
        deps.embedder = Some(embedder);
        deps.cache = Arc::new(cache);
    }
    if m.strategy == StrategyKind::Rerank {
        deps.reranker = build_rerank(cfg)?;
    }

    let strategy = build_strategy(m.strategy, m, &deps)?;
    tracing::debug!(
        target: "skillwave.factory",
        strategy = strategy.name(),
        min_confidence = m.min_confidence,
        "matcher built"
    );
    Ok(SkillMatcher::new(
        strategy,
        SelectionPolicy {
            min_confidence: m.min_confidence,
        },
    ))
}
