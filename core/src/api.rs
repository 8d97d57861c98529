//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `skillwave_core::api` instead of reaching into internal modules.

pub use crate::cache::{
    refresh_embeddings, source_signature, BatchOptions, CacheEntry, CacheStatus, MatchCache,
    RefreshSummary,
};
pub use crate::config::{
    load_default, AppConfig, CacheConfig, DecompositionConfig, EmbeddingConfig,
    EmbeddingProvider, ExclusivityConfig, LogRotation, LoggingConfig, MatcherConfig, RerankConfig,
    StrategyKind,
};
pub use crate::conflict::{analyze_wave, Conflict, ExclusivityRegistry, WaveAnalysis};
pub use crate::engine::{PlanReport, PlanningEngine};
pub use crate::error::{
    CacheError, CliError, ExternalServiceError, MatchError, PlanningError, RegistryError,
    ServiceKind, ValidationError,
};
pub use crate::graph::{Dag, GraphNode, Subtask};
pub use crate::matcher::{
    BlendWeights, BlendedStrategy, LexicalStrategy, MatchResult, MatchStrategy, RerankStrategy,
    SelectionPolicy, SkillMatcher, VectorStrategy,
};
pub use crate::output::PlanOutput;
pub use crate::planner::{ExecutionPlan, ExecutionPlanner, Wave};
pub use crate::services::{
    Decomposition, DecompositionRequest, DecompositionService, Embedding, EmbeddingService,
    RerankChoice, RerankRequest, RerankService,
};
pub use crate::skill::{SkillDescriptor, SkillRegistry};
