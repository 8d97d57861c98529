use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub matcher: MatcherConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub rerank: RerankConfig,

    #[serde(default)]
    pub decomposition: DecompositionConfig,

    #[serde(default)]
    pub exclusivity: ExclusivityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory`.
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "skillwave_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    #[serde(default)]
    pub directory: Option<String>,

    /// How often the plan log file rolls over.
    #[serde(default)]
    pub rotation: LogRotation,

    #[serde(default = "default_logging_file_prefix")]
    pub file_prefix: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

fn default_logging_file_prefix() -> String {
    "skillwave-plan.log".to_string()
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
            rotation: LogRotation::default(),
            file_prefix: default_logging_file_prefix(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Lexical,
    Vector,
    Blended,
    Rerank,
}

impl StrategyKind {
    pub fn needs_embeddings(self) -> bool {
        matches!(self, Self::Vector | Self::Blended)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    #[serde(default = "default_strategy")]
    pub strategy: StrategyKind,

    #[serde(default)]
    pub min_confidence: f64,

    #[serde(default = "default_lexical_weight")]
    pub lexical_weight: f64,

    #[serde(default = "default_vector_weight")]
    pub vector_weight: f64,

    /// Shortlist size for the rerank strategy.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Strategy that builds the rerank shortlist. Must not be `rerank`.
    #[serde(default = "default_shortlist_strategy")]
    pub shortlist_strategy: StrategyKind,
}

fn default_strategy() -> StrategyKind {
    StrategyKind::Lexical
}

fn default_lexical_weight() -> f64 {
    0.4
}

fn default_vector_weight() -> f64 {
    0.6
}

fn default_top_k() -> usize {
    10
}

fn default_shortlist_strategy() -> StrategyKind {
    StrategyKind::Lexical
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            min_confidence: 0.0,
            lexical_weight: default_lexical_weight(),
            vector_weight: default_vector_weight(),
            top_k: default_top_k(),
            shortlist_strategy: default_shortlist_strategy(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache file. Empty means `<data dir>/embeddings.json`.
    #[serde(default)]
    pub path: String,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
}

fn default_batch_size() -> usize {
    100
}

fn default_batch_delay_ms() -> u64 {
    1_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    Ollama,
    OpenAI,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_provider")]
    pub provider: EmbeddingProvider,

    #[serde(default = "default_embedding_url")]
    pub base_url: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_embedding_provider() -> EmbeddingProvider {
    EmbeddingProvider::Ollama
}

fn default_embedding_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            base_url: default_embedding_url(),
            model: default_embedding_model(),
            api_key: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankConfig {
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecompositionConfig {
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_decomposition_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_decomposition_timeout_ms() -> u64 {
    120_000
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout_ms: default_decomposition_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusivityConfig {
    /// Capability tags whose skills never share a wave.
    #[serde(default = "default_singleton_tags")]
    pub singleton_tags: Vec<String>,
}

fn default_singleton_tags() -> Vec<String> {
    vec![crate::conflict::DEFAULT_SINGLETON_TAG.to_string()]
}

impl Default for ExclusivityConfig {
    fn default() -> Self {
        Self {
            singleton_tags: default_singleton_tags(),
        }
    }
}
