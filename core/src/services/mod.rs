//! Interfaces to the external collaborators: embedding, rerank and
//! decomposition services. HTTP implementations live in `skillwave-plugins`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ExternalServiceError;
use crate::graph::Subtask;
use crate::skill::SkillDescriptor;

/// One embedding as returned by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub model_id: String,
}

/// Trait for embedding text into vectors.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Model identifier stored alongside cached vectors.
    fn model_id(&self) -> &str;

    /// Generate embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Embedding, ExternalServiceError>;

    /// Generate embeddings for multiple texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, ExternalServiceError>;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RerankRequest {
    pub subtask: Subtask,
    pub candidates: Vec<SkillDescriptor>,
}

/// The reranker's single pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RerankChoice {
    pub skill_id: Option<String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

/// Picks one skill out of a shortlist.
#[async_trait]
pub trait RerankService: Send + Sync {
    async fn rerank(&self, request: &RerankRequest) -> Result<RerankChoice, ExternalServiceError>;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecompositionRequest {
    pub task: String,
    pub skills: Vec<SkillDescriptor>,
}

/// Structured output of the decomposition service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decomposition {
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub complexity: f64,
}

/// Turns a task description into subtasks. Treated as a black box.
#[async_trait]
pub trait DecompositionService: Send + Sync {
    async fn decompose(
        &self,
        request: &DecompositionRequest,
    ) -> Result<Decomposition, ExternalServiceError>;
}
