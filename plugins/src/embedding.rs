//! Embedding service clients.
//!
//! Supports both local (Ollama) and remote (OpenAI-compatible) providers.

use async_trait::async_trait;
use futures::future::try_join_all;
use skillwave_core::api::{Embedding, EmbeddingService, ExternalServiceError, ServiceKind};

use crate::http::{join_url, JsonClient};

/// Ollama local embedding service.
pub struct OllamaEmbeddingService {
    client: JsonClient,
    url: String,
    model: String,
}

impl OllamaEmbeddingService {
    pub fn new(base_url: &str, model: String, timeout_ms: u64) -> anyhow::Result<Self> {
        Ok(Self {
            client: JsonClient::new(ServiceKind::Embedding, String::new(), timeout_ms)?,
            url: join_url(base_url, "/api/embeddings"),
            model,
        })
    }
}

#[async_trait]
impl EmbeddingService for OllamaEmbeddingService {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Embedding, ExternalServiceError> {
        let request = OllamaEmbedRequest {
            model: &self.model,
            prompt: text,
        };
        tracing::debug!(
            target: "skillwave.embedding",
            provider = "ollama",
            model = %self.model,
            text_len = text.len(),
            "embedding request"
        );
        let result: OllamaEmbedResponse = self.client.post_json(&self.url, &request).await?;
        if result.embedding.is_empty() {
            return Err(ExternalServiceError::malformed(
                ServiceKind::Embedding,
                "empty embedding vector",
            ));
        }
        Ok(Embedding {
            vector: result.embedding,
            model_id: self.model.clone(),
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, ExternalServiceError> {
        // The endpoint takes one prompt per call; bound how many run at once.
        let concurrent_limit = 8usize;
        let mut all_results = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(concurrent_limit) {
            let results = try_join_all(chunk.iter().map(|text| self.embed(text))).await?;
            all_results.extend(results);
        }
        Ok(all_results)
    }
}

#[derive(serde::Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(serde::Deserialize)]
struct OllamaEmbedResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

/// OpenAI-compatible remote embedding service.
pub struct OpenAIEmbeddingService {
    client: JsonClient,
    url: String,
    model: String,
}

impl OpenAIEmbeddingService {
    pub fn new(base_url: &str, api_key: String, model: String, timeout_ms: u64) -> anyhow::Result<Self> {
        Ok(Self {
            client: JsonClient::new(ServiceKind::Embedding, api_key, timeout_ms)?,
            url: join_url(base_url, "/embeddings"),
            model,
        })
    }
}

#[async_trait]
impl EmbeddingService for OpenAIEmbeddingService {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Embedding, ExternalServiceError> {
        let mut out = self.embed_batch(&[text.to_string()]).await?;
        out.pop().ok_or_else(|| {
            ExternalServiceError::malformed(ServiceKind::Embedding, "no embedding in response")
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, ExternalServiceError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let request = OpenAIEmbedBatchRequest {
            input: texts,
            model: &self.model,
            encoding_format: "float",
        };
        tracing::debug!(
            target: "skillwave.embedding",
            provider = "openai",
            model = %self.model,
            batch = texts.len(),
            "embedding request"
        );
        let mut result: OpenAIEmbedResponse = self.client.post_json(&self.url, &request).await?;

        if result.data.len() != texts.len() {
            return Err(ExternalServiceError::malformed(
                ServiceKind::Embedding,
                format!("expected {} embeddings, got {}", texts.len(), result.data.len()),
            ));
        }
        // `data` is not guaranteed to come back in input order.
        result.data.sort_by_key(|d| d.index);
        if let Some(served) = result.model.as_deref().filter(|m| *m != self.model) {
            tracing::debug!(
                target: "skillwave.embedding",
                requested = %self.model,
                served = %served,
                "server reported a different model name"
            );
        }
        // Stamp with the configured model so cache entries compare against model_id().
        Ok(result
            .data
            .into_iter()
            .map(|d| Embedding {
                vector: d.embedding,
                model_id: self.model.clone(),
            })
            .collect())
    }
}

#[derive(serde::Serialize)]
struct OpenAIEmbedBatchRequest<'a> {
    input: &'a [String],
    model: &'a str,
    encoding_format: &'a str,
}

#[derive(serde::Deserialize)]
struct OpenAIEmbedResponse {
    data: Vec<OpenAIEmbedData>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(serde::Deserialize)]
struct OpenAIEmbedData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}
