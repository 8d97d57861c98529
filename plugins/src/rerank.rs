use async_trait::async_trait;
use skillwave_core::api::{
    ExternalServiceError, RerankChoice, RerankRequest, RerankService, ServiceKind,
};

use crate::http::{join_url, JsonClient};

/// Rerank service over `POST {base}/v1/rerank`.
pub struct HttpRerankService {
    client: JsonClient,
    url: String,
}

impl HttpRerankService {
    pub fn new(base_url: &str, api_key: String, timeout_ms: u64) -> anyhow::Result<Self> {
        Ok(Self {
            client: JsonClient::new(ServiceKind::Rerank, api_key, timeout_ms)?,
            url: join_url(base_url, "/v1/rerank"),
        })
    }
}

#[async_trait]
impl RerankService for HttpRerankService {
    async fn rerank(&self, request: &RerankRequest) -> Result<RerankChoice, ExternalServiceError> {
        tracing::debug!(
            target: "skillwave.rerank",
            subtask = %request.subtask.id,
            candidates = request.candidates.len(),
            "rerank request"
        );
        self.client.post_json(&self.url, request).await
    }
}
