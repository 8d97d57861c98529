use async_trait::async_trait;
use skillwave_core::api::{
    Decomposition, DecompositionRequest, DecompositionService, ExternalServiceError, ServiceKind,
};

use crate::http::{join_url, JsonClient};

/// Decomposition service over `POST {base}/v1/decompose`.
pub struct HttpDecompositionService {
    client: JsonClient,
    url: String,
}

impl HttpDecompositionService {
    pub fn new(base_url: &str, api_key: String, timeout_ms: u64) -> anyhow::Result<Self> {
        Ok(Self {
            client: JsonClient::new(ServiceKind::Decomposition, api_key, timeout_ms)?,
            url: join_url(base_url, "/v1/decompose"),
        })
    }
}

#[async_trait]
impl DecompositionService for HttpDecompositionService {
    async fn decompose(
        &self,
        request: &DecompositionRequest,
    ) -> Result<Decomposition, ExternalServiceError> {
        tracing::debug!(
            target: "skillwave.decompose",
            task_len = request.task.len(),
            skills = request.skills.len(),
            "decomposition request"
        );
        let out: Decomposition = self.client.post_json(&self.url, request).await?;
        tracing::debug!(
            target: "skillwave.decompose",
            subtasks = out.subtasks.len(),
            strategy = %out.strategy,
            "decomposition response"
        );
        Ok(out)
    }
}
