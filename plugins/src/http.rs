//! Shared JSON-over-HTTP plumbing for the external service clients.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use skillwave_core::api::{ExternalServiceError, ServiceKind};

const BODY_PREVIEW_LIMIT: usize = 512;

pub(crate) fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out = String::new();
    let mut truncated = false;
    for (idx, ch) in trimmed.chars().enumerate() {
        if idx >= BODY_PREVIEW_LIMIT {
            truncated = true;
            break;
        }
        out.push(ch);
    }

    if truncated {
        out.push_str("...");
    }

    out
}

pub(crate) fn from_reqwest(service: ServiceKind, err: reqwest::Error) -> ExternalServiceError {
    if err.is_timeout() {
        ExternalServiceError::Timeout { service }
    } else if err.is_decode() {
        ExternalServiceError::malformed(service, err.to_string())
    } else if let Some(status) = err.status() {
        ExternalServiceError::Status {
            service,
            status: status.as_u16(),
            body: err.to_string(),
        }
    } else {
        ExternalServiceError::unavailable(service, err.to_string())
    }
}

/// JSON client bound to one external service.
#[derive(Clone)]
pub struct JsonClient {
    service: ServiceKind,
    api_key: String,
    http: reqwest::Client,
}

impl JsonClient {
    pub fn new(service: ServiceKind, api_key: String, timeout_ms: u64) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            service,
            api_key,
            http,
        })
    }

    pub fn service(&self) -> ServiceKind {
        self.service
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.trim().is_empty() {
            req
        } else {
            req.bearer_auth(&self.api_key)
        }
    }

    /// POST `payload` as JSON and decode the JSON response.
    ///
    /// Non-2xx statuses, timeouts, transport failures and undecodable bodies
    /// all map onto [`ExternalServiceError`]. Nothing is retried.
    pub async fn post_json<Req, Resp>(&self, url: &str, payload: &Req) -> Result<Resp, ExternalServiceError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let service = self.service;
        tracing::debug!(target: "skillwave.http", service = %service, url = %url, "request");

        let req = self.http.post(url).json(payload);
        let resp = self
            .auth(req)
            .send()
            .await
            .map_err(|err| from_reqwest(service, err))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|err| from_reqwest(service, err))?;
        tracing::debug!(
            target: "skillwave.http",
            service = %service,
            status = %status,
            body_len = body.len(),
            "response"
        );

        if !status.is_success() {
            return Err(ExternalServiceError::Status {
                service,
                status: status.as_u16(),
                body: preview_body(&body),
            });
        }

        serde_json::from_str::<Resp>(&body).map_err(|err| {
            ExternalServiceError::malformed(
                service,
                format!("failed to decode response body: {err} | body={}", preview_body(&body)),
            )
        })
    }
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[test]
    fn test_preview_body_empty() {
        assert_eq!(preview_body("   "), "<empty body>");
    }

    #[test]
    fn test_preview_body_truncates() {
        let body = "a".repeat(BODY_PREVIEW_LIMIT + 10);
        let preview = preview_body(&body);
        assert!(preview.ends_with("..."));
        assert!(preview.len() <= BODY_PREVIEW_LIMIT + 3);
    }

    #[test]
    fn test_join_url_trims_trailing_slash() {
        assert_eq!(join_url("http://x:1/", "/v1/rerank"), "http://x:1/v1/rerank");
    }

    #[tokio::test]
    async fn test_status_error_carries_body_preview() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/v1/rerank")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let client = JsonClient::new(ServiceKind::Rerank, String::new(), 1_000).unwrap();
        let err = client
            .post_json::<_, serde_json::Value>(&join_url(&server.url(), "/v1/rerank"), &serde_json::json!({}))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ExternalServiceError::Status {
                service: ServiceKind::Rerank,
                status: 502,
                body: "bad gateway".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_undecodable_body_is_malformed() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/x")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = JsonClient::new(ServiceKind::Embedding, String::new(), 1_000).unwrap();
        let err = client
            .post_json::<_, Vec<f32>>(&join_url(&server.url(), "/x"), &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ExternalServiceError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unavailable() {
        let client = JsonClient::new(ServiceKind::Decomposition, String::new(), 500).unwrap();
        let err = client
            .post_json::<_, serde_json::Value>("http://127.0.0.1:9/v1/decompose", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.service(), ServiceKind::Decomposition);
        assert!(matches!(
            err,
            ExternalServiceError::Unavailable { .. } | ExternalServiceError::Timeout { .. }
        ));
    }
}
