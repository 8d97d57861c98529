use std::fmt;

use thiserror::Error;

/// External collaborator a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Decomposition,
    Embedding,
    Rerank,
}

impl ServiceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Decomposition => "decomposition",
            Self::Embedding => "embedding",
            Self::Rerank => "rerank",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed failure of an external service call. Never retried here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExternalServiceError {
    #[error("{service} service unavailable: {message}")]
    Unavailable { service: ServiceKind, message: String },

    #[error("{service} service timed out")]
    Timeout { service: ServiceKind },

    #[error("{service} service returned status {status}: {body}")]
    Status {
        service: ServiceKind,
        status: u16,
        body: String,
    },

    #[error("{service} service returned a malformed response: {message}")]
    MalformedResponse { service: ServiceKind, message: String },
}

impl ExternalServiceError {
    pub fn service(&self) -> ServiceKind {
        match self {
            Self::Unavailable { service, .. }
            | Self::Timeout { service }
            | Self::Status { service, .. }
            | Self::MalformedResponse { service, .. } => *service,
        }
    }

    pub fn malformed(service: ServiceKind, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            service,
            message: message.into(),
        }
    }

    pub fn unavailable(service: ServiceKind, message: impl Into<String>) -> Self {
        Self::Unavailable {
            service,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_service() {
        let err = ExternalServiceError::Status {
            service: ServiceKind::Rerank,
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(
            err.to_string(),
            "rerank service returned status 502: bad gateway"
        );
        assert_eq!(err.service(), ServiceKind::Rerank);
    }
}
