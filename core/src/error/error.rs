use thiserror::Error;

use super::cache::CacheError;
use super::planner::{PlanningError, RegistryError, ValidationError};
use super::service::ExternalServiceError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("planning failed: {0}")]
    Planning(#[from] PlanningError),
    #[error("skill registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        Self::Planning(PlanningError::Validation(err))
    }
}

impl From<ExternalServiceError> for CliError {
    fn from(err: ExternalServiceError) -> Self {
        Self::Planning(PlanningError::Service(err))
    }
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// 11: config, 20: io, 30: validation, 40: external service, 50: other.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 11,
            Self::Io(_) | Self::Command(_) | Self::Cache(_) => 20,
            Self::Registry(_) => 30,
            Self::Planning(pe) => match pe {
                PlanningError::Validation(_) => 30,
                PlanningError::Service(_) => 40,
                PlanningError::InvariantViolated(_) => 50,
            },
            Self::Anyhow(_) => 50,
        }
    }
}
