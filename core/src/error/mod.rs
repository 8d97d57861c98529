pub mod cache;
#[allow(clippy::module_inception)]
pub mod error;
pub mod planner;
pub mod service;

pub use cache::CacheError;
pub use error::CliError;
pub use planner::{MatchError, PlanningError, RegistryError, ValidationError};
pub use service::{ExternalServiceError, ServiceKind};
