use thiserror::Error;

use super::service::ExternalServiceError;

/// Graph construction failures. Fatal to a planning request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Duplicate subtask ID: {0}")]
    DuplicateId(String),

    #[error("Dependency not found: subtask '{subtask_id}' depends on '{missing_dep}'")]
    UnknownDependency {
        subtask_id: String,
        missing_dep: String,
    },

    #[error("Circular dependency detected: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },
}

impl ValidationError {
    /// Stable machine-readable code, used in plan output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateId(_) => "duplicate_id",
            Self::UnknownDependency { .. } => "unknown_dependency",
            Self::Cycle { .. } => "cycle",
        }
    }
}

/// No candidate cleared the selection policy. Recorded, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("No qualifying skill for subtask '{subtask_id}'")]
    NoQualifyingSkill { subtask_id: String },
}

impl MatchError {
    pub fn subtask_id(&self) -> &str {
        match self {
            Self::NoQualifyingSkill { subtask_id } => subtask_id,
        }
    }
}

#[derive(Error, Debug)]
pub enum PlanningError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Service(#[from] ExternalServiceError),

    #[error("plan invariant violated: {0}")]
    InvariantViolated(String),
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Duplicate skill ID in registry: {0}")]
    DuplicateSkillId(String),

    #[error("failed to read skill registry {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse skill registry {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let err = ValidationError::Cycle {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Circular dependency detected: a -> b -> a");
        assert_eq!(err.code(), "cycle");
    }
}
