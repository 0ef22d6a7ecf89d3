use thiserror::Error;

#[derive(Debug, Error)]
pub enum SteerError {
    #[error("not initialized: run 'steer init'")]
    NotInitialized,

    #[error("invalid rule '{rule}': {field}: {reason}")]
    Config {
        rule: String,
        field: String,
        reason: String,
    },

    #[error("invalid rule id '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidRuleId(String),

    #[error("unrecognized {field} '{value}'")]
    UnknownValue { field: &'static str, value: String },

    #[error("rule '{rule}' failed to evaluate: {reason}")]
    Evaluation { rule: String, reason: String },

    #[error("rule '{rule}' failed to render: {reason}")]
    Render { rule: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SteerError {
    /// True for errors that invalidate the whole rule set. Everything else
    /// is recovered locally (skip the rule, or fall back to the original
    /// prompt).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SteerError::NotInitialized
                | SteerError::Config { .. }
                | SteerError::InvalidRuleId(_)
                | SteerError::UnknownValue { .. }
                | SteerError::Yaml(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SteerError>;
