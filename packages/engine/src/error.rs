use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Failures reported by a style sheet backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("Rule rejected: {reason} in `{rule}`")]
    RuleRejected { rule: String, reason: String },

    #[error("Rule index {index} out of bounds (sheet has {len} rules)")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Rule at index {index} is not a media block")]
    NotAMediaBlock { index: usize },

    #[error("Style sheet '{id}' does not exist and cannot be created")]
    ContainerMissing { id: String },
}

impl HostError {
    pub fn rejected(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RuleRejected {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}

/// Unrecoverable engine setup failures
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Style sheet container '{id}' is unavailable: {source}")]
    ContainerUnavailable {
        id: String,
        #[source]
        source: HostError,
    },
}
