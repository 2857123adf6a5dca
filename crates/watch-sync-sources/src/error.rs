use thiserror::Error;

/// Error raised by an external collaborator (progress store or remote
/// service). Carries the underlying message so failure reasons stay
/// observable in the report.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SourceError {
    message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn from_err(err: impl std::fmt::Display) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}
