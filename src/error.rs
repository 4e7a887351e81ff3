use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("{field} {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(#[from] clap::Error),

    #[error("Invalid server configuration: {0}")]
    Config(String),
}

impl CompareError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CompareError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
