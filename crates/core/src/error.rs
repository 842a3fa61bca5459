use thiserror::Error;

pub type ActionResult<T> = Result<T, ActionError>;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("{0}")]
    PayloadValidation(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ActionError {
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ActionError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Errors caused by the payload itself. These are user-actionable and
    /// must never be retried.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ActionError::PayloadValidation(_)
                | ActionError::MissingField(_)
                | ActionError::InvalidField { .. }
        )
    }
}

impl From<config::ConfigError> for ActionError {
    fn from(err: config::ConfigError) -> Self {
        ActionError::Config(err.to_string())
    }
}
