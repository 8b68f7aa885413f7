use thiserror::Error;

/// Top-level error type for the LexDesk runtime.
#[derive(Debug, Error)]
pub enum DeskError {
    #[error("invalid arguments for tool '{tool}': field '{field}' {message}")]
    Validation {
        tool: String,
        field: String,
        message: String,
    },

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("tool '{tool}' failed: {message}")]
    Handler { tool: String, message: String },

    #[error("model service error ({provider}): {message}")]
    ModelService { provider: String, message: String },

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeskError {
    pub fn validation(
        tool: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Validation {
            tool: tool.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn model_service(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModelService {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Failure reported by a tool handler. Always surfaced to the model as an
/// `error` tool result, never as a request failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("missing correlation: {0}")]
    MissingCorrelation(String),

    #[error("provider unavailable: {0}")]
    Provider(String),

    #[error("timed out after {0}s")]
    Timeout(u64),
}

impl From<anyhow::Error> for ToolError {
    fn from(err: anyhow::Error) -> Self {
        Self::Provider(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_field() {
        let err = DeskError::validation("intakeAgent", "email", "is required");
        assert_eq!(
            err.to_string(),
            "invalid arguments for tool 'intakeAgent': field 'email' is required"
        );
    }

    #[test]
    fn model_service_error_names_provider() {
        let err = DeskError::model_service("openrouter", "connection reset");
        assert!(err.to_string().contains("(openrouter)"));
        assert!(err.to_string().contains("connection reset"));
    }
}
