use thiserror::Error;

/// Marker the service uses for exhausted quotas in its `error.status` field.
pub const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success answer from the generation service.
    #[error("Service error ({status}{}): {message}", code_suffix(.code))]
    Service {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Response error: {0}")]
    ResponseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("The image service is busy (429 Resource Exhausted) or the usage quota is used up. Please wait 2-3 minutes and try again.")]
    RunExhausted,

    #[error("Generation was cancelled before any image was produced")]
    Cancelled,
}

impl StudioError {
    /// Quota and rate-limit failures: HTTP 429, a `RESOURCE_EXHAUSTED` code,
    /// or a message carrying a `429`/quota marker.
    pub fn is_quota(&self) -> bool {
        match self {
            StudioError::Service {
                status,
                code,
                message,
            } => {
                *status == 429
                    || code.as_deref() == Some(RESOURCE_EXHAUSTED)
                    || message_has_quota_marker(message)
            }
            StudioError::Transport(message) => message_has_quota_marker(message),
            _ => false,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        match self {
            StudioError::Service {
                status, message, ..
            } => *status == 403 || message.contains("Requested entity was not found"),
            _ => false,
        }
    }

    /// Failures that no retry or later slot can fix: a missing key or an
    /// account the service refuses. These end the whole run.
    pub fn is_run_terminal(&self) -> bool {
        matches!(self, StudioError::ConfigError(_)) || self.is_permission_denied()
    }

    /// Text suitable for showing to the end user.
    pub fn user_message(&self) -> String {
        if matches!(self, StudioError::RunExhausted) {
            return self.to_string();
        }
        if self.is_quota() {
            return "The service is busy (overloaded). Please wait a minute and try again."
                .to_string();
        }
        if self.is_permission_denied() {
            return "Permission denied (403). Check that the API key belongs to a billed project."
                .to_string();
        }
        self.to_string()
    }
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref()
        .map(|c| format!(" {}", c))
        .unwrap_or_default()
}

fn message_has_quota_marker(message: &str) -> bool {
    message.contains("429") || message.to_ascii_lowercase().contains("quota")
}

impl From<reqwest::Error> for StudioError {
    fn from(err: reqwest::Error) -> Self {
        StudioError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(err: serde_json::Error) -> Self {
        StudioError::SerializationError(err.to_string())
    }
}

impl From<base64::DecodeError> for StudioError {
    fn from(err: base64::DecodeError) -> Self {
        StudioError::ResponseError(format!("invalid base64 image data: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn service(status: u16, code: Option<&str>, message: &str) -> StudioError {
        StudioError::Service {
            status,
            code: code.map(String::from),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_quota_classification() {
        assert!(service(429, None, "slow down").is_quota());
        assert!(service(400, Some(RESOURCE_EXHAUSTED), "exhausted").is_quota());
        assert!(service(500, None, "Quota exceeded for metric").is_quota());
        assert!(service(503, None, "upstream said 429").is_quota());
        assert!(!service(400, Some("INVALID_ARGUMENT"), "bad image").is_quota());
        assert!(!StudioError::ResponseError("quota".into()).is_quota());
    }

    #[test]
    fn test_user_messages() {
        assert!(service(429, None, "x").user_message().contains("busy"));
        assert!(service(403, None, "nope").user_message().contains("403"));
        assert!(service(404, None, "Requested entity was not found.")
            .user_message()
            .contains("403"));
        assert_eq!(
            StudioError::InvalidInput("empty".into()).user_message(),
            "Invalid input: empty"
        );
        assert!(StudioError::RunExhausted.user_message().contains("2-3 minutes"));
    }

    #[test]
    fn test_run_terminal_errors() {
        assert!(StudioError::ConfigError("no key".into()).is_run_terminal());
        assert!(service(403, Some("PERMISSION_DENIED"), "denied").is_run_terminal());
        assert!(!service(429, None, "slow down").is_run_terminal());
        assert!(!service(400, None, "bad image").is_run_terminal());
        assert!(!StudioError::Transport("timed out".into()).is_run_terminal());
    }

    #[test]
    fn test_service_display_includes_code() {
        let err = service(429, Some(RESOURCE_EXHAUSTED), "limit");
        assert_eq!(
            err.to_string(),
            "Service error (429 RESOURCE_EXHAUSTED): limit"
        );
        assert_eq!(service(400, None, "bad").to_string(), "Service error (400): bad");
    }
}
