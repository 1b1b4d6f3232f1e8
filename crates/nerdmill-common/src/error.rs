use thiserror::Error;

#[derive(Debug, Error)]
pub enum NerdError {
    #[error("Annotation service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Annotation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed annotation response: {0}")]
    MalformedResponse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NerdError {
    /// Raised by the annotation service, as opposed to local I/O or input.
    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            NerdError::Transport(_) | NerdError::Status { .. } | NerdError::MalformedResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, NerdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let e = NerdError::Status { status: 503, body: "busy".to_string() };
        assert_eq!(e.to_string(), "Annotation service returned HTTP 503: busy");
        assert!(e.is_service_error());
    }

    #[test]
    fn test_invalid_input_is_not_service_error() {
        let e = NerdError::InvalidInput("empty corpus".to_string());
        assert!(!e.is_service_error());
    }
}
