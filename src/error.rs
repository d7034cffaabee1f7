use thiserror::Error;

/// Central error type for pipechain
#[derive(Error, Debug)]
pub enum PipeError {
    // ============================================================================
    // Composition Errors
    // ============================================================================
    #[error("Cannot compose a pipeline from zero stages")]
    EmptyPipeline,

    #[error("Linking would create a cycle through stage '{0}'")]
    CyclicPipeline(String),

    // ============================================================================
    // Stage Errors
    // ============================================================================
    #[error("Stage '{stage}' failed: {message}")]
    StageFailed { stage: String, message: String },

    #[error("Stage '{0}' was re-entered while still executing")]
    Reentrant(String),

    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    GenericError(String),
}

impl PipeError {
    /// Build a stage failure with the stage's name attached
    pub fn stage_failed(stage: impl Into<String>, message: impl Into<String>) -> Self {
        PipeError::StageFailed {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Wrap an arbitrary error raised by stage logic
    pub fn custom<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PipeError::Custom(Box::new(err))
    }
}

// Automatic conversion from String (for ad-hoc stage errors)
impl From<String> for PipeError {
    fn from(err: String) -> Self {
        PipeError::GenericError(err)
    }
}

// Automatic conversion from &str (for ad-hoc stage errors)
impl From<&str> for PipeError {
    fn from(err: &str) -> Self {
        PipeError::GenericError(err.to_string())
    }
}

// Conversion to String for callers that surface errors as text
impl From<PipeError> for String {
    fn from(error: PipeError) -> Self {
        error.to_string()
    }
}

// Helper type alias for Results
pub type PipeResult<T> = Result<T, PipeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipeError::EmptyPipeline;
        assert_eq!(err.to_string(), "Cannot compose a pipeline from zero stages");
    }

    #[test]
    fn test_error_conversion_to_string() {
        let err = PipeError::CyclicPipeline("reader".to_string());
        let s: String = err.into();
        assert_eq!(s, "Linking would create a cycle through stage 'reader'");
    }

    #[test]
    fn test_stage_failed_display() {
        let err = PipeError::stage_failed("classifier", "bad record");
        assert_eq!(err.to_string(), "Stage 'classifier' failed: bad record");
    }

    #[test]
    fn test_custom_error_is_transparent() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = PipeError::custom(io_err);
        assert_eq!(err.to_string(), "disk gone");
        assert!(matches!(err, PipeError::Custom(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: PipeError = json_err.into();
        assert!(matches!(err, PipeError::Json(_)));
    }

    #[test]
    fn test_str_conversion() {
        let err: PipeError = "oops".into();
        assert!(matches!(err, PipeError::GenericError(ref m) if m == "oops"));
    }
}
