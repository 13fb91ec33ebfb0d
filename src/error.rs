use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("recognition engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("engine '{engine}' failed to recognise image: {message}")]
    RecognitionFailure { engine: String, message: String },

    #[error("unrecognised result shape: {0}")]
    UnrecognizedResultShape(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),
}

impl RecognitionError {
    #[must_use]
    pub fn failure(engine: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RecognitionFailure {
            engine: engine.into(),
            message: message.into(),
        }
    }
}
