use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    EngineFallback,
    EngineUnavailable,
    RecognitionFailed,
    UnrecognizedResultShape,
    LanguageDetectionFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchWarning {
    pub code: WarningCode,
    pub message: String,
    pub image_index: Option<usize>,
    pub engine: Option<String>,
}

impl BatchWarning {
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            image_index: None,
            engine: None,
        }
    }

    #[must_use]
    pub fn with_image(mut self, image_index: usize) -> Self {
        self.image_index = Some(image_index);
        self
    }

    #[must_use]
    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }
}
