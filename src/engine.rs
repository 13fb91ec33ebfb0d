use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::adapter::adapt;
use crate::error::RecognitionError;
use crate::model::RecognitionResult;
use crate::options::LanguageProfile;

pub(crate) const CJK_ONLY_RATIO: f32 = 0.7;
pub(crate) const LATIN_ONLY_RATIO: f32 = 0.3;

/// One image handed to a recognition engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImageInput {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecognizeRequest {
    pub language: LanguageProfile,
    /// Low-effort pass, only used for language detection.
    pub quick: bool,
}

/// Native engine output before adaptation.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutput {
    Normalized(RecognitionResult),
    Json(Value),
}

/// Handle an engine uses to report how far it is through one image, as a
/// fraction in `[0, 1]`.
#[derive(Debug, Clone, Default)]
pub struct EngineProgress {
    sender: Option<mpsc::UnboundedSender<f32>>,
}

impl EngineProgress {
    /// A handle whose reports go nowhere.
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<f32>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    pub fn report(&self, fraction: f32) {
        if let Some(sender) = &self.sender {
            // The receiver is gone once the image is finished; late reports are dropped.
            let _ = sender.send(fraction.clamp(0.0, 1.0));
        }
    }
}

#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    fn name(&self) -> &str;

    async fn is_available(&self) -> bool {
        true
    }

    /// Engines that need a language profile get one from a detection pass.
    fn needs_language_profile(&self) -> bool {
        false
    }

    async fn recognize(
        &self,
        image: &ImageInput,
        request: RecognizeRequest,
        progress: &EngineProgress,
    ) -> Result<EngineOutput, RecognitionError>;
}

/// Replays recorded recogniser output: the image bytes are the JSON the
/// recogniser produced for that image.
#[derive(Debug, Clone, Default)]
pub struct RecordedEngine;

#[async_trait]
impl RecognitionEngine for RecordedEngine {
    fn name(&self) -> &str {
        "recorded"
    }

    async fn recognize(
        &self,
        image: &ImageInput,
        _request: RecognizeRequest,
        progress: &EngineProgress,
    ) -> Result<EngineOutput, RecognitionError> {
        let value = serde_json::from_slice::<Value>(&image.bytes).map_err(|error| {
            RecognitionError::failure(
                self.name(),
                format!("'{}' is not recorded JSON output: {error}", image.name),
            )
        })?;
        progress.report(1.0);
        Ok(EngineOutput::Json(value))
    }
}

fn is_cjk(ch: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&ch)
}

/// Picks a profile from the share of CJK characters among CJK and Latin letters.
pub fn language_profile_for_text(text: &str) -> LanguageProfile {
    let cjk = text.chars().filter(|ch| is_cjk(*ch)).count();
    let latin = text.chars().filter(char::is_ascii_alphabetic).count();
    let total = cjk + latin;
    if total == 0 {
        return LanguageProfile::Mixed;
    }

    let cjk_ratio = cjk as f32 / total as f32;
    if cjk_ratio > CJK_ONLY_RATIO {
        LanguageProfile::CjkOnly
    } else if cjk_ratio < LATIN_ONLY_RATIO {
        LanguageProfile::LatinOnly
    } else {
        LanguageProfile::Mixed
    }
}

async fn quick_pass(
    engine: &dyn RecognitionEngine,
    image: &ImageInput,
) -> Result<RecognitionResult, RecognitionError> {
    let request = RecognizeRequest {
        language: LanguageProfile::Mixed,
        quick: true,
    };
    adapt(
        engine
            .recognize(image, request, &EngineProgress::detached())
            .await?,
    )
}

/// Runs a quick mixed-language pass and chooses a profile from its text.
pub async fn detect_language_profile(
    engine: &dyn RecognitionEngine,
    image: &ImageInput,
) -> Result<LanguageProfile, RecognitionError> {
    let result = quick_pass(engine, image).await?;
    Ok(language_profile_for_text(&result.full_text))
}
