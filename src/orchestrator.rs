use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::adapter::adapt;
use crate::engine::{
    EngineOutput, EngineProgress, ImageInput, RecognitionEngine, RecognizeRequest,
    detect_language_profile,
};
use crate::error::RecognitionError;
use crate::format_result;
use crate::model::{LayoutKind, LayoutOutput};
use crate::options::{HeaderPolicy, LanguageProfile, LayoutOptions, RecognitionMode};
use crate::warning::{BatchWarning, WarningCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum BatchStatus {
    Idle,
    Running { current_index: usize, total: usize },
    Done,
    Failed,
}

/// Receives batch progress as a percentage that never decreases.
pub trait ProgressSink {
    fn report(&mut self, percent: f32, message: &str);
}

impl<F> ProgressSink for F
where
    F: FnMut(f32, &str),
{
    fn report(&mut self, percent: f32, message: &str) {
        self(percent, message);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _percent: f32, _message: &str) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageReport {
    pub name: String,
    pub text: String,
    /// `None` when recognition failed and `text` holds the failure marker.
    pub kind: Option<LayoutKind>,
    pub engine: Option<String>,
}

impl ImageReport {
    fn recognized(name: &str, output: LayoutOutput, engine: &str) -> Self {
        Self {
            name: name.to_string(),
            text: output.text,
            kind: Some(output.kind),
            engine: Some(engine.to_string()),
        }
    }

    fn failed(name: &str, marker: &str) -> Self {
        Self {
            name: name.to_string(),
            text: failure_marker(marker, name),
            kind: None,
            engine: None,
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.kind.is_none()
    }
}

/// Outcome of one batch. Serialises to the JSON report `ocr2tsv` writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub mode: RecognitionMode,
    pub header_policy: HeaderPolicy,
    pub images: Vec<ImageReport>,
    pub warnings: Vec<BatchWarning>,
    pub status: BatchStatus,
    #[serde(skip)]
    separator: String,
}

impl BatchReport {
    /// All per-image texts in input order, separated by the batch separator.
    #[must_use]
    pub fn combined_text(&self) -> String {
        self.images
            .iter()
            .map(|image| image.text.as_str())
            .collect::<Vec<_>>()
            .join(&self.separator)
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.images.iter().filter(|image| image.is_failure()).count()
    }
}

#[must_use]
pub fn failure_marker(marker: &str, image_name: &str) -> String {
    format!("{marker}: {image_name}")
}

fn warning_for(error: &RecognitionError) -> BatchWarning {
    let code = match error {
        RecognitionError::EngineUnavailable(_) => WarningCode::EngineUnavailable,
        RecognitionError::UnrecognizedResultShape(_) => WarningCode::UnrecognizedResultShape,
        _ => WarningCode::RecognitionFailed,
    };
    let warning = BatchWarning::new(code, error.to_string());
    match error {
        RecognitionError::RecognitionFailure { engine, .. } => warning.with_engine(engine.clone()),
        _ => warning,
    }
}

/// Batch percentage for `fraction` of image `index` done.
fn progress_percent(index: usize, total: usize, fraction: f32) -> f32 {
    if total == 0 {
        return 100.0;
    }
    (index as f32 + fraction) / total as f32 * 100.0
}

/// Forwards in-image engine progress to the batch sink, never going backwards.
struct ImageProgress<'a> {
    sink: &'a mut dyn ProgressSink,
    index: usize,
    total: usize,
    fraction: f32,
}

impl ImageProgress<'_> {
    fn advance(&mut self, fraction: f32) {
        if fraction <= self.fraction {
            return;
        }
        self.fraction = fraction;
        self.sink.report(
            progress_percent(self.index, self.total, fraction),
            &format!("recognising image {} of {}", self.index + 1, self.total),
        );
    }
}

/// Drives a batch of images through a ranked list of engines, one image at a
/// time, and formats each result according to [`LayoutOptions::mode`].
pub struct Orchestrator {
    engines: Vec<Arc<dyn RecognitionEngine>>,
    options: LayoutOptions,
    status: BatchStatus,
}

impl Orchestrator {
    pub fn new(options: LayoutOptions) -> Result<Self, RecognitionError> {
        options.validate().map_err(RecognitionError::InvalidOption)?;
        Ok(Self {
            engines: Vec::new(),
            options,
            status: BatchStatus::Idle,
        })
    }

    /// Appends an engine; earlier engines are preferred.
    #[must_use]
    pub fn with_engine(mut self, engine: Arc<dyn RecognitionEngine>) -> Self {
        self.engines.push(engine);
        self
    }

    #[must_use]
    pub fn status(&self) -> BatchStatus {
        self.status
    }

    async fn select_engine(
        &self,
        image_index: usize,
        warnings: &mut Vec<BatchWarning>,
    ) -> Result<&dyn RecognitionEngine, RecognitionError> {
        for engine in &self.engines {
            if engine.is_available().await {
                return Ok(engine.as_ref());
            }

            warn!(engine = engine.name(), image_index, "recognition engine not ready, trying next");
            warnings.push(
                BatchWarning::new(
                    WarningCode::EngineFallback,
                    "engine is not ready; falling back to the next engine",
                )
                .with_image(image_index)
                .with_engine(engine.name()),
            );
        }

        Err(RecognitionError::EngineUnavailable(format!(
            "none of the {} configured engines is ready",
            self.engines.len()
        )))
    }

    async fn language_for(
        &self,
        engine: &dyn RecognitionEngine,
        image: &ImageInput,
        image_index: usize,
        warnings: &mut Vec<BatchWarning>,
    ) -> LanguageProfile {
        if !self.options.detect_language || !engine.needs_language_profile() {
            return LanguageProfile::default();
        }

        match detect_language_profile(engine, image).await {
            Ok(profile) => {
                debug!(image = %image.name, language = profile.as_code(), "detected language profile");
                profile
            }
            Err(error) => {
                warn!(image = %image.name, %error, "language detection failed, using mixed profile");
                warnings.push(
                    BatchWarning::new(WarningCode::LanguageDetectionFailed, error.to_string())
                        .with_image(image_index)
                        .with_engine(engine.name()),
                );
                LanguageProfile::Mixed
            }
        }
    }

    async fn recognize_with_progress(
        engine: &dyn RecognitionEngine,
        image: &ImageInput,
        request: RecognizeRequest,
        progress: &mut ImageProgress<'_>,
    ) -> Result<EngineOutput, RecognitionError> {
        let (handle, mut fractions) = EngineProgress::channel();
        let mut recognition = engine.recognize(image, request, &handle);

        loop {
            tokio::select! {
                output = &mut recognition => {
                    while let Ok(fraction) = fractions.try_recv() {
                        progress.advance(fraction);
                    }
                    return output;
                }
                Some(fraction) = fractions.recv() => progress.advance(fraction),
            }
        }
    }

    async fn process_image(
        &self,
        image: &ImageInput,
        image_index: usize,
        warnings: &mut Vec<BatchWarning>,
        progress: &mut ImageProgress<'_>,
    ) -> Result<ImageReport, RecognitionError> {
        let engine = self.select_engine(image_index, warnings).await?;
        let language = self.language_for(engine, image, image_index, warnings).await;

        debug!(image = %image.name, engine = engine.name(), "recognising image");
        let request = RecognizeRequest {
            language,
            quick: false,
        };
        let native = Self::recognize_with_progress(engine, image, request, progress).await?;
        let result = adapt(native)?;
        let output = format_result(&result, self.options.mode, self.options.header_policy);

        Ok(ImageReport::recognized(&image.name, output, engine.name()))
    }

    /// Recognises every image in order. Per-image failures become failure
    /// markers and warnings; only a batch without engines ends `Failed`.
    pub async fn run_batch(
        &mut self,
        images: &[ImageInput],
        progress: &mut dyn ProgressSink,
    ) -> Result<BatchReport, RecognitionError> {
        if self.engines.is_empty() {
            self.status = BatchStatus::Failed;
            return Err(RecognitionError::EngineUnavailable(
                "no recognition engines configured".to_string(),
            ));
        }

        let total = images.len();
        let mut reports = Vec::with_capacity(total);
        let mut warnings = Vec::new();

        for (index, image) in images.iter().enumerate() {
            self.status = BatchStatus::Running {
                current_index: index,
                total,
            };
            progress.report(
                progress_percent(index, total, 0.0),
                &format!("processing image {} of {total}", index + 1),
            );

            let mut image_progress = ImageProgress {
                sink: &mut *progress,
                index,
                total,
                fraction: 0.0,
            };
            match self
                .process_image(image, index, &mut warnings, &mut image_progress)
                .await
            {
                Ok(report) => reports.push(report),
                Err(error) => {
                    warn!(image = %image.name, %error, "image recognition failed");
                    warnings.push(warning_for(&error).with_image(index));
                    reports.push(ImageReport::failed(&image.name, &self.options.failure_marker));
                }
            }
        }

        progress.report(100.0, "recognition complete");
        self.status = BatchStatus::Done;

        let report = BatchReport {
            mode: self.options.mode,
            header_policy: self.options.header_policy,
            images: reports,
            warnings,
            status: self.status,
            separator: self.options.batch_separator.clone(),
        };
        info!(
            images = total,
            failed = report.failed_count(),
            "recognition batch complete"
        );
        Ok(report)
    }
}
