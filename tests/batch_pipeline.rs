mod common;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ocr_layout::{
    BatchStatus, EngineOutput, EngineProgress, ImageInput, LanguageProfile, LayoutKind, LayoutOptions,
    NoProgress, Orchestrator, RecognitionEngine, RecognitionError, RecognizeRequest,
    RecordedEngine, WarningCode, failure_marker,
};
use pretty_assertions::assert_eq;

use common::{result_with_words, word};

type Scripted = Result<EngineOutput, RecognitionError>;

struct ScriptedEngine {
    name: &'static str,
    available: bool,
    needs_language: bool,
    fractions: Vec<f32>,
    outputs: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<RecognizeRequest>>,
}

impl ScriptedEngine {
    fn new(name: &'static str, outputs: Vec<Scripted>) -> Self {
        Self {
            name,
            available: true,
            needs_language: false,
            fractions: Vec::new(),
            outputs: Mutex::new(outputs.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn offline(name: &'static str) -> Self {
        Self {
            available: false,
            ..Self::new(name, Vec::new())
        }
    }

    fn needing_language(mut self) -> Self {
        self.needs_language = true;
        self
    }

    fn reporting(mut self, fractions: &[f32]) -> Self {
        self.fractions = fractions.to_vec();
        self
    }

    fn requests(&self) -> Vec<RecognizeRequest> {
        self.requests.lock().expect("request log lock").clone()
    }
}

#[async_trait]
impl RecognitionEngine for ScriptedEngine {
    fn name(&self) -> &str {
        self.name
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    fn needs_language_profile(&self) -> bool {
        self.needs_language
    }

    async fn recognize(
        &self,
        image: &ImageInput,
        request: RecognizeRequest,
        progress: &EngineProgress,
    ) -> Result<EngineOutput, RecognitionError> {
        self.requests.lock().expect("request log lock").push(request);
        for fraction in &self.fractions {
            progress.report(*fraction);
        }
        self.outputs
            .lock()
            .expect("output script lock")
            .pop_front()
            .unwrap_or_else(|| {
                Err(RecognitionError::failure(
                    self.name,
                    format!("no output scripted for {}", image.name),
                ))
            })
    }
}

fn hello_world() -> Scripted {
    Ok(EngineOutput::Normalized(result_with_words(vec![
        word("Hello", 0.0, 0.0, 50.0, 20.0),
        word("world", 60.0, 0.0, 110.0, 20.0),
    ])))
}

fn images(names: &[&str]) -> Vec<ImageInput> {
    names
        .iter()
        .map(|name| ImageInput::new(*name, Vec::new()))
        .collect()
}

fn orchestrator() -> Orchestrator {
    Orchestrator::new(LayoutOptions::default()).expect("default options are valid")
}

#[tokio::test]
async fn failed_image_becomes_marker_and_batch_completes() {
    let engine = Arc::new(ScriptedEngine::new(
        "scripted",
        vec![
            hello_world(),
            Err(RecognitionError::failure("scripted", "decoder crashed")),
        ],
    ));
    let mut orchestrator = orchestrator().with_engine(engine);

    let report = orchestrator
        .run_batch(&images(&["a.png", "b.png"]), &mut NoProgress)
        .await
        .expect("batch runs");

    assert_eq!(report.status, BatchStatus::Done);
    assert_eq!(orchestrator.status(), BatchStatus::Done);
    assert_eq!(report.images[0].text, "Hello world");
    assert_eq!(report.images[0].kind, Some(LayoutKind::Text));
    assert_eq!(report.images[1].text, failure_marker("辨識失敗", "b.png"));
    assert!(report.images[1].is_failure());
    assert_eq!(report.failed_count(), 1);

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].code, WarningCode::RecognitionFailed);
    assert_eq!(report.warnings[0].image_index, Some(1));
    assert_eq!(report.warnings[0].engine.as_deref(), Some("scripted"));

    assert_eq!(report.combined_text(), "Hello world\n\n辨識失敗: b.png");
}

#[tokio::test]
async fn unavailable_engine_falls_back_to_next() {
    let backup = Arc::new(ScriptedEngine::new("backup", vec![hello_world()]));
    let mut orchestrator = orchestrator()
        .with_engine(Arc::new(ScriptedEngine::offline("offline")))
        .with_engine(backup.clone());

    let report = orchestrator
        .run_batch(&images(&["scan.png"]), &mut NoProgress)
        .await
        .expect("batch runs");

    assert_eq!(report.images[0].text, "Hello world");
    assert_eq!(report.images[0].engine.as_deref(), Some("backup"));
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].code, WarningCode::EngineFallback);
    assert_eq!(report.warnings[0].engine.as_deref(), Some("offline"));
    assert_eq!(backup.requests().len(), 1);
}

#[tokio::test]
async fn no_ready_engine_marks_image_failed() {
    let mut orchestrator = orchestrator().with_engine(Arc::new(ScriptedEngine::offline("offline")));

    let report = orchestrator
        .run_batch(&images(&["scan.png"]), &mut NoProgress)
        .await
        .expect("batch runs");

    assert_eq!(report.status, BatchStatus::Done);
    assert_eq!(report.images[0].text, "辨識失敗: scan.png");
    let codes = report
        .warnings
        .iter()
        .map(|warning| warning.code.clone())
        .collect::<Vec<_>>();
    assert_eq!(
        codes,
        vec![WarningCode::EngineFallback, WarningCode::EngineUnavailable]
    );
}

#[tokio::test]
async fn unrecognised_output_marks_image_failed() {
    let mut orchestrator = orchestrator().with_engine(Arc::new(RecordedEngine));
    let images = vec![ImageInput::new("status.json", br#"{"status": "ok"}"#.to_vec())];

    let report = orchestrator
        .run_batch(&images, &mut NoProgress)
        .await
        .expect("batch runs");

    assert_eq!(report.images[0].text, "辨識失敗: status.json");
    assert_eq!(report.warnings[0].code, WarningCode::UnrecognizedResultShape);
}

#[tokio::test]
async fn language_profile_comes_from_quick_pass() {
    let quick = Ok(EngineOutput::Normalized(ocr_layout::RecognitionResult {
        full_text: "第一季營業收入".to_string(),
        ..ocr_layout::RecognitionResult::default()
    }));
    let engine =
        Arc::new(ScriptedEngine::new("lang", vec![quick, hello_world()]).needing_language());
    let mut orchestrator = orchestrator().with_engine(engine.clone());

    let report = orchestrator
        .run_batch(&images(&["scan.png"]), &mut NoProgress)
        .await
        .expect("batch runs");

    assert_eq!(report.images[0].text, "Hello world");
    assert!(report.warnings.is_empty());
    assert_eq!(
        engine.requests(),
        vec![
            RecognizeRequest {
                language: LanguageProfile::Mixed,
                quick: true,
            },
            RecognizeRequest {
                language: LanguageProfile::CjkOnly,
                quick: false,
            },
        ]
    );
}

#[tokio::test]
async fn failed_language_detection_uses_mixed_profile() {
    let engine = Arc::new(
        ScriptedEngine::new(
            "lang",
            vec![
                Err(RecognitionError::failure("lang", "quick pass timed out")),
                hello_world(),
            ],
        )
        .needing_language(),
    );
    let mut orchestrator = orchestrator().with_engine(engine.clone());

    let report = orchestrator
        .run_batch(&images(&["scan.png"]), &mut NoProgress)
        .await
        .expect("batch runs");

    assert_eq!(report.images[0].text, "Hello world");
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].code, WarningCode::LanguageDetectionFailed);
    assert_eq!(engine.requests()[1].language, LanguageProfile::Mixed);
}

#[tokio::test]
async fn skipped_language_detection_goes_straight_to_recognition() {
    let engine = Arc::new(ScriptedEngine::new("lang", vec![hello_world()]).needing_language());
    let options = LayoutOptions {
        detect_language: false,
        ..LayoutOptions::default()
    };
    let mut orchestrator = Orchestrator::new(options)
        .expect("options are valid")
        .with_engine(engine.clone());

    orchestrator
        .run_batch(&images(&["scan.png"]), &mut NoProgress)
        .await
        .expect("batch runs");

    assert_eq!(engine.requests(), vec![RecognizeRequest::default()]);
}

#[tokio::test]
async fn progress_is_monotonic_and_finishes_at_100() {
    let engine = Arc::new(ScriptedEngine::new(
        "scripted",
        vec![hello_world(), hello_world(), hello_world()],
    ));
    let mut orchestrator = orchestrator().with_engine(engine);

    let mut seen = Vec::new();
    let mut progress = |percent: f32, message: &str| seen.push((percent, message.to_string()));
    orchestrator
        .run_batch(&images(&["a.png", "b.png", "c.png"]), &mut progress)
        .await
        .expect("batch runs");

    assert_eq!(seen.len(), 4);
    assert!(seen.windows(2).all(|pair| pair[0].0 <= pair[1].0));
    assert_eq!(seen[0].1, "processing image 1 of 3");
    let (last_percent, last_message) = seen.last().expect("final progress report");
    assert!((last_percent - 100.0).abs() < f32::EPSILON);
    assert_eq!(last_message, "recognition complete");
}

#[tokio::test]
async fn engine_progress_is_spread_within_each_image() {
    let engine = Arc::new(
        ScriptedEngine::new("scripted", vec![hello_world(), hello_world()]).reporting(&[0.5, 1.0]),
    );
    let mut orchestrator = orchestrator().with_engine(engine);

    let mut seen = Vec::new();
    let mut progress = |percent: f32, _message: &str| seen.push(percent);
    orchestrator
        .run_batch(&images(&["a.png", "b.png"]), &mut progress)
        .await
        .expect("batch runs");

    assert_eq!(seen, vec![0.0, 25.0, 50.0, 50.0, 75.0, 100.0, 100.0]);
}
