use serde::Deserialize;
use serde_json::Value;

use crate::engine::EngineOutput;
use crate::error::RecognitionError;
use crate::model::{BoundingBox, RecognitionResult, RecognizedWord, TextBlock};

#[derive(Debug, Deserialize)]
struct PageOutput {
    #[serde(default, alias = "fullText")]
    text: String,
    #[serde(default)]
    words: Vec<PageWord>,
    #[serde(default)]
    paragraphs: Vec<TextBlock>,
    #[serde(default)]
    lines: Vec<TextBlock>,
}

#[derive(Debug, Deserialize)]
struct PageWord {
    text: String,
    #[serde(alias = "boundingBox")]
    bbox: BoundingBox,
    #[serde(default)]
    confidence: f32,
}

#[derive(Debug, Deserialize)]
struct DetectedText {
    text: String,
    #[serde(alias = "polygon", alias = "box")]
    points: Vec<[f32; 2]>,
    #[serde(default, alias = "score")]
    confidence: f32,
}

/// Maps a native confidence onto `[0, 1]`; percent scales are divided by 100.
fn normalize_confidence(raw: f32) -> f32 {
    let scaled = if raw > 1.0 { raw / 100.0 } else { raw };
    scaled.clamp(0.0, 1.0)
}

fn shape_error(error: &serde_json::Error) -> RecognitionError {
    RecognitionError::UnrecognizedResultShape(error.to_string())
}

fn adapt_page(value: &Value) -> Result<RecognitionResult, RecognitionError> {
    let page = PageOutput::deserialize(value).map_err(|error| shape_error(&error))?;
    let words = page
        .words
        .into_iter()
        .map(|word| RecognizedWord::new(word.text, word.bbox, normalize_confidence(word.confidence)))
        .collect();

    Ok(RecognitionResult {
        full_text: page.text,
        words,
        paragraphs: page.paragraphs,
        lines: page.lines,
    })
}

fn adapt_detections(value: &Value) -> Result<RecognitionResult, RecognitionError> {
    let detections = Vec::<DetectedText>::deserialize(value).map_err(|error| shape_error(&error))?;

    let mut words = Vec::with_capacity(detections.len());
    let mut lines = Vec::with_capacity(detections.len());
    for detection in detections {
        let points = detection
            .points
            .iter()
            .map(|&[x, y]| (x, y))
            .collect::<Vec<_>>();
        let bbox = BoundingBox::from_points(&points).ok_or_else(|| {
            RecognitionError::UnrecognizedResultShape(format!(
                "detection '{}' has no polygon points",
                detection.text
            ))
        })?;

        lines.push(TextBlock {
            text: detection.text.clone(),
        });
        words.push(RecognizedWord::new(
            detection.text,
            bbox,
            normalize_confidence(detection.confidence),
        ));
    }

    let full_text = lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(RecognitionResult {
        full_text,
        words,
        paragraphs: Vec::new(),
        lines,
    })
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object without recognisable text fields",
    }
}

/// Adapts a recogniser's JSON output. Accepted shapes are a page object
/// (`text`, `words[].bbox`, `paragraphs`, `lines`), the same wrapped in
/// `data`, and detector lists (`[{text, points, score}]` or `{results: [...]}`).
pub fn adapt_json(value: &Value) -> Result<RecognitionResult, RecognitionError> {
    match value {
        Value::Array(_) => adapt_detections(value),
        Value::Object(map) => {
            if let Some(data) = map.get("data").filter(|data| data.is_object()) {
                return adapt_json(data);
            }
            if let Some(results) = map.get("results").filter(|results| results.is_array()) {
                return adapt_detections(results);
            }
            if ["words", "text", "fullText", "paragraphs", "lines"]
                .iter()
                .any(|key| map.contains_key(*key))
            {
                return adapt_page(value);
            }
            Err(RecognitionError::UnrecognizedResultShape(
                describe(value).to_string(),
            ))
        }
        other => Err(RecognitionError::UnrecognizedResultShape(
            describe(other).to_string(),
        )),
    }
}

/// Normalises any engine output into a [`RecognitionResult`].
pub fn adapt(output: EngineOutput) -> Result<RecognitionResult, RecognitionError> {
    match output {
        EngineOutput::Normalized(mut result) => {
            for word in &mut result.words {
                word.confidence = normalize_confidence(word.confidence);
            }
            Ok(result)
        }
        EngineOutput::Json(value) => adapt_json(&value),
    }
}
