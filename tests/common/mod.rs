#![allow(dead_code)]

use ocr_layout::{BoundingBox, RecognitionResult, RecognizedWord, TextBlock};

pub fn word(text: &str, x0: f32, y0: f32, x1: f32, y1: f32) -> RecognizedWord {
    RecognizedWord::new(text, BoundingBox::new(x0, y0, x1, y1), 0.9)
}

/// Lays out `rows` on a regular grid: `col_step` pixels between cell starts,
/// `row_step` pixels between rows, each cell `cell_width` wide and 20px high.
pub fn grid(rows: &[&[&str]], col_step: f32, row_step: f32, cell_width: f32) -> Vec<RecognizedWord> {
    let mut words = Vec::new();
    for (row, cells) in rows.iter().enumerate() {
        for (col, text) in cells.iter().enumerate() {
            let x0 = col as f32 * col_step;
            let y0 = row as f32 * row_step;
            words.push(word(text, x0, y0, x0 + cell_width, y0 + 20.0));
        }
    }
    words
}

pub fn result_with_words(words: Vec<RecognizedWord>) -> RecognitionResult {
    let text = words
        .iter()
        .map(|word| word.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    RecognitionResult {
        full_text: text.clone(),
        words,
        paragraphs: vec![TextBlock { text }],
        lines: Vec::new(),
    }
}

/// Recorded page output in the shape a Tesseract-style recogniser emits.
pub fn page_json(words: &[RecognizedWord]) -> String {
    let text = words
        .iter()
        .map(|word| word.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let words = words
        .iter()
        .map(|word| {
            serde_json::json!({
                "text": word.text,
                "bbox": {
                    "x0": word.bbox.x0,
                    "y0": word.bbox.y0,
                    "x1": word.bbox.x1,
                    "y1": word.bbox.y1,
                },
                "confidence": word.confidence * 100.0,
            })
        })
        .collect::<Vec<_>>();

    serde_json::json!({
        "text": text,
        "words": words,
        "paragraphs": [{ "text": text }],
    })
    .to_string()
}
