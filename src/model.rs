use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    #[must_use]
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Axis-aligned box around a polygon or quad, `None` for an empty point list.
    #[must_use]
    pub fn from_points(points: &[(f32, f32)]) -> Option<Self> {
        let (&(first_x, first_y), rest) = points.split_first()?;
        let mut bbox = Self::new(first_x, first_y, first_x, first_y);
        for &(x, y) in rest {
            bbox.x0 = bbox.x0.min(x);
            bbox.y0 = bbox.y0.min(y);
            bbox.x1 = bbox.x1.max(x);
            bbox.y1 = bbox.y1.max(y);
        }
        Some(bbox)
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedWord {
    pub text: String,
    pub bbox: BoundingBox,
    /// Normalised to `[0, 1]` by the adapter.
    pub confidence: f32,
}

impl RecognizedWord {
    #[must_use]
    pub fn new(text: impl Into<String>, bbox: BoundingBox, confidence: f32) -> Self {
        Self {
            text: text.into(),
            bbox,
            confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TextBlock {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecognitionResult {
    pub full_text: String,
    pub words: Vec<RecognizedWord>,
    pub paragraphs: Vec<TextBlock>,
    pub lines: Vec<TextBlock>,
}

/// Words sharing one visual row, sorted by `x0`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    pub words: Vec<RecognizedWord>,
}

impl Line {
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[must_use]
    pub fn min_y0(&self) -> Option<f32> {
        self.words.iter().map(|word| word.bbox.y0).reduce(f32::min)
    }

    #[must_use]
    pub fn joined_text(&self, separator: &str) -> String {
        self.words
            .iter()
            .map(|word| word.text.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// A contiguous run of one line's words inferred to be a single table field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column<'a> {
    pub words: &'a [RecognizedWord],
}

impl Column<'_> {
    #[must_use]
    pub fn text(&self) -> String {
        self.words.iter().map(|word| word.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    Table,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutOutput {
    pub text: String,
    pub kind: LayoutKind,
}
