use std::str::FromStr;

use serde::Serialize;

pub const DEFAULT_FAILURE_MARKER: &str = "辨識失敗";
pub const DEFAULT_BATCH_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognitionMode {
    #[default]
    Auto,
    Text,
    Table,
}

impl FromStr for RecognitionMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "text" => Ok(Self::Text),
            "table" => Ok(Self::Table),
            other => Err(format!(
                "invalid recognition mode '{other}', expected auto, text or table"
            )),
        }
    }
}

/// Which table lines are clustered with the header strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderPolicy {
    /// CJK headings without amounts, or with a year token.
    #[default]
    Cjk,
    FirstLine,
    Never,
}

impl FromStr for HeaderPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cjk" => Ok(Self::Cjk),
            "first-line" | "first_line" => Ok(Self::FirstLine),
            "never" | "none" => Ok(Self::Never),
            other => Err(format!(
                "invalid header policy '{other}', expected cjk, first-line or never"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LanguageProfile {
    CjkOnly,
    LatinOnly,
    #[default]
    Mixed,
}

impl LanguageProfile {
    /// Tesseract-style language code for the profile.
    #[must_use]
    pub const fn as_code(self) -> &'static str {
        match self {
            Self::CjkOnly => "chi_tra",
            Self::LatinOnly => "eng",
            Self::Mixed => "chi_tra+eng",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutOptions {
    pub mode: RecognitionMode,
    pub header_policy: HeaderPolicy,
    pub detect_language: bool,
    pub failure_marker: String,
    pub batch_separator: String,
}

impl LayoutOptions {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.failure_marker.trim().is_empty() {
            return Err("failure marker cannot be empty".to_string());
        }
        if self.batch_separator.is_empty() {
            return Err("batch separator cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            mode: RecognitionMode::Auto,
            header_policy: HeaderPolicy::Cjk,
            detect_language: true,
            failure_marker: DEFAULT_FAILURE_MARKER.to_string(),
            batch_separator: DEFAULT_BATCH_SEPARATOR.to_string(),
        }
    }
}
