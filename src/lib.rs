mod adapter;
mod column_group;
mod engine;
mod error;
mod line_group;
mod model;
mod numeric_fix;
mod options;
mod orchestrator;
mod table_detect;
mod table_format;
mod text_format;
mod warning;

pub use adapter::{adapt, adapt_json};
pub use column_group::{RowKind, classify_row, group_into_columns};
pub use engine::{
    EngineOutput, EngineProgress, ImageInput, RecognitionEngine, RecognizeRequest,
    RecordedEngine, detect_language_profile, language_profile_for_text,
};
pub use error::RecognitionError;
pub use line_group::group_into_lines;
pub use model::{
    BoundingBox, Column, LayoutKind, LayoutOutput, Line, RecognitionResult, RecognizedWord,
    TextBlock,
};
pub use numeric_fix::{fix_decimal_points, looks_like_number_part, remove_table_artifacts};
pub use options::{HeaderPolicy, LanguageProfile, LayoutOptions, RecognitionMode};
pub use orchestrator::{
    BatchReport, BatchStatus, ImageReport, NoProgress, Orchestrator, ProgressSink, failure_marker,
};
pub use table_detect::is_table;
pub use table_format::format_as_table;
pub use text_format::format_as_text;
pub use warning::{BatchWarning, WarningCode};

/// Formats one recognition result. `Auto` lets the table detector choose.
#[must_use]
pub fn format_result(
    result: &RecognitionResult,
    mode: RecognitionMode,
    header_policy: HeaderPolicy,
) -> LayoutOutput {
    let as_table = match mode {
        RecognitionMode::Table => true,
        RecognitionMode::Text => false,
        RecognitionMode::Auto => is_table(&result.words),
    };

    if as_table {
        LayoutOutput {
            text: format_as_table(&result.words, header_policy),
            kind: LayoutKind::Table,
        }
    } else {
        LayoutOutput {
            text: format_as_text(result),
            kind: LayoutKind::Text,
        }
    }
}
