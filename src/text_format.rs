use crate::model::{RecognitionResult, TextBlock};

fn join_blocks(blocks: &[TextBlock]) -> String {
    blocks
        .iter()
        .map(|block| block.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Flattens recognised text into one line that fits a single spreadsheet cell:
/// no tabs, no newlines, single spaces.
pub fn format_as_text(result: &RecognitionResult) -> String {
    let raw = if !result.paragraphs.is_empty() {
        join_blocks(&result.paragraphs)
    } else if !result.lines.is_empty() {
        join_blocks(&result.lines)
    } else {
        result.full_text.clone()
    };

    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
