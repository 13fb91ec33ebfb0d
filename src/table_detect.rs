use std::sync::LazyLock;

use regex::Regex;

use crate::line_group::group_into_lines;
use crate::model::{Line, RecognizedWord};

pub(crate) const MIN_TABLE_LINES: usize = 3;
pub(crate) const MIN_AVG_COLUMNS: f32 = 2.5;
pub(crate) const COLUMN_COUNT_SLACK: f32 = 1.0;
pub(crate) const MIN_CONSISTENT_LINE_RATIO: f32 = 0.7;
pub(crate) const PROSE_WORD_THRESHOLD: usize = 20;
pub(crate) const ALIGNMENT_TOLERANCE_PX: f32 = 30.0;
pub(crate) const MIN_ALIGNED_POSITION_RATIO: f32 = 0.5;
pub(crate) const MIN_ALIGNED_LINE_RATIO: f32 = 0.4;
pub(crate) const MIN_NUMERIC_WORD_RATIO: f32 = 0.3;
pub(crate) const MAX_COMPLETE_WORD_RATIO: f32 = 0.7;

const CONNECTOR_WORDS: [&str; 12] = [
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

static BORDER_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[|\-+=_\s]+$").expect("hardcoded border token regex is valid")
});
static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+[.,]\d+").expect("hardcoded decimal regex is valid"));

/// True for tokens that only draw table borders.
pub(crate) fn is_border_token(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || BORDER_TOKEN_RE.is_match(trimmed)
}

pub(crate) fn without_border_tokens(words: &[RecognizedWord]) -> Vec<RecognizedWord> {
    words
        .iter()
        .filter(|word| !is_border_token(&word.text))
        .cloned()
        .collect()
}

fn is_numeric_word(text: &str) -> bool {
    text.chars().any(|ch| ch.is_ascii_digit() || ch == '%') || DECIMAL_RE.is_match(text)
}

fn ratio(count: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    count as f32 / total as f32
}

/// Connector words, or mostly long non-numeric words, mean running text.
pub(crate) fn reads_like_prose(lines: &[Line]) -> bool {
    let words = lines
        .iter()
        .flat_map(|line| line.words.iter().map(|word| word.text.as_str()))
        .collect::<Vec<_>>();
    if words.is_empty() {
        return false;
    }

    let lowered = words.join(" ").to_lowercase();
    let has_connectors = lowered
        .split(|ch: char| !ch.is_alphanumeric())
        .any(|token| CONNECTOR_WORDS.contains(&token));

    let complete_words = words
        .iter()
        .filter(|word| {
            word.chars().count() > 2 && !word.chars().all(|ch| ch.is_ascii_digit())
        })
        .count();

    has_connectors || ratio(complete_words, words.len()) > MAX_COMPLETE_WORD_RATIO
}

pub(crate) fn has_table_structure(lines: &[Line]) -> bool {
    let Some((first, rest)) = lines.split_first() else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }

    let total_words = lines
        .iter()
        .map(|line| line.joined_text(" ").split_whitespace().count())
        .sum::<usize>();
    if total_words > PROSE_WORD_THRESHOLD && reads_like_prose(lines) {
        return false;
    }

    let aligned_lines = rest
        .iter()
        .filter(|line| line.len() == first.len())
        .filter(|line| {
            let aligned = first
                .words
                .iter()
                .zip(&line.words)
                .filter(|(top, other)| (top.bbox.x0 - other.bbox.x0).abs() <= ALIGNMENT_TOLERANCE_PX)
                .count();
            ratio(aligned, first.len()) >= MIN_ALIGNED_POSITION_RATIO
        })
        .count();

    ratio(aligned_lines, rest.len()) >= MIN_ALIGNED_LINE_RATIO
}

/// Conservative tabular-content check over one image's recognised words.
pub fn is_table(words: &[RecognizedWord]) -> bool {
    let filtered = without_border_tokens(words);
    let lines = group_into_lines(&filtered);
    if lines.len() < MIN_TABLE_LINES {
        return false;
    }

    let column_counts = lines.iter().map(Line::len).collect::<Vec<_>>();
    let avg_columns = column_counts.iter().sum::<usize>() as f32 / column_counts.len() as f32;
    if avg_columns < MIN_AVG_COLUMNS {
        return false;
    }

    let consistent = column_counts
        .iter()
        .filter(|&&count| (count as f32 - avg_columns).abs() <= COLUMN_COUNT_SLACK)
        .count();
    if ratio(consistent, lines.len()) < MIN_CONSISTENT_LINE_RATIO {
        return false;
    }

    if !has_table_structure(&lines) {
        return false;
    }

    let numeric = filtered
        .iter()
        .filter(|word| is_numeric_word(&word.text))
        .count();
    ratio(numeric, filtered.len()) >= MIN_NUMERIC_WORD_RATIO
}
