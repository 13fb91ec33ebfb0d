use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Column, Line, RecognizedWord};
use crate::numeric_fix::looks_like_number_part;
use crate::options::HeaderPolicy;

pub(crate) const HEADER_GAP_RATIO: f32 = 1.5;
pub(crate) const HEADER_YEAR_GAP_RATIO: f32 = 0.8;
pub(crate) const HEADER_WORD_GAP_RATIO: f32 = 1.0;
pub(crate) const DATA_GAP_RATIO: f32 = 0.5;

static CJK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\u{4E00}-\u{9FFF}]{2,}").expect("hardcoded CJK run regex is valid")
});
static YEAR_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)20\d{2}(?:\D|$)").expect("hardcoded year token regex is valid")
});
static BARE_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^20\d{2}$").expect("hardcoded bare year regex is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Header,
    Data,
}

/// Glyphs recognised as separate words still form a CJK run, so the run is
/// searched in the unspaced text while year tokens need word boundaries.
fn looks_like_cjk_header(line: &Line) -> bool {
    let compact = line.joined_text("");
    let spaced = line.joined_text(" ");
    let has_numbers = spaced.chars().any(|ch| ch.is_ascii_digit() || ch == '%');
    CJK_RUN_RE.is_match(&compact) && (!has_numbers || YEAR_TOKEN_RE.is_match(&spaced))
}

/// Decides which clustering strategy a table line gets. `line_index` is the
/// line's position within the table.
pub fn classify_row(line: &Line, line_index: usize, policy: HeaderPolicy) -> RowKind {
    let is_header = match policy {
        HeaderPolicy::Cjk => looks_like_cjk_header(line),
        HeaderPolicy::FirstLine => line_index == 0,
        HeaderPolicy::Never => false,
    };

    if is_header {
        RowKind::Header
    } else {
        RowKind::Data
    }
}

fn partition<'a>(
    words: &'a [RecognizedWord],
    starts_column: impl Fn(&RecognizedWord, &RecognizedWord) -> bool,
) -> Vec<Column<'a>> {
    if words.is_empty() {
        return Vec::new();
    }

    let mut columns = Vec::new();
    let mut start = 0;
    for index in 1..words.len() {
        if starts_column(&words[index - 1], &words[index]) {
            columns.push(Column {
                words: &words[start..index],
            });
            start = index;
        }
    }
    columns.push(Column {
        words: &words[start..],
    });
    columns
}

fn gap(previous: &RecognizedWord, next: &RecognizedWord) -> f32 {
    next.bbox.x0 - previous.bbox.x1
}

fn group_header_columns(words: &[RecognizedWord]) -> Vec<Column<'_>> {
    let avg_word_width = if words.is_empty() {
        0.0
    } else {
        words.iter().map(|word| word.bbox.width()).sum::<f32>() / words.len() as f32
    };

    partition(words, |previous, next| {
        let gap = gap(previous, next);
        let text = next.text.trim();
        gap > avg_word_width * HEADER_GAP_RATIO
            || (BARE_YEAR_RE.is_match(text) && gap > avg_word_width * HEADER_YEAR_GAP_RATIO)
            || (text.chars().count() >= 2 && gap > avg_word_width * HEADER_WORD_GAP_RATIO)
    })
}

fn group_data_columns(words: &[RecognizedWord]) -> Vec<Column<'_>> {
    partition(words, |previous, next| {
        gap(previous, next) > previous.bbox.width() * DATA_GAP_RATIO
            && !looks_like_number_part(previous.text.trim(), next.text.trim())
    })
}

/// Clusters a line's words into table fields. The columns are contiguous
/// slices of `line.words` and together cover it exactly once.
pub fn group_into_columns(line: &Line, kind: RowKind) -> Vec<Column<'_>> {
    match kind {
        RowKind::Header => group_header_columns(&line.words),
        RowKind::Data => group_data_columns(&line.words),
    }
}
