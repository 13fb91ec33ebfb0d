use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Three-digit percentages above this value are read as a missed decimal point.
pub(crate) const THREE_DIGIT_PERCENT_MIN: u32 = 100;
pub(crate) const THREE_DIGIT_PERCENT_MAX: u32 = 1000;
/// Two-digit percentages strictly inside this band get a decimal point.
pub(crate) const TWO_DIGIT_PERCENT_BAND: (u32, u32) = (80, 90);
pub(crate) const MAX_SPLIT_DECIMAL_DIGITS: usize = 2;

static THREE_DIGIT_PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^\d.,])(\d{3})%").expect("hardcoded three-digit percent regex is valid")
});
static TWO_DIGIT_PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^\d.,])(\d{2})%").expect("hardcoded two-digit percent regex is valid")
});
static SPACED_PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s+(\d+)%").expect("hardcoded spaced percent regex is valid")
});
static COMMA_PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)[,，](\d+)%").expect("hardcoded comma percent regex is valid")
});
static LETTER_O_PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)[oO](\d+)%").expect("hardcoded letter-o percent regex is valid")
});
static ZERO_PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^\d.,])(\d{2,})0(\d)%").expect("hardcoded stray-zero percent regex is valid")
});

fn is_all_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|ch| ch.is_ascii_digit())
}

fn is_digits_then_percent(value: &str) -> bool {
    value.strip_suffix('%').is_some_and(is_all_digits)
}

/// True when `left` and `right` are most likely two halves of one number that
/// the recogniser split at a decimal point or before a percent sign.
pub fn looks_like_number_part(left: &str, right: &str) -> bool {
    let left_digits = is_all_digits(left);

    (left_digits && is_digits_then_percent(right))
        || (left_digits && is_all_digits(right) && right.len() <= MAX_SPLIT_DECIMAL_DIGITS)
        || (left.chars().last().is_some_and(|ch| ch.is_ascii_digit()) && right.starts_with('%'))
        || (left_digits && (right.starts_with('.') || right.starts_with(',')))
}

fn insert_point_before_last_digit(caps: &Captures<'_>, accept: impl Fn(u32) -> bool) -> String {
    let prefix = &caps[1];
    let digits = &caps[2];
    match digits.parse::<u32>() {
        Ok(value) if accept(value) => {
            let (head, tail) = digits.split_at(digits.len() - 1);
            format!("{prefix}{head}.{tail}%")
        }
        _ => caps[0].to_string(),
    }
}

/// Repairs percentages whose decimal point the recogniser dropped or misread.
pub fn fix_decimal_points(text: &str) -> String {
    let text = THREE_DIGIT_PERCENT_RE.replace_all(text, |caps: &Captures<'_>| {
        insert_point_before_last_digit(caps, |value| {
            value > THREE_DIGIT_PERCENT_MIN && value < THREE_DIGIT_PERCENT_MAX
        })
    });
    let text = TWO_DIGIT_PERCENT_RE.replace_all(&text, |caps: &Captures<'_>| {
        let (low, high) = TWO_DIGIT_PERCENT_BAND;
        insert_point_before_last_digit(caps, |value| value > low && value < high)
    });
    let text = SPACED_PERCENT_RE.replace_all(&text, "${1}.${2}%");
    let text = COMMA_PERCENT_RE.replace_all(&text, "${1}.${2}%");
    let text = LETTER_O_PERCENT_RE.replace_all(&text, "${1}.${2}%");
    // A zero only stands in for the point in percentages of four or more digits.
    let text = ZERO_PERCENT_RE.replace_all(&text, "${1}${2}.${3}%");
    text.into_owned()
}

fn is_table_border_char(ch: char) -> bool {
    matches!(ch, '_' | '|' | '-' | '+' | '=')
}

fn is_leader_char(ch: char) -> bool {
    matches!(ch, '.' | '·' | '…' | '—' | '–' | ' ')
}

/// Strips table-drawing characters and collapses whitespace. Applying it twice
/// gives the same result as applying it once.
pub fn remove_table_artifacts(text: &str) -> String {
    let stripped = text
        .chars()
        .filter(|ch| !is_table_border_char(*ch))
        .collect::<String>();
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().all(is_leader_char) {
        return String::new();
    }

    collapsed
}
