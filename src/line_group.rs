use crate::model::{Line, RecognizedWord};

pub(crate) const DEFAULT_LINE_HEIGHT: f32 = 20.0;
pub(crate) const LINE_TOLERANCE_RATIO: f32 = 0.5;
pub(crate) const MIN_LINE_TOLERANCE: f32 = 10.0;

fn line_tolerance(anchor: &RecognizedWord) -> f32 {
    let height = anchor.bbox.height();
    let line_height = if height > 0.0 {
        height
    } else {
        DEFAULT_LINE_HEIGHT
    };
    (line_height * LINE_TOLERANCE_RATIO).max(MIN_LINE_TOLERANCE)
}

fn close_line(mut words: Vec<RecognizedWord>, lines: &mut Vec<Line>) {
    if words.is_empty() {
        return;
    }
    words.sort_by(|left, right| left.bbox.x0.total_cmp(&right.bbox.x0));
    lines.push(Line { words });
}

/// Partitions words into visual rows. Rows come out top to bottom and every
/// word lands in exactly one row.
pub fn group_into_lines(words: &[RecognizedWord]) -> Vec<Line> {
    let mut sorted = words.to_vec();
    sorted.sort_by(|left, right| left.bbox.y0.total_cmp(&right.bbox.y0));

    let mut lines = Vec::new();
    let mut current: Vec<RecognizedWord> = Vec::new();

    for word in sorted {
        if let Some(anchor) = current.first()
            && (word.bbox.y0 - anchor.bbox.y0).abs() > line_tolerance(anchor)
        {
            close_line(std::mem::take(&mut current), &mut lines);
        }
        current.push(word);
    }

    close_line(current, &mut lines);
    lines
}

#[cfg(test)]
mod tests {
    use super::group_into_lines;
    use crate::model::{BoundingBox, RecognizedWord};

    fn word(text: &str, x0: f32, y0: f32, height: f32) -> RecognizedWord {
        RecognizedWord::new(text, BoundingBox::new(x0, y0, x0 + 30.0, y0 + height), 0.9)
    }

    #[test]
    fn empty_input_yields_no_lines() {
        assert!(group_into_lines(&[]).is_empty());
    }

    #[test]
    fn groups_by_vertical_band_and_sorts_by_x() {
        let words = vec![
            word("b", 100.0, 12.0, 20.0),
            word("c", 10.0, 50.0, 20.0),
            word("a", 10.0, 10.0, 20.0),
        ];
        let lines = group_into_lines(&words);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].joined_text(" "), "a b");
        assert_eq!(lines[1].joined_text(" "), "c");
    }

    #[test]
    fn tolerance_never_drops_below_minimum() {
        // 4px-high glyphs would give a 2px tolerance; the floor keeps them together.
        let words = vec![word("x", 0.0, 0.0, 4.0), word("y", 40.0, 9.0, 4.0)];
        assert_eq!(group_into_lines(&words).len(), 1);
    }

    #[test]
    fn degenerate_height_uses_default_line_height() {
        let words = vec![word("x", 0.0, 0.0, 0.0), word("y", 40.0, 10.5, 0.0)];
        assert_eq!(group_into_lines(&words).len(), 2);
    }

    #[test]
    fn tall_anchor_widens_tolerance() {
        let words = vec![word("x", 0.0, 0.0, 60.0), word("y", 40.0, 25.0, 20.0)];
        assert_eq!(group_into_lines(&words).len(), 1);
    }
}
