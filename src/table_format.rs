use crate::column_group::{classify_row, group_into_columns};
use crate::line_group::group_into_lines;
use crate::model::RecognizedWord;
use crate::numeric_fix::{fix_decimal_points, remove_table_artifacts};
use crate::options::HeaderPolicy;
use crate::table_detect::without_border_tokens;

fn clean_cell(raw: &str) -> String {
    remove_table_artifacts(&fix_decimal_points(raw.trim()))
}

/// Renders recognised words as tab-separated rows, one line per visual row.
pub fn format_as_table(words: &[RecognizedWord], policy: HeaderPolicy) -> String {
    let filtered = without_border_tokens(words);
    let lines = group_into_lines(&filtered);

    let mut rows = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        let kind = classify_row(line, index, policy);
        let cells = group_into_columns(line, kind)
            .iter()
            .map(|column| clean_cell(&column.text()))
            .filter(|cell| !cell.is_empty())
            .collect::<Vec<_>>();

        if !cells.is_empty() {
            rows.push(cells.join("\t"));
        }
    }

    rows.join("\n").trim_end().to_string()
}
