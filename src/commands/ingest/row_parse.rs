use super::*;

const DELIMITER: char = ',';
const QUOTE: char = '"';
const UTF8_BOM: char = '\u{feff}';

/// Splits one line of delimited text into cells.
///
/// A quote toggles the in-quotes state and is never kept; a doubled quote
/// is two toggles. A delimiter inside quotes is literal. An unterminated
/// quote is closed by the end of the line.
pub(super) fn split_row(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            QUOTE => in_quotes = !in_quotes,
            DELIMITER if !in_quotes => cells.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }

    cells.push(current);
    cells
}

/// Lines of the source with a trailing `\r` removed. The empty segment after
/// a final newline is not a line.
pub(super) fn source_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .strip_suffix('\n')
        .unwrap_or(content)
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

pub(super) fn parse_header(line: &str) -> Vec<String> {
    let line = line.strip_prefix(UTF8_BOM).unwrap_or(line);
    split_row(line)
        .into_iter()
        .map(|label| label.trim().to_string())
        .collect()
}

pub(super) fn is_blank_line(line: &str) -> bool {
    line.trim().is_empty()
}
