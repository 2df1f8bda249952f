//! Line scanner: turns normalized source text into a random-access list of
//! lines with byte offsets, plus the column arithmetic shared by the block
//! parser (indentation matching, tab expansion).
//!
//! The scanner assumes `\n`-only input; the converter facade normalizes
//! `\r\n` and bare `\r` before parsing.

/// A single source line without its trailing newline.
#[derive(Clone, Debug)]
pub struct Line {
    pub text: String,
    /// Byte offset of the first character in the source.
    pub start: usize,
    /// Byte offset just past the last character (excluding the newline).
    pub end: usize,
    pub has_newline: bool,
}

impl Line {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

pub fn split_lines(source: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (idx, byte) in source.bytes().enumerate() {
        if byte == b'\n' {
            lines.push(Line {
                text: source[start..idx].to_string(),
                start,
                end: idx,
                has_newline: true,
            });
            start = idx + 1;
        }
    }
    if start < source.len() {
        lines.push(Line {
            text: source[start..].to_string(),
            start,
            end: source.len(),
            has_newline: false,
        });
    }
    lines
}

/// Advances a visual column by one byte, treating tabs as 4-column stops.
/// Returns `None` for the first non-whitespace byte.
pub fn advance_column(columns: usize, byte: u8) -> Option<usize> {
    match byte {
        b' ' => Some(columns + 1),
        b'\t' => Some(columns + (4 - columns % 4)),
        _ => None,
    }
}

/// Returns the byte length of the leading whitespace if the line is indented
/// by at least `required` visual columns.
pub fn indent_prefix_len(text: &str, required: usize) -> Option<usize> {
    if required == 0 {
        return Some(0);
    }
    let mut cols = 0;
    for (idx, byte) in text.bytes().enumerate() {
        match advance_column(cols, byte) {
            Some(next) => {
                cols = next;
                if cols >= required {
                    return Some(idx + 1);
                }
            }
            None => return None,
        }
    }
    None
}

/// Counts the visual indentation width of a line.
pub fn indent_width(text: &str) -> usize {
    let mut cols = 0;
    for byte in text.bytes() {
        match advance_column(cols, byte) {
            Some(next) => cols = next,
            None => break,
        }
    }
    cols
}

/// Removes `columns` visual columns of indentation, expanding a partially
/// consumed tab into spaces so the remainder keeps its alignment.
pub fn remove_indent_columns(text: &str, columns: usize) -> String {
    let bytes = text.as_bytes();
    let mut cols = 0;
    let mut idx = 0;
    while idx < bytes.len() && cols < columns {
        match advance_column(cols, bytes[idx]) {
            Some(next) => {
                idx += 1;
                cols = next;
            }
            None => break,
        }
    }
    let mut out = String::new();
    for _ in columns..cols {
        out.push(' ');
    }
    out.push_str(&text[idx..]);
    out
}

/// Expands tabs to spaces at the given tab width. Used when emitting code
/// block text; the AST keeps the literal tabs.
pub fn expand_tabs(text: &str, tab_width: usize) -> String {
    if tab_width == 0 || !text.contains('\t') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut col = 0;
    for ch in text.chars() {
        match ch {
            '\t' => {
                let pad = tab_width - col % tab_width;
                for _ in 0..pad {
                    out.push(' ');
                }
                col += pad;
            }
            '\n' => {
                out.push('\n');
                col = 0;
            }
            other => {
                out.push(other);
                col += 1;
            }
        }
    }
    out
}
