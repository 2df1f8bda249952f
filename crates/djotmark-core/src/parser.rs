//! Block-structure parser.
//!
//! Two passes, both over the same line stream: a prepass that walks the
//! block structure without parsing inlines to collect link-reference
//! definitions, then the full parse that consumes them. Each block type has
//! a `parse_*` try-function returning the block and the next line index;
//! container content is re-parsed recursively over sliced line vectors.
//!
//! There are no block-level syntax errors: unterminated fences run to end of
//! input and anything unrecognized falls through to paragraph text.

use std::collections::{HashMap, HashSet};

use crate::ast::{
    Block, BlockKind, Document, Footnote, InlineSeq, LinkDef, List, ListItem, Table, TableAlign,
    plain_text,
};
use crate::attr::{Attributes, parse_attributes};
use crate::inline::{normalize_label, parse_inlines};
use crate::scanner::{Line, indent_prefix_len, indent_width, remove_indent_columns, split_lines};
use crate::source_map::SourceMap;
use crate::span::Span;

pub struct ParseResult {
    pub document: Document,
    pub source_map: SourceMap,
}

/// Parses `\n`-normalized source text into a document.
pub fn parse(source: &str) -> ParseResult {
    // Definition prepass: link references may be used before they are
    // declared, so the full parse needs the complete side table up front.
    let mut prepass = Parser::new();
    let lines = split_lines(source);
    let _ = prepass.parse_blocks(&lines, false);

    let mut parser = Parser::new();
    parser.link_defs = prepass.link_defs;
    let mut blocks = parser.parse_blocks(&lines, true);
    let mut used_ids: HashSet<String> = HashSet::new();
    assign_heading_ids(&mut blocks, &mut used_ids);

    let document = Document {
        span: Span {
            start: 0,
            end: source.len(),
        },
        blocks,
        link_defs: parser.link_defs,
        footnotes: parser.footnotes,
    };
    ParseResult {
        document,
        source_map: SourceMap::new(source),
    }
}

struct Parser {
    link_defs: HashMap<String, LinkDef>,
    footnotes: Vec<Footnote>,
}

impl Parser {
    fn new() -> Self {
        Self {
            link_defs: HashMap::new(),
            footnotes: Vec::new(),
        }
    }

    fn parse_blocks(&mut self, lines: &[Line], parse_inlines: bool) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut i = 0;
        let mut pending_attrs: Option<Attributes> = None;

        while i < lines.len() {
            let line = &lines[i];
            if line.is_blank() {
                i += 1;
                continue;
            }

            if let Some(attrs) = try_attribute_line(line) {
                match pending_attrs.as_mut() {
                    Some(pending) => pending.merge(attrs),
                    None => pending_attrs = Some(attrs),
                }
                i += 1;
                continue;
            }

            if let Some(next) = self.parse_link_def(lines, i) {
                pending_attrs = None;
                i = next;
                continue;
            }

            if let Some(next) = self.parse_footnote_def(lines, i, parse_inlines) {
                pending_attrs = None;
                i = next;
                continue;
            }

            let parsed = self
                .parse_code_block(lines, i)
                .or_else(|| self.parse_div(lines, i, parse_inlines))
                .or_else(|| parse_thematic_break(lines, i))
                .or_else(|| self.parse_blockquote(lines, i, parse_inlines))
                .or_else(|| self.parse_list(lines, i, parse_inlines))
                .or_else(|| self.parse_table(lines, i, parse_inlines))
                .or_else(|| self.parse_heading(lines, i, parse_inlines));

            if let Some((mut block, next)) = parsed {
                apply_pending_attrs(&mut block, &mut pending_attrs);
                blocks.push(block);
                i = next;
                continue;
            }

            let (mut block, next) = self.parse_paragraph(lines, i, parse_inlines);
            apply_pending_attrs(&mut block, &mut pending_attrs);
            blocks.push(block);
            i = next;
        }

        blocks
    }

    fn parse_heading(
        &mut self,
        lines: &[Line],
        i: usize,
        parse_inlines: bool,
    ) -> Option<(Block, usize)> {
        let line = &lines[i];
        let text = line.text.trim_start();
        let level = text.bytes().take_while(|b| *b == b'#').count();
        if level == 0 || level > 6 {
            return None;
        }
        let rest = &text[level..];
        if !rest.is_empty() && !rest.starts_with(' ') {
            return None;
        }
        let content_text = rest.trim();
        let marker_len = line.text.len() - text.len() + level;
        let leading = rest.len() - rest.trim_start().len();
        let base = line.start + marker_len + leading;
        let content = if parse_inlines {
            self.parse_inline(content_text, base)
        } else {
            Vec::new()
        };
        Some((
            Block {
                span: Span {
                    start: line.start,
                    end: line.end,
                },
                attrs: Attributes::default(),
                kind: BlockKind::Heading {
                    level: level as u8,
                    content,
                },
            },
            i + 1,
        ))
    }

    fn parse_code_block(&mut self, lines: &[Line], start: usize) -> Option<(Block, usize)> {
        let line = &lines[start];
        let (indent_len, fence_len, fence_char, info) = parse_fence_open(&line.text, b'`')
            .or_else(|| parse_fence_open(&line.text, b'~'))?;

        // Unterminated fences consume the rest of the input.
        let mut body = Vec::new();
        let mut i = start + 1;
        while i < lines.len() {
            let candidate = &lines[i];
            if is_fence_close(&candidate.text, fence_len, fence_char) {
                i += 1;
                break;
            }
            body.push(strip_leading_spaces(&candidate.text, indent_len).to_string());
            i += 1;
        }
        let mut text = body.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }

        let span = Span {
            start: line.start,
            end: lines[i.saturating_sub(1)].end,
        };
        // `=format` info marks a raw passthrough block for that format.
        if let Some(format) = info.strip_prefix('=') {
            let format = format.trim().to_string();
            if !format.is_empty() {
                return Some((
                    Block {
                        span,
                        attrs: Attributes::default(),
                        kind: BlockKind::RawBlock { format, text },
                    },
                    i,
                ));
            }
        }
        let (lang, attrs) = parse_fence_info(&info);
        Some((
            Block {
                span,
                attrs,
                kind: BlockKind::CodeBlock { lang, text },
            },
            i,
        ))
    }

    fn parse_div(
        &mut self,
        lines: &[Line],
        start: usize,
        parse_inlines: bool,
    ) -> Option<(Block, usize)> {
        let line = &lines[start];
        let (fence_len, rest) = parse_div_open(&line.text)?;
        let mut attrs = Attributes::default();
        let rest = rest.trim();
        if rest.starts_with('{') {
            let (parsed, consumed) = parse_attributes(rest, 0)?;
            if !rest[consumed..].trim().is_empty() {
                return None;
            }
            attrs = parsed;
        } else if !rest.is_empty() {
            // Bare word shorthand for a single class.
            if rest.contains(char::is_whitespace) {
                return None;
            }
            attrs.push_class(rest);
        }

        let mut inner = Vec::new();
        let mut i = start + 1;
        let mut depth = 1usize;
        while i < lines.len() {
            let candidate = &lines[i];
            // Verbatim regions may contain colon fences; skip them whole.
            if let Some((_, code_len, code_char, _)) = parse_fence_open(&candidate.text, b'`')
                .or_else(|| parse_fence_open(&candidate.text, b'~'))
            {
                inner.push(candidate.clone());
                i += 1;
                while i < lines.len() {
                    let code_line = &lines[i];
                    inner.push(code_line.clone());
                    i += 1;
                    if is_fence_close(&code_line.text, code_len, code_char) {
                        break;
                    }
                }
                continue;
            }
            if let Some((nested_len, nested_rest)) = parse_div_open(&candidate.text) {
                if nested_rest.trim().is_empty() {
                    // Bare colon fence: a close for the innermost open div.
                    if nested_len >= fence_len && depth == 1 {
                        i += 1;
                        break;
                    }
                    depth = depth.saturating_sub(1);
                } else {
                    depth += 1;
                }
            }
            inner.push(candidate.clone());
            i += 1;
        }
        // Unterminated divs close at end of input.

        let blocks = self.parse_blocks(&inner, parse_inlines);
        Some((
            Block {
                span: Span {
                    start: line.start,
                    end: lines[i.saturating_sub(1)].end,
                },
                attrs,
                kind: BlockKind::Div { blocks },
            },
            i,
        ))
    }

    fn parse_blockquote(
        &mut self,
        lines: &[Line],
        start: usize,
        parse_inlines: bool,
    ) -> Option<(Block, usize)> {
        let line = &lines[start];
        blockquote_content(&line.text)?;
        let mut quoted = Vec::new();
        let mut i = start;
        while i < lines.len() {
            let candidate = &lines[i];
            if let Some(content) = blockquote_content(&candidate.text) {
                let consumed = candidate.text.len() - content.len();
                quoted.push(Line {
                    text: content.to_string(),
                    start: candidate.start + consumed,
                    end: candidate.end,
                    has_newline: candidate.has_newline,
                });
                i += 1;
                continue;
            }
            if candidate.is_blank() {
                break;
            }
            // Lazy paragraph continuation.
            quoted.push(candidate.clone());
            i += 1;
        }
        let blocks = self.parse_blocks(&quoted, parse_inlines);
        Some((
            Block {
                span: Span {
                    start: line.start,
                    end: lines[i.saturating_sub(1)].end,
                },
                attrs: Attributes::default(),
                kind: BlockKind::Blockquote { blocks },
            },
            i,
        ))
    }

    fn parse_list(
        &mut self,
        lines: &[Line],
        start: usize,
        parse_inlines: bool,
    ) -> Option<(Block, usize)> {
        let first_marker = parse_list_marker(&lines[start].text)?;
        let mut items = Vec::new();
        let mut loose = false;
        let mut i = start;

        while i < lines.len() {
            let current = &lines[i];
            let marker = match parse_list_marker(&current.text) {
                Some(marker) if marker.compatible(&first_marker) => marker,
                _ => break,
            };

            let mut item_lines = Vec::new();
            item_lines.push(Line {
                text: current.text[marker.content_offset..].to_string(),
                start: current.start + marker.content_offset,
                end: current.end,
                has_newline: current.has_newline,
            });
            let mut last_line = i;
            let mut j = i + 1;
            let mut pending_blanks = 0usize;
            while j < lines.len() {
                let next = &lines[j];
                if next.is_blank() {
                    pending_blanks += 1;
                    j += 1;
                    continue;
                }
                if indent_prefix_len(&next.text, marker.content_indent).is_some() {
                    if pending_blanks > 0 {
                        loose = true;
                        for _ in 0..pending_blanks {
                            item_lines.push(Line {
                                text: String::new(),
                                start: next.start,
                                end: next.start,
                                has_newline: true,
                            });
                        }
                        pending_blanks = 0;
                    }
                    item_lines.push(Line {
                        text: remove_indent_columns(&next.text, marker.content_indent),
                        start: next.start,
                        end: next.end,
                        has_newline: next.has_newline,
                    });
                    last_line = j;
                    j += 1;
                    continue;
                }
                if let Some(next_marker) = parse_list_marker(&next.text) {
                    if next_marker.compatible(&first_marker) {
                        if pending_blanks > 0 {
                            loose = true;
                        }
                        break;
                    }
                }
                if pending_blanks == 0 {
                    // Lazy paragraph continuation of the item.
                    item_lines.push(next.clone());
                    last_line = j;
                    j += 1;
                    continue;
                }
                break;
            }

            let blocks = self.parse_blocks(&item_lines, parse_inlines);
            items.push(ListItem {
                span: Span {
                    start: current.start,
                    end: lines[last_line].end,
                },
                blocks,
            });
            if j < lines.len() && pending_blanks > 0 && parse_list_marker(&lines[j].text).is_none()
            {
                // Blank line ended the list; anything after is a new block.
                i = j;
                break;
            }
            i = j;
        }

        if items.is_empty() {
            return None;
        }
        let span = Span {
            start: lines[start].start,
            end: items
                .last()
                .map(|item| item.span.end)
                .unwrap_or(lines[start].end),
        };
        Some((
            Block {
                span,
                attrs: Attributes::default(),
                kind: BlockKind::List(List {
                    ordered: first_marker.ordered,
                    start: first_marker.number.unwrap_or(1),
                    tight: !loose,
                    items,
                }),
            },
            i,
        ))
    }

    fn parse_table(
        &mut self,
        lines: &[Line],
        start: usize,
        parse_inlines: bool,
    ) -> Option<(Block, usize)> {
        if !is_table_line(&lines[start].text) {
            return None;
        }
        let mut raw_rows: Vec<&Line> = Vec::new();
        let mut i = start;
        while i < lines.len() && is_table_line(&lines[i].text) {
            raw_rows.push(&lines[i]);
            i += 1;
        }

        let mut head = None;
        let mut aligns = Vec::new();
        let mut rows = Vec::new();
        for (idx, row_line) in raw_rows.iter().enumerate() {
            let cells = split_table_cells(row_line.text.trim());
            if idx == 1 {
                if let Some(parsed) = parse_table_separator(&cells) {
                    aligns = parsed;
                    head = Some(rows.pop().unwrap_or_default());
                    continue;
                }
            }
            let row: Vec<InlineSeq> = cells
                .iter()
                .map(|cell| {
                    if parse_inlines {
                        self.parse_inline(cell.trim(), row_line.start)
                    } else {
                        Vec::new()
                    }
                })
                .collect();
            rows.push(row);
        }

        let column_count = head
            .as_ref()
            .map(|h: &Vec<InlineSeq>| h.len())
            .or_else(|| rows.first().map(|r| r.len()))
            .unwrap_or(0);
        if column_count == 0 {
            return None;
        }
        while aligns.len() < column_count {
            aligns.push(TableAlign::None);
        }

        Some((
            Block {
                span: Span {
                    start: lines[start].start,
                    end: lines[i.saturating_sub(1)].end,
                },
                attrs: Attributes::default(),
                kind: BlockKind::Table(Table { head, aligns, rows }),
            },
            i,
        ))
    }

    fn parse_paragraph(
        &mut self,
        lines: &[Line],
        start: usize,
        parse_inlines: bool,
    ) -> (Block, usize) {
        let mut i = start;
        let mut buffer = String::new();
        while i < lines.len() && !lines[i].is_blank() {
            if i > start {
                buffer.push('\n');
            }
            // Leading whitespace is not significant inside a paragraph;
            // trailing spaces are (hard breaks).
            buffer.push_str(lines[i].text.trim_start());
            i += 1;
        }
        let trimmed_len = buffer.trim_end_matches([' ', '\t']).len();
        buffer.truncate(trimmed_len);
        let content = if parse_inlines {
            self.parse_inline(&buffer, lines[start].start)
        } else {
            Vec::new()
        };
        (
            Block {
                span: Span {
                    start: lines[start].start,
                    end: lines[i.saturating_sub(1).max(start)].end,
                },
                attrs: Attributes::default(),
                kind: BlockKind::Paragraph { content },
            },
            i,
        )
    }

    fn parse_link_def(&mut self, lines: &[Line], i: usize) -> Option<usize> {
        let text = lines[i].text.trim();
        let rest = text.strip_prefix('[')?;
        if rest.starts_with('^') {
            return None;
        }
        let close = rest.find(']')?;
        let label = &rest[..close];
        if label.is_empty() {
            return None;
        }
        let after = rest[close + 1..].strip_prefix(':')?;
        let after = after.trim();
        let (destination, title) = match after.find(char::is_whitespace) {
            Some(split) => {
                let dest = &after[..split];
                let title_part = after[split..].trim();
                let title = strip_title_quotes(title_part)?;
                (dest.to_string(), Some(title))
            }
            None => (after.to_string(), None),
        };
        if destination.is_empty() {
            return None;
        }
        self.link_defs
            .entry(normalize_label(label))
            .or_insert(LinkDef { destination, title });
        Some(i + 1)
    }

    fn parse_footnote_def(
        &mut self,
        lines: &[Line],
        start: usize,
        parse_inlines: bool,
    ) -> Option<usize> {
        let text = lines[start].text.trim_start();
        let rest = text.strip_prefix("[^")?;
        let close = rest.find(']')?;
        let label = &rest[..close];
        if label.is_empty()
            || !label
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
        {
            return None;
        }
        let body_first = rest[close + 1..].strip_prefix(':')?.trim_start();

        let mut body = Vec::new();
        let first = &lines[start];
        body.push(Line {
            text: body_first.to_string(),
            start: first.start + (first.text.len() - body_first.len()),
            end: first.end,
            has_newline: first.has_newline,
        });
        let mut i = start + 1;
        let mut pending_blanks = 0usize;
        while i < lines.len() {
            let next = &lines[i];
            if next.is_blank() {
                pending_blanks += 1;
                i += 1;
                continue;
            }
            if indent_width(&next.text) >= 2 {
                for _ in 0..pending_blanks {
                    body.push(Line {
                        text: String::new(),
                        start: next.start,
                        end: next.start,
                        has_newline: true,
                    });
                }
                pending_blanks = 0;
                body.push(Line {
                    text: remove_indent_columns(&next.text, 2),
                    start: next.start,
                    end: next.end,
                    has_newline: next.has_newline,
                });
                i += 1;
                continue;
            }
            break;
        }
        i -= pending_blanks;

        let blocks = self.parse_blocks(&body, parse_inlines);
        let label = label.to_string();
        if !self.footnotes.iter().any(|f| f.label == label) {
            self.footnotes.push(Footnote { label, blocks });
        }
        Some(i)
    }

    fn parse_inline(&mut self, text: &str, base: usize) -> InlineSeq {
        parse_inlines(text, base, &self.link_defs)
    }
}

fn apply_pending_attrs(block: &mut Block, pending: &mut Option<Attributes>) {
    if let Some(attrs) = pending.take() {
        block.attrs.merge(attrs);
    }
}

/// A line consisting solely of one or more attribute sets attaches them to
/// the following block.
fn try_attribute_line(line: &Line) -> Option<Attributes> {
    let text = line.text.trim();
    if !text.starts_with('{') {
        return None;
    }
    let mut attrs = Attributes::default();
    let mut at = 0;
    while at < text.len() {
        let (set, next) = parse_attributes(text, at)?;
        attrs.merge(set);
        at = next;
        while at < text.len() && text.as_bytes()[at] == b' ' {
            at += 1;
        }
    }
    Some(attrs)
}

fn parse_thematic_break(lines: &[Line], i: usize) -> Option<(Block, usize)> {
    let line = &lines[i];
    let text = line.text.trim();
    let marker = text.chars().find(|ch| *ch != ' ')?;
    if marker != '*' && marker != '-' {
        return None;
    }
    let count = text.chars().filter(|ch| *ch == marker).count();
    if count < 3 || !text.chars().all(|ch| ch == marker || ch == ' ') {
        return None;
    }
    Some((
        Block {
            span: Span {
                start: line.start,
                end: line.end,
            },
            attrs: Attributes::default(),
            kind: BlockKind::ThematicBreak,
        },
        i + 1,
    ))
}

/// Open fence: up to 3 leading spaces, 3+ fence characters, optional info.
/// Returns (indent bytes, fence length, fence char, info string).
fn parse_fence_open(text: &str, fence_char: u8) -> Option<(usize, usize, u8, String)> {
    let bytes = text.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() && idx < 3 && bytes[idx] == b' ' {
        idx += 1;
    }
    let fence_len = bytes[idx..]
        .iter()
        .take_while(|b| **b == fence_char)
        .count();
    if fence_len < 3 {
        return None;
    }
    let info = text[idx + fence_len..].trim();
    if fence_char == b'`' && info.contains('`') {
        return None;
    }
    Some((idx, fence_len, fence_char, info.to_string()))
}

fn is_fence_close(text: &str, fence_len: usize, fence_char: u8) -> bool {
    let trimmed = text.trim();
    let count = trimmed
        .bytes()
        .take_while(|b| *b == fence_char)
        .count();
    count >= fence_len && trimmed.bytes().all(|b| b == fence_char)
}

fn parse_div_open(text: &str) -> Option<(usize, &str)> {
    let trimmed = text.trim_start();
    if text.len() - trimmed.len() > 3 {
        return None;
    }
    let fence_len = trimmed.bytes().take_while(|b| *b == b':').count();
    if fence_len < 3 {
        return None;
    }
    Some((fence_len, &trimmed[fence_len..]))
}

fn parse_fence_info(info: &str) -> (Option<String>, Attributes) {
    if let Some(brace) = info.find('{') {
        let lang_part = info[..brace].trim();
        let lang = if lang_part.is_empty() {
            None
        } else {
            Some(lang_part.to_string())
        };
        match parse_attributes(info, brace) {
            Some((attrs, _)) => (lang, attrs),
            None => (lang, Attributes::default()),
        }
    } else if info.is_empty() {
        (None, Attributes::default())
    } else {
        (Some(info.to_string()), Attributes::default())
    }
}

fn strip_leading_spaces(text: &str, max: usize) -> &str {
    let mut idx = 0;
    let bytes = text.as_bytes();
    while idx < max && idx < bytes.len() && bytes[idx] == b' ' {
        idx += 1;
    }
    &text[idx..]
}

fn blockquote_content(text: &str) -> Option<&str> {
    let trimmed = text.trim_start();
    if text.len() - trimmed.len() > 3 {
        return None;
    }
    let rest = trimmed.strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

#[derive(Clone, Copy, Debug)]
struct ListMarker {
    ordered: bool,
    marker: u8,
    number: Option<u64>,
    /// Byte offset of the item content on the marker line.
    content_offset: usize,
    /// Visual column continuation lines must be indented to.
    content_indent: usize,
}

impl ListMarker {
    fn compatible(&self, other: &ListMarker) -> bool {
        self.ordered == other.ordered && self.marker == other.marker
    }
}

fn parse_list_marker(text: &str) -> Option<ListMarker> {
    let bytes = text.as_bytes();
    let mut idx = 0;
    let mut indent = 0;
    while idx < bytes.len() && bytes[idx] == b' ' && indent < 3 {
        idx += 1;
        indent += 1;
    }
    if idx >= bytes.len() {
        return None;
    }
    let (marker, number, marker_end) = match bytes[idx] {
        b @ (b'-' | b'*' | b'+') => (b, None, idx + 1),
        b'0'..=b'9' => {
            let mut j = idx;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j - idx > 9 || j >= bytes.len() || !matches!(bytes[j], b'.' | b')') {
                return None;
            }
            let number: u64 = text[idx..j].parse().ok()?;
            (bytes[j], Some(number), j + 1)
        }
        _ => return None,
    };
    // The marker must be followed by at least one space (or end the line).
    if marker_end < bytes.len() && bytes[marker_end] != b' ' {
        return None;
    }
    let mut content_offset = marker_end;
    while content_offset < bytes.len() && bytes[content_offset] == b' ' {
        content_offset += 1;
    }
    let content_indent = if content_offset >= bytes.len() {
        marker_end - idx + indent + 1
    } else {
        content_offset
    };
    Some(ListMarker {
        ordered: number.is_some(),
        marker,
        number,
        content_offset,
        content_indent,
    })
}

fn is_table_line(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed.ends_with('|')
}

fn split_table_cells(text: &str) -> Vec<String> {
    let inner = &text[1..text.len() - 1];
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                if let Some(next) = chars.next() {
                    if next != '|' {
                        current.push('\\');
                    }
                    current.push(next);
                } else {
                    current.push('\\');
                }
            }
            '|' => cells.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    cells.push(current);
    cells
}

fn parse_table_separator(cells: &[String]) -> Option<Vec<TableAlign>> {
    let mut aligns = Vec::new();
    for cell in cells {
        let cell = cell.trim();
        if cell.is_empty() {
            return None;
        }
        let left = cell.starts_with(':');
        let right = cell.ends_with(':');
        let dashes = cell.trim_matches(':');
        if dashes.is_empty() || !dashes.bytes().all(|b| b == b'-') {
            return None;
        }
        aligns.push(match (left, right) {
            (true, true) => TableAlign::Center,
            (true, false) => TableAlign::Left,
            (false, true) => TableAlign::Right,
            (false, false) => TableAlign::None,
        });
    }
    Some(aligns)
}

fn strip_title_quotes(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    if bytes.len() < 2 {
        return None;
    }
    let quote = bytes[0];
    if (quote == b'"' || quote == b'\'') && bytes[bytes.len() - 1] == quote {
        Some(text[1..text.len() - 1].to_string())
    } else {
        None
    }
}

/// Gives every heading a stable id for anchors: an explicit `{#id}` wins,
/// otherwise a slug of the heading text, deduplicated with `-N` suffixes.
fn assign_heading_ids(blocks: &mut [Block], used: &mut HashSet<String>) {
    for block in blocks.iter_mut() {
        match &mut block.kind {
            BlockKind::Heading { content, .. } => {
                if let Some(id) = &block.attrs.id {
                    used.insert(id.clone());
                    continue;
                }
                let slug = slugify(&plain_text(content));
                let mut candidate = if slug.is_empty() {
                    "section".to_string()
                } else {
                    slug.clone()
                };
                let mut counter = 1;
                while used.contains(&candidate) {
                    counter += 1;
                    candidate = format!("{}-{}", slug, counter);
                }
                used.insert(candidate.clone());
                block.attrs.id = Some(candidate);
            }
            BlockKind::Div { blocks } | BlockKind::Blockquote { blocks } => {
                assign_heading_ids(blocks, used);
            }
            BlockKind::List(list) => {
                for item in &mut list.items {
                    assign_heading_ids(&mut item.blocks, used);
                }
            }
            _ => {}
        }
    }
}

fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut last_dash = true;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
