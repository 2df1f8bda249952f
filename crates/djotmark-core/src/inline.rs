//! Inline parser: a single left-to-right scan over the text content of a
//! leaf block, building a flat node list plus a delimiter stack that is
//! resolved into nested emphasis-like spans afterwards.
//!
//! Djot inverts the common Markdown emphasis markers: `*` produces Strong
//! and `_` produces Emphasis. All symmetric pairs (`*`, `_`, `^`, `~`,
//! `{=..=}`, `{+..+}`, `{-..-}`) share one flanking rule: an opener may not
//! be followed by whitespace, a closer may not be preceded by it. Anything
//! unmatched stays literal text; inline parsing never fails.

use std::collections::HashMap;

use crate::ast::{Inline, InlineKind, InlineSeq, LinkDef, plain_text};
use crate::attr::{Attributes, parse_attributes};
use crate::span::Span;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum DelimKind {
    Strong,
    Emphasis,
    Superscript,
    Subscript,
    Highlight,
    Insert,
    Delete,
}

impl DelimKind {
    fn wrap(self, children: InlineSeq) -> InlineKind {
        match self {
            DelimKind::Strong => InlineKind::Strong(children),
            DelimKind::Emphasis => InlineKind::Emphasis(children),
            DelimKind::Superscript => InlineKind::Superscript(children),
            DelimKind::Subscript => InlineKind::Subscript(children),
            DelimKind::Highlight => InlineKind::Highlight(children),
            DelimKind::Insert => InlineKind::Insert(children),
            DelimKind::Delete => InlineKind::Delete(children),
        }
    }
}

#[derive(Clone, Debug)]
struct Delimiter {
    kind: DelimKind,
    node_index: usize,
    can_open: bool,
    can_close: bool,
}

#[derive(Clone, Debug)]
struct BracketEntry {
    node_index: usize,
    image: bool,
    active: bool,
}

pub(crate) fn parse_inlines(
    text: &str,
    base: usize,
    link_defs: &HashMap<String, LinkDef>,
) -> InlineSeq {
    InlineParser { base, link_defs }.parse(text)
}

struct InlineParser<'a> {
    base: usize,
    link_defs: &'a HashMap<String, LinkDef>,
}

impl<'a> InlineParser<'a> {
    fn parse(&self, text: &str) -> InlineSeq {
        let bytes = text.as_bytes();
        let end = bytes.len();
        let mut out: InlineSeq = Vec::new();
        let mut delims: Vec<Delimiter> = Vec::new();
        let mut brackets: Vec<BracketEntry> = Vec::new();
        let mut text_buf = String::new();
        let mut text_start = 0;
        let mut i = 0;

        while i < end {
            let b = bytes[i];
            match b {
                b'\\' => {
                    if i + 1 < end {
                        let next = bytes[i + 1];
                        if next == b'\n' {
                            self.flush(&mut out, &mut text_buf, &mut text_start, i);
                            out.push(Inline::new(self.span(i, i + 2), InlineKind::HardBreak));
                            i += 2;
                            text_start = i;
                            continue;
                        }
                        if next.is_ascii_punctuation() {
                            if text_buf.is_empty() {
                                text_start = i;
                            }
                            text_buf.push(next as char);
                            i += 2;
                            continue;
                        }
                    }
                    if text_buf.is_empty() {
                        text_start = i;
                    }
                    text_buf.push('\\');
                    i += 1;
                }
                b'`' => {
                    if let Some((inline, next)) = self.parse_code_span(text, i) {
                        self.flush(&mut out, &mut text_buf, &mut text_start, i);
                        out.push(inline);
                        i = next;
                        text_start = i;
                    } else {
                        let run = count_run(bytes, i, b'`');
                        if text_buf.is_empty() {
                            text_start = i;
                        }
                        for _ in 0..run {
                            text_buf.push('`');
                        }
                        i += run;
                    }
                }
                b'<' => {
                    if let Some((inline, next)) = self.parse_autolink(text, i) {
                        self.flush(&mut out, &mut text_buf, &mut text_start, i);
                        out.push(inline);
                        i = next;
                        text_start = i;
                    } else {
                        if text_buf.is_empty() {
                            text_start = i;
                        }
                        text_buf.push('<');
                        i += 1;
                    }
                }
                b'!' if i + 1 < end && bytes[i + 1] == b'[' => {
                    self.flush(&mut out, &mut text_buf, &mut text_start, i);
                    out.push(Inline::new(
                        self.span(i, i + 2),
                        InlineKind::Text("![".to_string()),
                    ));
                    brackets.push(BracketEntry {
                        node_index: out.len() - 1,
                        image: true,
                        active: true,
                    });
                    i += 2;
                    text_start = i;
                }
                b'[' => {
                    if let Some((inline, next)) = self.parse_footnote_ref(text, i) {
                        self.flush(&mut out, &mut text_buf, &mut text_start, i);
                        out.push(inline);
                        i = next;
                        text_start = i;
                        continue;
                    }
                    self.flush(&mut out, &mut text_buf, &mut text_start, i);
                    out.push(Inline::new(
                        self.span(i, i + 1),
                        InlineKind::Text("[".to_string()),
                    ));
                    brackets.push(BracketEntry {
                        node_index: out.len() - 1,
                        image: false,
                        active: true,
                    });
                    i += 1;
                    text_start = i;
                }
                b']' => {
                    self.flush(&mut out, &mut text_buf, &mut text_start, i);
                    if let Some(next) =
                        self.close_bracket(text, i, &mut out, &mut delims, &mut brackets)
                    {
                        i = next;
                        text_start = i;
                    } else {
                        if text_buf.is_empty() {
                            text_start = i;
                        }
                        text_buf.push(']');
                        i += 1;
                    }
                }
                b'{' if i + 1 < end && matches!(bytes[i + 1], b'=' | b'+' | b'-') => {
                    let kind = match bytes[i + 1] {
                        b'=' => DelimKind::Highlight,
                        b'+' => DelimKind::Insert,
                        _ => DelimKind::Delete,
                    };
                    let after = text[i + 2..].chars().next();
                    let can_open = after.is_some_and(|ch| !ch.is_whitespace());
                    self.flush(&mut out, &mut text_buf, &mut text_start, i);
                    out.push(Inline::new(
                        self.span(i, i + 2),
                        InlineKind::Text(text[i..i + 2].to_string()),
                    ));
                    delims.push(Delimiter {
                        kind,
                        node_index: out.len() - 1,
                        can_open,
                        can_close: false,
                    });
                    i += 2;
                    text_start = i;
                }
                b'{' => {
                    match self.try_trailing_attributes(
                        text,
                        i,
                        &mut out,
                        &mut text_buf,
                        &mut text_start,
                        &delims,
                        &brackets,
                    ) {
                        Some(next) => {
                            i = next;
                            text_start = i;
                        }
                        None => {
                            if text_buf.is_empty() {
                                text_start = i;
                            }
                            text_buf.push('{');
                            i += 1;
                        }
                    }
                }
                b'=' | b'+' | b'-' if i + 1 < end && bytes[i + 1] == b'}' => {
                    self.flush(&mut out, &mut text_buf, &mut text_start, i);
                    self.push_brace_closer(text, i, b, &mut out, &mut delims);
                    i += 2;
                    text_start = i;
                }
                b'*' | b'_' | b'^' | b'~' => {
                    let run = count_run(bytes, i, b);
                    let kind = match b {
                        b'*' => DelimKind::Strong,
                        b'_' => DelimKind::Emphasis,
                        b'^' => DelimKind::Superscript,
                        _ => DelimKind::Subscript,
                    };
                    let (can_open, can_close) = flanking(text, i, run);
                    self.flush(&mut out, &mut text_buf, &mut text_start, i);
                    out.push(Inline::new(
                        self.span(i, i + run),
                        InlineKind::Text(text[i..i + run].to_string()),
                    ));
                    if can_open || can_close {
                        delims.push(Delimiter {
                            kind,
                            node_index: out.len() - 1,
                            can_open,
                            can_close,
                        });
                    }
                    i += run;
                    text_start = i;
                }
                b'"' | b'\'' => {
                    let before = text[..i].chars().next_back();
                    let open = match before {
                        None => true,
                        Some(ch) => ch.is_whitespace() || matches!(ch, '(' | '[' | '{'),
                    };
                    self.flush(&mut out, &mut text_buf, &mut text_start, i);
                    out.push(Inline::new(
                        self.span(i, i + 1),
                        InlineKind::SmartQuote {
                            open,
                            double: b == b'"',
                        },
                    ));
                    i += 1;
                    text_start = i;
                }
                b'\n' => {
                    let trailing = text_buf.chars().rev().take_while(|ch| *ch == ' ').count();
                    let hard = trailing >= 2;
                    for _ in 0..trailing {
                        text_buf.pop();
                    }
                    self.flush(&mut out, &mut text_buf, &mut text_start, i);
                    out.push(Inline::new(
                        self.span(i, i + 1),
                        if hard {
                            InlineKind::HardBreak
                        } else {
                            InlineKind::SoftBreak
                        },
                    ));
                    i += 1;
                    text_start = i;
                }
                _ => {
                    if text_buf.is_empty() {
                        text_start = i;
                    }
                    let ch = match text[i..].chars().next() {
                        Some(ch) => ch,
                        None => break,
                    };
                    text_buf.push(ch);
                    i += ch.len_utf8();
                }
            }
        }

        self.flush(&mut out, &mut text_buf, &mut text_start, end);
        resolve_delimiters(&mut out, &mut delims, 0);
        out
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span {
            start: self.base + start,
            end: self.base + end,
        }
    }

    fn flush(&self, out: &mut InlineSeq, text_buf: &mut String, text_start: &mut usize, at: usize) {
        if text_buf.is_empty() {
            *text_start = at;
            return;
        }
        let span = self.span(*text_start, at);
        out.push(Inline::new(span, InlineKind::Text(std::mem::take(text_buf))));
        *text_start = at;
    }

    fn push_brace_closer(
        &self,
        text: &str,
        i: usize,
        marker: u8,
        out: &mut InlineSeq,
        delims: &mut Vec<Delimiter>,
    ) {
        let kind = match marker {
            b'=' => DelimKind::Highlight,
            b'+' => DelimKind::Insert,
            _ => DelimKind::Delete,
        };
        let before = text[..i].chars().next_back();
        let can_close = before.is_some_and(|ch| !ch.is_whitespace());
        out.push(Inline::new(
            self.span(i, i + 2),
            InlineKind::Text(text[i..i + 2].to_string()),
        ));
        delims.push(Delimiter {
            kind,
            node_index: out.len() - 1,
            can_open: false,
            can_close,
        });
    }

    fn parse_code_span(&self, text: &str, start: usize) -> Option<(Inline, usize)> {
        let bytes = text.as_bytes();
        let run = count_run(bytes, start, b'`');
        let mut i = start + run;
        while i < bytes.len() {
            if bytes[i] == b'`' {
                let close = count_run(bytes, i, b'`');
                if close == run {
                    let mut content = text[start + run..i].replace('\n', " ");
                    if content.starts_with(' ')
                        && content.ends_with(' ')
                        && content.len() >= 2
                        && content.bytes().any(|b| b != b' ')
                    {
                        content = content[1..content.len() - 1].to_string();
                    }
                    let mut next = i + run;
                    // A raw-format marker turns the span into raw inline
                    // content; any other attribute set attaches to the span.
                    if let Some(format) = parse_raw_format(text, next) {
                        let consumed = next + format.len() + 3;
                        let inline = Inline::new(
                            self.span(start, consumed),
                            InlineKind::RawInline {
                                format,
                                text: content,
                            },
                        );
                        return Some((inline, consumed));
                    }
                    let mut inline =
                        Inline::new(self.span(start, next), InlineKind::CodeSpan(content));
                    next = self.attach_attributes(text, next, &mut inline.attrs);
                    inline.span.end = self.base + next;
                    return Some((inline, next));
                }
                i += close;
                continue;
            }
            i += 1;
        }
        None
    }

    fn parse_autolink(&self, text: &str, start: usize) -> Option<(Inline, usize)> {
        let bytes = text.as_bytes();
        let mut i = start + 1;
        if i >= bytes.len() || !bytes[i].is_ascii_alphabetic() {
            return None;
        }
        while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'+' | b'-' | b'.'))
        {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b':' {
            return None;
        }
        while i < bytes.len() {
            match bytes[i] {
                b'>' => {
                    let url = &text[start + 1..i];
                    let span = self.span(start, i + 1);
                    let children = vec![Inline::new(span, InlineKind::Text(url.to_string()))];
                    return Some((
                        Inline::new(
                            span,
                            InlineKind::Link {
                                children,
                                destination: url.to_string(),
                                title: None,
                            },
                        ),
                        i + 1,
                    ));
                }
                b' ' | b'\t' | b'\n' | b'<' => return None,
                _ => i += 1,
            }
        }
        None
    }

    fn parse_footnote_ref(&self, text: &str, start: usize) -> Option<(Inline, usize)> {
        let bytes = text.as_bytes();
        if start + 1 >= bytes.len() || bytes[start + 1] != b'^' {
            return None;
        }
        let mut i = start + 2;
        while i < bytes.len() {
            let b = bytes[i];
            if b == b']' {
                if i == start + 2 {
                    return None;
                }
                let label = text[start + 2..i].to_string();
                return Some((
                    Inline::new(self.span(start, i + 1), InlineKind::FootnoteRef { label }),
                    i + 1,
                ));
            }
            if !(b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.')) {
                return None;
            }
            i += 1;
        }
        None
    }

    fn close_bracket(
        &self,
        text: &str,
        at: usize,
        out: &mut InlineSeq,
        delims: &mut Vec<Delimiter>,
        brackets: &mut Vec<BracketEntry>,
    ) -> Option<usize> {
        let entry_idx = brackets.iter().rposition(|entry| entry.active)?;
        let entry = brackets[entry_idx].clone();
        let bytes = text.as_bytes();
        let after = bytes.get(at + 1).copied();

        let (kind_hint, next) = match after {
            Some(b'(') => {
                let (destination, title, next) = parse_inline_destination(text, at + 1)?;
                (BracketKind::Link { destination, title }, next)
            }
            Some(b'[') => {
                let close = text[at + 2..].find(']')? + at + 2;
                let raw_label = &text[at + 2..close];
                let label = if raw_label.trim().is_empty() {
                    let children = &out[entry.node_index + 1..];
                    plain_text(children)
                } else {
                    raw_label.to_string()
                };
                let def = self.link_defs.get(&normalize_label(&label))?;
                (
                    BracketKind::Link {
                        destination: def.destination.clone(),
                        title: def.title.clone(),
                    },
                    close + 1,
                )
            }
            Some(b'{') => {
                let (attrs, consumed) = parse_attributes(text, at + 1)?;
                (BracketKind::Span(attrs), consumed)
            }
            _ => return None,
        };

        // Resolve emphasis inside the bracket before lifting its children.
        resolve_delimiters(out, delims, entry.node_index + 1);
        let mut removed: Vec<Inline> = out.drain(entry.node_index..).collect();
        let opener = removed.remove(0);
        let children = removed;
        delims.retain(|delim| delim.node_index < entry.node_index);
        brackets.truncate(entry_idx);

        let mut node = match kind_hint {
            BracketKind::Link { destination, title } => {
                if entry.image {
                    Inline::new(
                        Span {
                            start: opener.span.start,
                            end: self.base + next,
                        },
                        InlineKind::Image {
                            alt: children,
                            destination,
                            title,
                        },
                    )
                } else {
                    // Links cannot nest; deactivate enclosing link openers.
                    for other in brackets.iter_mut() {
                        if !other.image {
                            other.active = false;
                        }
                    }
                    Inline::new(
                        Span {
                            start: opener.span.start,
                            end: self.base + next,
                        },
                        InlineKind::Link {
                            children,
                            destination,
                            title,
                        },
                    )
                }
            }
            BracketKind::Span(attrs) => {
                let mut node = Inline::new(
                    Span {
                        start: opener.span.start,
                        end: self.base + next,
                    },
                    InlineKind::Span(children),
                );
                node.attrs = attrs;
                node
            }
        };

        let next = self.attach_attributes(text, next, &mut node.attrs);
        node.span.end = self.base + next;
        out.push(node);
        Some(next)
    }

    /// Consumes zero or more trailing `{...}` attribute sets, merging them
    /// in order.
    fn attach_attributes(&self, text: &str, mut at: usize, attrs: &mut Attributes) -> usize {
        while let Some((set, next)) = parse_attributes(text, at) {
            attrs.merge(set);
            at = next;
        }
        at
    }

    /// A bare `{...}` set attaches to the nearest preceding node: the
    /// trailing word of pending text (which becomes an attributed span), or
    /// the last finished inline. With nothing to attach to, the braces stay
    /// literal. Returns the index past the consumed sets on success.
    #[allow(clippy::too_many_arguments)]
    fn try_trailing_attributes(
        &self,
        text: &str,
        at: usize,
        out: &mut InlineSeq,
        text_buf: &mut String,
        text_start: &mut usize,
        delims: &[Delimiter],
        brackets: &[BracketEntry],
    ) -> Option<usize> {
        let (mut attrs, mut next) = parse_attributes(text, at)?;
        while let Some((more, after)) = parse_attributes(text, next) {
            attrs.merge(more);
            next = after;
        }

        if let Some(word_at) = trailing_word_start(text_buf) {
            let word = text_buf.split_off(word_at);
            let word_start = at - word.len();
            self.flush(out, text_buf, text_start, word_start);
            let mut node = Inline::new(self.span(word_start, next), InlineKind::Text(word));
            node.attrs = attrs;
            out.push(node);
            return Some(next);
        }

        if text_buf.is_empty() {
            let last_index = out.len().checked_sub(1)?;
            // An unmatched delimiter or bracket marker is not a node yet;
            // attaching to it would lose the attributes during resolution.
            let pending = delims.iter().any(|delim| delim.node_index == last_index)
                || brackets.iter().any(|entry| entry.node_index == last_index);
            if pending {
                return None;
            }
            let node = &mut out[last_index];
            if matches!(node.kind, InlineKind::SoftBreak | InlineKind::HardBreak) {
                return None;
            }
            node.attrs.merge(attrs);
            node.span.end = self.base + next;
            return Some(next);
        }
        None
    }
}

/// Index of the last run of non-whitespace in `text_buf`, if it ends one.
fn trailing_word_start(text_buf: &str) -> Option<usize> {
    let prefix = text_buf.trim_end_matches(|ch: char| !ch.is_whitespace());
    if prefix.len() == text_buf.len() {
        return None;
    }
    Some(prefix.len())
}

enum BracketKind {
    Link {
        destination: String,
        title: Option<String>,
    },
    Span(Attributes),
}

/// `(` destination with optional quoted title `)`. Returns the index just
/// past the closing paren.
fn parse_inline_destination(text: &str, open: usize) -> Option<(String, Option<String>, usize)> {
    let bytes = text.as_bytes();
    let mut i = open + 1;
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t' || bytes[i] == b'\n') {
        i += 1;
    }
    let mut destination = String::new();
    let mut depth = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if i + 1 < bytes.len() && bytes[i + 1].is_ascii_punctuation() => {
                destination.push(bytes[i + 1] as char);
                i += 2;
            }
            b'(' => {
                depth += 1;
                destination.push('(');
                i += 1;
            }
            b')' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                destination.push(')');
                i += 1;
            }
            b' ' | b'\t' | b'\n' => break,
            _ => {
                let ch = text[i..].chars().next()?;
                destination.push(ch);
                i += ch.len_utf8();
            }
        }
    }
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t' || bytes[i] == b'\n') {
        i += 1;
    }
    let mut title = None;
    if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
        let quote = bytes[i];
        let mut value = String::new();
        i += 1;
        loop {
            if i >= bytes.len() {
                return None;
            }
            if bytes[i] == b'\\' && i + 1 < bytes.len() && bytes[i + 1].is_ascii_punctuation() {
                value.push(bytes[i + 1] as char);
                i += 2;
                continue;
            }
            if bytes[i] == quote {
                i += 1;
                break;
            }
            let ch = text[i..].chars().next()?;
            value.push(ch);
            i += ch.len_utf8();
        }
        title = Some(value);
        while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t' || bytes[i] == b'\n') {
            i += 1;
        }
    }
    if i >= bytes.len() || bytes[i] != b')' {
        return None;
    }
    Some((destination, title, i + 1))
}

/// `{=format}` right after a code span: raw inline marker.
fn parse_raw_format(text: &str, at: usize) -> Option<String> {
    let bytes = text.as_bytes();
    if at + 1 >= bytes.len() || bytes[at] != b'{' || bytes[at + 1] != b'=' {
        return None;
    }
    let mut i = at + 2;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    if i == at + 2 || i >= bytes.len() || bytes[i] != b'}' {
        return None;
    }
    Some(text[at + 2..i].to_string())
}

pub(crate) fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn count_run(bytes: &[u8], start: usize, needle: u8) -> usize {
    let mut i = start;
    while i < bytes.len() && bytes[i] == needle {
        i += 1;
    }
    i - start
}

/// Whitespace-adjacency flanking, applied uniformly to every symmetric pair.
fn flanking(text: &str, pos: usize, run: usize) -> (bool, bool) {
    let before = text[..pos].chars().next_back();
    let after = text[pos + run..].chars().next();
    let can_open = after.is_some_and(|ch| !ch.is_whitespace());
    let can_close = before.is_some_and(|ch| !ch.is_whitespace());
    (can_open, can_close)
}

/// Pairs delimiters bottom-up: the first unresolved closer is matched with
/// the nearest valid opener of the same kind, so overlapping runs nest
/// innermost-first. Only delimiters at `floor` or later are considered.
fn resolve_delimiters(out: &mut InlineSeq, delims: &mut Vec<Delimiter>, floor: usize) {
    loop {
        let closer_pos = delims
            .iter()
            .position(|delim| delim.can_close && delim.node_index >= floor);
        let closer_pos = match closer_pos {
            Some(pos) => pos,
            None => break,
        };
        let closer = delims[closer_pos].clone();
        let opener_pos = delims[..closer_pos].iter().rposition(|delim| {
            delim.can_open && delim.kind == closer.kind && delim.node_index >= floor
        });
        let opener_pos = match opener_pos {
            Some(pos) => pos,
            None => {
                delims[closer_pos].can_close = false;
                continue;
            }
        };
        let opener = delims[opener_pos].clone();
        if opener.node_index >= closer.node_index {
            delims[closer_pos].can_close = false;
            continue;
        }

        let removed_count = closer.node_index - opener.node_index + 1;
        let removed: Vec<Inline> = out
            .drain(opener.node_index..closer.node_index + 1)
            .collect();
        let opener_span = removed[0].span;
        let closer_span = removed[removed.len() - 1].span;
        let children: Vec<Inline> = removed
            .into_iter()
            .skip(1)
            .take(removed_count - 2)
            .collect();
        out.insert(
            opener.node_index,
            Inline::new(
                Span {
                    start: opener_span.start,
                    end: closer_span.end,
                },
                closer.kind.wrap(children),
            ),
        );

        let delta = removed_count - 1;
        let mut kept = Vec::with_capacity(delims.len());
        for delim in delims.iter() {
            if delim.node_index < opener.node_index {
                kept.push(delim.clone());
            } else if delim.node_index > closer.node_index {
                let mut shifted = delim.clone();
                shifted.node_index -= delta;
                kept.push(shifted);
            }
        }
        *delims = kept;
    }
}
