use std::collections::HashMap;

use crate::attr::Attributes;
use crate::span::Span;

pub type InlineSeq = Vec<Inline>;

/// Parsed document: top-level blocks plus the side tables collected during
/// block parsing (link reference definitions and footnote definitions).
///
/// The tree is build-once: nothing mutates it after parsing, so a `Document`
/// can be rendered repeatedly and shared across threads.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub span: Span,
    pub blocks: Vec<Block>,
    pub link_defs: HashMap<String, LinkDef>,
    pub footnotes: Vec<Footnote>,
}

impl Document {
    pub fn footnote(&self, label: &str) -> Option<&Footnote> {
        self.footnotes.iter().find(|f| f.label == label)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkDef {
    pub destination: String,
    pub title: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Footnote {
    pub label: String,
    pub blocks: Vec<Block>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub span: Span,
    pub attrs: Attributes,
    pub kind: BlockKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BlockKind {
    Paragraph {
        content: InlineSeq,
    },
    Heading {
        level: u8,
        content: InlineSeq,
    },
    List(List),
    Blockquote {
        blocks: Vec<Block>,
    },
    CodeBlock {
        lang: Option<String>,
        text: String,
    },
    Div {
        blocks: Vec<Block>,
    },
    Table(Table),
    ThematicBreak,
    RawBlock {
        format: String,
        text: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct List {
    pub ordered: bool,
    pub start: u64,
    pub tight: bool,
    pub items: Vec<ListItem>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListItem {
    pub span: Span,
    pub blocks: Vec<Block>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    /// Header row, present when an alignment separator follows the first row.
    pub head: Option<Vec<InlineSeq>>,
    pub aligns: Vec<TableAlign>,
    pub rows: Vec<Vec<InlineSeq>>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TableAlign {
    None,
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Inline {
    pub span: Span,
    pub attrs: Attributes,
    pub kind: InlineKind,
}

impl Inline {
    pub fn new(span: Span, kind: InlineKind) -> Self {
        Self {
            span,
            attrs: Attributes::default(),
            kind,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InlineKind {
    Text(String),
    Emphasis(InlineSeq),
    Strong(InlineSeq),
    Superscript(InlineSeq),
    Subscript(InlineSeq),
    Highlight(InlineSeq),
    Insert(InlineSeq),
    Delete(InlineSeq),
    CodeSpan(String),
    Link {
        children: InlineSeq,
        destination: String,
        title: Option<String>,
    },
    Image {
        alt: InlineSeq,
        destination: String,
        title: Option<String>,
    },
    /// Generic attributed wrapper (`[text]{...}`): the hook point for
    /// semantic-markup extensions.
    Span(InlineSeq),
    FootnoteRef {
        label: String,
    },
    SoftBreak,
    HardBreak,
    RawInline {
        format: String,
        text: String,
    },
    /// Straight quote character, resolved to a directional quote at render
    /// time based on the configured locale.
    SmartQuote {
        open: bool,
        double: bool,
    },
}

/// Concatenates the visible text of an inline sequence, dropping markup.
/// Used for image alt text, heading slugs, and table-of-contents entries.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    collect_plain_text(inlines, &mut out);
    out
}

fn collect_plain_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match &inline.kind {
            InlineKind::Text(text) | InlineKind::CodeSpan(text) => out.push_str(text),
            InlineKind::Emphasis(children)
            | InlineKind::Strong(children)
            | InlineKind::Superscript(children)
            | InlineKind::Subscript(children)
            | InlineKind::Highlight(children)
            | InlineKind::Insert(children)
            | InlineKind::Delete(children)
            | InlineKind::Span(children)
            | InlineKind::Link { children, .. }
            | InlineKind::Image { alt: children, .. } => collect_plain_text(children, out),
            InlineKind::SoftBreak | InlineKind::HardBreak => out.push(' '),
            InlineKind::SmartQuote { double, .. } => out.push(if *double { '"' } else { '\'' }),
            InlineKind::FootnoteRef { .. } | InlineKind::RawInline { .. } => {}
        }
    }
}
