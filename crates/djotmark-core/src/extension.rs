//! Render extensions.
//!
//! An extension is a strategy consulted during rendering: for each node the
//! renderer first renders the node's children, then offers the node and its
//! children HTML to every installed extension in order. The first extension
//! that returns `Some` replaces the default markup for that node; `None`
//! means "not mine" and the next extension (or the default) runs. Extensions
//! can also contribute HTML before and after the document body.
//!
//! Extensions never mutate the tree, so a configured set is reusable across
//! documents and threads.

use crate::ast::{Block, BlockKind, Document, Inline, InlineKind, plain_text};
use crate::emit::{escape_attr, escape_html};

/// A node being rendered, together with its already-rendered children.
pub enum RenderEvent<'a> {
    Block {
        block: &'a Block,
        children_html: &'a str,
    },
    Inline {
        inline: &'a Inline,
        children_html: &'a str,
    },
}

pub trait Extension: Send + Sync {
    /// Replacement HTML for a node, or `None` to keep the default.
    fn render_override(&self, _event: &RenderEvent<'_>) -> Option<String> {
        None
    }

    /// HTML inserted before the document body.
    fn document_prefix(&self, _document: &Document) -> Option<String> {
        None
    }

    /// HTML inserted after the document body.
    fn document_suffix(&self, _document: &Document) -> Option<String> {
        None
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TocListType {
    Unordered,
    Ordered,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TocPosition {
    Top,
    Bottom,
}

/// Table of contents built from the document's headings, linked through the
/// heading anchors the parser assigns.
pub struct TableOfContents {
    pub min_level: u8,
    pub max_level: u8,
    pub list_type: TocListType,
    pub position: TocPosition,
    pub css_class: String,
}

impl Default for TableOfContents {
    fn default() -> Self {
        Self {
            min_level: 1,
            max_level: 3,
            list_type: TocListType::Unordered,
            position: TocPosition::Top,
            css_class: "toc".to_string(),
        }
    }
}

impl TableOfContents {
    fn build(&self, document: &Document) -> Option<String> {
        let mut entries = Vec::new();
        collect_headings(&document.blocks, self.min_level, self.max_level, &mut entries);
        if entries.is_empty() {
            return None;
        }

        let tag = match self.list_type {
            TocListType::Unordered => "ul",
            TocListType::Ordered => "ol",
        };
        let mut out = format!("<nav class=\"{}\">\n", escape_attr(&self.css_class));
        // Stack of the heading levels the open lists were started at. Jumps
        // of more than one level are clamped to one extra list.
        let mut stack: Vec<u8> = Vec::new();
        for (level, id, title) in &entries {
            if stack.is_empty() {
                out.push_str(&format!("<{}>\n", tag));
                stack.push(*level);
            } else {
                while stack.len() > 1 && stack[stack.len() - 1] > *level {
                    out.push_str(&format!("</li>\n</{}>\n", tag));
                    stack.pop();
                }
                if stack[stack.len() - 1] >= *level {
                    out.push_str("</li>\n");
                } else {
                    out.push_str(&format!("<{}>\n", tag));
                    stack.push(*level);
                }
            }
            out.push_str(&format!(
                "<li><a href=\"#{}\">{}</a>\n",
                escape_attr(id),
                escape_html(title)
            ));
        }
        for _ in 0..stack.len() {
            out.push_str(&format!("</li>\n</{}>\n", tag));
        }
        out.push_str("</nav>\n");
        Some(out)
    }
}

impl Extension for TableOfContents {
    fn document_prefix(&self, document: &Document) -> Option<String> {
        if self.position == TocPosition::Top {
            self.build(document)
        } else {
            None
        }
    }

    fn document_suffix(&self, document: &Document) -> Option<String> {
        if self.position == TocPosition::Bottom {
            self.build(document)
        } else {
            None
        }
    }
}

fn collect_headings(
    blocks: &[Block],
    min_level: u8,
    max_level: u8,
    entries: &mut Vec<(u8, String, String)>,
) {
    for block in blocks {
        match &block.kind {
            BlockKind::Heading { level, content } => {
                if *level >= min_level && *level <= max_level {
                    if let Some(id) = &block.attrs.id {
                        entries.push((*level, id.clone(), plain_text(content)));
                    }
                }
            }
            BlockKind::Div { blocks } | BlockKind::Blockquote { blocks } => {
                collect_headings(blocks, min_level, max_level, entries);
            }
            BlockKind::List(list) => {
                for item in &list.items {
                    collect_headings(&item.blocks, min_level, max_level, entries);
                }
            }
            _ => {}
        }
    }
}

/// Appends a self-link anchor to every heading that has an id.
pub struct HeadingPermalinks {
    pub symbol: String,
    pub css_class: String,
}

impl Default for HeadingPermalinks {
    fn default() -> Self {
        Self {
            symbol: "§".to_string(),
            css_class: "permalink".to_string(),
        }
    }
}

impl Extension for HeadingPermalinks {
    fn render_override(&self, event: &RenderEvent<'_>) -> Option<String> {
        let RenderEvent::Block {
            block,
            children_html,
        } = event
        else {
            return None;
        };
        let BlockKind::Heading { level, .. } = &block.kind else {
            return None;
        };
        let id = block.attrs.id.as_deref()?;
        Some(format!(
            "<h{level} id=\"{id}\">{children}<a class=\"{class}\" href=\"#{id}\">{symbol}</a></h{level}>\n",
            level = level,
            id = escape_attr(id),
            children = children_html,
            class = escape_attr(&self.css_class),
            symbol = escape_html(&self.symbol),
        ))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuoteLocale {
    /// “double” and ‘single’.
    English,
    /// „double“ and ‚single‘.
    German,
    /// «double» and ‹single›.
    French,
}

impl QuoteLocale {
    pub fn by_name(name: &str) -> Option<QuoteLocale> {
        match name {
            // `auto` resolves to the default quote set.
            "auto" | "en" => Some(QuoteLocale::English),
            "de" => Some(QuoteLocale::German),
            "fr" => Some(QuoteLocale::French),
            _ => None,
        }
    }

    pub fn quote(self, open: bool, double: bool) -> &'static str {
        match (self, double, open) {
            (QuoteLocale::English, true, true) => "\u{201C}",
            (QuoteLocale::English, true, false) => "\u{201D}",
            (QuoteLocale::English, false, true) => "\u{2018}",
            (QuoteLocale::English, false, false) => "\u{2019}",
            (QuoteLocale::German, true, true) => "\u{201E}",
            (QuoteLocale::German, true, false) => "\u{201C}",
            (QuoteLocale::German, false, true) => "\u{201A}",
            (QuoteLocale::German, false, false) => "\u{2018}",
            (QuoteLocale::French, true, true) => "\u{00AB}",
            (QuoteLocale::French, true, false) => "\u{00BB}",
            (QuoteLocale::French, false, true) => "\u{2039}",
            (QuoteLocale::French, false, false) => "\u{203A}",
        }
    }
}

/// Locale-aware quote rendering. Without this extension quote candidates
/// fall back to the English typographic quotes.
pub struct SmartQuotes {
    pub locale: QuoteLocale,
}

impl SmartQuotes {
    pub fn new(locale: QuoteLocale) -> Self {
        Self { locale }
    }
}

impl Extension for SmartQuotes {
    fn render_override(&self, event: &RenderEvent<'_>) -> Option<String> {
        let RenderEvent::Inline { inline, .. } = event else {
            return None;
        };
        let InlineKind::SmartQuote { open, double } = &inline.kind else {
            return None;
        };
        Some(self.locale.quote(*open, *double).to_string())
    }
}

/// Maps attributed spans onto semantic HTML elements: `{abbr="..."}` becomes
/// `<abbr title="...">`, a `kbd` flag becomes `<kbd>`, a `dfn` flag `<dfn>`.
pub struct SemanticSpans;

impl Extension for SemanticSpans {
    fn render_override(&self, event: &RenderEvent<'_>) -> Option<String> {
        let RenderEvent::Inline {
            inline,
            children_html,
        } = event
        else {
            return None;
        };
        if !matches!(inline.kind, InlineKind::Span(_)) {
            return None;
        }
        if let Some(expansion) = inline.attrs.get("abbr") {
            return Some(format!(
                "<abbr title=\"{}\">{}</abbr>",
                escape_attr(expansion),
                children_html
            ));
        }
        if inline.attrs.has("kbd") || inline.attrs.has_class("kbd") {
            return Some(format!("<kbd>{}</kbd>", children_html));
        }
        if inline.attrs.has("dfn") || inline.attrs.has_class("dfn") {
            return Some(format!("<dfn>{}</dfn>", children_html));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{QuoteLocale, TableOfContents, TocPosition};
    use crate::parser::parse;

    #[test]
    fn quote_tables_cover_locales() {
        assert_eq!(QuoteLocale::English.quote(true, true), "\u{201C}");
        assert_eq!(QuoteLocale::German.quote(true, true), "\u{201E}");
        assert_eq!(QuoteLocale::French.quote(false, false), "\u{203A}");
        assert_eq!(QuoteLocale::by_name("de"), Some(QuoteLocale::German));
        assert_eq!(QuoteLocale::by_name("auto"), Some(QuoteLocale::English));
        assert!(QuoteLocale::by_name("xx").is_none());
    }

    #[test]
    fn toc_nests_by_heading_level() {
        use crate::extension::Extension;
        let result = parse("# One\n\n## One A\n\n# Two\n");
        let toc = TableOfContents::default();
        let html = toc.document_prefix(&result.document).unwrap();
        assert!(html.contains("<nav class=\"toc\">"));
        assert!(html.contains("<a href=\"#one\">One</a>"));
        assert!(html.contains("<a href=\"#one-a\">One A</a>"));
        assert!(html.contains("<a href=\"#two\">Two</a>"));
        assert!(toc.document_suffix(&result.document).is_none());
    }

    #[test]
    fn toc_position_bottom_swaps_hooks() {
        use crate::extension::Extension;
        let result = parse("# Only\n");
        let toc = TableOfContents {
            position: TocPosition::Bottom,
            ..TableOfContents::default()
        };
        assert!(toc.document_prefix(&result.document).is_none());
        assert!(toc.document_suffix(&result.document).is_some());
    }
}
