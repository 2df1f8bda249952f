//! HTML rendering.
//!
//! Children are rendered first, then every installed extension is offered
//! the node together with its children HTML; the first `Some` replaces the
//! default markup. The profile allow-list is consulted before each node and
//! disallowed constructs are flattened so their text survives.

use std::collections::{HashMap, HashSet};

use ammonia::Builder;
use once_cell::sync::Lazy;

use crate::ast::{
    Block, BlockKind, Document, Inline, InlineKind, InlineSeq, List, Table, TableAlign, plain_text,
};
use crate::attr::Attributes;
use crate::extension::{Extension, QuoteLocale, RenderEvent};
use crate::profile::{Feature, Profile};
use crate::scanner::expand_tabs;

/// How soft line breaks inside a paragraph are emitted.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SoftBreak {
    /// Keep the newline (default).
    #[default]
    Newline,
    /// Collapse to a single space.
    Space,
    /// Promote to `<br>`.
    Break,
}

impl SoftBreak {
    pub fn by_name(name: &str) -> Option<SoftBreak> {
        match name {
            "newline" => Some(SoftBreak::Newline),
            "space" => Some(SoftBreak::Space),
            "br" | "break" => Some(SoftBreak::Break),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub profile: Profile,
    /// Strip URLs with schemes outside the allow-list and drop raw
    /// passthrough content regardless of profile.
    pub safe: bool,
    pub soft_break: SoftBreak,
    /// Expand tabs in code block text to this many columns; 0 keeps tabs.
    pub code_block_tab_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            profile: Profile::full(),
            safe: false,
            soft_break: SoftBreak::Newline,
            code_block_tab_width: 0,
        }
    }
}

/// Renders a document to raw, un-sanitized HTML.
pub fn render_html(
    document: &Document,
    options: &RenderOptions,
    extensions: &[Box<dyn Extension>],
) -> String {
    let mut renderer = Renderer {
        document,
        options,
        extensions,
        footnote_order: Vec::new(),
    };
    renderer.render()
}

/// Renders and then sanitizes against a fixed tag/attribute allow-list.
/// Defense in depth for untrusted input on top of `safe` mode.
pub fn render_html_sanitized(
    document: &Document,
    options: &RenderOptions,
    extensions: &[Box<dyn Extension>],
) -> String {
    let raw_html = render_html(document, options, extensions);

    let tags: HashSet<&'static str> = [
        "a", "abbr", "audio", "blockquote", "br", "code", "del", "dfn", "div", "em", "h1", "h2",
        "h3", "h4", "h5", "h6", "hr", "img", "ins", "kbd", "li", "mark", "nav", "ol", "p", "pre",
        "section", "span", "strong", "sub", "sup", "table", "tbody", "td", "th", "thead", "tr",
        "ul", "video",
    ]
    .iter()
    .copied()
    .collect();

    let mut generic_attributes: HashSet<&'static str> = HashSet::new();
    generic_attributes.insert("class");
    generic_attributes.insert("id");

    let mut tag_attributes = HashMap::new();
    tag_attributes.insert("a", ["href", "title", "rel", "role"].iter().copied().collect());
    tag_attributes.insert("abbr", ["title"].iter().copied().collect());
    tag_attributes.insert("img", ["alt", "src", "title"].iter().copied().collect());
    tag_attributes.insert("ol", ["start"].iter().copied().collect());
    tag_attributes.insert("td", ["style"].iter().copied().collect());
    tag_attributes.insert("th", ["style"].iter().copied().collect());
    tag_attributes.insert("section", ["role"].iter().copied().collect());
    tag_attributes.insert("video", ["src", "controls"].iter().copied().collect());
    tag_attributes.insert("audio", ["src", "controls"].iter().copied().collect());

    let mut generic_attribute_prefixes = HashSet::new();
    generic_attribute_prefixes.insert("data-");

    Builder::new()
        // Required by ammonia when `rel` is an allowed attribute on `a`.
        .link_rel(None)
        .tags(tags)
        .generic_attributes(generic_attributes)
        .tag_attributes(tag_attributes)
        .generic_attribute_prefixes(generic_attribute_prefixes)
        .clean(&raw_html)
        .to_string()
}

static SAFE_SCHEMES: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["http", "https", "mailto", "ftp", "tel"].iter().copied().collect());

/// Relative URLs are always safe; absolute ones must use an allowed scheme.
fn url_is_safe(url: &str) -> bool {
    match url.find(':') {
        None => true,
        Some(colon) => {
            let scheme = &url[..colon];
            // A slash, query, or fragment before the colon means it is not a
            // scheme at all.
            if scheme.contains(['/', '?', '#']) {
                return true;
            }
            SAFE_SCHEMES.contains(scheme.to_ascii_lowercase().as_str())
        }
    }
}

struct Renderer<'a> {
    document: &'a Document,
    options: &'a RenderOptions,
    extensions: &'a [Box<dyn Extension>],
    /// Footnote labels in order of first reference; indices are the numbers.
    footnote_order: Vec<String>,
}

impl<'a> Renderer<'a> {
    fn render(&mut self) -> String {
        let document = self.document;
        let mut out = String::new();
        for extension in self.extensions {
            if let Some(prefix) = extension.document_prefix(document) {
                out.push_str(&prefix);
            }
        }
        out.push_str(&self.render_blocks(&document.blocks));
        if self.options.profile.allows(Feature::Footnotes) {
            out.push_str(&self.render_footnote_section());
        }
        for extension in self.extensions {
            if let Some(suffix) = extension.document_suffix(document) {
                out.push_str(&suffix);
            }
        }
        out
    }

    fn render_blocks(&mut self, blocks: &[Block]) -> String {
        let mut out = String::new();
        for block in blocks {
            out.push_str(&self.render_block(block));
        }
        out
    }

    fn render_block(&mut self, block: &Block) -> String {
        if let Some(flattened) = self.flatten_disallowed(block) {
            return flattened;
        }

        let children_html = self.block_children_html(block);
        for extension in self.extensions {
            let event = RenderEvent::Block {
                block,
                children_html: &children_html,
            };
            if let Some(html) = extension.render_override(&event) {
                return html;
            }
        }

        match &block.kind {
            BlockKind::Paragraph { .. } => {
                format!("<p{}>{}</p>\n", render_attrs(&block.attrs), children_html)
            }
            BlockKind::Heading { level, .. } => format!(
                "<h{level}{}>{}</h{level}>\n",
                render_attrs(&block.attrs),
                children_html,
                level = level
            ),
            BlockKind::List(list) => self.render_list(block, list),
            BlockKind::Blockquote { .. } => format!(
                "<blockquote{}>\n{}</blockquote>\n",
                render_attrs(&block.attrs),
                children_html
            ),
            BlockKind::CodeBlock { lang, text } => {
                let class = match lang {
                    Some(lang) => format!(" class=\"language-{}\"", escape_attr(lang)),
                    None => String::new(),
                };
                let text = if self.options.code_block_tab_width > 0 {
                    expand_tabs(text, self.options.code_block_tab_width)
                } else {
                    text.clone()
                };
                let mut escaped = escape_html(&text);
                if !escaped.is_empty() && !escaped.ends_with('\n') {
                    escaped.push('\n');
                }
                format!(
                    "<pre{}><code{}>{}</code></pre>\n",
                    render_attrs(&block.attrs),
                    class,
                    escaped
                )
            }
            BlockKind::Div { .. } => format!(
                "<div{}>\n{}</div>\n",
                render_attrs(&block.attrs),
                children_html
            ),
            BlockKind::Table(table) => self.render_table(block, table),
            BlockKind::ThematicBreak => format!("<hr{}>\n", render_attrs(&block.attrs)),
            BlockKind::RawBlock { format, text } => {
                if format == "html" && self.raw_html_allowed() {
                    let mut out = text.clone();
                    if !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    out
                } else {
                    String::new()
                }
            }
        }
    }

    fn block_children_html(&mut self, block: &Block) -> String {
        match &block.kind {
            BlockKind::Paragraph { content } | BlockKind::Heading { content, .. } => {
                self.render_inlines(content)
            }
            BlockKind::Blockquote { blocks } | BlockKind::Div { blocks } => {
                self.render_blocks(blocks)
            }
            _ => String::new(),
        }
    }

    /// Disallowed constructs flatten rather than disappear: the reader still
    /// sees the text, just without the structure.
    fn flatten_disallowed(&mut self, block: &Block) -> Option<String> {
        let profile = self.options.profile.clone();
        match &block.kind {
            BlockKind::Heading { content, .. } if !profile.allows(Feature::Headings) => {
                Some(format!("<p>{}</p>\n", self.render_inlines(content)))
            }
            BlockKind::List(list) if !profile.allows(Feature::Lists) => {
                let mut out = String::new();
                for item in &list.items {
                    out.push_str(&self.render_blocks(&item.blocks));
                }
                Some(out)
            }
            BlockKind::Blockquote { blocks } if !profile.allows(Feature::Blockquotes) => {
                Some(self.render_blocks(blocks))
            }
            BlockKind::CodeBlock { text, .. } if !profile.allows(Feature::CodeBlocks) => {
                Some(format!("<p>{}</p>\n", escape_html(text.trim_end())))
            }
            BlockKind::Div { blocks } if !profile.allows(Feature::Divs) => {
                Some(self.render_blocks(blocks))
            }
            BlockKind::Table(table) if !profile.allows(Feature::Tables) => {
                let mut out = String::new();
                let mut rows: Vec<&Vec<InlineSeq>> = Vec::new();
                if let Some(head) = &table.head {
                    rows.push(head);
                }
                rows.extend(table.rows.iter());
                for row in rows {
                    let cells: Vec<String> =
                        row.iter().map(|cell| self.render_inlines(cell)).collect();
                    out.push_str(&format!("<p>{}</p>\n", cells.join(" ")));
                }
                Some(out)
            }
            BlockKind::ThematicBreak if !profile.allows(Feature::ThematicBreaks) => {
                Some(String::new())
            }
            BlockKind::RawBlock { .. } if !profile.allows(Feature::RawHtml) => {
                Some(String::new())
            }
            _ => None,
        }
    }

    fn render_list(&mut self, block: &Block, list: &List) -> String {
        let tag = if list.ordered { "ol" } else { "ul" };
        let start_attr = if list.ordered && list.start != 1 {
            format!(" start=\"{}\"", list.start)
        } else {
            String::new()
        };
        let mut out = format!("<{}{}{}>\n", tag, render_attrs(&block.attrs), start_attr);
        for item in &list.items {
            if list.tight && item.blocks.len() == 1 {
                if let BlockKind::Paragraph { content } = &item.blocks[0].kind {
                    out.push_str(&format!("<li>{}</li>\n", self.render_inlines(content)));
                    continue;
                }
            }
            out.push_str("<li>\n");
            out.push_str(&self.render_blocks(&item.blocks));
            out.push_str("</li>\n");
        }
        out.push_str(&format!("</{}>\n", tag));
        out
    }

    fn render_table(&mut self, block: &Block, table: &Table) -> String {
        let mut out = format!("<table{}>\n", render_attrs(&block.attrs));
        if let Some(head) = &table.head {
            out.push_str("<thead>\n<tr>\n");
            for (idx, cell) in head.iter().enumerate() {
                out.push_str(&format!(
                    "<th{}>{}</th>\n",
                    align_attr(table.aligns.get(idx)),
                    self.render_inlines(cell)
                ));
            }
            out.push_str("</tr>\n</thead>\n");
        }
        if !table.rows.is_empty() {
            out.push_str("<tbody>\n");
            for row in &table.rows {
                out.push_str("<tr>\n");
                for (idx, cell) in row.iter().enumerate() {
                    out.push_str(&format!(
                        "<td{}>{}</td>\n",
                        align_attr(table.aligns.get(idx)),
                        self.render_inlines(cell)
                    ));
                }
                out.push_str("</tr>\n");
            }
            out.push_str("</tbody>\n");
        }
        out.push_str("</table>\n");
        out
    }

    fn render_inlines(&mut self, inlines: &[Inline]) -> String {
        let mut out = String::new();
        for inline in inlines {
            out.push_str(&self.render_inline(inline));
        }
        out
    }

    fn render_inline(&mut self, inline: &Inline) -> String {
        let children_html = self.inline_children_html(inline);
        for extension in self.extensions {
            let event = RenderEvent::Inline {
                inline,
                children_html: &children_html,
            };
            if let Some(html) = extension.render_override(&event) {
                return html;
            }
        }

        match &inline.kind {
            InlineKind::Text(text) => {
                let escaped = escape_html(text);
                if inline.attrs.is_empty() {
                    escaped
                } else {
                    format!("<span{}>{}</span>", render_attrs(&inline.attrs), escaped)
                }
            }
            InlineKind::Emphasis(_) => self.wrap("em", inline, &children_html),
            InlineKind::Strong(_) => self.wrap("strong", inline, &children_html),
            InlineKind::Superscript(_) => self.wrap("sup", inline, &children_html),
            InlineKind::Subscript(_) => self.wrap("sub", inline, &children_html),
            InlineKind::Highlight(_) => self.wrap("mark", inline, &children_html),
            InlineKind::Insert(_) => self.wrap("ins", inline, &children_html),
            InlineKind::Delete(_) => self.wrap("del", inline, &children_html),
            InlineKind::Span(_) => self.wrap("span", inline, &children_html),
            InlineKind::CodeSpan(text) => format!(
                "<code{}>{}</code>",
                render_attrs(&inline.attrs),
                escape_html(text)
            ),
            InlineKind::Link {
                destination, title, ..
            } => self.render_link(inline, destination, title.as_deref(), &children_html),
            InlineKind::Image {
                alt,
                destination,
                title,
            } => self.render_image(inline, alt, destination, title.as_deref()),
            InlineKind::FootnoteRef { label } => self.render_footnote_ref(label),
            InlineKind::SoftBreak => match self.options.soft_break {
                SoftBreak::Newline => "\n".to_string(),
                SoftBreak::Space => " ".to_string(),
                SoftBreak::Break => "<br>\n".to_string(),
            },
            InlineKind::HardBreak => "<br>\n".to_string(),
            InlineKind::RawInline { format, text } => {
                if format == "html" && self.raw_html_allowed() {
                    text.clone()
                } else {
                    String::new()
                }
            }
            InlineKind::SmartQuote { open, double } => QuoteLocale::English
                .quote(*open, *double)
                .to_string(),
        }
    }

    fn inline_children_html(&mut self, inline: &Inline) -> String {
        match &inline.kind {
            InlineKind::Emphasis(children)
            | InlineKind::Strong(children)
            | InlineKind::Superscript(children)
            | InlineKind::Subscript(children)
            | InlineKind::Highlight(children)
            | InlineKind::Insert(children)
            | InlineKind::Delete(children)
            | InlineKind::Span(children)
            | InlineKind::Link { children, .. } => self.render_inlines(children),
            _ => String::new(),
        }
    }

    fn wrap(&self, tag: &str, inline: &Inline, children_html: &str) -> String {
        format!(
            "<{tag}{}>{}</{tag}>",
            render_attrs(&inline.attrs),
            children_html,
            tag = tag
        )
    }

    fn render_link(
        &self,
        inline: &Inline,
        destination: &str,
        title: Option<&str>,
        children_html: &str,
    ) -> String {
        if !self.options.profile.allows(Feature::Links) {
            return children_html.to_string();
        }
        let mut out = String::from("<a");
        if !self.options.safe || url_is_safe(destination) {
            out.push_str(&format!(" href=\"{}\"", escape_url_attr(destination)));
        }
        if let Some(title) = title {
            out.push_str(&format!(" title=\"{}\"", escape_attr(title)));
        }
        if self.options.profile.nofollow_links() {
            out.push_str(" rel=\"nofollow\"");
        }
        out.push_str(&render_attrs(&inline.attrs));
        out.push('>');
        out.push_str(children_html);
        out.push_str("</a>");
        out
    }

    fn render_image(
        &mut self,
        inline: &Inline,
        alt: &[Inline],
        destination: &str,
        title: Option<&str>,
    ) -> String {
        if !self.options.profile.allows(Feature::Images) {
            return escape_html(&plain_text(alt));
        }
        let src_ok = !self.options.safe || url_is_safe(destination);

        // Class-marked media embeds get a player element instead of <img>.
        for (tag, class) in [("video", "video"), ("audio", "audio")] {
            if inline.attrs.has_class(class) {
                let src = if src_ok {
                    format!(" src=\"{}\"", escape_url_attr(destination))
                } else {
                    String::new()
                };
                return format!(
                    "<{tag} controls{}{}></{tag}>",
                    src,
                    render_attrs(&inline.attrs),
                    tag = tag
                );
            }
        }

        let mut out = String::from("<img");
        if src_ok {
            out.push_str(&format!(" src=\"{}\"", escape_url_attr(destination)));
        }
        out.push_str(&format!(" alt=\"{}\"", escape_attr(&plain_text(alt))));
        if let Some(title) = title {
            out.push_str(&format!(" title=\"{}\"", escape_attr(title)));
        }
        out.push_str(&render_attrs(&inline.attrs));
        out.push('>');
        out
    }

    fn render_footnote_ref(&mut self, label: &str) -> String {
        if !self.options.profile.allows(Feature::Footnotes) {
            return String::new();
        }
        // A reference without a definition stays literal, like an
        // unresolved link label.
        if self.document.footnote(label).is_none() {
            return escape_html(&format!("[^{}]", label));
        }
        let number = match self.footnote_order.iter().position(|l| l == label) {
            Some(idx) => idx + 1,
            None => {
                self.footnote_order.push(label.to_string());
                self.footnote_order.len()
            }
        };
        format!(
            "<a id=\"fnref{number}\" href=\"#fn{number}\" role=\"doc-noteref\"><sup>{number}</sup></a>",
            number = number
        )
    }

    fn render_footnote_section(&mut self) -> String {
        if self.footnote_order.is_empty() {
            return String::new();
        }
        let mut out = String::from("<section role=\"doc-endnotes\">\n<hr>\n<ol>\n");
        // Numbered by first reference; the order list is stable by now
        // because the body has been rendered.
        for (idx, label) in self.footnote_order.clone().iter().enumerate() {
            let number = idx + 1;
            out.push_str(&format!("<li id=\"fn{}\">\n", number));
            let backref = format!(
                "<a href=\"#fnref{}\" role=\"doc-backref\">\u{21A9}\u{FE0E}</a>",
                number
            );
            let blocks = match self.document.footnote(label) {
                Some(footnote) => footnote.blocks.clone(),
                None => Vec::new(),
            };
            let mut body = self.render_blocks(&blocks);
            // The backref goes inside the last paragraph when there is one.
            if let Some(rest) = body.strip_suffix("</p>\n") {
                body = format!("{}{}</p>\n", rest, backref);
            } else {
                body.push_str(&format!("<p>{}</p>\n", backref));
            }
            out.push_str(&body);
            out.push_str("</li>\n");
        }
        out.push_str("</ol>\n</section>\n");
        out
    }

    fn raw_html_allowed(&self) -> bool {
        self.options.profile.allows(Feature::RawHtml) && !self.options.safe
    }
}

fn align_attr(align: Option<&TableAlign>) -> String {
    match align {
        Some(TableAlign::Left) => " style=\"text-align: left;\"".to_string(),
        Some(TableAlign::Center) => " style=\"text-align: center;\"".to_string(),
        Some(TableAlign::Right) => " style=\"text-align: right;\"".to_string(),
        _ => String::new(),
    }
}

/// Renders an attribute set as ` id=".." class=".." key=".."`.
fn render_attrs(attrs: &Attributes) -> String {
    let mut out = String::new();
    if let Some(id) = &attrs.id {
        out.push_str(&format!(" id=\"{}\"", escape_attr(id)));
    }
    if !attrs.classes.is_empty() {
        let classes: Vec<String> = attrs.classes.iter().map(|c| escape_attr(c)).collect();
        out.push_str(&format!(" class=\"{}\"", classes.join(" ")));
    }
    for (key, value) in attrs.pairs() {
        if key_is_renderable(key) {
            out.push_str(&format!(" {}=\"{}\"", key, escape_attr(value)));
        }
    }
    out
}

/// Only pass through attribute names that cannot smuggle script handlers.
fn key_is_renderable(key: &str) -> bool {
    !key.is_empty()
        && !key.to_ascii_lowercase().starts_with("on")
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-'))
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_attr(text: &str) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_url_attr(text: &str) -> String {
    let mut encoded = String::new();
    for &byte in text.as_bytes() {
        match byte {
            b' ' => encoded.push_str("%20"),
            b'\\' => encoded.push_str("%5C"),
            0x00..=0x1F | 0x7F..=0xFF => {
                encoded.push_str(&format!("%{:02X}", byte));
            }
            _ => encoded.push(byte as char),
        }
    }
    escape_attr(&encoded)
}

#[cfg(test)]
mod tests {
    use super::url_is_safe;

    #[test]
    fn scheme_allow_list() {
        assert!(url_is_safe("https://example.com/a"));
        assert!(url_is_safe("mailto:a@example.com"));
        assert!(url_is_safe("/relative/path"));
        assert!(url_is_safe("relative/path?q=1"));
        assert!(url_is_safe("/path:with/colon"));
        assert!(!url_is_safe("javascript:alert(1)"));
        assert!(!url_is_safe("JAVASCRIPT:alert(1)"));
        assert!(!url_is_safe("data:text/html,x"));
        assert!(!url_is_safe("vbscript:x"));
    }
}
