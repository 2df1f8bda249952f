mod ast;
mod attr;
mod convert;
mod emit;
mod extension;
mod inline;
mod parser;
mod profile;
mod scanner;
mod source_map;
mod span;

pub use ast::{
    Block, BlockKind, Document, Footnote, Inline, InlineKind, InlineSeq, LinkDef, List, ListItem,
    Table, TableAlign, plain_text,
};
pub use attr::{Attributes, parse_attributes};
pub use convert::{ConfigError, Converter, ConverterBuilder, to_html};
pub use emit::{
    RenderOptions, SoftBreak, escape_attr, escape_html, escape_url_attr, render_html,
    render_html_sanitized,
};
pub use extension::{
    Extension, HeadingPermalinks, QuoteLocale, RenderEvent, SemanticSpans, SmartQuotes,
    TableOfContents, TocListType, TocPosition,
};
pub use parser::{ParseResult, parse};
pub use profile::{Feature, Profile};
pub use source_map::{Position, Range, SourceMap};
pub use span::{Span, SpanError};
