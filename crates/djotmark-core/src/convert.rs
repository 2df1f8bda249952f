//! Converter facade: configuration is validated once at build time, the
//! resulting [`Converter`] is immutable and reusable across documents and
//! threads.

use thiserror::Error;

use crate::ast::Document;
use crate::emit::{RenderOptions, SoftBreak, render_html, render_html_sanitized};
use crate::extension::{
    Extension, HeadingPermalinks, QuoteLocale, SemanticSpans, SmartQuotes, TableOfContents,
};
use crate::parser::parse;
use crate::profile::Profile;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown profile: {0:?}")]
    UnknownProfile(String),
    #[error("unknown soft break mode: {0:?} (expected newline, space, or br)")]
    UnknownSoftBreak(String),
    #[error("unknown smart quote locale: {0:?} (expected auto, en, de, or fr)")]
    UnknownLocale(String),
    #[error("table of contents levels out of order: min {min} > max {max}")]
    TocLevelsOutOfOrder { min: u8, max: u8 },
    #[error("heading level {0} out of range 1..=6")]
    HeadingLevelOutOfRange(u8),
}

pub struct ConverterBuilder {
    profile: Profile,
    profile_name: Option<String>,
    safe: bool,
    soft_break: SoftBreak,
    soft_break_name: Option<String>,
    code_block_tab_width: usize,
    smart_quotes_locale: Option<String>,
    toc_levels: Option<(u8, u8)>,
    permalinks: bool,
    semantic_spans: bool,
    extensions: Vec<Box<dyn Extension>>,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBuilder {
    pub fn new() -> Self {
        Self {
            profile: Profile::full(),
            profile_name: None,
            safe: false,
            soft_break: SoftBreak::Newline,
            soft_break_name: None,
            code_block_tab_width: 0,
            smart_quotes_locale: None,
            toc_levels: None,
            permalinks: false,
            semantic_spans: false,
            extensions: Vec::new(),
        }
    }

    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self.profile_name = None;
        self
    }

    /// Select a preset profile by name; validated at build time.
    pub fn profile_name(mut self, name: &str) -> Self {
        self.profile_name = Some(name.to_string());
        self
    }

    pub fn safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    pub fn soft_break(mut self, mode: SoftBreak) -> Self {
        self.soft_break = mode;
        self.soft_break_name = None;
        self
    }

    /// Select a soft break mode by name; validated at build time.
    pub fn soft_break_name(mut self, name: &str) -> Self {
        self.soft_break_name = Some(name.to_string());
        self
    }

    pub fn code_block_tab_width(mut self, width: usize) -> Self {
        self.code_block_tab_width = width;
        self
    }

    pub fn smart_quotes_locale(mut self, locale: &str) -> Self {
        self.smart_quotes_locale = Some(locale.to_string());
        self
    }

    pub fn table_of_contents(mut self, min_level: u8, max_level: u8) -> Self {
        self.toc_levels = Some((min_level, max_level));
        self
    }

    pub fn heading_permalinks(mut self) -> Self {
        self.permalinks = true;
        self
    }

    pub fn semantic_spans(mut self) -> Self {
        self.semantic_spans = true;
        self
    }

    pub fn extension(mut self, extension: Box<dyn Extension>) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn build(self) -> Result<Converter, ConfigError> {
        let profile = match &self.profile_name {
            Some(name) => {
                Profile::by_name(name).ok_or_else(|| ConfigError::UnknownProfile(name.clone()))?
            }
            None => self.profile,
        };
        let soft_break = match &self.soft_break_name {
            Some(name) => SoftBreak::by_name(name)
                .ok_or_else(|| ConfigError::UnknownSoftBreak(name.clone()))?,
            None => self.soft_break,
        };

        let mut extensions = self.extensions;
        if let Some((min, max)) = self.toc_levels {
            for level in [min, max] {
                if !(1..=6).contains(&level) {
                    return Err(ConfigError::HeadingLevelOutOfRange(level));
                }
            }
            if min > max {
                return Err(ConfigError::TocLevelsOutOfOrder { min, max });
            }
            extensions.push(Box::new(TableOfContents {
                min_level: min,
                max_level: max,
                ..TableOfContents::default()
            }));
        }
        if self.permalinks {
            extensions.push(Box::new(HeadingPermalinks::default()));
        }
        if self.semantic_spans {
            extensions.push(Box::new(SemanticSpans));
        }
        if let Some(name) = &self.smart_quotes_locale {
            let locale = QuoteLocale::by_name(name)
                .ok_or_else(|| ConfigError::UnknownLocale(name.clone()))?;
            extensions.push(Box::new(SmartQuotes::new(locale)));
        }

        Ok(Converter {
            options: RenderOptions {
                profile,
                safe: self.safe,
                soft_break,
                code_block_tab_width: self.code_block_tab_width,
            },
            extensions,
        })
    }
}

pub struct Converter {
    options: RenderOptions,
    extensions: Vec<Box<dyn Extension>>,
}

impl Converter {
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::new()
    }

    pub fn profile(&self) -> &Profile {
        &self.options.profile
    }

    /// Parses without rendering. Line endings are normalized first, so the
    /// spans refer to the normalized text.
    pub fn parse(&self, source: &str) -> Document {
        parse(&normalize(source)).document
    }

    pub fn convert(&self, source: &str) -> String {
        let result = parse(&normalize(source));
        render_html(&result.document, &self.options, &self.extensions)
    }

    /// Like [`convert`](Self::convert) with an ammonia pass over the output.
    pub fn convert_sanitized(&self, source: &str) -> String {
        let result = parse(&normalize(source));
        render_html_sanitized(&result.document, &self.options, &self.extensions)
    }
}

/// One-shot conversion with default settings.
pub fn to_html(source: &str) -> String {
    let result = parse(&normalize(source));
    render_html(&result.document, &RenderOptions::default(), &[])
}

fn normalize(source: &str) -> String {
    if !source.contains('\r') {
        return source.to_string();
    }
    source.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, Converter, normalize};

    #[test]
    fn normalizes_line_endings() {
        assert_eq!(normalize("a\r\nb\rc\n"), "a\nb\nc\n");
        assert_eq!(normalize("plain\n"), "plain\n");
    }

    #[test]
    fn build_rejects_unknown_names() {
        assert!(matches!(
            Converter::builder().profile_name("blog").build(),
            Err(ConfigError::UnknownProfile(_))
        ));
        assert!(matches!(
            Converter::builder().soft_break_name("crlf").build(),
            Err(ConfigError::UnknownSoftBreak(_))
        ));
        assert!(matches!(
            Converter::builder().smart_quotes_locale("tlh").build(),
            Err(ConfigError::UnknownLocale(_))
        ));
    }

    #[test]
    fn build_accepts_soft_break_aliases() {
        for name in ["newline", "space", "br", "break"] {
            assert!(Converter::builder().soft_break_name(name).build().is_ok());
        }
    }

    #[test]
    fn build_accepts_auto_locale() {
        let converter = Converter::builder().smart_quotes_locale("auto").build();
        assert!(converter.is_ok());
    }

    #[test]
    fn build_rejects_bad_toc_levels() {
        assert!(matches!(
            Converter::builder().table_of_contents(3, 2).build(),
            Err(ConfigError::TocLevelsOutOfOrder { min: 3, max: 2 })
        ));
        assert!(matches!(
            Converter::builder().table_of_contents(0, 3).build(),
            Err(ConfigError::HeadingLevelOutOfRange(0))
        ));
    }

    #[test]
    fn converter_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Converter>();
    }
}
