//! Rendering profiles: immutable allow-lists of block/inline constructs.
//!
//! A profile is data, not behavior. The renderer consults it before emitting
//! each node; a disallowed construct is flattened so its text content still
//! appears in the output.

use std::collections::HashMap;

use once_cell::sync::Lazy;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Feature {
    Headings,
    Lists,
    Blockquotes,
    CodeBlocks,
    Divs,
    Tables,
    ThematicBreaks,
    Links,
    Images,
    RawHtml,
    Footnotes,
}

impl Feature {
    fn bit(self) -> u16 {
        match self {
            Feature::Headings => 1 << 0,
            Feature::Lists => 1 << 1,
            Feature::Blockquotes => 1 << 2,
            Feature::CodeBlocks => 1 << 3,
            Feature::Divs => 1 << 4,
            Feature::Tables => 1 << 5,
            Feature::ThematicBreaks => 1 << 6,
            Feature::Links => 1 << 7,
            Feature::Images => 1 << 8,
            Feature::RawHtml => 1 << 9,
            Feature::Footnotes => 1 << 10,
        }
    }
}

const ALL_FEATURES: u16 = (1 << 11) - 1;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Profile {
    name: String,
    mask: u16,
    nofollow_links: bool,
}

impl Profile {
    /// No restrictions.
    pub fn full() -> Self {
        Self {
            name: "full".to_string(),
            mask: ALL_FEATURES,
            nofollow_links: false,
        }
    }

    /// Trusted long-form content: everything except raw HTML passthrough.
    pub fn article() -> Self {
        Self {
            name: "article".to_string(),
            mask: ALL_FEATURES & !Feature::RawHtml.bit(),
            nofollow_links: false,
        }
    }

    /// Untrusted short content: no headings, images, tables, or raw HTML;
    /// links carry `rel="nofollow"`.
    pub fn comment() -> Self {
        Self {
            name: "comment".to_string(),
            mask: ALL_FEATURES
                & !(Feature::Headings.bit()
                    | Feature::Images.bit()
                    | Feature::Tables.bit()
                    | Feature::RawHtml.bit()),
            nofollow_links: true,
        }
    }

    /// Text and lists only.
    pub fn minimal() -> Self {
        Self {
            name: "minimal".to_string(),
            mask: Feature::Lists.bit(),
            nofollow_links: false,
        }
    }

    /// Custom profile from an explicit feature list.
    pub fn custom(name: &str, features: &[Feature]) -> Self {
        let mut mask = 0;
        for feature in features {
            mask |= feature.bit();
        }
        Self {
            name: name.to_string(),
            mask,
            nofollow_links: false,
        }
    }

    pub fn by_name(name: &str) -> Option<Profile> {
        PRESETS.get(name).cloned()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn allows(&self, feature: Feature) -> bool {
        self.mask & feature.bit() != 0
    }

    pub fn nofollow_links(&self) -> bool {
        self.nofollow_links
    }

    pub fn with_nofollow_links(mut self, nofollow: bool) -> Self {
        self.nofollow_links = nofollow;
        self
    }
}

static PRESETS: Lazy<HashMap<&'static str, Profile>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert("full", Profile::full());
    map.insert("article", Profile::article());
    map.insert("comment", Profile::comment());
    map.insert("minimal", Profile::minimal());
    map
});

#[cfg(test)]
mod tests {
    use super::{Feature, Profile};

    #[test]
    fn presets_restrict_expected_features() {
        assert!(Profile::full().allows(Feature::RawHtml));
        assert!(!Profile::article().allows(Feature::RawHtml));
        assert!(Profile::article().allows(Feature::Headings));
        assert!(!Profile::comment().allows(Feature::Headings));
        assert!(!Profile::comment().allows(Feature::Images));
        assert!(Profile::comment().allows(Feature::Links));
        assert!(Profile::comment().nofollow_links());
        assert!(Profile::minimal().allows(Feature::Lists));
        assert!(!Profile::minimal().allows(Feature::Links));
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(Profile::by_name("comment"), Some(Profile::comment()));
        assert!(Profile::by_name("nonsense").is_none());
    }
}
