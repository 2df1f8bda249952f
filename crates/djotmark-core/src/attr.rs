//! Parser for the `{#id .class key="value" flag}` attribute syntax and the
//! merge rules for stacking multiple attribute sets on one node.
//!
//! Attribute syntax never produces a hard error: anything malformed or
//! unterminated is rejected with `None` and the caller keeps the braces as
//! literal text.

/// Ordered attribute map attached to a block or inline node.
///
/// `id` and `class` are distinguished: classes from later sets union with
/// earlier ones, while any other key set later overrides the earlier value.
/// Bare word tokens are stored as boolean-present flags with an empty value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
    pub id: Option<String>,
    pub classes: Vec<String>,
    pairs: Vec<(String, String)>,
}

impl Attributes {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.classes.is_empty() && self.pairs.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// True for boolean-present flags (`{video}`) and for present keys.
    pub fn has(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        if let Some(entry) = self.pairs.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value.to_string();
        } else {
            self.pairs.push((key.to_string(), value.to_string()));
        }
    }

    pub fn push_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Folds a later attribute set into this one: classes union, everything
    /// else overrides.
    pub fn merge(&mut self, other: Attributes) {
        if other.id.is_some() {
            self.id = other.id;
        }
        for class in other.classes {
            if !self.has_class(&class) {
                self.classes.push(class);
            }
        }
        for (key, value) in other.pairs {
            self.set(&key, &value);
        }
    }
}

/// Parses an attribute set starting at `text[start..]`, which must begin with
/// `{`. Returns the attributes and the index just past the closing brace.
pub fn parse_attributes(text: &str, start: usize) -> Option<(Attributes, usize)> {
    let bytes = text.as_bytes();
    if start >= bytes.len() || bytes[start] != b'{' {
        return None;
    }
    let mut attrs = Attributes::default();
    let mut i = start + 1;

    loop {
        while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
            i += 1;
        }
        if i >= bytes.len() {
            return None;
        }
        match bytes[i] {
            b'}' => return Some((attrs, i + 1)),
            b'#' => {
                let (name, next) = scan_name(bytes, i + 1)?;
                attrs.id = Some(name);
                i = next;
            }
            b'.' => {
                let (name, next) = scan_name(bytes, i + 1)?;
                attrs.push_class(&name);
                i = next;
            }
            _ => {
                let (key, next) = scan_name(bytes, i)?;
                i = next;
                if i < bytes.len() && bytes[i] == b'=' {
                    let (value, next) = scan_value(text, i + 1)?;
                    attrs.set(&key, &value);
                    i = next;
                } else {
                    // Bare word: boolean-present flag.
                    attrs.set(&key, "");
                }
            }
        }
        if i < bytes.len() && bytes[i] != b'}' && bytes[i] != b' ' && bytes[i] != b'\t' {
            return None;
        }
    }
}

fn scan_name(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    let mut i = start;
    while i < bytes.len() {
        let b = bytes[i];
        let ok = b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b':');
        if !ok {
            break;
        }
        i += 1;
    }
    if i == start {
        return None;
    }
    Some((String::from_utf8_lossy(&bytes[start..i]).to_string(), i))
}

fn scan_value(text: &str, start: usize) -> Option<(String, usize)> {
    let bytes = text.as_bytes();
    if start >= bytes.len() {
        return None;
    }
    match bytes[start] {
        quote @ (b'"' | b'\'') => {
            let mut value = String::new();
            let mut i = start + 1;
            while i < bytes.len() {
                let b = bytes[i];
                if b == b'\\' && i + 1 < bytes.len() {
                    let next = bytes[i + 1];
                    if next == quote || next == b'\\' {
                        value.push(next as char);
                        i += 2;
                        continue;
                    }
                }
                if b == quote {
                    return Some((value, i + 1));
                }
                if b == b'\n' {
                    return None;
                }
                value.push(text[i..].chars().next()?);
                i += text[i..].chars().next()?.len_utf8();
            }
            None
        }
        _ => {
            let mut i = start;
            while i < bytes.len() && !matches!(bytes[i], b' ' | b'\t' | b'}' | b'{' | b'\n') {
                i += 1;
            }
            if i == start {
                return None;
            }
            Some((text[start..i].to_string(), i))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Attributes, parse_attributes};

    #[test]
    fn parses_id_classes_and_pairs() {
        let (attrs, end) = parse_attributes("{#intro .warning .wide lang=en}", 0).unwrap();
        assert_eq!(end, 31);
        assert_eq!(attrs.id.as_deref(), Some("intro"));
        assert_eq!(attrs.classes, vec!["warning", "wide"]);
        assert_eq!(attrs.get("lang"), Some("en"));
    }

    #[test]
    fn quoted_values_support_escapes() {
        let (attrs, _) = parse_attributes(r#"{title="say \"hi\" \\now"}"#, 0).unwrap();
        assert_eq!(attrs.get("title"), Some(r#"say "hi" \now"#));
    }

    #[test]
    fn single_quoted_and_bare_values() {
        let (attrs, _) = parse_attributes("{a='x y' b=word flag}", 0).unwrap();
        assert_eq!(attrs.get("a"), Some("x y"));
        assert_eq!(attrs.get("b"), Some("word"));
        assert!(attrs.has("flag"));
    }

    #[test]
    fn rejects_unterminated_or_malformed() {
        assert!(parse_attributes("{#id", 0).is_none());
        assert!(parse_attributes("{key=}", 0).is_none());
        assert!(parse_attributes("{key=\"open}", 0).is_none());
        assert!(parse_attributes("no brace", 0).is_none());
    }

    #[test]
    fn later_sets_override_except_classes() {
        let (mut first, _) = parse_attributes("{#a .one lang=en}", 0).unwrap();
        let (second, _) = parse_attributes("{#b .two lang=de}", 0).unwrap();
        first.merge(second);
        assert_eq!(first.id.as_deref(), Some("b"));
        assert_eq!(first.classes, vec!["one", "two"]);
        assert_eq!(first.get("lang"), Some("de"));
    }

    #[test]
    fn empty_set_is_empty() {
        let (attrs, end) = parse_attributes("{}", 0).unwrap();
        assert_eq!(end, 2);
        assert_eq!(attrs, Attributes::default());
    }
}
