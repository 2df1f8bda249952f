use djotmark_core::{
    BlockKind, Converter, Extension, HeadingPermalinks, RenderEvent, TableOfContents, TocPosition,
};

#[test]
fn semantic_spans_map_abbr_attribute() {
    let converter = Converter::builder().semantic_spans().build().unwrap();
    assert_eq!(
        converter.convert("[CSS]{abbr=\"Cascading Style Sheets\"}\n"),
        "<p><abbr title=\"Cascading Style Sheets\">CSS</abbr></p>\n"
    );
}

#[test]
fn semantic_spans_map_kbd_and_dfn() {
    let converter = Converter::builder().semantic_spans().build().unwrap();
    let html = converter.convert("Press [Ctrl]{kbd} to see a [term]{dfn}.\n");
    assert!(html.contains("<kbd>Ctrl</kbd>"));
    assert!(html.contains("<dfn>term</dfn>"));
}

#[test]
fn spans_without_semantic_attrs_keep_default_markup() {
    let converter = Converter::builder().semantic_spans().build().unwrap();
    assert_eq!(
        converter.convert("[plain]{.x}\n"),
        "<p><span class=\"x\">plain</span></p>\n"
    );
}

#[test]
fn toc_is_prepended_and_linked() {
    let converter = Converter::builder().table_of_contents(1, 3).build().unwrap();
    let html = converter.convert("# One\n\n## One A\n\n# Two\n");
    let nav_end = html.find("</nav>").expect("nav present");
    let first_heading = html.find("<h1").expect("heading present");
    assert!(nav_end < first_heading, "toc must come before the body");
    assert!(html.contains("<a href=\"#one\">One</a>"));
    assert!(html.contains("<a href=\"#one-a\">One A</a>"));
    assert!(html.contains("<a href=\"#two\">Two</a>"));
}

#[test]
fn toc_respects_level_bounds() {
    let converter = Converter::builder().table_of_contents(2, 3).build().unwrap();
    let html = converter.convert("# Skipped\n\n## Kept\n");
    assert!(!html.contains("<a href=\"#skipped\">"));
    assert!(html.contains("<a href=\"#kept\">"));
}

#[test]
fn toc_at_bottom() {
    let toc = TableOfContents {
        position: TocPosition::Bottom,
        ..TableOfContents::default()
    };
    let converter = Converter::builder().extension(Box::new(toc)).build().unwrap();
    let html = converter.convert("# Only\n");
    let heading = html.find("<h1").expect("heading present");
    let nav = html.find("<nav").expect("nav present");
    assert!(heading < nav, "toc must come after the body");
}

#[test]
fn heading_permalinks_append_anchor() {
    let converter = Converter::builder().heading_permalinks().build().unwrap();
    assert_eq!(
        converter.convert("# Intro\n"),
        "<h1 id=\"intro\">Intro<a class=\"permalink\" href=\"#intro\">\u{00A7}</a></h1>\n"
    );
}

#[test]
fn custom_permalink_symbol() {
    let permalinks = HeadingPermalinks {
        symbol: "#".to_string(),
        css_class: "anchor".to_string(),
    };
    let converter = Converter::builder()
        .extension(Box::new(permalinks))
        .build()
        .unwrap();
    let html = converter.convert("# Intro\n");
    assert!(html.contains("<a class=\"anchor\" href=\"#intro\">#</a>"));
}

#[test]
fn smart_quotes_locales() {
    let de = Converter::builder().smart_quotes_locale("de").build().unwrap();
    assert_eq!(de.convert("\"hallo\"\n"), "<p>\u{201E}hallo\u{201C}</p>\n");

    let fr = Converter::builder().smart_quotes_locale("fr").build().unwrap();
    assert_eq!(fr.convert("\"salut\"\n"), "<p>\u{00AB}salut\u{00BB}</p>\n");
}

struct ShoutingCode;

impl Extension for ShoutingCode {
    fn render_override(&self, event: &RenderEvent<'_>) -> Option<String> {
        let RenderEvent::Block { block, .. } = event else {
            return None;
        };
        let BlockKind::CodeBlock { text, .. } = &block.kind else {
            return None;
        };
        Some(format!("<pre class=\"shout\">{}</pre>\n", text.to_uppercase()))
    }
}

#[test]
fn custom_extension_overrides_default_markup() {
    let converter = Converter::builder()
        .extension(Box::new(ShoutingCode))
        .build()
        .unwrap();
    assert_eq!(
        converter.convert("```\nquiet\n```\n"),
        "<pre class=\"shout\">QUIET\n</pre>\n"
    );
}

#[test]
fn first_extension_wins() {
    struct Second;
    impl Extension for Second {
        fn render_override(&self, event: &RenderEvent<'_>) -> Option<String> {
            let RenderEvent::Block { block, .. } = event else {
                return None;
            };
            if matches!(block.kind, BlockKind::CodeBlock { .. }) {
                Some("<pre>never</pre>\n".to_string())
            } else {
                None
            }
        }
    }

    let converter = Converter::builder()
        .extension(Box::new(ShoutingCode))
        .extension(Box::new(Second))
        .build()
        .unwrap();
    let html = converter.convert("```\nquiet\n```\n");
    assert!(html.contains("QUIET"));
    assert!(!html.contains("never"));
}
