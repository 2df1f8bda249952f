use djotmark_core::{Converter, Feature, Profile};

#[test]
fn comment_profile_flattens_headings_but_keeps_text() {
    let converter = Converter::builder()
        .profile_name("comment")
        .build()
        .unwrap();
    let html = converter.convert("# Heading\n\nBody.\n");
    assert!(!html.contains("<h1"), "heading tag must be stripped");
    assert!(html.contains("<p>Heading</p>"), "heading text must survive");
    assert!(html.contains("<p>Body.</p>"));
}

#[test]
fn comment_profile_drops_images_to_alt_text() {
    let converter = Converter::builder()
        .profile_name("comment")
        .build()
        .unwrap();
    let html = converter.convert("![a cat](cat.png)\n");
    assert!(!html.contains("<img"));
    assert!(html.contains("a cat"));
}

#[test]
fn comment_profile_adds_nofollow() {
    let converter = Converter::builder()
        .profile_name("comment")
        .build()
        .unwrap();
    assert_eq!(
        converter.convert("[go](/there)\n"),
        "<p><a href=\"/there\" rel=\"nofollow\">go</a></p>\n"
    );
}

#[test]
fn comment_profile_flattens_tables() {
    let converter = Converter::builder()
        .profile_name("comment")
        .build()
        .unwrap();
    let html = converter.convert("| a | b |\n|---|---|\n| 1 | 2 |\n");
    assert!(!html.contains("<table"));
    assert!(html.contains("a b"));
    assert!(html.contains("1 2"));
}

#[test]
fn minimal_profile_keeps_lists_only() {
    let converter = Converter::builder()
        .profile_name("minimal")
        .build()
        .unwrap();
    let html = converter.convert("- one\n- two\n");
    assert!(html.contains("<ul>"));

    let html = converter.convert("> quoted\n\n---\n\n[go](/there)\n");
    assert!(!html.contains("<blockquote"));
    assert!(!html.contains("<hr"));
    assert!(!html.contains("<a"));
    assert!(html.contains("<p>quoted</p>"));
    assert!(html.contains("go"));
}

#[test]
fn minimal_profile_flattens_code_blocks() {
    let converter = Converter::builder()
        .profile_name("minimal")
        .build()
        .unwrap();
    let html = converter.convert("```\nlet x = 1;\n```\n");
    assert!(!html.contains("<pre"));
    assert!(html.contains("<p>let x = 1;</p>"));
}

#[test]
fn article_profile_drops_raw_html() {
    let converter = Converter::builder()
        .profile_name("article")
        .build()
        .unwrap();
    let html = converter.convert("``` =html\n<script>alert(1)</script>\n```\n\nText.\n");
    assert!(!html.contains("<script"));
    assert!(html.contains("<p>Text.</p>"));
    // Headings still work in article.
    assert!(converter.convert("# H\n").contains("<h1"));
}

#[test]
fn custom_profile_masks_features() {
    let profile = Profile::custom("headings-only", &[Feature::Headings]);
    let converter = Converter::builder().profile(profile).build().unwrap();
    assert!(converter.convert("# H\n").contains("<h1"));
    assert!(!converter.convert("> q\n").contains("<blockquote"));
}

#[test]
fn safe_mode_strips_dangerous_schemes() {
    let converter = Converter::builder().safe(true).build().unwrap();
    let html = converter.convert("[x](javascript:alert\\(1\\))\n");
    assert!(!html.contains("javascript:"));
    assert!(html.contains("<a>x</a>"));

    let html = converter.convert("![x](data:image/svg+xml,payload)\n");
    assert!(!html.contains("data:"));

    // Relative and allow-listed URLs are untouched.
    let html = converter.convert("[a](/ok) [b](https://ok.example) [c](mailto:x@y.z)\n");
    assert!(html.contains("href=\"/ok\""));
    assert!(html.contains("href=\"https://ok.example\""));
    assert!(html.contains("href=\"mailto:x@y.z\""));
}

#[test]
fn safe_mode_drops_raw_html_even_on_full_profile() {
    let converter = Converter::builder().safe(true).build().unwrap();
    let html = converter.convert("``` =html\n<script>alert(1)</script>\n```\n");
    assert_eq!(html, "");
    let html = converter.convert("`<b>`{=html}\n");
    assert_eq!(html, "<p></p>\n");
}

#[test]
fn sanitized_output_removes_disallowed_tags() {
    let converter = Converter::builder().build().unwrap();
    let html = converter.convert_sanitized("``` =html\n<script>alert(1)</script>\n```\n\nKept.\n");
    assert!(!html.contains("<script"));
    assert!(html.contains("Kept."));
}

#[test]
fn sanitized_output_keeps_ids_and_classes() {
    let converter = Converter::builder().build().unwrap();
    let html = converter.convert_sanitized("{#custom .wide}\n# Title\n");
    assert!(html.contains("id=\"custom\""));
    assert!(html.contains("class=\"wide\""));
}
