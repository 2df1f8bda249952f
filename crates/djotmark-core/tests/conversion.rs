use djotmark_core::{Converter, SoftBreak, to_html};

#[test]
fn conversion_is_deterministic() {
    let source = "# Title\n\nBody with *markup* and a [link](/a).\n";
    assert_eq!(to_html(source), to_html(source));
}

#[test]
fn star_is_strong_and_underscore_is_emphasis() {
    assert_eq!(
        to_html("*bold* and _ital_\n"),
        "<p><strong>bold</strong> and <em>ital</em></p>\n"
    );
}

#[test]
fn overlapping_markers_nest_innermost_first() {
    assert_eq!(
        to_html("_*text*_\n"),
        "<p><em><strong>text</strong></em></p>\n"
    );
}

#[test]
fn unmatched_markers_stay_literal() {
    assert_eq!(to_html("a * lone star\n"), "<p>a * lone star</p>\n");
    assert_eq!(to_html("_open only\n"), "<p>_open only</p>\n");
}

#[test]
fn superscript_and_subscript() {
    assert_eq!(
        to_html("x^2^ and H~2~O\n"),
        "<p>x<sup>2</sup> and H<sub>2</sub>O</p>\n"
    );
}

#[test]
fn brace_pairs_highlight_insert_delete() {
    assert_eq!(
        to_html("{=marked=} and {+added+} and {-gone-}\n"),
        "<p><mark>marked</mark> and <ins>added</ins> and <del>gone</del></p>\n"
    );
}

#[test]
fn blank_line_separates_paragraphs() {
    let html = to_html("First paragraph.\n\nSecond paragraph.\n");
    assert_eq!(html, "<p>First paragraph.</p>\n<p>Second paragraph.</p>\n");
    assert_eq!(html.matches("<p>").count(), 2);
}

#[test]
fn three_items_one_list() {
    let html = to_html("- Item 1\n- Item 2\n- Item 3\n");
    assert_eq!(html.matches("<ul>").count(), 1);
    assert_eq!(html.matches("<li>").count(), 3);
    assert_eq!(
        html,
        "<ul>\n<li>Item 1</li>\n<li>Item 2</li>\n<li>Item 3</li>\n</ul>\n"
    );
}

#[test]
fn loose_list_wraps_items_in_paragraphs() {
    assert_eq!(
        to_html("- one\n\n- two\n"),
        "<ul>\n<li>\n<p>one</p>\n</li>\n<li>\n<p>two</p>\n</li>\n</ul>\n"
    );
}

#[test]
fn nested_list_needs_blank_line() {
    let html = to_html("- fruits\n\n  - apple\n  - pear\n");
    assert!(html.contains("<p>fruits</p>"));
    assert!(html.contains("<li>apple</li>"));
    assert_eq!(html.matches("<ul>").count(), 2);
}

#[test]
fn code_block_is_literal() {
    let html = to_html("```rust\nfn main() {\n    let x = 1 < 2;\n}\n```\n");
    assert_eq!(
        html,
        "<pre><code class=\"language-rust\">fn main() {\n    let x = 1 &lt; 2;\n}\n</code></pre>\n"
    );
}

#[test]
fn fence_without_blank_line_stays_in_paragraph() {
    let html = to_html("Some prose\n```\ncode\n```\n");
    assert!(!html.contains("<pre>"), "fence must not open a code block");
    assert!(html.starts_with("<p>Some prose"));
}

#[test]
fn unterminated_fence_runs_to_end() {
    let html = to_html("```\nleft open\n");
    assert_eq!(html, "<pre><code>left open\n</code></pre>\n");
}

#[test]
fn heading_gets_slug_id() {
    assert_eq!(
        to_html("## Getting Started\n"),
        "<h2 id=\"getting-started\">Getting Started</h2>\n"
    );
}

#[test]
fn duplicate_heading_slugs_get_suffixes() {
    let html = to_html("# Setup\n\n# Setup\n");
    assert!(html.contains("<h1 id=\"setup\">"));
    assert!(html.contains("<h1 id=\"setup-2\">"));
}

#[test]
fn attribute_line_attaches_to_next_block() {
    assert_eq!(
        to_html("{#custom .wide}\n# Title\n"),
        "<h1 id=\"custom\" class=\"wide\">Title</h1>\n"
    );
}

#[test]
fn malformed_attribute_line_is_literal_text() {
    let html = to_html("{#unclosed\n");
    assert_eq!(html, "<p>{#unclosed</p>\n");
}

#[test]
fn blockquote_and_lazy_continuation() {
    assert_eq!(
        to_html("> quoted\n"),
        "<blockquote>\n<p>quoted</p>\n</blockquote>\n"
    );
    assert_eq!(
        to_html("> first\nsecond\n"),
        "<blockquote>\n<p>first\nsecond</p>\n</blockquote>\n"
    );
}

#[test]
fn div_with_class_shorthand() {
    assert_eq!(
        to_html("::: note\ncontent\n:::\n"),
        "<div class=\"note\">\n<p>content</p>\n</div>\n"
    );
}

#[test]
fn nested_divs_close_in_order() {
    let html = to_html("::: outer\n:::: inner\ndeep\n::::\n:::\n");
    assert_eq!(
        html,
        "<div class=\"outer\">\n<div class=\"inner\">\n<p>deep</p>\n</div>\n</div>\n"
    );
}

#[test]
fn thematic_break() {
    assert_eq!(to_html("***\n"), "<hr>\n");
    assert_eq!(to_html("- - -\n"), "<hr>\n");
}

#[test]
fn inline_link_with_title() {
    assert_eq!(
        to_html("[docs](https://example.com \"The docs\")\n"),
        "<p><a href=\"https://example.com\" title=\"The docs\">docs</a></p>\n"
    );
}

#[test]
fn reference_and_collapsed_links() {
    assert_eq!(
        to_html("[text][label]\n\n[label]: /url\n"),
        "<p><a href=\"/url\">text</a></p>\n"
    );
    assert_eq!(
        to_html("[Label][]\n\n[label]: /url\n"),
        "<p><a href=\"/url\">Label</a></p>\n"
    );
}

#[test]
fn definition_may_follow_use() {
    // The prepass collects definitions before inlines are parsed.
    let html = to_html("See [here][ref].\n\n[ref]: /target\n");
    assert!(html.contains("<a href=\"/target\">here</a>"));
}

#[test]
fn unresolved_reference_stays_literal() {
    let html = to_html("[text][missing]\n");
    assert!(!html.contains("<a"));
    assert!(html.contains("[text]"));
}

#[test]
fn autolink() {
    assert_eq!(
        to_html("<https://example.com/x>\n"),
        "<p><a href=\"https://example.com/x\">https://example.com/x</a></p>\n"
    );
}

#[test]
fn image_alt_is_plain_text() {
    assert_eq!(
        to_html("![a *bold* cat](cat.png)\n"),
        "<p><img src=\"cat.png\" alt=\"a bold cat\"></p>\n"
    );
}

#[test]
fn code_span_strips_one_padding_space() {
    assert_eq!(to_html("`` `tick` ``\n"), "<p><code>`tick`</code></p>\n");
}

#[test]
fn escaped_punctuation_is_literal() {
    assert_eq!(to_html("\\*not strong\\*\n"), "<p>*not strong*</p>\n");
}

#[test]
fn hard_breaks() {
    assert_eq!(to_html("a\\\nb\n"), "<p>a<br>\nb</p>\n");
    assert_eq!(to_html("a  \nb\n"), "<p>a<br>\nb</p>\n");
}

#[test]
fn soft_break_modes() {
    let space = Converter::builder()
        .soft_break(SoftBreak::Space)
        .build()
        .unwrap();
    assert_eq!(space.convert("a\nb\n"), "<p>a b</p>\n");

    let hard = Converter::builder()
        .soft_break(SoftBreak::Break)
        .build()
        .unwrap();
    assert_eq!(hard.convert("a\nb\n"), "<p>a<br>\nb</p>\n");

    assert_eq!(to_html("a\nb\n"), "<p>a\nb</p>\n");
}

#[test]
fn footnotes_numbered_by_first_reference() {
    let html = to_html("One[^b] two[^a].\n\n[^a]: Alpha note\n\n[^b]: Beta note\n");
    // `b` is referenced first, so it gets number 1.
    assert!(html.contains("<a id=\"fnref1\" href=\"#fn1\" role=\"doc-noteref\"><sup>1</sup></a>"));
    assert!(html.contains("<a id=\"fnref2\" href=\"#fn2\" role=\"doc-noteref\"><sup>2</sup></a>"));
    let fn1 = html.find("<li id=\"fn1\">").expect("fn1 item");
    let beta = html.find("Beta note").expect("beta body");
    let alpha = html.find("Alpha note").expect("alpha body");
    assert!(fn1 < beta && beta < alpha);
    assert!(html.contains("role=\"doc-backref\""));
}

#[test]
fn unreferenced_footnotes_emit_no_section() {
    let html = to_html("No refs here.\n\n[^a]: Orphan\n");
    assert!(!html.contains("doc-endnotes"));
}

#[test]
fn unresolved_footnote_ref_stays_literal() {
    let html = to_html("Ref[^missing].\n");
    assert_eq!(html, "<p>Ref[^missing].</p>\n");
    assert!(!html.contains("doc-endnotes"));
}

#[test]
fn raw_html_block_passes_through() {
    assert_eq!(
        to_html("``` =html\n<aside>raw</aside>\n```\n"),
        "<aside>raw</aside>\n"
    );
}

#[test]
fn raw_inline_passes_through() {
    assert_eq!(to_html("a `<b>`{=html} b\n"), "<p>a <b> b</p>\n");
}

#[test]
fn raw_content_for_other_formats_is_dropped() {
    assert_eq!(to_html("``` =latex\n\\section{x}\n```\n"), "");
}

#[test]
fn straight_quotes_curl_by_default() {
    assert_eq!(
        to_html("\"hi\" and 'lo'\n"),
        "<p>\u{201C}hi\u{201D} and \u{2018}lo\u{2019}</p>\n"
    );
}

#[test]
fn tables_with_alignment() {
    let html = to_html("| a | b |\n|---|--:|\n| 1 | 2 |\n");
    assert_eq!(
        html,
        "<table>\n<thead>\n<tr>\n<th>a</th>\n<th style=\"text-align: right;\">b</th>\n</tr>\n</thead>\n\
         <tbody>\n<tr>\n<td>1</td>\n<td style=\"text-align: right;\">2</td>\n</tr>\n</tbody>\n</table>\n"
    );
}

#[test]
fn headless_table_has_no_thead() {
    let html = to_html("| 1 | 2 |\n| 3 | 4 |\n");
    assert!(!html.contains("<thead>"));
    assert_eq!(html.matches("<tr>").count(), 2);
}

#[test]
fn crlf_input_is_normalized() {
    assert_eq!(to_html("one\r\ntwo\r\n"), "<p>one\ntwo</p>\n");
}

#[test]
fn media_classes_become_players() {
    let html = to_html("![clip](/v.mp4){.video}\n");
    assert!(html.contains("<video controls src=\"/v.mp4\""));
    assert!(html.contains("</video>"));
}

#[test]
fn span_attributes_render_generically() {
    assert_eq!(
        to_html("[note]{.small}\n"),
        "<p><span class=\"small\">note</span></p>\n"
    );
}

#[test]
fn trailing_attributes_attach_to_preceding_word() {
    assert_eq!(
        to_html("word{.red}\n"),
        "<p><span class=\"red\">word</span></p>\n"
    );
    assert_eq!(
        to_html("a nice{.x} day\n"),
        "<p>a <span class=\"x\">nice</span> day</p>\n"
    );
}

#[test]
fn attributes_after_whitespace_stay_literal() {
    assert_eq!(to_html("word {.red}\n"), "<p>word {.red}</p>\n");
}

#[test]
fn ordered_list_start_attribute() {
    assert_eq!(
        to_html("3. three\n4. four\n"),
        "<ol start=\"3\">\n<li>three</li>\n<li>four</li>\n</ol>\n"
    );
}
