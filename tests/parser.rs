use mdrender::{RenderOptions, render_to_html};
use pretty_assertions::assert_eq;

fn assert_html(md: &str, expected: &str) {
    assert_eq!(render_to_html(md, &RenderOptions::default()), expected);
}

#[test]
fn renders_empty_and_whitespace_input() {
    assert_html("", "");
    assert_html("   \n\n\t\n", "");
}

#[test]
fn renders_headings_h1_to_h6() {
    assert_html(
        "# h1\n## h2\n### h3\n#### h4\n##### h5\n###### h6",
        "<h1>h1</h1>\n<h2>h2</h2>\n<h3>h3</h3>\n<h4>h4</h4>\n<h5>h5</h5>\n<h6>h6</h6>\n",
    );
}

#[test]
fn seven_hashes_is_a_paragraph() {
    assert_html("####### h7", "<p>####### h7</p>\n");
}

#[test]
fn atx_closing_sequence_is_stripped() {
    assert_html("# foo ##", "<h1>foo</h1>\n");
    assert_html("## foo #bar", "<h2>foo #bar</h2>\n");
}

#[test]
fn renders_setext_headings() {
    assert_html(
        "Heading one\n===========\n\nHeading two\n-----------",
        "<h1>Heading one</h1>\n<h2>Heading two</h2>\n",
    );
}

#[test]
fn setext_heading_spans_paragraph_lines() {
    assert_html("Foo\nbar\n===", "<h1>Foo\nbar</h1>\n");
}

#[test]
fn indented_heading() {
    assert_html("   ## heading", "<h2>heading</h2>\n");
}

#[test]
fn hash_without_space_is_text() {
    assert_html("##heading", "<p>##heading</p>\n");
    assert_html("#5 bolt", "<p>#5 bolt</p>\n");
}

#[test]
fn paragraph_collects_lines_until_block_boundary() {
    assert_html(
        "line one\nline two\n\n# h\nline three",
        "<p>line one\nline two</p>\n<h1>h</h1>\n<p>line three</p>\n",
    );
}

#[test]
fn inline_styles() {
    assert_html(
        "this is **strong** and *em* and `code`",
        "<p>this is <strong>strong</strong> and <em>em</em> and <code>code</code></p>\n",
    );
}

#[test]
fn underscore_variants() {
    assert_html(
        "__strong__ and _em_",
        "<p><strong>strong</strong> and <em>em</em></p>\n",
    );
}

#[test]
fn intraword_underscore_is_literal() {
    assert_html("snake_case_name", "<p>snake_case_name</p>\n");
    assert_html("_foo_bar", "<p>_foo_bar</p>\n");
}

#[test]
fn intraword_asterisk_emphasis() {
    assert_html("foo*bar*", "<p>foo<em>bar</em></p>\n");
}

#[test]
fn whitespace_before_closer_prevents_emphasis() {
    assert_html("*foo bar *", "<p>*foo bar *</p>\n");
}

#[test]
fn symbols_and_non_ascii_punctuation_block_closers() {
    assert_html("*foo😀*bar", "<p>*foo😀*bar</p>\n");
    assert_html("*foo،*bar", "<p>*foo،*bar</p>\n");
    assert_html("*$*alpha.", "<p>*$*alpha.</p>\n");
}

#[test]
fn digits_and_letters_outside_ascii_are_not_punctuation() {
    assert_html("a*²*b", "<p>a<em>²</em>b</p>\n");
    assert_html("a*µ*b", "<p>a<em>µ</em>b</p>\n");
}

#[test]
fn unicode_space_around_delimiters() {
    assert_html("*\u{3000}a*", "<p>*\u{3000}a*</p>\n");
    assert_html("a\u{2028}*b*", "<p>a\u{2028}<em>b</em></p>\n");
}

#[test]
fn nested_inline_markup() {
    assert_html(
        "**outer *inner***",
        "<p><strong>outer <em>inner</em></strong></p>\n",
    );
}

#[test]
fn triple_delimiters() {
    assert_html("***both***", "<p><em><strong>both</strong></em></p>\n");
}

#[test]
fn rule_of_three_keeps_inner_run_literal() {
    assert_html("*foo**bar*", "<p><em>foo**bar</em></p>\n");
}

#[test]
fn links_with_inline_label_markup() {
    assert_html(
        "visit [**site**](https://example.com)",
        "<p>visit <a href=\"https://example.com\"><strong>site</strong></a></p>\n",
    );
}

#[test]
fn reference_links_and_shortcuts() {
    assert_html(
        "[A ref][id]\n\n[Shortcut]\n\n[id]: https://example.com \"Ref\"\n[shortcut]: https://shortcut.test",
        "<p><a href=\"https://example.com\" title=\"Ref\">A ref</a></p>\n<p><a href=\"https://shortcut.test\">Shortcut</a></p>\n",
    );
}

#[test]
fn collapsed_reference_link() {
    assert_html(
        "[Foo][]\n\n[foo]: /url",
        "<p><a href=\"/url\">Foo</a></p>\n",
    );
}

#[test]
fn first_reference_definition_wins() {
    assert_html(
        "[foo]\n\n[foo]: first\n[foo]: second",
        "<p><a href=\"first\">foo</a></p>\n",
    );
}

#[test]
fn reference_labels_are_case_and_space_insensitive() {
    assert_html(
        "[Foo  Bar]\n\n[foo bar]: /url",
        "<p><a href=\"/url\">Foo  Bar</a></p>\n",
    );
}

#[test]
fn undefined_reference_is_text() {
    assert_html("[nope]", "<p>[nope]</p>\n");
}

#[test]
fn reference_images() {
    assert_html(
        "![Logo][brand]\n\n[brand]: https://img.test/logo.png \"Logo title\"",
        "<p><img src=\"https://img.test/logo.png\" alt=\"Logo\" title=\"Logo title\" /></p>\n",
    );
}

#[test]
fn link_url_is_html_escaped() {
    assert_html(
        "[x](https://example.com?a=1&b=2)",
        "<p><a href=\"https://example.com?a=1&amp;b=2\">x</a></p>\n",
    );
}

#[test]
fn link_url_is_percent_encoded() {
    assert_html("[a](<b c>)", "<p><a href=\"b%20c\">a</a></p>\n");
    assert_html("[a](/ä)", "<p><a href=\"/%C3%A4\">a</a></p>\n");
}

#[test]
fn unparsable_link_is_left_as_text() {
    assert_html("look [here](missing", "<p>look [here](missing</p>\n");
}

#[test]
fn links_do_not_nest() {
    assert_html(
        "[foo [bar](/uri)](/uri)",
        "<p>[foo <a href=\"/uri\">bar</a>](/uri)</p>\n",
    );
}

#[test]
fn image_alt_flattens_markup() {
    assert_html(
        "![foo *bar*](/url \"title\")",
        "<p><img src=\"/url\" alt=\"foo bar\" title=\"title\" /></p>\n",
    );
}

#[test]
fn lists() {
    assert_html(
        "- one\n- two\n\n1. first\n2. second",
        "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n<ol>\n<li>first</li>\n<li>second</li>\n</ol>\n",
    );
}

#[test]
fn ordered_list_start_attribute() {
    assert_html(
        "3. a\n4. b",
        "<ol start=\"3\">\n<li>a</li>\n<li>b</li>\n</ol>\n",
    );
}

#[test]
fn nested_lists() {
    assert_html(
        "- one\n  - two\n    - three",
        "<ul>\n<li>one\n<ul>\n<li>two\n<ul>\n<li>three</li>\n</ul>\n</li>\n</ul>\n</li>\n</ul>\n",
    );
}

#[test]
fn under_indented_child_starts_sibling_list() {
    assert_html(
        "1. one\n  - two\n    1. three",
        "<ol>\n<li>one</li>\n</ol>\n<ul>\n<li>two\n<ol>\n<li>three</li>\n</ol>\n</li>\n</ul>\n",
    );
}

#[test]
fn changing_bullet_starts_new_list() {
    assert_html(
        "- one\n* two\n+ three",
        "<ul>\n<li>one</li>\n</ul>\n<ul>\n<li>two</li>\n</ul>\n<ul>\n<li>three</li>\n</ul>\n",
    );
}

#[test]
fn ordered_marker_needs_following_space() {
    assert_html("1.one\n1. two", "<p>1.one</p>\n<ol>\n<li>two</li>\n</ol>\n");
}

#[test]
fn only_list_starting_at_one_interrupts_paragraph() {
    assert_html("The number of\n14. windows", "<p>The number of\n14. windows</p>\n");
}

#[test]
fn blank_line_between_items_makes_list_loose() {
    assert_html(
        "- a\n- b\n\n- c",
        "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n<li>\n<p>c</p>\n</li>\n</ul>\n",
    );
}

#[test]
fn blank_line_inside_item_makes_list_loose() {
    assert_html(
        "- foo\n\n  bar",
        "<ul>\n<li>\n<p>foo</p>\n<p>bar</p>\n</li>\n</ul>\n",
    );
}

#[test]
fn blockquotes_and_fences() {
    assert_html(
        "> hello\n> **world**\n\n```rs\nfn main() {}\n```",
        "<blockquote>\n<p>hello\n<strong>world</strong></p>\n</blockquote>\n<pre><code class=\"language-rs\">fn main() {}\n</code></pre>\n",
    );
}

#[test]
fn blockquote_marker_with_optional_space() {
    assert_html(">a\n> b", "<blockquote>\n<p>a\nb</p>\n</blockquote>\n");
}

#[test]
fn blockquote_lazy_continuation() {
    assert_html("> a\nb", "<blockquote>\n<p>a\nb</p>\n</blockquote>\n");
}

#[test]
fn fenced_code_without_language() {
    assert_html("```\n<raw>\n```", "<pre><code>&lt;raw&gt;\n</code></pre>\n");
}

#[test]
fn fenced_code_without_closing_fence_consumes_rest() {
    assert_html(
        "```txt\nline 1\nline 2",
        "<pre><code class=\"language-txt\">line 1\nline 2\n</code></pre>\n",
    );
}

#[test]
fn shorter_fence_does_not_close() {
    assert_html("~~~~\na\n~~~\n~~~~", "<pre><code>a\n~~~\n</code></pre>\n");
}

#[test]
fn indented_code_block() {
    assert_html(
        "    let x = 1;\n\tlet y = 2;\n\nend",
        "<pre><code>let x = 1;\nlet y = 2;\n</code></pre>\n<p>end</p>\n",
    );
}

#[test]
fn inline_images_with_title() {
    assert_html(
        "![alt text](https://img.test/logo.png \"Logo\")",
        "<p><img src=\"https://img.test/logo.png\" alt=\"alt text\" title=\"Logo\" /></p>\n",
    );
}

#[test]
fn link_title_attribute() {
    assert_html(
        "[Example](https://example.com \"Homepage\")",
        "<p><a href=\"https://example.com\" title=\"Homepage\">Example</a></p>\n",
    );
}

#[test]
fn uri_and_email_autolinks() {
    assert_html(
        "<https://example.com> <hello@example.com>",
        "<p><a href=\"https://example.com\">https://example.com</a> <a href=\"mailto:hello@example.com\">hello@example.com</a></p>\n",
    );
}

#[test]
fn bare_urls_are_not_linked() {
    assert_html("https://example.com", "<p>https://example.com</p>\n");
}

#[test]
fn backslash_escapes_inline_markers() {
    assert_html("\\*no em\\* and \\[x\\](y)", "<p>*no em* and [x](y)</p>\n");
    assert_html("\\&amp;", "<p>&amp;amp;</p>\n");
}

#[test]
fn entity_references() {
    assert_html("&amp; &copy; &#35; &#x22;", "<p>&amp; © # &quot;</p>\n");
    assert_html("&nosuch;", "<p>&amp;nosuch;</p>\n");
}

#[test]
fn code_span_strips_one_surrounding_space() {
    assert_html("`` a ` b ``", "<p><code>a ` b</code></p>\n");
}

#[test]
fn code_span_is_not_parsed() {
    assert_html("`*a* <b>`", "<p><code>*a* &lt;b&gt;</code></p>\n");
}

#[test]
fn script_block_is_passed_through() {
    assert_html(
        "<script>alert('x')</script> \"quote\"",
        "<script>alert('x')</script> \"quote\"\n",
    );
}

#[test]
fn raw_inline_html_is_not_escaped() {
    assert_html(
        "Use <kbd>Ctrl</kbd> and <em>HTML</em>",
        "<p>Use <kbd>Ctrl</kbd> and <em>HTML</em></p>\n",
    );
}

#[test]
fn raw_html_block_is_passed_through() {
    assert_html(
        "<dl>\n<dt>Term</dt>\n<dd>Definition</dd>\n</dl>\n\ntext",
        "<dl>\n<dt>Term</dt>\n<dd>Definition</dd>\n</dl>\n<p>text</p>\n",
    );
}

#[test]
fn html_comment_block() {
    assert_html("<!-- c -->\n\ntext", "<!-- c -->\n<p>text</p>\n");
}

#[test]
fn hard_line_breaks() {
    assert_html("foo\\\nbar", "<p>foo<br />\nbar</p>\n");
    assert_html("foo  \nbar", "<p>foo<br />\nbar</p>\n");
}

#[test]
fn windows_and_old_mac_line_endings() {
    assert_html(
        "# h\r\n\r\n- x\r\n- y\r\n",
        "<h1>h</h1>\n<ul>\n<li>x</li>\n<li>y</li>\n</ul>\n",
    );
    assert_html("a\rb", "<p>a\nb</p>\n");
}

#[test]
fn nul_is_replaced() {
    assert_html("a\0b", "<p>a\u{FFFD}b</p>\n");
}

#[test]
fn horizontal_rules() {
    assert_html("***\n---\n___", "<hr />\n<hr />\n<hr />\n");
    assert_html("* * *", "<hr />\n");
}

#[test]
fn hard_breaks_option_converts_soft_breaks() {
    let opts = RenderOptions { hard_breaks: true };

    assert_eq!(render_to_html("1\n2", &opts), "<p>1<br />\n2</p>\n");

    assert_eq!(
        render_to_html("> 1\n> 2", &opts),
        "<blockquote>\n<p>1<br />\n2</p>\n</blockquote>\n"
    );

    assert_eq!(
        render_to_html("1\n2", &RenderOptions::default()),
        "<p>1\n2</p>\n"
    );
}

#[test]
fn hard_breaks_option_leaves_code_alone() {
    let opts = RenderOptions::HARD_BREAKS;
    assert_eq!(
        render_to_html("```\na\nb\n```", &opts),
        "<pre><code>a\nb\n</code></pre>\n"
    );
}
