use std::sync::Arc;
use std::thread;

use mdrender::{RenderError, RenderOptions, Renderer};
use pretty_assertions::assert_eq;

fn render(md: &str) -> String {
    Renderer::default()
        .render_to_html(md)
        .expect("valid UTF-8 always renders")
}

#[test]
fn odd_documents_still_render() {
    let inputs = [
        "",
        "\n",
        "`",
        "[",
        "]",
        "![",
        "<",
        "&",
        "*_*_*_",
        "[a](",
        "[a](<b",
        "<!--",
        "```",
        "> > > > >",
        "- - - - x",
        "1.",
        "\t\t\tx",
        "\u{0}\u{0}",
        "\\",
        "&#xFFFFFFFF;",
        "****a****b****",
    ];
    let renderer = Renderer::default();
    for input in inputs {
        assert!(renderer.render_to_html(input).is_ok(), "input {input:?}");
    }
}

#[test]
fn deeply_nested_containers_render() {
    let quotes = ">".repeat(10_000) + " x";
    assert!(Renderer::default().render_to_html(&quotes).is_ok());

    let brackets = "[".repeat(10_000) + &"]".repeat(10_000);
    assert!(Renderer::default().render_to_html(&brackets).is_ok());

    let stars = "*a ".repeat(5_000) + &"b* ".repeat(5_000);
    assert!(Renderer::default().render_to_html(&stars).is_ok());
}

#[test]
fn invalid_utf8_is_the_only_failure() {
    let result = Renderer::default().render_to_html(b"ok \xFF\xFE");
    assert_eq!(result, Err(RenderError::InvalidUtf8 { valid_up_to: 3 }));
}

#[test]
fn special_characters_are_escaped() {
    assert_eq!(
        render("a < b > c & d \"e\""),
        "<p>a &lt; b &gt; c &amp; d &quot;e&quot;</p>\n"
    );
}

#[test]
fn special_characters_in_attributes_are_escaped() {
    assert_eq!(
        render("[x](/a&b \"<t>\")"),
        "<p><a href=\"/a&amp;b\" title=\"&lt;t&gt;\">x</a></p>\n"
    );
}

#[test]
fn inline_html_passes_through() {
    assert_eq!(
        render("Hello <b>world</b> & more"),
        "<p>Hello <b>world</b> &amp; more</p>\n"
    );
}

#[test]
fn soft_break_depends_on_hard_breaks_option() {
    let input = "line one\nline two";
    assert_eq!(render(input), "<p>line one\nline two</p>\n");
    assert_eq!(
        Renderer::hard_breaks().render_to_html(input).as_deref(),
        Ok("<p>line one<br />\nline two</p>\n")
    );
}

#[test]
fn emphasis_and_strong() {
    assert_eq!(render("*foo*"), "<p><em>foo</em></p>\n");
    assert_eq!(render("**foo**"), "<p><strong>foo</strong></p>\n");
    assert_eq!(render("*foo"), "<p>*foo</p>\n");
}

#[test]
fn code_spans_need_matching_runs() {
    assert_eq!(render("`code`"), "<p><code>code</code></p>\n");
    assert_eq!(render("`code"), "<p>`code</p>\n");
    assert_eq!(render("``code`"), "<p>``code`</p>\n");
}

#[test]
fn rendering_is_deterministic() {
    let input = "# T\n\n- *a*\n- [b](/c)\n\n> `d`\n";
    let renderer = Renderer::default();
    let first = renderer.render_to_html(input);
    let second = renderer.render_to_html(input);
    assert_eq!(first, second);
}

#[test]
fn concurrent_renders_do_not_interfere() {
    let renderer = Arc::new(Renderer::hard_breaks());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let renderer = Arc::clone(&renderer);
            thread::spawn(move || {
                let input = format!("item {i}\n**bold {i}**");
                let expected = format!("<p>item {i}<br />\n<strong>bold {i}</strong></p>\n");
                for _ in 0..100 {
                    assert_eq!(renderer.render_to_html(&input).as_deref(), Ok(expected.as_str()));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("render thread panicked");
    }
}

#[test]
fn free_function_matches_renderer() {
    let input = "a\nb *c*";
    for options in [RenderOptions::DEFAULT, RenderOptions::HARD_BREAKS] {
        assert_eq!(
            Ok(mdrender::render_to_html(input, &options)),
            Renderer::new(options).render_to_html(input)
        );
    }
}
