use crate::RenderOptions;
use crate::ast::{Block, Document, Inline, LineBreak, List, ListItem, ListKind, collect_plain_text};
use crate::html::{encode_url_escaped_into, escape_html_into};

/// Render a parsed [`Document`] to HTML.
///
/// Output follows the CommonMark reference renderer: one block per line,
/// void elements written as `<hr />`, `<br />` and `<img ... />`.
///
/// # Examples
///
/// ```
/// use mdrender::{RenderOptions, parse, to_html};
///
/// let doc = parse("a\nb");
/// assert_eq!(to_html(&doc, &RenderOptions::default()), "<p>a\nb</p>\n");
/// assert_eq!(to_html(&doc, &RenderOptions::HARD_BREAKS), "<p>a<br />\nb</p>\n");
/// ```
pub fn to_html(doc: &Document, options: &RenderOptions) -> String {
    let mut out = String::with_capacity(256);
    let mut stack: Vec<Work<'_>> = doc.blocks.iter().rev().map(Work::Block).collect();

    while let Some(work) = stack.pop() {
        match work {
            Work::Block(block) => render_block(block, &mut out, options, &mut stack),
            Work::TightParagraph(content) => render_inlines(content, &mut out, options),
            Work::Item(item, tight) => {
                out.push_str("<li>");
                stack.push(Work::CloseItem);
                for child in item.children.iter().rev() {
                    match child {
                        Block::Paragraph { content } if tight => {
                            stack.push(Work::TightParagraph(content))
                        }
                        _ => stack.push(Work::Block(child)),
                    }
                }
            }
            Work::CloseItem => {
                out.push_str("</li>");
                cr(&mut out);
            }
            Work::CloseContainer(tag) => {
                cr(&mut out);
                out.push_str(tag);
                cr(&mut out);
            }
        }
    }
    out
}

enum Work<'a> {
    Block(&'a Block),
    /// A paragraph directly inside a tight list item: no `<p>` wrapper.
    TightParagraph(&'a [Inline]),
    Item(&'a ListItem, bool),
    CloseItem,
    CloseContainer(&'static str),
}

/// Starts a new line unless the output is empty or already ends with one.
#[inline]
fn cr(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn render_block<'a>(
    block: &'a Block,
    out: &mut String,
    options: &RenderOptions,
    stack: &mut Vec<Work<'a>>,
) {
    match block {
        Block::Paragraph { content } => {
            cr(out);
            out.push_str("<p>");
            render_inlines(content, out, options);
            out.push_str("</p>");
            cr(out);
        }
        Block::Heading { level, content } => {
            let level = (*level).clamp(1, 6);
            cr(out);
            out.push_str("<h");
            push_digit(out, level);
            out.push('>');
            render_inlines(content, out, options);
            out.push_str("</h");
            push_digit(out, level);
            out.push('>');
            cr(out);
        }
        Block::CodeBlock { info, literal } => {
            cr(out);
            out.push_str("<pre><code");
            let lang = info.split([' ', '\t']).next().unwrap_or("");
            if !lang.is_empty() {
                out.push_str(" class=\"language-");
                escape_html_into(out, lang);
                out.push('"');
            }
            out.push('>');
            escape_html_into(out, literal);
            out.push_str("</code></pre>");
            cr(out);
        }
        Block::HtmlBlock { literal } => {
            cr(out);
            out.push_str(literal);
            cr(out);
        }
        Block::ThematicBreak => {
            cr(out);
            out.push_str("<hr />");
            cr(out);
        }
        Block::BlockQuote { children } => {
            cr(out);
            out.push_str("<blockquote>");
            cr(out);
            stack.push(Work::CloseContainer("</blockquote>"));
            stack.extend(children.iter().rev().map(Work::Block));
        }
        Block::List(list) => render_list_open(list, out, stack),
    }
}

fn render_list_open<'a>(list: &'a List, out: &mut String, stack: &mut Vec<Work<'a>>) {
    cr(out);
    match list.kind {
        ListKind::Bullet(_) => {
            out.push_str("<ul>");
            stack.push(Work::CloseContainer("</ul>"));
        }
        ListKind::Ordered(_) => {
            if list.start == 1 {
                out.push_str("<ol>");
            } else {
                out.push_str("<ol start=\"");
                out.push_str(&list.start.to_string());
                out.push_str("\">");
            }
            stack.push(Work::CloseContainer("</ol>"));
        }
    }
    cr(out);
    stack.extend(list.items.iter().rev().map(|item| Work::Item(item, list.tight)));
}

#[inline]
fn push_digit(out: &mut String, digit: u8) {
    out.push(char::from(b'0' + digit));
}

enum InlineWork<'a> {
    Node(&'a Inline),
    Close(&'static str),
}

fn render_inlines(inlines: &[Inline], out: &mut String, options: &RenderOptions) {
    let mut stack: Vec<InlineWork<'_>> = inlines.iter().rev().map(InlineWork::Node).collect();

    while let Some(work) = stack.pop() {
        let node = match work {
            InlineWork::Close(tag) => {
                out.push_str(tag);
                continue;
            }
            InlineWork::Node(node) => node,
        };
        match node {
            Inline::Text { literal } => escape_html_into(out, literal),
            Inline::Code { literal } => {
                out.push_str("<code>");
                escape_html_into(out, literal);
                out.push_str("</code>");
            }
            Inline::Html { literal } => out.push_str(literal),
            Inline::LineBreak { kind } => match kind {
                LineBreak::Hard => out.push_str("<br />\n"),
                LineBreak::Soft if options.hard_breaks => out.push_str("<br />\n"),
                LineBreak::Soft => out.push('\n'),
            },
            Inline::Emphasis { children } => {
                out.push_str("<em>");
                stack.push(InlineWork::Close("</em>"));
                stack.extend(children.iter().rev().map(InlineWork::Node));
            }
            Inline::Strong { children } => {
                out.push_str("<strong>");
                stack.push(InlineWork::Close("</strong>"));
                stack.extend(children.iter().rev().map(InlineWork::Node));
            }
            Inline::Link {
                destination,
                title,
                children,
            } => {
                out.push_str("<a href=\"");
                encode_url_escaped_into(out, destination);
                out.push('"');
                push_title(out, title.as_deref());
                out.push('>');
                stack.push(InlineWork::Close("</a>"));
                stack.extend(children.iter().rev().map(InlineWork::Node));
            }
            Inline::Image {
                destination,
                title,
                alt,
            } => {
                out.push_str("<img src=\"");
                encode_url_escaped_into(out, destination);
                out.push_str("\" alt=\"");
                let mut alt_text = String::new();
                collect_plain_text(alt, &mut alt_text);
                escape_html_into(out, &alt_text);
                out.push('"');
                push_title(out, title.as_deref());
                out.push_str(" />");
            }
        }
    }
}

#[inline]
fn push_title(out: &mut String, title: Option<&str>) {
    if let Some(title) = title {
        out.push_str(" title=\"");
        escape_html_into(out, title);
        out.push('"');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(doc: &Document) -> String {
        to_html(doc, &RenderOptions::default())
    }

    #[test]
    fn empty_document_renders_nothing() {
        assert_eq!(render(&Document::default()), "");
    }

    #[test]
    fn escapes_text_and_attributes() {
        let doc = Document {
            blocks: vec![Block::Paragraph {
                content: vec![
                    Inline::text("a < b & \"c\""),
                    Inline::Link {
                        destination: "/x?a=1&b=\"2\"".to_string(),
                        title: Some("t & \"u\"".to_string()),
                        children: vec![Inline::text("l")],
                    },
                ],
            }],
        };
        assert_eq!(
            render(&doc),
            "<p>a &lt; b &amp; &quot;c&quot;<a href=\"/x?a=1&amp;b=%222%22\" title=\"t &amp; &quot;u&quot;\">l</a></p>\n"
        );
    }

    #[test]
    fn tight_and_loose_items() {
        let item = |text: &str| ListItem {
            children: vec![Block::Paragraph {
                content: vec![Inline::text(text)],
            }],
        };
        let list = |tight| List {
            kind: ListKind::Ordered(b'.'),
            start: 3,
            tight,
            items: vec![item("a"), item("b")],
        };
        let doc = Document {
            blocks: vec![Block::List(list(true))],
        };
        assert_eq!(render(&doc), "<ol start=\"3\">\n<li>a</li>\n<li>b</li>\n</ol>\n");
        let doc = Document {
            blocks: vec![Block::List(list(false))],
        };
        assert_eq!(
            render(&doc),
            "<ol start=\"3\">\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ol>\n"
        );
    }

    #[test]
    fn empty_item_and_nested_block() {
        let doc = Document {
            blocks: vec![Block::List(List {
                kind: ListKind::Bullet(b'-'),
                start: 0,
                tight: true,
                items: vec![
                    ListItem::default(),
                    ListItem {
                        children: vec![Block::CodeBlock {
                            info: String::new(),
                            literal: "x\n".to_string(),
                        }],
                    },
                ],
            })],
        };
        assert_eq!(
            render(&doc),
            "<ul>\n<li></li>\n<li>\n<pre><code>x\n</code></pre>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn image_alt_is_plain_text() {
        let doc = Document {
            blocks: vec![Block::Paragraph {
                content: vec![Inline::Image {
                    destination: "a b.png".to_string(),
                    title: None,
                    alt: vec![
                        Inline::Emphasis {
                            children: vec![Inline::text("x")],
                        },
                        Inline::LineBreak {
                            kind: LineBreak::Hard,
                        },
                        Inline::text("<y>"),
                    ],
                }],
            }],
        };
        assert_eq!(
            render(&doc),
            "<p><img src=\"a%20b.png\" alt=\"x &lt;y&gt;\" /></p>\n"
        );
    }

    #[test]
    fn code_block_language_is_first_info_word() {
        let doc = Document {
            blocks: vec![Block::CodeBlock {
                info: "rust ignore".to_string(),
                literal: "<T>\n".to_string(),
            }],
        };
        assert_eq!(
            render(&doc),
            "<pre><code class=\"language-rust\">&lt;T&gt;\n</code></pre>\n"
        );
    }
}
