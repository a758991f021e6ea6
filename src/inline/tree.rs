use super::*;
use crate::ast::LineBreak;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Frame {
    Root,
    Emphasis,
    Strong,
    Link(usize),
}

fn push_text(children: &mut Vec<Inline>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text { literal }) = children.last_mut() {
        literal.push_str(text);
    } else {
        children.push(Inline::text(text));
    }
}

impl InlineScanner<'_> {
    /// Nests the flat item list into inline nodes. Each delimiter run closes
    /// its emphasis, keeps its unmatched characters as text, then opens new
    /// emphasis.
    pub(super) fn into_tree(mut self) -> Vec<Inline> {
        let items = std::mem::take(&mut self.items);
        let mut stack: Vec<(Frame, Vec<Inline>)> = vec![(Frame::Root, Vec::new())];

        for item in items {
            match item {
                InlineItem::TextRange(start, end) => {
                    push_text(current(&mut stack), &self.input[start..end])
                }
                InlineItem::TextOwned(text) => push_text(current(&mut stack), &text),
                InlineItem::TextStatic(text) => push_text(current(&mut stack), text),
                InlineItem::RawHtml(start, end) => current(&mut stack).push(Inline::Html {
                    literal: self.input[start..end].to_string(),
                }),
                InlineItem::Code(literal) => current(&mut stack).push(Inline::Code { literal }),
                InlineItem::Autolink {
                    start,
                    end,
                    is_email,
                } => {
                    let text = &self.input[start..end];
                    let destination = if is_email {
                        format!("mailto:{text}")
                    } else {
                        text.to_string()
                    };
                    current(&mut stack).push(Inline::Link {
                        destination,
                        title: None,
                        children: vec![Inline::text(text)],
                    });
                }
                InlineItem::HardBreak => current(&mut stack).push(Inline::LineBreak {
                    kind: LineBreak::Hard,
                }),
                InlineItem::SoftBreak => current(&mut stack).push(Inline::LineBreak {
                    kind: LineBreak::Soft,
                }),
                InlineItem::DelimRun { delim } => {
                    let d = &self.delims[delim];
                    for &size in &d.close_em {
                        let frame = if size == 2 { Frame::Strong } else { Frame::Emphasis };
                        self.close_frame(&mut stack, frame);
                    }
                    if d.count > 0 {
                        let marker = if d.marker == b'*' { "*" } else { "_" };
                        push_text(current(&mut stack), &marker.repeat(d.count));
                    }
                    for &size in d.open_em.iter().rev() {
                        let frame = if size == 2 { Frame::Strong } else { Frame::Emphasis };
                        stack.push((frame, Vec::new()));
                    }
                }
                InlineItem::BracketOpen { is_image } => {
                    push_text(current(&mut stack), if is_image { "![" } else { "[" })
                }
                InlineItem::LinkStart(idx) => stack.push((Frame::Link(idx), Vec::new())),
                InlineItem::LinkEnd => {
                    let top = stack.last().map(|(frame, _)| *frame);
                    if let Some(frame @ Frame::Link(_)) = top {
                        self.close_frame(&mut stack, frame);
                    }
                }
            }
        }

        while stack.len() > 1 {
            let Some((frame, _)) = stack.last() else {
                break;
            };
            let frame = *frame;
            self.close_frame(&mut stack, frame);
        }
        stack.pop().map(|(_, children)| children).unwrap_or_default()
    }

    fn close_frame(&self, stack: &mut Vec<(Frame, Vec<Inline>)>, want: Frame) {
        if stack.len() < 2 || stack.last().map(|(f, _)| *f) != Some(want) {
            return;
        }
        let Some((frame, children)) = stack.pop() else {
            return;
        };
        let node = match frame {
            Frame::Root => return,
            Frame::Emphasis => Inline::Emphasis { children },
            Frame::Strong => Inline::Strong { children },
            Frame::Link(idx) => {
                let link = &self.links[idx];
                if link.is_image {
                    Inline::Image {
                        destination: link.dest.clone(),
                        title: link.title.clone(),
                        alt: children,
                    }
                } else {
                    Inline::Link {
                        destination: link.dest.clone(),
                        title: link.title.clone(),
                        children,
                    }
                }
            }
        };
        current(stack).push(node);
    }
}

#[inline]
fn current(stack: &mut [(Frame, Vec<Inline>)]) -> &mut Vec<Inline> {
    let last = stack.len() - 1;
    &mut stack[last].1
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn inlines(input: &str) -> Vec<Inline> {
        parse_inlines(input, &LinkRefMap::new())
    }

    #[test]
    fn nested_emphasis() {
        assert_eq!(
            inlines("*foo **bar** baz*"),
            vec![Inline::Emphasis {
                children: vec![
                    Inline::text("foo "),
                    Inline::Strong {
                        children: vec![Inline::text("bar")],
                    },
                    Inline::text(" baz"),
                ],
            }]
        );
    }

    #[test]
    fn triple_run_opens_strong_inside_emphasis() {
        assert_eq!(
            inlines("***foo***"),
            vec![Inline::Emphasis {
                children: vec![Inline::Strong {
                    children: vec![Inline::text("foo")],
                }],
            }]
        );
    }

    #[test]
    fn leftover_markers_stay_literal() {
        assert_eq!(
            inlines("**foo*"),
            vec![
                Inline::text("*"),
                Inline::Emphasis {
                    children: vec![Inline::text("foo")],
                },
            ]
        );
    }

    #[test]
    fn link_with_emphasis_inside() {
        assert_eq!(
            inlines("[*a*](/u \"t\")"),
            vec![Inline::Link {
                destination: "/u".to_string(),
                title: Some("t".to_string()),
                children: vec![Inline::Emphasis {
                    children: vec![Inline::text("a")],
                }],
            }]
        );
    }

    #[test]
    fn email_autolink() {
        assert_eq!(
            inlines("<foo@bar.com>"),
            vec![Inline::Link {
                destination: "mailto:foo@bar.com".to_string(),
                title: None,
                children: vec![Inline::text("foo@bar.com")],
            }]
        );
    }

    #[test]
    fn unmatched_brackets_are_text() {
        assert_eq!(inlines("[a] ![b]"), vec![Inline::text("[a] ![b]")]);
    }
}
