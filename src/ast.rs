//! Document tree produced by [`parse`](crate::parse).
//!
//! Every text-bearing node stores the literal text with backslash escapes and
//! character references already decoded. Nothing in the tree is HTML-escaped;
//! that happens in [`to_html`](crate::to_html).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Root of a parsed Markdown document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Document {
    pub blocks: Vec<Block>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Block {
    Paragraph {
        content: Vec<Inline>,
    },
    Heading {
        level: u8,
        content: Vec<Inline>,
    },
    List(List),
    BlockQuote {
        children: Vec<Block>,
    },
    /// Fenced or indented code. `info` is empty for indented blocks.
    CodeBlock {
        info: String,
        literal: String,
    },
    ThematicBreak,
    /// Raw HTML, emitted verbatim.
    HtmlBlock {
        literal: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct List {
    pub kind: ListKind,
    /// First number of an ordered list; `0` for bullet lists.
    pub start: u32,
    /// Tight lists render their paragraphs without `<p>` tags.
    pub tight: bool,
    pub items: Vec<ListItem>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ListItem {
    pub children: Vec<Block>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ListKind {
    Bullet(u8),  // marker character: b'-', b'*', b'+'
    Ordered(u8), // delimiter: b'.' or b')'
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Inline {
    Text {
        literal: String,
    },
    Emphasis {
        children: Vec<Inline>,
    },
    Strong {
        children: Vec<Inline>,
    },
    Code {
        literal: String,
    },
    Link {
        destination: String,
        title: Option<String>,
        children: Vec<Inline>,
    },
    Image {
        destination: String,
        title: Option<String>,
        alt: Vec<Inline>,
    },
    LineBreak {
        kind: LineBreak,
    },
    /// Raw inline HTML, emitted verbatim.
    Html {
        literal: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LineBreak {
    Soft,
    Hard,
}

impl Inline {
    pub fn text(literal: impl Into<String>) -> Self {
        Inline::Text {
            literal: literal.into(),
        }
    }

    /// Concatenated literal text of this node and its descendants, without
    /// any markup. Used for image `alt` attributes.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_plain_text(std::slice::from_ref(self), &mut out);
        out
    }
}

pub(crate) fn collect_plain_text(inlines: &[Inline], out: &mut String) {
    let mut stack: Vec<std::slice::Iter<'_, Inline>> = vec![inlines.iter()];
    while let Some(iter) = stack.last_mut() {
        let Some(inline) = iter.next() else {
            stack.pop();
            continue;
        };
        match inline {
            Inline::Text { literal } | Inline::Code { literal } | Inline::Html { literal } => {
                out.push_str(literal)
            }
            Inline::LineBreak { .. } => out.push(' '),
            Inline::Emphasis { children }
            | Inline::Strong { children }
            | Inline::Link { children, .. } => stack.push(children.iter()),
            Inline::Image { alt, .. } => stack.push(alt.iter()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_flattens_markup() {
        let node = Inline::Strong {
            children: vec![
                Inline::text("a "),
                Inline::Emphasis {
                    children: vec![Inline::text("b")],
                },
                Inline::LineBreak {
                    kind: LineBreak::Soft,
                },
                Inline::Code {
                    literal: "c".to_string(),
                },
                Inline::Html {
                    literal: "<br>".to_string(),
                },
            ],
        };
        assert_eq!(node.plain_text(), "a b c<br>");
    }
}
