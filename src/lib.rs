#![deny(clippy::undocumented_unsafe_blocks)]

//! # mdrender
//!
//! A CommonMark Markdown-to-HTML renderer with a single rendering option:
//! whether soft line breaks inside paragraphs become `<br />`.
//!
//! ## Usage
//!
//! ```
//! use mdrender::Renderer;
//!
//! let html = Renderer::default().render("# Hello, **world**!");
//! assert_eq!(html, "<h1>Hello, <strong>world</strong>!</h1>\n");
//!
//! let html = Renderer::hard_breaks().render("line one\nline two");
//! assert_eq!(html, "<p>line one<br />\nline two</p>\n");
//! ```
//!
//! Rendering raw bytes reports undecodable input instead of guessing:
//!
//! ```
//! use mdrender::{RenderError, Renderer};
//!
//! let err = Renderer::default().render_to_html(b"\xff").unwrap_err();
//! assert_eq!(err, RenderError::InvalidUtf8 { valid_up_to: 0 });
//! ```
//!
//! ## Pipeline
//!
//! | Stage | Entry point | Output |
//! |---|---|---|
//! | block + inline parsing | [`parse`] | [`Document`] |
//! | HTML emission | [`to_html`] | `String` |
//! | both | [`Renderer::render_to_html`] | `Result<String>` |

pub mod ast;
mod block;
mod entities;
mod error;
mod html;
mod inline;
mod options;
mod render;
mod renderer;

pub use ast::{Block, Document, Inline, LineBreak, List, ListItem, ListKind};
pub use block::{parse, parse_bytes};
pub use error::{RenderError, Result};
pub use options::RenderOptions;
pub use render::to_html;
pub use renderer::{Renderer, render_to_html};

#[inline(always)]
pub(crate) fn is_ascii_punctuation(b: u8) -> bool {
    matches!(b, b'!'..=b'/' | b':'..=b'@' | b'['..=b'`' | b'{'..=b'~')
}

#[inline(always)]
pub(crate) fn utf8_char_len(first: u8) -> usize {
    if first < 0x80 {
        1
    } else if first < 0xE0 {
        2
    } else if first < 0xF0 {
        3
    } else {
        4
    }
}
