//! Renderer facade: a fixed set of options plus the parse-and-emit pipeline.

use crate::error::{RenderError, Result};
use crate::{RenderOptions, parse, to_html};

/// Markdown-to-HTML renderer.
///
/// Options are fixed at construction. A `Renderer` is a plain `Copy` value,
/// so it can be shared across threads or copied freely; calls keep no state
/// between them.
///
/// ```
/// use mdrender::{RenderOptions, Renderer};
///
/// let renderer = Renderer::new(RenderOptions { hard_breaks: true });
/// assert_eq!(renderer, Renderer::hard_breaks());
/// assert_eq!(
///     renderer.render_to_html("a\nb").unwrap(),
///     "<p>a<br />\nb</p>\n"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub const fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// A renderer that turns every soft line break into `<br />`.
    pub const fn hard_breaks() -> Self {
        Self::new(RenderOptions::HARD_BREAKS)
    }

    pub const fn options(&self) -> RenderOptions {
        self.options
    }

    /// Renders Markdown bytes to HTML.
    ///
    /// Fails only when the input is not valid UTF-8; no partial output is
    /// produced in that case.
    pub fn render_to_html(&self, markdown: impl AsRef<[u8]>) -> Result<String> {
        let bytes = markdown.as_ref();
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                let err = RenderError::from(e);
                tracing::debug!(
                    input_len = bytes.len(),
                    error = %err,
                    "Failed to decode Markdown input"
                );
                return Err(err);
            }
        };
        Ok(self.render(text))
    }

    /// Renders already-decoded Markdown. Never fails.
    pub fn render(&self, markdown: &str) -> String {
        let doc = parse(markdown);
        let html = to_html(&doc, &self.options);
        tracing::trace!(
            input_len = markdown.len(),
            output_len = html.len(),
            block_count = doc.blocks.len(),
            hard_breaks = self.options.hard_breaks,
            "Rendered Markdown"
        );
        html
    }
}

/// Renders `markdown` with `options` in one call.
///
/// ```
/// use mdrender::{RenderOptions, render_to_html};
///
/// let html = render_to_html("*hi*", &RenderOptions::default());
/// assert_eq!(html, "<p><em>hi</em></p>\n");
/// ```
pub fn render_to_html(markdown: &str, options: &RenderOptions) -> String {
    Renderer::new(*options).render(markdown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        assert!(!Renderer::default().options().hard_breaks);
        assert!(Renderer::hard_breaks().options().hard_breaks);
    }

    #[test]
    fn accepts_str_string_and_bytes() {
        let renderer = Renderer::default();
        let expected = "<p>x</p>\n";
        assert_eq!(renderer.render_to_html("x").as_deref(), Ok(expected));
        assert_eq!(renderer.render_to_html(String::from("x")).as_deref(), Ok(expected));
        assert_eq!(renderer.render_to_html(b"x").as_deref(), Ok(expected));
        assert_eq!(renderer.render_to_html(vec![b'x']).as_deref(), Ok(expected));
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let err = Renderer::default()
            .render_to_html([b'a', 0xC3, b'(', b'b'])
            .unwrap_err();
        assert_eq!(err, RenderError::InvalidUtf8 { valid_up_to: 1 });
    }

    #[test]
    fn renderer_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Copy>() {}
        assert_send_sync::<Renderer>();
        assert_send_sync::<RenderOptions>();
    }
}
