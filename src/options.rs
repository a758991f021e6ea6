//! Rendering configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options for customizing HTML output.
///
/// A value is chosen once per [`Renderer`](crate::Renderer) and never changes
/// afterwards. New options are added as named fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderOptions {
    /// When `true`, every soft line break inside a paragraph becomes a hard
    /// line break (`<br />`). Default: `false`.
    pub hard_breaks: bool,
}

impl RenderOptions {
    /// Soft line breaks render as a newline.
    pub const DEFAULT: Self = Self { hard_breaks: false };

    /// Soft line breaks render as `<br />`.
    pub const HARD_BREAKS: Self = Self { hard_breaks: true };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keeps_soft_breaks() {
        assert_eq!(RenderOptions::default(), RenderOptions::DEFAULT);
        assert!(!RenderOptions::default().hard_breaks);
        assert!(RenderOptions::HARD_BREAKS.hard_breaks);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn missing_fields_deserialize_to_default() {
        let opts: RenderOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, RenderOptions::DEFAULT);
        let opts: RenderOptions = serde_json::from_str(r#"{"hard_breaks":true}"#).unwrap();
        assert_eq!(opts, RenderOptions::HARD_BREAKS);
    }
}
