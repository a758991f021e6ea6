/// Error returned when a Markdown input cannot be rendered.
///
/// Malformed Markdown is never an error: unterminated code spans, unmatched
/// emphasis and broken links fall back to literal text. Only input that
/// cannot be read as text fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// The input bytes are not valid UTF-8.
    #[error("input is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },
}

impl From<std::str::Utf8Error> for RenderError {
    fn from(err: std::str::Utf8Error) -> Self {
        RenderError::InvalidUtf8 {
            valid_up_to: err.valid_up_to(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_utf8_error() {
        let bytes = [b'o', b'k', 0xFF];
        let err: RenderError = std::str::from_utf8(&bytes).unwrap_err().into();
        assert_eq!(err, RenderError::InvalidUtf8 { valid_up_to: 2 });
        assert_eq!(
            err.to_string(),
            "input is not valid UTF-8 (valid up to byte 2)"
        );
    }
}
