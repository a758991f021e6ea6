#[cfg(test)]
pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    escape_html_into(&mut out, input);
    out
}

/// Entity for a byte that must not appear raw in HTML text or a quoted
/// attribute value.
#[inline]
const fn html_entity(b: u8) -> Option<&'static str> {
    match b {
        b'&' => Some("&amp;"),
        b'<' => Some("&lt;"),
        b'>' => Some("&gt;"),
        b'"' => Some("&quot;"),
        _ => None,
    }
}

/// Appends `input` to `out`, replacing `&`, `<`, `>` and `"` with entities.
#[inline]
pub(crate) fn escape_html_into(out: &mut String, input: &str) {
    let mut rest = input;
    while let Some(pos) = rest.bytes().position(|b| html_entity(b).is_some()) {
        out.push_str(&rest[..pos]);
        if let Some(entity) = html_entity(rest.as_bytes()[pos]) {
            out.push_str(entity);
        }
        rest = &rest[pos + 1..];
    }
    out.push_str(rest);
}

/// Bytes that may appear unencoded in an emitted `href` or `src`.
#[inline]
const fn is_url_safe(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'-' | b'_'
                | b'.'
                | b'~'
                | b'!'
                | b'*'
                | b'\''
                | b'('
                | b')'
                | b';'
                | b'/'
                | b'?'
                | b':'
                | b'@'
                | b'='
                | b'+'
                | b'$'
                | b','
                | b'#'
        )
}

#[inline]
fn is_percent_escape(bytes: &[u8]) -> bool {
    matches!(bytes, [b'%', hi, lo, ..] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit())
}

/// Percent-encodes a link destination for use inside a double-quoted HTML
/// attribute. Existing `%XX` escapes are kept and `&` becomes `&amp;`.
pub(crate) fn encode_url_escaped_into(out: &mut String, url: &str) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let bytes = url.as_bytes();
    let mut plain_from = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if is_url_safe(b) {
            i += 1;
            continue;
        }
        if is_percent_escape(&bytes[i..]) {
            i += 3;
            continue;
        }
        out.push_str(&url[plain_from..i]);
        if b == b'&' {
            out.push_str("&amp;");
            i += 1;
        } else {
            let end = (i + crate::utf8_char_len(b)).min(bytes.len());
            for &byte in &bytes[i..end] {
                out.push('%');
                out.push(char::from(HEX[usize::from(byte >> 4)]));
                out.push(char::from(HEX[usize::from(byte & 0xF)]));
            }
            i = end;
        }
        plain_from = i;
    }
    out.push_str(&url[plain_from..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(url: &str) -> String {
        let mut out = String::new();
        encode_url_escaped_into(&mut out, url);
        out
    }

    #[test]
    fn escapes_all_html_specials() {
        assert_eq!(escape_html("<>&\"'"), "&lt;&gt;&amp;&quot;'");
    }

    #[test]
    fn escapes_into_existing_buffer() {
        let mut out = String::from("x=");
        escape_html_into(&mut out, "<>");
        assert_eq!(out, "x=&lt;&gt;");
    }

    #[test]
    fn plain_text_no_copy() {
        assert_eq!(escape_html("hello world"), "hello world");
    }

    #[test]
    fn mixed_content() {
        assert_eq!(escape_html("a < b & c > d"), "a &lt; b &amp; c &gt; d");
    }

    #[test]
    fn url_keeps_safe_characters_and_existing_escapes() {
        assert_eq!(
            encode("https://example.com/a_b?c=d#e"),
            "https://example.com/a_b?c=d#e"
        );
        assert_eq!(encode("foo%20bar"), "foo%20bar");
    }

    #[test]
    fn url_encodes_unsafe_bytes() {
        assert_eq!(encode("a b"), "a%20b");
        assert_eq!(encode("a\"b"), "a%22b");
        assert_eq!(encode("ä"), "%C3%A4");
        assert_eq!(encode("%zz"), "%25zz");
        assert_eq!(encode("?a=1&b=2"), "?a=1&amp;b=2");
        assert_eq!(encode("\\"), "%5C");
        assert_eq!(encode("[x]"), "%5Bx%5D");
    }
}
