use super::*;

/// Nesting limit for unescaped parentheses in a bare destination.
const MAX_DEST_PAREN_DEPTH: usize = 32;
/// Characters allowed between the brackets of a link label.
const MAX_LABEL_CHARS: usize = 999;

/// Scans a link label starting at `bytes[start] == b'['`. Returns the
/// position just past the closing `]`.
pub(crate) fn scan_link_label(bytes: &[u8], start: usize) -> Option<usize> {
    if bytes.get(start) != Some(&b'[') {
        return None;
    }
    let mut i = start + 1;
    let mut chars = 0;
    while i < bytes.len() {
        match bytes[i] {
            b']' => return Some(i + 1),
            b'[' => return None,
            b'\\' => {
                i += 1;
                if i < bytes.len() {
                    i += utf8_char_len(bytes[i]);
                }
            }
            b => i += utf8_char_len(b),
        }
        chars += 1;
        if chars > MAX_LABEL_CHARS {
            return None;
        }
    }
    None
}

/// Scans a link destination at `start`, either `<...>` or a bare run with
/// balanced parentheses. Returns the decoded destination and the position
/// after it. A bare destination may be empty only when `)` follows.
pub(crate) fn scan_link_destination(input: &str, start: usize) -> Option<(String, usize)> {
    let bytes = input.as_bytes();
    if bytes.get(start) == Some(&b'<') {
        let mut i = start + 1;
        while i < bytes.len() {
            match bytes[i] {
                b'>' => {
                    let dest = unescape_string(&input[start + 1..i]).into_owned();
                    return Some((dest, i + 1));
                }
                b'<' | b'\n' => return None,
                b'\\' if i + 1 < bytes.len() && is_ascii_punctuation(bytes[i + 1]) => i += 2,
                _ => i += 1,
            }
        }
        return None;
    }

    let mut i = start;
    let mut depth = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if i + 1 < bytes.len() && is_ascii_punctuation(bytes[i + 1]) => {
                i += 2;
                continue;
            }
            b'(' => {
                depth += 1;
                if depth > MAX_DEST_PAREN_DEPTH {
                    return None;
                }
            }
            b')' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            b if b <= b' ' || b == 0x7F => break,
            _ => {}
        }
        i += 1;
    }
    if depth != 0 {
        return None;
    }
    if i == start && bytes.get(i) != Some(&b')') {
        return None;
    }
    Some((unescape_string(&input[start..i]).into_owned(), i))
}

/// Scans a `"..."`, `'...'` or `(...)` link title at `start`. Returns the
/// decoded title and the position after the closing delimiter.
pub(crate) fn scan_link_title(input: &str, start: usize) -> Option<(String, usize)> {
    let bytes = input.as_bytes();
    let open = *bytes.get(start)?;
    let close = match open {
        b'"' => b'"',
        b'\'' => b'\'',
        b'(' => b')',
        _ => return None,
    };
    let mut i = start + 1;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' && i + 1 < bytes.len() {
            i += 2;
        } else if b == close {
            let title = unescape_string(&input[start + 1..i]).into_owned();
            return Some((title, i + 1));
        } else if open == b'(' && b == b'(' {
            return None;
        } else {
            i += 1;
        }
    }
    None
}

/// `scheme:rest` with a 2 to 32 character scheme.
fn is_absolute_uri(s: &str) -> bool {
    let bytes = s.as_bytes();
    let Some(colon) = memchr::memchr(b':', bytes) else {
        return false;
    };
    let scheme = &bytes[..colon];
    (2..=32).contains(&scheme.len())
        && scheme[0].is_ascii_alphabetic()
        && scheme[1..]
            .iter()
            .all(|&b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'.' | b'-'))
}

fn is_email_address(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    let local_ok = !local.is_empty()
        && local.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b".!#$%&'*+/=?^_`{|}~-".contains(&b)
        });
    local_ok
        && domain.split('.').all(|label| {
            let bytes = label.as_bytes();
            !bytes.is_empty()
                && bytes.len() <= 63
                && bytes[0].is_ascii_alphanumeric()
                && bytes[bytes.len() - 1].is_ascii_alphanumeric()
                && bytes.iter().all(|&b| b.is_ascii_alphanumeric() || b == b'-')
        })
}

#[inline]
fn skip_tag_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t' | b'\n') {
        i += 1;
    }
    i
}

/// Length of the raw HTML construct at the start of `rest` (which begins
/// with `<`): a tag, comment, processing instruction, declaration or CDATA
/// section.
fn scan_html_tag(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();

    if let Some(body) = rest.strip_prefix("<!--") {
        if body.starts_with('>') {
            return Some(5);
        }
        if body.starts_with("->") {
            return Some(6);
        }
        return body.find("-->").map(|end| end + 7);
    }
    if let Some(body) = rest.strip_prefix("<?") {
        return body.find("?>").map(|end| end + 4);
    }
    if let Some(body) = rest.strip_prefix("<![CDATA[") {
        return body.find("]]>").map(|end| end + 12);
    }
    if bytes.len() > 2 && bytes[1] == b'!' && bytes[2].is_ascii_alphabetic() {
        return memchr::memchr(b'>', bytes).map(|end| end + 1);
    }

    let is_close = bytes.get(1) == Some(&b'/');
    let name_start = if is_close { 2 } else { 1 };
    if !bytes.get(name_start)?.is_ascii_alphabetic() {
        return None;
    }
    let mut i = name_start + 1;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }

    if is_close {
        i = skip_tag_whitespace(bytes, i);
        return (bytes.get(i) == Some(&b'>')).then_some(i + 1);
    }

    loop {
        let before = i;
        i = skip_tag_whitespace(bytes, i);
        let had_space = i > before;
        match *bytes.get(i)? {
            b'>' => return Some(i + 1),
            b'/' => return (bytes.get(i + 1) == Some(&b'>')).then_some(i + 2),
            b if had_space && (b.is_ascii_alphabetic() || b == b'_' || b == b':') => {}
            _ => return None,
        }
        while i < bytes.len()
            && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'_' | b':' | b'.' | b'-'))
        {
            i += 1;
        }
        let after_name = i;
        i = skip_tag_whitespace(bytes, i);
        if bytes.get(i) != Some(&b'=') {
            i = after_name;
            continue;
        }
        i = skip_tag_whitespace(bytes, i + 1);
        match *bytes.get(i)? {
            quote @ (b'\'' | b'"') => {
                let close = memchr::memchr(quote, &bytes[i + 1..])?;
                i += close + 2;
            }
            b' ' | b'\t' | b'\n' | b'=' | b'<' | b'>' | b'`' => return None,
            _ => {
                while i < bytes.len()
                    && !matches!(
                        bytes[i],
                        b' ' | b'\t' | b'\n' | b'"' | b'\'' | b'=' | b'<' | b'>' | b'`'
                    )
                {
                    i += 1;
                }
            }
        }
    }
}

impl<'a> InlineScanner<'a> {
    fn skip_spaces_and_newlines(&mut self) {
        while self.pos < self.bytes.len() && matches!(self.bytes[self.pos], b' ' | b'\t' | b'\n') {
            self.pos += 1;
        }
    }

    /// `[text](destination "title")`, with `self.pos` just past `]`.
    pub(super) fn try_inline_link(&mut self) -> Option<(String, Option<String>)> {
        if self.bytes.get(self.pos) != Some(&b'(') {
            return None;
        }
        let saved = self.pos;
        self.pos += 1;
        self.skip_spaces_and_newlines();

        let Some((dest, dest_end)) = scan_link_destination(self.input, self.pos) else {
            self.pos = saved;
            return None;
        };
        self.pos = dest_end;

        let before_ws = self.pos;
        self.skip_spaces_and_newlines();
        let mut title = None;
        if self.pos > before_ws
            && let Some((t, title_end)) = scan_link_title(self.input, self.pos)
        {
            title = Some(t);
            self.pos = title_end;
            self.skip_spaces_and_newlines();
        }

        if self.bytes.get(self.pos) == Some(&b')') {
            self.pos += 1;
            Some((dest, title))
        } else {
            self.pos = saved;
            None
        }
    }

    /// Full (`[text][label]`), collapsed (`[text][]`) and shortcut (`[text]`)
    /// references, with `self.pos` just past `]`.
    pub(super) fn try_reference_link(
        &mut self,
        opener: &BracketInfo,
        close_pos: usize,
    ) -> Option<(String, Option<String>)> {
        let after_close = self.pos;
        if self.refs.is_empty() {
            return None;
        }
        let label_end = scan_link_label(self.bytes, after_close);
        let label = match label_end {
            Some(end) if end - after_close > 2 => Some(&self.input[after_close + 1..end - 1]),
            _ if !opener.bracket_after => Some(&self.input[opener.text_pos..close_pos]),
            _ => None,
        };
        let found = label.and_then(|label| {
            self.refs
                .get(normalize_reference_label(label).as_ref())
                .cloned()
        });
        match found {
            Some(reference) => {
                if let Some(end) = label_end {
                    self.pos = end;
                }
                Some((reference.href, reference.title))
            }
            None => {
                self.pos = after_close;
                None
            }
        }
    }

    /// `<scheme:...>` or `<user@host>`, with `self.pos` at `<`.
    pub(super) fn try_autolink(&mut self) -> bool {
        let start = self.pos + 1;
        let mut end = start;
        while end < self.bytes.len() {
            match self.bytes[end] {
                b'>' => break,
                b'<' => return false,
                b if b <= b' ' || b == 0x7F => return false,
                _ => end += 1,
            }
        }
        if end >= self.bytes.len() {
            return false;
        }
        let content = &self.input[start..end];
        let is_email = if is_absolute_uri(content) {
            false
        } else if is_email_address(content) {
            true
        } else {
            return false;
        };
        self.items.push(InlineItem::Autolink {
            start,
            end,
            is_email,
        });
        self.pos = end + 1;
        true
    }

    /// Raw inline HTML, with `self.pos` at `<`.
    pub(super) fn try_html_inline(&mut self) -> bool {
        let Some(len) = scan_html_tag(&self.input[self.pos..]) else {
            return false;
        };
        self.items
            .push(InlineItem::RawHtml(self.pos, self.pos + len));
        self.pos += len;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_labels() {
        assert_eq!(scan_link_label(b"[foo] x", 0), Some(5));
        assert_eq!(scan_link_label(b"[a\\]b]", 0), Some(6));
        assert_eq!(scan_link_label(b"[a[b]", 0), None);
        assert_eq!(scan_link_label(b"[abc", 0), None);
        let long = format!("[{}]", "x".repeat(1000));
        assert_eq!(scan_link_label(long.as_bytes(), 0), None);
    }

    #[test]
    fn destinations() {
        assert_eq!(scan_link_destination("<my url>)", 0), Some(("my url".into(), 8)));
        assert_eq!(scan_link_destination("<a\nb>", 0), None);
        assert_eq!(scan_link_destination("a(b)c) z", 0), Some(("a(b)c".into(), 5)));
        assert_eq!(scan_link_destination("a(b", 0), None);
        assert_eq!(scan_link_destination(")", 0), Some((String::new(), 0)));
        assert_eq!(scan_link_destination(" x", 0), None);
        assert_eq!(scan_link_destination("a\\)b)", 0), Some(("a)b".into(), 4)));
    }

    #[test]
    fn titles() {
        assert_eq!(scan_link_title("\"a \\\" b\")", 0), Some(("a \" b".into(), 8)));
        assert_eq!(scan_link_title("'x'", 0), Some(("x".into(), 3)));
        assert_eq!(scan_link_title("(a(b)", 0), None);
        assert_eq!(scan_link_title("\"open", 0), None);
    }

    #[test]
    fn autolink_forms() {
        assert!(is_absolute_uri("http://example.com"));
        assert!(is_absolute_uri("a+b:c"));
        assert!(!is_absolute_uri("m:abc"));
        assert!(!is_absolute_uri("3x:abc"));
        assert!(is_email_address("foo@bar.example.com"));
        assert!(!is_email_address("foo@-bar.com"));
        assert!(!is_email_address("foo.bar"));
    }

    #[test]
    fn html_tags() {
        assert_eq!(scan_html_tag("<a href=\"x\">y"), Some(12));
        assert_eq!(scan_html_tag("<br/>"), Some(5));
        assert_eq!(scan_html_tag("</b >"), Some(5));
        assert_eq!(scan_html_tag("<!-->"), Some(5));
        assert_eq!(scan_html_tag("<!-- c -->x"), Some(10));
        assert_eq!(scan_html_tag("<?php x ?>"), Some(10));
        assert_eq!(scan_html_tag("<!DOCTYPE html>"), Some(15));
        assert_eq!(scan_html_tag("<![CDATA[x]]>"), Some(13));
        assert_eq!(scan_html_tag("<a b=>"), None);
        assert_eq!(scan_html_tag("<a b c=d>"), Some(9));
        assert_eq!(scan_html_tag("<33>"), None);
        assert_eq!(scan_html_tag("<a"), None);
    }
}
