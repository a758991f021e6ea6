use super::*;

/// Tag names that open an HTML block ending at a blank line. Sorted for
/// binary search.
static BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "base",
    "basefont",
    "blockquote",
    "body",
    "caption",
    "center",
    "col",
    "colgroup",
    "dd",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "frame",
    "frameset",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "head",
    "header",
    "hr",
    "html",
    "iframe",
    "legend",
    "li",
    "link",
    "main",
    "menu",
    "menuitem",
    "nav",
    "noframes",
    "ol",
    "optgroup",
    "option",
    "p",
    "param",
    "search",
    "section",
    "summary",
    "table",
    "tbody",
    "td",
    "template",
    "tfoot",
    "th",
    "thead",
    "title",
    "tr",
    "track",
    "ul",
];

static RAW_TEXT_TAGS: &[&[u8]] = &[b"pre", b"script", b"style", b"textarea"];

fn starts_with_tag_ci(bytes: &[u8], tag: &[u8]) -> bool {
    if bytes.len() < 1 + tag.len() || bytes[0] != b'<' {
        return false;
    }
    if !bytes[1..=tag.len()].eq_ignore_ascii_case(tag) {
        return false;
    }
    matches!(
        bytes.get(1 + tag.len()),
        None | Some(b' ' | b'\t' | b'>')
    )
}

/// Recognizes the start of an HTML block on a line beginning with `<`.
/// Blocks that may only follow a blank line are refused when
/// `interrupts_paragraph` is set.
pub(super) fn parse_html_block_start(line: &str, interrupts_paragraph: bool) -> Option<HtmlBlockEnd> {
    let bytes = line.as_bytes();
    if bytes.first() != Some(&b'<') {
        return None;
    }

    if RAW_TEXT_TAGS.iter().any(|tag| starts_with_tag_ci(bytes, tag)) {
        return Some(HtmlBlockEnd::RawTextEndTag);
    }
    if bytes.starts_with(b"<!--") {
        return Some(HtmlBlockEnd::Comment);
    }
    if bytes.starts_with(b"<?") {
        return Some(HtmlBlockEnd::ProcessingInstruction);
    }
    if bytes.len() > 2 && bytes[1] == b'!' && bytes[2].is_ascii_alphabetic() {
        return Some(HtmlBlockEnd::Declaration);
    }
    if bytes.starts_with(b"<![CDATA[") {
        return Some(HtmlBlockEnd::Cdata);
    }
    if is_block_tag(bytes) {
        return Some(HtmlBlockEnd::BlankLine);
    }
    if !interrupts_paragraph && is_complete_tag_line(bytes) {
        return Some(HtmlBlockEnd::BlankLine);
    }
    None
}

/// `<tag` or `</tag` for a known block-level tag, followed by whitespace,
/// the end of the line, `>` or `/>`.
fn is_block_tag(bytes: &[u8]) -> bool {
    let start = if bytes.get(1) == Some(&b'/') { 2 } else { 1 };
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_alphanumeric() {
        end += 1;
    }
    let tag_len = end - start;
    if tag_len == 0 || tag_len > 10 {
        return false;
    }
    match &bytes[end..] {
        [] | [b' ' | b'\t' | b'>', ..] | [b'/', b'>', ..] => {}
        _ => return false,
    }
    let mut buf = [0u8; 10];
    for (dst, src) in buf.iter_mut().zip(&bytes[start..end]) {
        *dst = src.to_ascii_lowercase();
    }
    let lc_tag = &buf[..tag_len];
    BLOCK_TAGS
        .binary_search_by(|t| t.as_bytes().cmp(lc_tag))
        .is_ok()
}

#[inline]
fn skip_spaces_tabs(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    i
}

/// A complete open or closing tag followed only by whitespace.
fn is_complete_tag_line(bytes: &[u8]) -> bool {
    let is_close = bytes.get(1) == Some(&b'/');
    let start = if is_close { 2 } else { 1 };
    if start >= bytes.len() || !bytes[start].is_ascii_alphabetic() {
        return false;
    }
    let mut i = start;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    let name = &bytes[start..i];
    if RAW_TEXT_TAGS.iter().any(|tag| name.eq_ignore_ascii_case(tag)) {
        return false;
    }

    if is_close {
        i = skip_spaces_tabs(bytes, i);
        if bytes.get(i) != Some(&b'>') {
            return false;
        }
        i += 1;
    } else {
        loop {
            let before = i;
            i = skip_spaces_tabs(bytes, i);
            let had_space = i > before;
            match bytes.get(i) {
                None => return false,
                Some(b'>') => {
                    i += 1;
                    break;
                }
                Some(b'/') => {
                    if bytes.get(i + 1) != Some(&b'>') {
                        return false;
                    }
                    i += 2;
                    break;
                }
                Some(&b) => {
                    if !had_space || !(b.is_ascii_alphabetic() || b == b'_' || b == b':') {
                        return false;
                    }
                }
            }
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'_' | b':' | b'.' | b'-'))
            {
                i += 1;
            }
            let after_name = i;
            i = skip_spaces_tabs(bytes, i);
            if bytes.get(i) != Some(&b'=') {
                i = after_name;
                continue;
            }
            i = skip_spaces_tabs(bytes, i + 1);
            match bytes.get(i) {
                None => return false,
                Some(&quote @ (b'\'' | b'"')) => {
                    let Some(close) = memchr::memchr(quote, &bytes[i + 1..]) else {
                        return false;
                    };
                    i += close + 2;
                }
                Some(_) => {
                    let value_start = i;
                    while i < bytes.len()
                        && !matches!(bytes[i], b' ' | b'\t' | b'"' | b'\'' | b'=' | b'<' | b'>' | b'`')
                    {
                        i += 1;
                    }
                    if i == value_start {
                        return false;
                    }
                }
            }
        }
    }

    skip_spaces_tabs(bytes, i) == bytes.len()
}

fn contains_ci(haystack: &[u8], needle: &[u8]) -> bool {
    needle.len() <= haystack.len()
        && haystack
            .windows(needle.len())
            .any(|window| window.eq_ignore_ascii_case(needle))
}

pub(super) fn html_block_ends(condition: HtmlBlockEnd, line: &str) -> bool {
    match condition {
        HtmlBlockEnd::RawTextEndTag => {
            let bytes = line.as_bytes();
            [&b"</pre>"[..], b"</script>", b"</style>", b"</textarea>"]
                .iter()
                .any(|tag| contains_ci(bytes, tag))
        }
        HtmlBlockEnd::Comment => line.contains("-->"),
        HtmlBlockEnd::ProcessingInstruction => line.contains("?>"),
        HtmlBlockEnd::Declaration => line.contains('>'),
        HtmlBlockEnd::Cdata => line.contains("]]>"),
        HtmlBlockEnd::BlankLine => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_tags_are_sorted() {
        assert!(BLOCK_TAGS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn recognizes_start_conditions() {
        assert_eq!(
            parse_html_block_start("<SCRIPT type=\"x\">", false),
            Some(HtmlBlockEnd::RawTextEndTag)
        );
        assert_eq!(parse_html_block_start("<!-- c", true), Some(HtmlBlockEnd::Comment));
        assert_eq!(
            parse_html_block_start("<?php", true),
            Some(HtmlBlockEnd::ProcessingInstruction)
        );
        assert_eq!(
            parse_html_block_start("<!DOCTYPE html>", true),
            Some(HtmlBlockEnd::Declaration)
        );
        assert_eq!(
            parse_html_block_start("<![CDATA[", true),
            Some(HtmlBlockEnd::Cdata)
        );
        assert_eq!(parse_html_block_start("<div>", true), Some(HtmlBlockEnd::BlankLine));
        assert_eq!(parse_html_block_start("</TD>", true), Some(HtmlBlockEnd::BlankLine));
        assert_eq!(parse_html_block_start("<div/>", true), Some(HtmlBlockEnd::BlankLine));
    }

    #[test]
    fn block_tag_needs_a_boundary() {
        assert_eq!(parse_html_block_start("<divx>", true), None);
        assert_eq!(parse_html_block_start("<div/x", true), None);
    }

    #[test]
    fn complete_tag_lines() {
        assert_eq!(
            parse_html_block_start("<a href=\"foo\">", false),
            Some(HtmlBlockEnd::BlankLine)
        );
        assert_eq!(parse_html_block_start("<a href=\"foo\">", true), None);
        assert_eq!(parse_html_block_start("<Warning>  ", false), Some(HtmlBlockEnd::BlankLine));
        assert_eq!(parse_html_block_start("<a> text", false), None);
        assert_eq!(parse_html_block_start("<a b=>", false), None);
        assert_eq!(parse_html_block_start("</pre >", false), None);
    }

    #[test]
    fn end_conditions() {
        assert!(html_block_ends(HtmlBlockEnd::RawTextEndTag, "x </STYLE> y"));
        assert!(html_block_ends(HtmlBlockEnd::RawTextEndTag, "</pre>"));
        assert!(!html_block_ends(HtmlBlockEnd::RawTextEndTag, "</div>"));
        assert!(html_block_ends(HtmlBlockEnd::Comment, "end -->"));
        assert!(!html_block_ends(HtmlBlockEnd::BlankLine, ""));
    }
}
