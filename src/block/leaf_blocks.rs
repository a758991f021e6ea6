use super::*;

#[inline]
pub(super) fn trim_spaces_tabs(s: &str) -> &str {
    s.trim_matches(|c| c == ' ' || c == '\t')
}

#[inline]
fn only_spaces_tabs(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| b == b' ' || b == b'\t')
}

/// `line` starts at the first non-space character.
pub(super) fn is_thematic_break(line: &str) -> bool {
    let mut marker: u8 = 0;
    let mut count: u32 = 0;
    for &b in line.as_bytes() {
        match b {
            b' ' | b'\t' => continue,
            b'*' | b'-' | b'_' => {
                if marker == 0 {
                    marker = b;
                } else if b != marker {
                    return false;
                }
                count += 1;
            }
            _ => return false,
        }
    }
    count >= 3
}

/// Returns the heading level and its raw content with the optional closing
/// sequence removed.
pub(super) fn parse_atx_heading(line: &str) -> Option<(u8, &str)> {
    let bytes = line.as_bytes();
    let level = bytes.iter().take_while(|&&b| b == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }
    if level < bytes.len() && bytes[level] != b' ' && bytes[level] != b'\t' {
        return None;
    }
    let content = trim_spaces_tabs(&line[level..]);
    Some((level as u8, strip_closing_hashes(content)))
}

pub(super) fn strip_closing_hashes(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == b'#' {
        end -= 1;
    }
    if end == bytes.len() {
        return s;
    }
    if end == 0 {
        return "";
    }
    if bytes[end - 1] == b' ' || bytes[end - 1] == b'\t' {
        trim_spaces_tabs(&s[..end])
    } else {
        s
    }
}

pub(super) fn parse_setext_underline(line: &str) -> Option<u8> {
    let bytes = line.as_bytes();
    let ch = *bytes.first()?;
    if ch != b'=' && ch != b'-' {
        return None;
    }
    let run = bytes.iter().take_while(|&&b| b == ch).count();
    if !only_spaces_tabs(&bytes[run..]) {
        return None;
    }
    Some(if ch == b'=' { 1 } else { 2 })
}

/// Returns the fence character and length of an opening code fence.
pub(super) fn parse_fence_start(line: &str) -> Option<(u8, usize)> {
    let bytes = line.as_bytes();
    let ch = *bytes.first()?;
    if ch != b'`' && ch != b'~' {
        return None;
    }
    let count = bytes.iter().take_while(|&&b| b == ch).count();
    if count < 3 {
        return None;
    }
    // Backtick fences cannot have backticks in the info string
    if ch == b'`' && memchr::memchr(b'`', &bytes[count..]).is_some() {
        return None;
    }
    Some((ch, count))
}

/// `line` starts at the first non-space character; indentation is checked
/// by the caller.
#[inline]
pub(super) fn is_closing_fence(line: &str, fence_char: u8, fence_len: usize) -> bool {
    let bytes = line.as_bytes();
    let run = bytes.iter().take_while(|&&b| b == fence_char).count();
    run >= fence_len && only_spaces_tabs(&bytes[run..])
}

#[derive(Debug, Clone, Copy)]
pub(super) struct ListMarker {
    pub kind: ListKind,
    /// Bytes taken by the marker itself (`-` is 1, `10.` is 3).
    pub len: usize,
    pub start: u32,
    /// Nothing but whitespace follows the marker.
    pub is_empty_item: bool,
}

#[inline]
pub(super) fn parse_list_marker(line: &str) -> Option<ListMarker> {
    let bytes = line.as_bytes();
    let b0 = *bytes.first()?;

    let (kind, len, start) = if matches!(b0, b'-' | b'*' | b'+') {
        (ListKind::Bullet(b0), 1, 0)
    } else if b0.is_ascii_digit() {
        let digits = bytes.iter().take(10).take_while(|b| b.is_ascii_digit()).count();
        if digits > 9 {
            return None;
        }
        let delim = *bytes.get(digits)?;
        if delim != b'.' && delim != b')' {
            return None;
        }
        let start = line[..digits].parse::<u32>().ok()?;
        (ListKind::Ordered(delim), digits + 1, start)
    } else {
        return None;
    };

    if len < bytes.len() && bytes[len] != b' ' && bytes[len] != b'\t' {
        return None;
    }
    Some(ListMarker {
        kind,
        len,
        start,
        is_empty_item: only_spaces_tabs(&bytes[len..]),
    })
}

/// Empty items, and ordered items not starting at 1, cannot interrupt a
/// paragraph.
pub(super) fn can_interrupt_paragraph(marker: &ListMarker) -> bool {
    if marker.is_empty_item {
        return false;
    }
    match marker.kind {
        ListKind::Bullet(_) => true,
        ListKind::Ordered(_) => marker.start == 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thematic_breaks() {
        assert!(is_thematic_break("***"));
        assert!(is_thematic_break("- - -"));
        assert!(is_thematic_break("_____\t"));
        assert!(!is_thematic_break("--"));
        assert!(!is_thematic_break("*-*"));
        assert!(!is_thematic_break("---a"));
    }

    #[test]
    fn atx_headings() {
        assert_eq!(parse_atx_heading("# foo"), Some((1, "foo")));
        assert_eq!(parse_atx_heading("###### foo"), Some((6, "foo")));
        assert_eq!(parse_atx_heading("####### foo"), None);
        assert_eq!(parse_atx_heading("#5 bolt"), None);
        assert_eq!(parse_atx_heading("#"), Some((1, "")));
        assert_eq!(parse_atx_heading("## foo ##   "), Some((2, "foo")));
        assert_eq!(parse_atx_heading("# foo#"), Some((1, "foo#")));
        assert_eq!(parse_atx_heading("### ###"), Some((3, "")));
        assert_eq!(parse_atx_heading("# foo \\#"), Some((1, "foo \\#")));
    }

    #[test]
    fn setext_underlines() {
        assert_eq!(parse_setext_underline("==="), Some(1));
        assert_eq!(parse_setext_underline("---   "), Some(2));
        assert_eq!(parse_setext_underline("= ="), None);
        assert_eq!(parse_setext_underline("--- -"), None);
    }

    #[test]
    fn fences() {
        assert_eq!(parse_fence_start("```rust"), Some((b'`', 3)));
        assert_eq!(parse_fence_start("~~~~ a`b"), Some((b'~', 4)));
        assert_eq!(parse_fence_start("``` a`b"), None);
        assert_eq!(parse_fence_start("``"), None);
        assert!(is_closing_fence("````  ", b'`', 3));
        assert!(!is_closing_fence("``", b'`', 3));
        assert!(!is_closing_fence("``` x", b'`', 3));
        assert!(!is_closing_fence("~~~", b'`', 3));
    }

    #[test]
    fn list_markers() {
        let m = parse_list_marker("- foo").unwrap();
        assert_eq!((m.kind, m.len, m.is_empty_item), (ListKind::Bullet(b'-'), 1, false));
        let m = parse_list_marker("123) x").unwrap();
        assert_eq!((m.kind, m.len, m.start), (ListKind::Ordered(b')'), 4, 123));
        assert!(parse_list_marker("1234567890. x").is_none());
        assert!(parse_list_marker("-foo").is_none());
        assert!(parse_list_marker("*").unwrap().is_empty_item);
    }

    #[test]
    fn paragraph_interruption() {
        let empty = parse_list_marker("-  ").unwrap();
        assert!(!can_interrupt_paragraph(&empty));
        let two = parse_list_marker("2. x").unwrap();
        assert!(!can_interrupt_paragraph(&two));
        let one = parse_list_marker("1. x").unwrap();
        assert!(can_interrupt_paragraph(&one));
    }
}
