use crate::inline::{scan_link_destination, scan_link_label, scan_link_title};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct LinkRefDef {
    pub label: String,
    pub destination: String,
    pub title: Option<String>,
    /// Bytes of input taken by the definition, including its line ending.
    pub consumed: usize,
}

#[inline]
fn skip_line_spaces(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    i
}

fn skip_spaces_and_optional_newline(bytes: &[u8], i: usize) -> usize {
    let i = skip_line_spaces(bytes, i);
    if i < bytes.len() && bytes[i] == b'\n' {
        skip_line_spaces(bytes, i + 1)
    } else {
        i
    }
}

#[inline]
fn end_of_line(bytes: &[u8], i: usize) -> Option<usize> {
    let after = skip_line_spaces(bytes, i);
    match bytes.get(after) {
        None => Some(after),
        Some(b'\n') => Some(after + 1),
        Some(_) => None,
    }
}

/// Parses one link reference definition at the start of `input`.
pub(super) fn parse_link_ref_def(input: &str) -> Option<LinkRefDef> {
    let bytes = input.as_bytes();
    let label_end = scan_link_label(bytes, 0)?;
    let label = &input[1..label_end - 1];
    if label
        .bytes()
        .all(|b| matches!(b, b' ' | b'\t' | b'\n'))
    {
        return None;
    }
    if bytes.get(label_end) != Some(&b':') {
        return None;
    }

    let dest_start = skip_spaces_and_optional_newline(bytes, label_end + 1);
    let (destination, dest_end) = scan_link_destination(input, dest_start)?;
    if dest_end == dest_start {
        return None;
    }

    let title_start = skip_spaces_and_optional_newline(bytes, dest_end);
    if title_start > dest_end
        && let Some((title, title_end)) = scan_link_title(input, title_start)
        && let Some(consumed) = end_of_line(bytes, title_end)
    {
        return Some(LinkRefDef {
            label: label.to_string(),
            destination,
            title: Some(title),
            consumed,
        });
    }

    let consumed = end_of_line(bytes, dest_end)?;
    Some(LinkRefDef {
        label: label.to_string(),
        destination,
        title: None,
        consumed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(label: &str, destination: &str, title: Option<&str>, consumed: usize) -> LinkRefDef {
        LinkRefDef {
            label: label.to_string(),
            destination: destination.to_string(),
            title: title.map(str::to_string),
            consumed,
        }
    }

    #[test]
    fn basic_definition() {
        assert_eq!(
            parse_link_ref_def("[foo]: /url \"title\"\n"),
            Some(def("foo", "/url", Some("title"), 20))
        );
    }

    #[test]
    fn destination_and_title_on_following_lines() {
        assert_eq!(
            parse_link_ref_def("[Foo bar]:\n<my url>\n'title'\nrest"),
            Some(def("Foo bar", "my url", Some("title"), 28))
        );
    }

    #[test]
    fn title_with_trailing_text_falls_back_to_no_title() {
        let input = "[foo]: /url\n\"title\" ok\n";
        assert_eq!(parse_link_ref_def(input), Some(def("foo", "/url", None, 12)));
    }

    #[test]
    fn title_must_be_separated_from_destination() {
        assert_eq!(parse_link_ref_def("[foo]: <bar>(baz)"), None);
    }

    #[test]
    fn rejects_incomplete_definitions() {
        assert_eq!(parse_link_ref_def("[foo]:\n"), None);
        assert_eq!(parse_link_ref_def("[]: /url"), None);
        assert_eq!(parse_link_ref_def("[ ]: /url"), None);
        assert_eq!(parse_link_ref_def("[foo]: /url bar"), None);
        assert_eq!(parse_link_ref_def("[foo] /url"), None);
        assert_eq!(parse_link_ref_def("[fo[o]: /url"), None);
    }

    #[test]
    fn escapes_and_entities_are_decoded() {
        assert_eq!(
            parse_link_ref_def("[foo]: /f&ouml;&ouml; \"f\\\"oo\""),
            Some(def("foo", "/f\u{f6}\u{f6}", Some("f\"oo"), 29))
        );
    }

    #[test]
    fn empty_angle_destination() {
        assert_eq!(parse_link_ref_def("[foo]: <>"), Some(def("foo", "", None, 9)));
    }
}
