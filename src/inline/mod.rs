mod links;
mod punct_table;
mod scanner;
mod tree;

pub(crate) use links::{scan_link_destination, scan_link_label, scan_link_title};

use crate::ast::Inline;
use crate::entities;
use std::borrow::Cow;
use std::collections::HashMap;

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct LinkReference {
    pub href: String,
    pub title: Option<String>,
}

/// Link reference definitions keyed by normalized label.
pub(crate) type LinkRefMap = HashMap<String, LinkReference>;

/// Case-folds a link label and collapses internal whitespace runs to a single
/// space.
pub(crate) fn normalize_reference_label(label: &str) -> Cow<'_, str> {
    let trimmed = label.trim();
    let bytes = trimmed.as_bytes();

    let mut simple = true;
    let mut prev_space = false;
    for &b in bytes {
        if b.is_ascii_uppercase() || matches!(b, b'\t' | b'\n' | b'\r') || b >= 0x80 {
            simple = false;
            break;
        }
        if b == b' ' {
            if prev_space {
                simple = false;
                break;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
    }
    if simple {
        return Cow::Borrowed(trimmed);
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut in_space = false;
    for c in trimmed.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
            continue;
        }
        in_space = false;
        match c {
            'ß' | 'ẞ' => out.push_str("ss"),
            _ if c.is_ascii() => out.push(c.to_ascii_lowercase()),
            _ => out.extend(c.to_lowercase()),
        }
    }
    Cow::Owned(out)
}

/// Resolves backslash escapes and character references.
pub(crate) fn unescape_string(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    if memchr::memchr2(b'\\', b'&', bytes).is_none() {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if i + 1 < bytes.len() && is_ascii_punctuation(bytes[i + 1]) => {
                out.push_str(&s[last..i]);
                last = i + 1;
                i += 2;
            }
            b'&' => {
                out.push_str(&s[last..i]);
                last = i;
                match entities::resolve_entity_in_bytes(bytes, i, &mut out) {
                    Some(end) => {
                        i = end;
                        last = end;
                    }
                    None => i += 1,
                }
            }
            _ => i += 1,
        }
    }
    out.push_str(&s[last..]);
    Cow::Owned(out)
}

static SPECIAL: [bool; 256] = {
    let mut t = [false; 256];
    t[b'\\' as usize] = true;
    t[b'`' as usize] = true;
    t[b'*' as usize] = true;
    t[b'_' as usize] = true;
    t[b'!' as usize] = true;
    t[b'[' as usize] = true;
    t[b']' as usize] = true;
    t[b'<' as usize] = true;
    t[b'&' as usize] = true;
    t[b'\n' as usize] = true;
    t
};

/// Parses the raw text of a paragraph or heading into inline nodes.
pub(crate) fn parse_inlines(raw: &str, refs: &LinkRefMap) -> Vec<Inline> {
    let raw = raw.trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r'));
    if raw.is_empty() {
        return Vec::new();
    }
    if !raw.bytes().any(|b| SPECIAL[b as usize]) {
        return vec![Inline::text(raw)];
    }

    let mut scanner = InlineScanner::new(raw, refs);
    scanner.scan_all();
    scanner.process_emphasis(None);
    scanner.into_tree()
}

#[derive(Clone, Debug)]
struct LinkInfo {
    dest: String,
    title: Option<String>,
    is_image: bool,
}

/// Flat intermediate form; [`InlineScanner::into_tree`] nests it.
#[derive(Clone, Debug)]
enum InlineItem {
    TextRange(usize, usize),
    TextOwned(String),
    TextStatic(&'static str),
    RawHtml(usize, usize),
    Code(String),
    Autolink { start: usize, end: usize, is_email: bool },
    HardBreak,
    SoftBreak,
    DelimRun { delim: usize },
    BracketOpen { is_image: bool },
    LinkStart(usize),
    LinkEnd,
}

/// Entry of the emphasis delimiter list. Entries are never freed, only
/// unlinked, so `DelimRun` items can still read their final state.
#[derive(Clone, Debug)]
struct Delimiter {
    marker: u8,
    orig_count: usize,
    count: usize,
    can_open: bool,
    can_close: bool,
    prev: Option<usize>,
    next: Option<usize>,
    /// Sizes (1 or 2) of emphasis opened here, innermost last.
    open_em: Vec<u8>,
    /// Sizes of emphasis closed here, innermost first.
    close_em: Vec<u8>,
}

#[derive(Clone, Debug)]
struct BracketInfo {
    item_idx: usize,
    is_image: bool,
    prev_delim: Option<usize>,
    bracket_after: bool,
    /// Start of the link text, just past `[`.
    text_pos: usize,
}

struct InlineScanner<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    refs: &'a LinkRefMap,
    items: Vec<InlineItem>,
    delims: Vec<Delimiter>,
    delims_top: Option<usize>,
    brackets: Vec<BracketInfo>,
    /// Non-image brackets below this index can no longer form links.
    link_barrier: usize,
    links: Vec<LinkInfo>,
    backtick_runs: Option<HashMap<usize, Vec<usize>>>,
}

impl<'a> InlineScanner<'a> {
    fn new(input: &'a str, refs: &'a LinkRefMap) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            refs,
            items: Vec::with_capacity(input.len() / 8 + 4),
            delims: Vec::new(),
            delims_top: None,
            brackets: Vec::new(),
            link_barrier: 0,
            links: Vec::new(),
            backtick_runs: None,
        }
    }
}

pub(super) use crate::is_ascii_punctuation;
pub(super) use crate::utf8_char_len;

#[inline(always)]
fn is_punctuation_char(c: char) -> bool {
    if c.is_ascii() {
        return is_ascii_punctuation(c as u8);
    }
    let cp = u32::from(c);
    punct_table::PUNCTUATION_RANGES
        .binary_search_by(|&(lo, hi)| {
            if hi < cp {
                std::cmp::Ordering::Less
            } else if lo > cp {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

/// Zs plus tab, line feed, form feed and carriage return.
#[inline(always)]
fn is_unicode_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

#[inline(always)]
fn char_before(s: &str, byte_pos: usize) -> char {
    s[..byte_pos].chars().next_back().unwrap_or(' ')
}

#[inline(always)]
fn char_at(s: &str, byte_pos: usize) -> char {
    s.get(byte_pos..)
        .and_then(|rest| rest.chars().next())
        .unwrap_or(' ')
}

/// Whether a run of `marker` between `before` and `after` may open and/or
/// close emphasis.
fn flanking(marker: u8, before: char, after: char) -> (bool, bool) {
    let before_ws = is_unicode_whitespace(before);
    let after_ws = is_unicode_whitespace(after);
    let before_punct = is_punctuation_char(before);
    let after_punct = is_punctuation_char(after);

    let left_flanking = !after_ws && (!after_punct || before_ws || before_punct);
    let right_flanking = !before_ws && (!before_punct || after_ws || after_punct);

    if marker == b'_' {
        (
            left_flanking && (!right_flanking || before_punct),
            right_flanking && (!left_flanking || after_punct),
        )
    } else {
        (left_flanking, right_flanking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_labels() {
        assert_eq!(normalize_reference_label("foo"), "foo");
        assert_eq!(normalize_reference_label("  Foo \n\t Bar "), "foo bar");
        assert_eq!(normalize_reference_label("ẞ"), "ss");
        assert_eq!(normalize_reference_label("ΑΓΩ"), "αγω");
    }

    #[test]
    fn unescapes_escapes_and_entities() {
        assert_eq!(unescape_string("plain"), "plain");
        assert_eq!(unescape_string("a\\*b\\c"), "a*b\\c");
        assert_eq!(unescape_string("&amp;&bogus;&#65;"), "&&bogus;A");
    }

    #[test]
    fn flanking_rules() {
        assert_eq!(flanking(b'*', ' ', 'a'), (true, false));
        assert_eq!(flanking(b'*', 'a', ' '), (false, true));
        assert_eq!(flanking(b'*', 'a', 'b'), (true, true));
        assert_eq!(flanking(b'_', 'a', 'b'), (false, false));
        assert_eq!(flanking(b'*', ' ', ' '), (false, false));
        assert_eq!(flanking(b'_', '"', 'a'), (true, false));
    }

    #[test]
    fn non_ascii_punctuation_and_symbols() {
        for c in ['¡', '،', '€', '—', '「', '😀', '👍'] {
            assert!(is_punctuation_char(c), "{c:?}");
        }
        for c in ['ª', '²', '³', 'µ', 'º', '¼', 'é', 'ß'] {
            assert!(!is_punctuation_char(c), "{c:?}");
        }
    }

    #[test]
    fn unicode_whitespace_is_zs_and_controls() {
        for c in [' ', '\t', '\n', '\u{0C}', '\r', '\u{A0}', '\u{2003}', '\u{3000}'] {
            assert!(is_unicode_whitespace(c), "{c:?}");
        }
        for c in ['\u{85}', '\u{2028}', '\u{2029}', '\u{0B}', 'a'] {
            assert!(!is_unicode_whitespace(c), "{c:?}");
        }
    }

    #[test]
    fn emphasis_next_to_non_ascii() {
        let refs = LinkRefMap::new();
        assert_eq!(parse_inlines("*foo😀*bar", &refs), vec![Inline::text("*foo😀*bar")]);
        assert_eq!(parse_inlines("*foo،*bar", &refs), vec![Inline::text("*foo،*bar")]);
        for inner in ["²", "µ"] {
            assert_eq!(
                parse_inlines(&format!("a*{inner}*b"), &refs),
                vec![
                    Inline::text("a"),
                    Inline::Emphasis {
                        children: vec![Inline::text(inner)],
                    },
                    Inline::text("b"),
                ]
            );
        }
    }

    #[test]
    fn plain_text_fast_path() {
        let refs = LinkRefMap::new();
        assert_eq!(parse_inlines("  hello world \n", &refs), vec![Inline::text("hello world")]);
        assert!(parse_inlines(" \n", &refs).is_empty());
    }
}
