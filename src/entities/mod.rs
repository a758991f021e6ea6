mod data;

use data::ENTITIES;

/// Longest name in the named character reference table.
pub(crate) const MAX_ENTITY_NAME_LEN: usize = 31;

#[inline]
pub(crate) fn lookup_entity_codepoints(name: &str) -> Option<(u32, u32)> {
    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes.len() > MAX_ENTITY_NAME_LEN {
        return None;
    }

    match bytes {
        b"amp" => return Some((0x26, 0)),
        b"lt" => return Some((0x3C, 0)),
        b"gt" => return Some((0x3E, 0)),
        b"quot" => return Some((0x22, 0)),
        b"nbsp" => return Some((0xA0, 0)),
        b"copy" => return Some((0xA9, 0)),
        _ => {}
    }

    ENTITIES
        .binary_search_by(|(n, _, _)| n.as_bytes().cmp(bytes))
        .ok()
        .map(|i| (ENTITIES[i].1, ENTITIES[i].2))
}

#[inline(always)]
fn push_codepoints(out: &mut String, cp1: u32, cp2: u32) {
    if let Some(c) = char::from_u32(cp1) {
        out.push(c);
    }
    if cp2 != 0
        && let Some(c) = char::from_u32(cp2)
    {
        out.push(c);
    }
}

#[inline]
pub(crate) fn lookup_entity_into(name: &str, out: &mut String) -> bool {
    if let Some((cp1, cp2)) = lookup_entity_codepoints(name) {
        push_codepoints(out, cp1, cp2);
        true
    } else {
        false
    }
}

/// Decodes the digits of a `&#...;` reference. Zero and invalid code points
/// map to U+FFFD.
pub(crate) fn resolve_numeric_ref_into(value: &str, hex: bool, out: &mut String) -> bool {
    let radix = if hex { 16 } else { 10 };
    let Ok(cp) = u32::from_str_radix(value, radix) else {
        return false;
    };
    let c = match cp {
        0 => char::REPLACEMENT_CHARACTER,
        cp => char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER),
    };
    out.push(c);
    true
}

/// Parses a character reference starting at `bytes[start] == b'&'`, pushing
/// the decoded text into `out`. Returns the position just past the `;`.
pub(crate) fn resolve_entity_in_bytes(
    bytes: &[u8],
    start: usize,
    out: &mut String,
) -> Option<usize> {
    let mut i = start + 1;
    if i >= bytes.len() {
        return None;
    }

    if bytes[i] == b'#' {
        i += 1;
        let hex = i < bytes.len() && matches!(bytes[i], b'x' | b'X');
        if hex {
            i += 1;
        }
        let ns = i;
        if hex {
            while i < bytes.len() && bytes[i].is_ascii_hexdigit() {
                i += 1;
            }
        } else {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
        let max_digits = if hex { 6 } else { 7 };
        if i == ns || i - ns > max_digits || i >= bytes.len() || bytes[i] != b';' {
            return None;
        }
        let value = std::str::from_utf8(&bytes[ns..i]).ok()?;
        i += 1;
        resolve_numeric_ref_into(value, hex, out).then_some(i)
    } else {
        let ns = i;
        if !bytes[ns].is_ascii_alphabetic() {
            return None;
        }
        while i < bytes.len() && i - ns <= MAX_ENTITY_NAME_LEN && bytes[i].is_ascii_alphanumeric()
        {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b';' {
            return None;
        }
        let name = std::str::from_utf8(&bytes[ns..i]).ok()?;
        i += 1;
        lookup_entity_into(name, out).then_some(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(s: &str) -> Option<(String, usize)> {
        let mut out = String::new();
        resolve_entity_in_bytes(s.as_bytes(), 0, &mut out).map(|end| (out, end))
    }

    #[test]
    fn table_is_sorted_for_binary_search() {
        assert!(ENTITIES.windows(2).all(|w| w[0].0.as_bytes() < w[1].0.as_bytes()));
    }

    #[test]
    fn named_references() {
        assert_eq!(decode("&amp;"), Some(("&".to_string(), 5)));
        assert_eq!(decode("&copy; 2024"), Some(("\u{a9}".to_string(), 6)));
        assert_eq!(decode("&ngE;"), Some(("\u{2267}\u{338}".to_string(), 5)));
        assert_eq!(decode("&AElig;"), Some(("\u{c6}".to_string(), 7)));
    }

    #[test]
    fn unknown_or_unterminated_names() {
        assert_eq!(decode("&madeup;"), None);
        assert_eq!(decode("&amp"), None);
        assert_eq!(decode("& amp;"), None);
    }

    #[test]
    fn numeric_references() {
        assert_eq!(decode("&#35;"), Some(("#".to_string(), 5)));
        assert_eq!(decode("&#X22;"), Some(("\"".to_string(), 6)));
        assert_eq!(decode("&#0;"), Some(("\u{FFFD}".to_string(), 4)));
        assert_eq!(decode("&#1234567;"), Some(("\u{FFFD}".to_string(), 10)));
        assert_eq!(decode("&#87654321;"), None);
        assert_eq!(decode("&#xabcdef0;"), None);
    }
}
