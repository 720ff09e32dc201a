//! RFC 3986 character classes and percent-encoding helpers.

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// True for RFC 3986 unreserved characters.
pub(crate) const fn is_unreserved(c: char) -> bool {
    matches!(c, 'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '.' | '_' | '~')
}

/// True for RFC 3986 gen-delims and sub-delims.
pub(crate) const fn is_reserved(c: char) -> bool {
    matches!(
        c,
        ':' | '/'
            | '?'
            | '#'
            | '['
            | ']'
            | '@'
            | '!'
            | '$'
            | '&'
            | '\''
            | '('
            | ')'
            | '*'
            | '+'
            | ','
            | ';'
            | '='
    )
}

/// True when `bytes[i]` starts a well-formed `%HH` triplet.
pub(crate) fn is_pct_triplet(bytes: &[u8], i: usize) -> bool {
    bytes[i] == b'%'
        && i + 2 < bytes.len()
        && bytes[i + 1].is_ascii_hexdigit()
        && bytes[i + 2].is_ascii_hexdigit()
}

fn push_pct(b: u8, out: &mut String) {
    out.push('%');
    out.push(HEX_UPPER[usize::from(b >> 4)] as char);
    out.push(HEX_UPPER[usize::from(b & 0x0F)] as char);
}

/// Percent-encodes `text` into `out`.
///
/// Unreserved characters always pass through. With `allow_reserved`,
/// reserved characters and pre-existing `%HH` triplets also pass through;
/// everything else is UTF-8 encoded byte by byte as uppercase `%HH`.
pub(crate) fn encode_into(text: &str, allow_reserved: bool, out: &mut String) {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < text.len() {
        if allow_reserved && is_pct_triplet(bytes, i) {
            out.push_str(&text[i..i + 3]);
            i += 3;
            continue;
        }
        let c = match text[i..].chars().next() {
            Some(c) => c,
            None => break,
        };
        if is_unreserved(c) || (allow_reserved && is_reserved(c)) {
            out.push(c);
        } else {
            for b in text[i..i + c.len_utf8()].bytes() {
                push_pct(b, out);
            }
        }
        i += c.len_utf8();
    }
}

/// Percent-encodes `text` to a fresh string.
#[cfg(test)]
fn encode(text: &str, allow_reserved: bool) -> String {
    let mut out = String::with_capacity(text.len());
    encode_into(text, allow_reserved, &mut out);
    out
}

pub(crate) const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decodes `%HH` triplets in `text` and validates the result as UTF-8.
///
/// Returns `None` for a dangling `%`, a malformed triplet, or decoded
/// bytes that are not valid UTF-8.
pub(crate) fn decode(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut buf = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 >= bytes.len() {
                return None;
            }
            let hi = hex_value(bytes[i + 1])?;
            let lo = hex_value(bytes[i + 2])?;
            buf.push(hi << 4 | lo);
            i += 3;
        } else {
            buf.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(buf).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_unreserved_passthrough() {
        assert_eq!(encode("Az09-._~", false), "Az09-._~");
    }

    #[test]
    fn encode_space_and_colon() {
        assert_eq!(encode("A :B", false), "A%20%3AB");
    }

    #[test]
    fn encode_reserved_allowed() {
        assert_eq!(encode("A :B", true), "A%20:B");
        assert_eq!(encode("/foo/bar", true), "/foo/bar");
    }

    #[test]
    fn encode_reserved_disallowed() {
        assert_eq!(encode("/foo", false), "%2Ffoo");
    }

    #[test]
    fn encode_multibyte() {
        // U+00FC as two UTF-8 bytes, uppercase hex
        assert_eq!(encode("\u{fc}", false), "%C3%BC");
    }

    #[test]
    fn encode_pct_passthrough_only_when_reserved_allowed() {
        assert_eq!(encode("%25", true), "%25");
        assert_eq!(encode("%25", false), "%2525");
        // Malformed triplet: the '%' itself is encoded
        assert_eq!(encode("%2x", true), "%252x");
    }

    #[test]
    fn decode_roundtrip() {
        assert_eq!(decode("A%20%3AB").as_deref(), Some("A :B"));
        assert_eq!(decode("%C3%BC").as_deref(), Some("\u{fc}"));
        assert_eq!(decode("plain").as_deref(), Some("plain"));
    }

    #[test]
    fn decode_rejects_dangling_percent() {
        assert_eq!(decode("%2"), None);
        assert_eq!(decode("%GG"), None);
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        assert_eq!(decode("%FF"), None);
    }
}
