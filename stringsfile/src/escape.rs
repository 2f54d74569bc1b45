//! Escape-sequence decoding and encoding shared by every text format.
//!
//! All three formats (`.strings`, gettext PO, C string literals) use the same
//! escape table: `\\`, `\"`, `\'`, `\n`, `\r`, `\t` and three-digit octal
//! `\NNN` with a leading digit of 0-3.

/// Target format for [`encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeFormat {
    /// Apple-style `.strings` files.
    Strings,
    /// GNU gettext `.po` files.
    Po,
    /// C/C++ string literals. Non-ASCII bytes are written as octal escapes so
    /// generated headers stay 7-bit clean.
    CLiteral,
}

/// Decodes one escape sequence.
///
/// `rest` starts right after the backslash. Returns the decoded byte and the
/// number of bytes of `rest` consumed, or `None` when the sequence is not
/// recognized.
pub fn decode_escape(rest: &[u8]) -> Option<(u8, usize)> {
    let first = *rest.first()?;
    match first {
        b'\\' | b'\'' | b'"' => Some((first, 1)),
        b'n' => Some((b'\n', 1)),
        b'r' => Some((b'\r', 1)),
        b't' => Some((b'\t', 1)),
        b'0'..=b'3' => {
            let second = *rest.get(1)?;
            let third = *rest.get(2)?;
            if !is_octal(second) || !is_octal(third) {
                return None;
            }
            Some((((first - b'0') << 6) | ((second - b'0') << 3) | (third - b'0'), 3))
        }
        _ => None,
    }
}

fn is_octal(b: u8) -> bool {
    (b'0'..=b'7').contains(&b)
}

/// Decodes every escape in `input` (which must not include the surrounding
/// quotes).
///
/// Returns the byte offset of the offending backslash on an invalid escape.
/// Decoded bytes that are not valid UTF-8 are replaced with U+FFFD.
pub fn decode(input: &str) -> Result<String, usize> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' {
            let (ch, used) = decode_escape(&bytes[i + 1..]).ok_or(i)?;
            out.push(ch);
            i += 1 + used;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Encodes `input` for the given format. The result does not include the
/// surrounding quotes.
pub fn encode(input: &str, format: EscapeFormat) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 8);

    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0}'..='\u{1f}' | '\u{7f}' => push_octal(&mut out, ch as u8),
            _ if !ch.is_ascii() && format == EscapeFormat::CLiteral => {
                let mut buf = [0u8; 4];
                for &b in ch.encode_utf8(&mut buf).as_bytes() {
                    push_octal(&mut out, b);
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

fn push_octal(out: &mut String, b: u8) {
    out.push('\\');
    out.push((b'0' + (b >> 6)) as char);
    out.push((b'0' + ((b >> 3) & 7)) as char);
    out.push((b'0' + (b & 7)) as char);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_named_and_octal_escapes() {
        let decoded = decode(r#"a\nb\t\"c\"\101"#).unwrap();
        assert_eq!(decoded, "a\nb\t\"c\"A");
    }

    #[test]
    fn test_decode_octal_utf8_sequence() {
        assert_eq!(decode(r"caf\303\251").unwrap(), "café");
    }

    #[test]
    fn test_decode_rejects_unknown_escape() {
        assert_eq!(decode(r"ok\q"), Err(2));
        // First octal digit must be 0-3.
        assert_eq!(decode(r"\477"), Err(0));
        // Too short for an octal escape.
        assert_eq!(decode(r"\01"), Err(0));
    }

    #[test]
    fn test_encode_strings_keeps_unicode() {
        assert_eq!(
            encode("Grüße \"du\"\n", EscapeFormat::Strings),
            r#"Grüße \"du\"\n"#
        );
    }

    #[test]
    fn test_encode_c_literal_uses_octal_for_non_ascii() {
        assert_eq!(encode("é", EscapeFormat::CLiteral), r"\303\251");
        assert_eq!(encode("a\\b", EscapeFormat::CLiteral), r"a\\b");
    }

    #[test]
    fn test_encode_control_bytes_as_octal() {
        assert_eq!(encode("\u{1}x", EscapeFormat::Po), r"\001x");
    }

    #[test]
    fn test_encode_then_decode_preserves_text() {
        for format in [EscapeFormat::Strings, EscapeFormat::Po, EscapeFormat::CLiteral] {
            let original = "tab\there \"quoted\" back\\slash\r\n\u{7f} ünïcödé";
            assert_eq!(decode(&encode(original, format)).unwrap(), original);
        }
    }
}
