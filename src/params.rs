//! Needle / replacement parameter decoding
//!
//! Front ends accept needle and replacement either as hex strings
//! (binary mode) or as text with C-style escapes. Both decoders produce
//! the raw bytes handed to [`Needle`](crate::streaming::Needle) and
//! [`Replacer`](crate::engine::Replacer).

/// Parameter decoding errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("hex string is empty")]
    EmptyHex,
    #[error("hex string has odd length {0}")]
    OddHexLength(usize),
    #[error("invalid hex digit {digit:?} at position {position}")]
    InvalidHexDigit { position: usize, digit: char },
    #[error("unknown escape sequence \\{escape} at position {position}")]
    UnknownEscape { position: usize, escape: char },
    #[error("dangling backslash at end of input")]
    TrailingBackslash,
}

/// Decode a hex string such as `0x0D0A` or `cafe` into bytes
pub fn decode_hex(input: &str) -> Result<Vec<u8>, ParamError> {
    let (offset, digits) = match input.strip_prefix("0x") {
        Some(rest) => (2, rest),
        None => (0, input),
    };

    if digits.is_empty() {
        return Err(ParamError::EmptyHex);
    }
    if digits.len() % 2 != 0 {
        return Err(ParamError::OddHexLength(digits.len()));
    }

    let nibble = |position: usize, byte: u8| {
        char::from(byte)
            .to_digit(16)
            .map(|d| d as u8)
            .ok_or_else(|| ParamError::InvalidHexDigit {
                position: offset + position,
                digit: char::from(byte),
            })
    };

    digits
        .as_bytes()
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| -> Result<u8, ParamError> {
            Ok(nibble(2 * i, pair[0])? << 4 | nibble(2 * i + 1, pair[1])?)
        })
        .collect()
}

/// Expand `\0 \a \b \t \n \v \f \r \\` escape sequences
pub fn expand_escapes(input: &[u8]) -> Result<Vec<u8>, ParamError> {
    let mut out = Vec::with_capacity(input.len());
    let mut bytes = input.iter().copied().enumerate();

    while let Some((position, byte)) = bytes.next() {
        if byte != b'\\' {
            out.push(byte);
            continue;
        }
        let (_, escaped) = bytes.next().ok_or(ParamError::TrailingBackslash)?;
        out.push(match escaped {
            b'0' => 0x00,
            b'a' => 0x07,
            b'b' => 0x08,
            b't' => b'\t',
            b'n' => b'\n',
            b'v' => 0x0B,
            b'f' => 0x0C,
            b'r' => b'\r',
            b'\\' => b'\\',
            other => {
                return Err(ParamError::UnknownEscape {
                    position,
                    escape: char::from(other),
                })
            }
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        plain = { "cafe", &[0xCA, 0xFE] },
        prefixed = { "0x0D0A", &[0x0D, 0x0A] },
        mixed_case = { "aBcD", &[0xAB, 0xCD] },
        zero = { "00", &[0x00] },
    )]
    fn decode_hex_ok(input: &str, expected: &[u8]) {
        assert_eq!(decode_hex(input).unwrap(), expected);
    }

    #[test]
    fn test_decode_hex_errors() {
        assert_eq!(decode_hex(""), Err(ParamError::EmptyHex));
        assert_eq!(decode_hex("0x"), Err(ParamError::EmptyHex));
        assert_eq!(decode_hex("abc"), Err(ParamError::OddHexLength(3)));
        assert_eq!(
            decode_hex("0x0g"),
            Err(ParamError::InvalidHexDigit {
                position: 3,
                digit: 'g'
            })
        );
        // Only a lowercase prefix is recognized
        assert!(decode_hex("0X0a").is_err());
    }

    #[parameterized(
        none = { b"foo bar", b"foo bar" },
        newline_tab = { b"foo\\nbar\\tbaz", b"foo\nbar\tbaz" },
        backslash = { b"a\\\\b", b"a\\b" },
        controls = { b"\\0\\a\\b\\v\\f\\r", b"\x00\x07\x08\x0b\x0c\r" },
        empty = { b"", b"" },
    )]
    fn expand_escapes_ok(input: &[u8], expected: &[u8]) {
        assert_eq!(expand_escapes(input).unwrap(), expected);
    }

    #[test]
    fn test_expand_escapes_errors() {
        assert_eq!(expand_escapes(b"abc\\"), Err(ParamError::TrailingBackslash));
        assert_eq!(
            expand_escapes(b"a\\qb"),
            Err(ParamError::UnknownEscape {
                position: 1,
                escape: 'q'
            })
        );
        let message = expand_escapes(b"\\x").unwrap_err().to_string();
        assert!(message.contains("\\x"));
    }
}
