//! Line Break Normalizer
//!
//! Two-byte line terminators (CRLF, LFCR) can split across reads, so
//! the filter carries one byte of state between calls:
//! - CRLF / LFCR collapse into a single LF
//! - a lone CR or LF becomes LF
//! - any other byte passes through and resets the state

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// Pre-filter applied to input bytes before they reach the matcher
#[derive(Debug, Default, Clone)]
pub struct LineBreakNormalizer {
    /// Line break byte that opened the current terminator, if any
    last_break: Option<u8>,
}

impl LineBreakNormalizer {
    /// Create a new normalizer
    pub fn new() -> Self {
        Self { last_break: None }
    }

    /// Feed one input byte; returns the byte to pass on, if any
    #[inline]
    pub fn feed(&mut self, byte: u8) -> Option<u8> {
        match byte {
            CR | LF => match self.last_break {
                // Second half of CRLF / LFCR
                Some(prev) if prev != byte => {
                    self.last_break = None;
                    None
                }
                _ => {
                    self.last_break = Some(byte);
                    Some(LF)
                }
            },
            _ => {
                self.last_break = None;
                Some(byte)
            }
        }
    }

    /// Forget any half-seen terminator
    pub fn reset(&mut self) {
        self.last_break = None;
    }
}

/// Normalize a whole slice, for callers that already hold the bytes
pub fn normalize(input: &[u8]) -> Vec<u8> {
    let mut normalizer = LineBreakNormalizer::new();
    input.iter().filter_map(|&b| normalizer.feed(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        crlf = { b"a\r\nb", b"a\nb" },
        lfcr = { b"a\n\rb", b"a\nb" },
        lone_cr = { b"a\rb", b"a\nb" },
        lone_lf = { b"a\nb", b"a\nb" },
        double_crlf = { b"\r\n\r\n", b"\n\n" },
        cr_cr = { b"\r\r", b"\n\n" },
        lf_lf = { b"\n\n", b"\n\n" },
        crlfcr = { b"\r\n\r", b"\n\n" },
        trailing_cr = { b"end\r", b"end\n" },
        no_breaks = { b"plain text", b"plain text" },
        empty = { b"", b"" },
    )]
    fn normalize_cases(input: &[u8], expected: &[u8]) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn test_terminator_split_across_feeds() {
        let mut normalizer = LineBreakNormalizer::new();
        assert_eq!(normalizer.feed(b'x'), Some(b'x'));
        assert_eq!(normalizer.feed(CR), Some(LF));
        // next read starts with the LF of the same CRLF
        assert_eq!(normalizer.feed(LF), None);
        assert_eq!(normalizer.feed(b'y'), Some(b'y'));
    }

    #[test]
    fn test_other_byte_resets_state() {
        let mut normalizer = LineBreakNormalizer::new();
        assert_eq!(normalizer.feed(CR), Some(LF));
        assert_eq!(normalizer.feed(b' '), Some(b' '));
        assert_eq!(normalizer.feed(LF), Some(LF));
    }

    #[test]
    fn test_reset() {
        let mut normalizer = LineBreakNormalizer::new();
        normalizer.feed(CR);
        normalizer.reset();
        assert_eq!(normalizer.feed(LF), Some(LF));
    }
}
