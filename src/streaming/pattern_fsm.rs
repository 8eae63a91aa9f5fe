//! Needle, compiled pattern and prefix function
//!
//! A [`Needle`] is what the caller searches for: bytes plus an optional
//! wildcard mask. [`Pattern`] is the needle compiled against a set of
//! options, and [`PrefixTable`] is the KMP failure function built from it.
//!
//! Comparison against input is per byte and O(1):
//! - ASCII-only case folding (`a`..`z` to `A`..`Z`)
//! - wildcard positions match any byte, CR/LF only when enabled

use log::{debug, log_enabled, Level};

use crate::config::{ReplaceOptions, MAX_PATTERN_LEN};
use crate::error::{ReplaceError, Result};

/// Needle construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NeedleError {
    #[error("search string (needle) must not be empty")]
    Empty,
    #[error("search string (needle) length {0} exceeds the allowable limit")]
    TooLong(usize),
    #[error("wildcard mask has {mask} entries for a needle of {needle} bytes")]
    MaskLength { needle: usize, mask: usize },
}

/// The byte sequence to search for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Needle {
    bytes: Vec<u8>,
    /// Empty when the needle has no wildcard positions
    wildcards: Vec<bool>,
}

impl Needle {
    /// Create a literal needle
    pub fn new(bytes: impl Into<Vec<u8>>) -> std::result::Result<Self, NeedleError> {
        let bytes = bytes.into();
        Self::check_len(bytes.len())?;
        Ok(Self {
            bytes,
            wildcards: Vec::new(),
        })
    }

    /// Create a needle with an explicit wildcard mask (true = matches any byte)
    pub fn with_wildcards(
        bytes: impl Into<Vec<u8>>,
        mask: Vec<bool>,
    ) -> std::result::Result<Self, NeedleError> {
        let bytes = bytes.into();
        Self::check_len(bytes.len())?;
        if mask.len() != bytes.len() {
            return Err(NeedleError::MaskLength {
                needle: bytes.len(),
                mask: mask.len(),
            });
        }
        let wildcards = if mask.iter().any(|&w| w) { mask } else { Vec::new() };
        Ok(Self { bytes, wildcards })
    }

    /// Create a needle where every occurrence of `wildcard` is a wildcard position
    pub fn with_wildcard_char(
        bytes: impl Into<Vec<u8>>,
        wildcard: u8,
    ) -> std::result::Result<Self, NeedleError> {
        let bytes = bytes.into();
        let mask = bytes.iter().map(|&b| b == wildcard).collect();
        Self::with_wildcards(bytes, mask)
    }

    fn check_len(len: usize) -> std::result::Result<(), NeedleError> {
        if len == 0 {
            Err(NeedleError::Empty)
        } else if len > MAX_PATTERN_LEN {
            Err(NeedleError::TooLong(len))
        } else {
            Ok(())
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false: construction rejects empty needles
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_wildcard(&self, index: usize) -> bool {
        self.wildcards.get(index).copied().unwrap_or(false)
    }

    pub fn has_wildcards(&self) -> bool {
        !self.wildcards.is_empty()
    }
}

/// A needle compiled for one matching pass
#[derive(Clone, Debug)]
pub struct Pattern {
    /// Needle bytes, upper-cased when matching case-insensitively
    bytes: Vec<u8>,
    wildcards: Vec<bool>,
    case_insensitive: bool,
    wildcard_matches_linebreaks: bool,
}

impl Pattern {
    /// Compile `needle` for the given options
    pub fn compile(needle: &Needle, options: &ReplaceOptions) -> Result<Self> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(needle.len())
            .map_err(|_| ReplaceError::Allocation {
                what: "pattern",
                requested: needle.len(),
            })?;
        if options.case_insensitive {
            bytes.extend(needle.as_bytes().iter().map(u8::to_ascii_uppercase));
        } else {
            bytes.extend_from_slice(needle.as_bytes());
        }

        Ok(Self {
            bytes,
            wildcards: needle.wildcards.clone(),
            case_insensitive: options.case_insensitive,
            wildcard_matches_linebreaks: options.wildcard_matches_linebreaks,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false: needles are never empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn has_wildcards(&self) -> bool {
        !self.wildcards.is_empty()
    }

    #[inline]
    fn is_wildcard(&self, index: usize) -> bool {
        !self.wildcards.is_empty() && self.wildcards[index]
    }

    /// Check whether input `byte` matches needle position `index`
    #[inline]
    pub fn matches_at(&self, index: usize, byte: u8) -> bool {
        if self.is_wildcard(index) {
            self.wildcard_matches_linebreaks || (byte != b'\r' && byte != b'\n')
        } else if self.case_insensitive {
            byte.to_ascii_uppercase() == self.bytes[index]
        } else {
            byte == self.bytes[index]
        }
    }

    /// Check whether `input` matches the needle prefix of the same length
    ///
    /// The first byte is tested on its own before the rest, so a
    /// mismatch at position 0 costs one comparison.
    pub fn matches_prefix<I>(&self, input: I) -> bool
    where
        I: IntoIterator<Item = u8>,
    {
        let mut input = input.into_iter();
        match input.next() {
            None => return true,
            Some(first) => {
                if !self.matches_at(0, first) {
                    return false;
                }
            }
        }
        let mut index = 1;
        for byte in input {
            if index >= self.len() || !self.matches_at(index, byte) {
                return false;
            }
            index += 1;
        }
        true
    }

    /// Positional equality of two needle positions, used for the prefix table
    ///
    /// Two wildcards are equal; a wildcard never equals a literal byte.
    #[inline]
    fn same_at(&self, a: usize, b: usize) -> bool {
        match (self.is_wildcard(a), self.is_wildcard(b)) {
            (true, true) => true,
            (false, false) => self.bytes[a] == self.bytes[b],
            _ => false,
        }
    }
}

/// KMP failure function
///
/// `get(i)` is the length of the longest proper border of the first `i`
/// needle bytes, with `get(0) == -1`.
#[derive(Clone, Debug)]
pub struct PrefixTable {
    prefix: Vec<isize>,
}

impl PrefixTable {
    /// Build the table in O(needle length)
    pub fn build(pattern: &Pattern) -> Result<Self> {
        let len = pattern.len();
        let mut prefix: Vec<isize> = Vec::new();
        prefix
            .try_reserve_exact(len + 1)
            .map_err(|_| ReplaceError::Allocation {
                what: "prefix table",
                requested: len + 1,
            })?;

        prefix.push(-1);
        let mut border: isize = -1;
        for pos in 0..len {
            while border >= 0 && !pattern.same_at(pos, border as usize) {
                border = prefix[border as usize];
            }
            border += 1;
            prefix.push(border);
        }

        if log_enabled!(Level::Debug) {
            debug!("prefix: {:?}", &prefix[..len]);
        }

        Ok(Self { prefix })
    }

    /// Raw table entry
    pub fn get(&self, index: usize) -> isize {
        self.prefix[index]
    }

    /// Border to fall back to after a mismatch with `matched` bytes held, None at 0
    #[inline]
    pub fn fallback(&self, matched: usize) -> Option<usize> {
        usize::try_from(self.prefix[matched]).ok()
    }

    /// Number of entries (needle length + 1)
    pub fn len(&self) -> usize {
        self.prefix.len()
    }

    /// Always false: a table has at least the sentinel entry
    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_for(needle: &[u8]) -> Vec<isize> {
        let pattern = Pattern::compile(&Needle::new(needle).unwrap(), &ReplaceOptions::default())
            .unwrap();
        let table = PrefixTable::build(&pattern).unwrap();
        (0..table.len()).map(|i| table.get(i)).collect()
    }

    #[test]
    fn test_prefix_table_classic() {
        assert_eq!(table_for(b"ababaa"), vec![-1, 0, 0, 1, 2, 3, 1]);
        assert_eq!(table_for(b"aaaa"), vec![-1, 0, 1, 2, 3]);
        assert_eq!(table_for(b"abcabd"), vec![-1, 0, 0, 0, 1, 2, 0]);
        assert_eq!(table_for(b"x"), vec![-1, 0]);
    }

    #[test]
    fn test_prefix_table_invariants() {
        let needles: [&[u8]; 4] = [b"bcbbab", b"kokos", b"abacabadabacaba", b"LTs3kx"];
        for needle in needles {
            let table = table_for(needle);
            assert_eq!(table.len(), needle.len() + 1);
            assert_eq!(table[0], -1);
            for (i, &entry) in table.iter().enumerate().skip(1) {
                assert!(entry >= 0 && (entry as usize) < i, "table[{}] = {}", i, entry);
            }
        }
    }

    #[test]
    fn test_fallback() {
        let pattern =
            Pattern::compile(&Needle::new(&b"aab"[..]).unwrap(), &ReplaceOptions::default())
                .unwrap();
        let table = PrefixTable::build(&pattern).unwrap();
        assert_eq!(table.fallback(0), None);
        assert_eq!(table.fallback(2), Some(1));
    }

    #[test]
    fn test_case_insensitive_folds_ascii_only() {
        let options = ReplaceOptions {
            case_insensitive: true,
            ..Default::default()
        };
        let pattern = Pattern::compile(&Needle::new(&b"a\xe4Z"[..]).unwrap(), &options).unwrap();
        assert!(pattern.matches_at(0, b'A'));
        assert!(pattern.matches_at(0, b'a'));
        assert!(pattern.matches_at(1, 0xE4));
        assert!(!pattern.matches_at(1, 0xC4));
        assert!(pattern.matches_at(2, b'z'));
        assert!(!pattern.matches_at(2, b'['));
    }

    #[test]
    fn test_case_sensitive_by_default() {
        let pattern =
            Pattern::compile(&Needle::new(&b"abc"[..]).unwrap(), &ReplaceOptions::default())
                .unwrap();
        assert!(pattern.matches_at(0, b'a'));
        assert!(!pattern.matches_at(0, b'A'));
    }

    #[test]
    fn test_wildcard_excludes_linebreaks_by_default() {
        let needle = Needle::with_wildcard_char(&b"a?c"[..], b'?').unwrap();
        let pattern = Pattern::compile(&needle, &ReplaceOptions::default()).unwrap();
        assert!(pattern.matches_at(1, b'X'));
        assert!(pattern.matches_at(1, b'?'));
        assert!(!pattern.matches_at(1, b'\n'));
        assert!(!pattern.matches_at(1, b'\r'));

        let options = ReplaceOptions {
            wildcard_matches_linebreaks: true,
            ..Default::default()
        };
        let pattern = Pattern::compile(&needle, &options).unwrap();
        assert!(pattern.matches_at(1, b'\n'));
    }

    #[test]
    fn test_matches_prefix_with_leading_wildcard() {
        let needle = Needle::with_wildcards(&b"?bc"[..], vec![true, false, false]).unwrap();
        let pattern = Pattern::compile(&needle, &ReplaceOptions::default()).unwrap();
        assert!(pattern.matches_prefix(b"zb".iter().copied()));
        assert!(pattern.matches_prefix(b"xbc".iter().copied()));
        assert!(!pattern.matches_prefix(b"\nb".iter().copied()));
        assert!(!pattern.matches_prefix(b"xbcd".iter().copied()));
        assert!(pattern.matches_prefix(std::iter::empty()));
    }

    #[test]
    fn test_wildcard_never_borders_literal() {
        // "a?" vs "aa": with a literal second byte the border would be 1
        let needle = Needle::with_wildcard_char(&b"a?a"[..], b'?').unwrap();
        let pattern = Pattern::compile(&needle, &ReplaceOptions::default()).unwrap();
        let table = PrefixTable::build(&pattern).unwrap();
        assert_eq!(table.get(2), 0);
        assert_eq!(table.get(3), 1);
    }

    #[test]
    fn test_needle_validation() {
        assert_eq!(Needle::new(Vec::<u8>::new()), Err(NeedleError::Empty));
        assert_eq!(
            Needle::with_wildcards(&b"ab"[..], vec![true]),
            Err(NeedleError::MaskLength { needle: 2, mask: 1 })
        );
        let literal = Needle::with_wildcards(&b"ab"[..], vec![false, false]).unwrap();
        assert!(!literal.has_wildcards());
        assert!(!literal.is_wildcard(0));
    }
}
