//! Sliding-window matcher
//!
//! Holds the input suffix that is still a viable match start and
//! re-compares it against the needle on every byte. Worst case is
//! O(input length x needle length); the first-byte check in
//! [`Pattern::matches_prefix`] makes the common mismatch cheap.
//!
//! Output is byte-identical to [`KmpMatcher`](super::KmpMatcher). It is kept as the
//! straightforward reference the faster matcher is tested against.

use std::io;

use super::{Advance, Matcher, Release};
use crate::config::ReplaceOptions;
use crate::error::Result;
use crate::io::{ByteSink, SinkItem};
use crate::streaming::{Needle, Pattern, RingBuffer};

/// Ring-buffer matcher of width `needle_len`
#[derive(Debug)]
pub struct WindowMatcher {
    pattern: Pattern,
    window: RingBuffer,
}

impl Matcher for WindowMatcher {
    fn compile(needle: &Needle, options: &ReplaceOptions) -> Result<Self> {
        let pattern = Pattern::compile(needle, options)?;
        let window = RingBuffer::with_capacity(pattern.len())?;
        Ok(Self { pattern, window })
    }

    fn advance<W: ByteSink + ?Sized>(
        &mut self,
        byte: u8,
        sink: &mut W,
        sync: bool,
    ) -> io::Result<Advance> {
        if let Some(evicted) = self.window.push(byte) {
            sink.write(SinkItem::Byte(evicted), sync)?;
        }

        // Release bytes that cannot start a match any more
        while !self.window.is_empty() && !self.pattern.matches_prefix(self.window.iter()) {
            self.window.release_front(1, sink, sync)?;
        }

        if self.window.is_full() {
            Ok(Advance::Matched)
        } else {
            Ok(Advance::Pending)
        }
    }

    fn release<W: ByteSink + ?Sized>(
        &mut self,
        mode: Release,
        sink: &mut W,
        sync: bool,
    ) -> io::Result<()> {
        match mode {
            Release::Emit => self.window.release_all(sink, sync),
            Release::Discard => {
                self.window.clear();
                Ok(())
            }
        }
    }

    fn held(&self) -> usize {
        self.window.len()
    }

    fn held_capacity(&self) -> usize {
        self.window.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::VecSink;

    fn matches_in(needle: Needle, input: &[u8]) -> Vec<usize> {
        let mut matcher = WindowMatcher::compile(&needle, &ReplaceOptions::default()).unwrap();
        let mut sink = VecSink::new();
        let mut ends = Vec::new();
        for (i, &b) in input.iter().enumerate() {
            if matcher.advance(b, &mut sink, false).unwrap() == Advance::Matched {
                ends.push(i + 1);
                matcher.release(Release::Emit, &mut sink, false).unwrap();
            }
        }
        matcher.release(Release::Emit, &mut sink, false).unwrap();
        assert_eq!(sink.as_bytes(), input, "emitting every held byte must reproduce input");
        ends
    }

    #[test]
    fn test_non_overlapping_matches() {
        assert_eq!(matches_in(Needle::new("aa").unwrap(), b"aaaaa"), vec![2, 4]);
        assert_eq!(matches_in(Needle::new("ab").unwrap(), b"aab"), vec![3]);
    }

    #[test]
    fn test_leading_wildcard_is_not_skipped() {
        let needle = Needle::with_wildcard_char("?bc", b'?').unwrap();
        assert_eq!(matches_in(needle, b"bbc abc"), vec![3, 7]);
    }

    #[test]
    fn test_window_never_exceeds_needle() {
        let mut matcher =
            WindowMatcher::compile(&Needle::new("xyz").unwrap(), &ReplaceOptions::default())
                .unwrap();
        let mut sink = VecSink::new();
        for &b in b"xyxyxyxxxyy".iter().cycle().take(500) {
            matcher.advance(b, &mut sink, false).unwrap();
            assert!(matcher.held() < matcher.held_capacity());
        }
    }
}
