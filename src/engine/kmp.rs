//! Backtracking-cursor matcher
//!
//! The cursor is the number of held bytes: the longest suffix of the input
//! seen so far that matches a needle prefix. On mismatch the cursor falls
//! back along the prefix table and the bytes that fall off the front are
//! written out. Total work is linear in the input length.
//!
//! Held bytes are the real input bytes, not needle bytes, so case folding
//! and wildcards never change what is written for non-matching input.

use std::io;

use log::trace;

use super::{Advance, Matcher, Release};
use crate::config::ReplaceOptions;
use crate::error::Result;
use crate::io::{ByteSink, SinkItem};
use crate::streaming::{Needle, Pattern, PrefixTable, RingBuffer};

/// KMP matcher with held-byte buffer
#[derive(Debug)]
pub struct KmpMatcher {
    pattern: Pattern,
    table: PrefixTable,
    held: RingBuffer,
}

impl KmpMatcher {
    /// Length of the held suffix to keep after a mismatch, None when nothing survives
    ///
    /// Literal needles read it from the prefix table. With wildcards, the
    /// table built from needle bytes alone can miss borders, so shorter
    /// suffixes of the held bytes are verified directly, longest first.
    fn fallback(&self, matched: usize) -> Option<usize> {
        if !self.pattern.has_wildcards() {
            return self.table.fallback(matched);
        }
        if matched == 0 {
            return None;
        }
        (0..matched).rev().find(|&border| {
            self.pattern
                .matches_prefix((matched - border..matched).filter_map(|i| self.held.get(i)))
        })
    }
}

impl Matcher for KmpMatcher {
    fn compile(needle: &Needle, options: &ReplaceOptions) -> Result<Self> {
        let pattern = Pattern::compile(needle, options)?;
        let table = PrefixTable::build(&pattern)?;
        let held = RingBuffer::with_capacity(pattern.len())?;
        Ok(Self {
            pattern,
            table,
            held,
        })
    }

    fn advance<W: ByteSink + ?Sized>(
        &mut self,
        byte: u8,
        sink: &mut W,
        sync: bool,
    ) -> io::Result<Advance> {
        let mut matched = self.held.len();
        debug_assert!(matched < self.pattern.len(), "full match was not released");

        // If the held prefix cannot be extended, search for a shorter one
        while !self.pattern.matches_at(matched, byte) {
            match self.fallback(matched) {
                Some(border) => {
                    trace!("mismatch: {} --> {}", matched, border);
                    self.held.release_front(matched - border, sink, sync)?;
                    matched = border;
                }
                None => {
                    sink.write(SinkItem::Byte(byte), sync)?;
                    return Ok(Advance::Pending);
                }
            }
        }

        self.held.push(byte);
        if self.held.len() == self.pattern.len() {
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
            Release::Emit => self.held.release_all(sink, sync),
            Release::Discard => {
                self.held.clear();
                Ok(())
            }
        }
    }

    fn held(&self) -> usize {
        self.held.len()
    }

    fn held_capacity(&self) -> usize {
        self.held.capacity()
    }
}
