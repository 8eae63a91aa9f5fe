//! Matching engine
//!
//! A [`Matcher`] consumes input one byte at a time, writing out every byte
//! that can no longer be part of a match and holding the rest. The
//! [`Replacer`] drives a matcher from a source to a sink and decides what
//! happens to held bytes on a full match.
//!
//! Two matchers are provided:
//! - [`KmpMatcher`]: backtracking cursor over a prefix table, linear in the input
//! - [`WindowMatcher`]: sliding window compared against the needle on every byte,
//!   kept as a simple reference implementation

pub mod kmp;
pub mod replacer;
pub mod window;

use std::io;

use crate::config::ReplaceOptions;
use crate::error::Result;
use crate::io::ByteSink;
use crate::streaming::Needle;

pub use kmp::KmpMatcher;
pub use replacer::{ReplaceSummary, Replacer};
pub use window::WindowMatcher;

/// Outcome of feeding one byte to a matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// No full match yet
    Pending,
    /// The held bytes now form a full match; the caller must release them
    Matched,
}

/// What to do with held bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Write them out unchanged (no match, dry run, end of input)
    Emit,
    /// Drop them (a replacement takes their place)
    Discard,
}

/// Byte-at-a-time streaming matcher
pub trait Matcher: Sized {
    /// Prepare a matcher for one pass; scratch memory is reserved here
    fn compile(needle: &Needle, options: &ReplaceOptions) -> Result<Self>;

    /// Feed one input byte
    ///
    /// Bytes that provably cannot belong to a match are written to `sink`
    /// in input order. Only sink failures are reported.
    fn advance<W: ByteSink + ?Sized>(
        &mut self,
        byte: u8,
        sink: &mut W,
        sync: bool,
    ) -> io::Result<Advance>;

    /// Emit or discard every held byte, resetting the match state
    fn release<W: ByteSink + ?Sized>(
        &mut self,
        mode: Release,
        sink: &mut W,
        sync: bool,
    ) -> io::Result<()>;

    /// Number of bytes currently held back
    fn held(&self) -> usize;

    /// Upper bound on held bytes (the needle length)
    fn held_capacity(&self) -> usize;
}
