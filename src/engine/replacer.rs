//! Streaming Search & Replace
//!
//! This driver does NOT accumulate the input.
//! It reads one byte, feeds the matcher, and forgets it.
//! Memory usage is O(needle + replacement) regardless of input size.

use std::io;

use log::{debug, warn};
use serde::Serialize;

use super::{Advance, KmpMatcher, Matcher, Release};
use crate::cancel::AbortFlag;
use crate::config::{ReplaceOptions, MAX_PATTERN_LEN};
use crate::error::{ReplaceError, Result};
use crate::io::{ByteSink, ByteSource, ReadOutcome, SinkItem, SliceSource, VecSink};
use crate::streaming::{LineBreakNormalizer, Needle};
use crate::telemetry::{self, EventType, Logger};

/// Outcome of a completed pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaceSummary {
    /// Occurrences replaced (or found, in a dry run)
    pub replacements: u64,
    /// Raw input bytes consumed
    pub bytes_read: u64,
    /// Bytes seen by the matcher, after line break normalization
    pub bytes_scanned: u64,
    /// Matching stopped after the first occurrence
    pub stopped_after_first: bool,
}

/// A configured search-and-replace operation, reusable across passes
#[derive(Debug, Clone)]
pub struct Replacer {
    needle: Needle,
    replacement: Vec<u8>,
    options: ReplaceOptions,
}

impl Replacer {
    /// Create a replacer; an empty replacement deletes every match
    pub fn new(
        needle: Needle,
        replacement: impl Into<Vec<u8>>,
        options: ReplaceOptions,
    ) -> Result<Self> {
        let replacement = replacement.into();
        check_replacement_len(replacement.len())?;

        Ok(Self {
            needle,
            replacement,
            options,
        })
    }

    pub fn needle(&self) -> &Needle {
        &self.needle
    }

    pub fn replacement(&self) -> &[u8] {
        &self.replacement
    }

    pub fn options(&self) -> &ReplaceOptions {
        &self.options
    }

    /// Run one pass from `source` to `sink` with the KMP matcher
    pub fn run<S, W>(
        &self,
        source: &mut S,
        sink: &mut W,
        abort: &AbortFlag,
        logger: Option<&mut dyn Logger>,
    ) -> Result<ReplaceSummary>
    where
        S: ByteSource + ?Sized,
        W: ByteSink + ?Sized,
    {
        self.run_with::<KmpMatcher, S, W>(source, sink, abort, logger)
    }

    /// Run one pass with a chosen matcher
    pub fn run_with<M, S, W>(
        &self,
        source: &mut S,
        sink: &mut W,
        abort: &AbortFlag,
        logger: Option<&mut dyn Logger>,
    ) -> Result<ReplaceSummary>
    where
        M: Matcher,
        S: ByteSource + ?Sized,
        W: ByteSink + ?Sized,
    {
        let matcher = M::compile(&self.needle, &self.options)?;
        debug!(
            "search & replace: needle {} bytes, replacement {} bytes, {:?}",
            self.needle.len(),
            self.replacement.len(),
            self.options
        );

        let mut pass = Pass {
            matcher,
            sink,
            logger,
            replacer: self,
            abort,
            summary: ReplaceSummary::default(),
        };
        pass.execute(source)
    }

    /// Convenience: run over an in-memory haystack, collecting the output
    pub fn replace_slice(&self, haystack: &[u8]) -> Result<(Vec<u8>, ReplaceSummary)> {
        let mut source = SliceSource::new(haystack);
        let mut sink = VecSink::new();
        let summary = self.run(&mut source, &mut sink, &AbortFlag::new(), None)?;
        Ok((sink.into_inner(), summary))
    }
}

fn check_replacement_len(len: usize) -> Result<()> {
    if len > MAX_PATTERN_LEN {
        return Err(ReplaceError::InvalidParameter(format!(
            "replacement length {} exceeds the allowable limit",
            len
        )));
    }
    Ok(())
}

/// State of one pass
struct Pass<'a, 'l, M, W: ?Sized> {
    matcher: M,
    sink: &'a mut W,
    logger: Option<&'l mut dyn Logger>,
    replacer: &'a Replacer,
    abort: &'a AbortFlag,
    summary: ReplaceSummary,
}

impl<M, W> Pass<'_, '_, M, W>
where
    M: Matcher,
    W: ByteSink + ?Sized,
{
    fn options(&self) -> &ReplaceOptions {
        &self.replacer.options
    }

    fn sync(&self) -> bool {
        self.replacer.options.force_sync
    }

    fn execute<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<ReplaceSummary> {
        let sync = self.sync();
        let mut normalizer = self
            .options()
            .normalize_linebreaks
            .then(LineBreakNormalizer::new);
        let mut read_error: Option<io::Error> = None;

        // Process all available input data
        loop {
            let byte = match self.next_byte(source, normalizer.as_mut()) {
                Ok(Some(byte)) => byte,
                Ok(None) => {
                    self.check_abort()?;
                    continue;
                }
                Err(ReadOutcome::EndOfStream) => break,
                Err(ReadOutcome::Error(e)) => {
                    read_error = Some(e);
                    break;
                }
            };
            self.summary.bytes_scanned += 1;

            let step = self.matcher.advance(byte, &mut *self.sink, sync);
            if step.map_err(|e| self.write_failed(e))? == Advance::Matched {
                self.on_match()?;
                if self.options().replace_once {
                    self.summary.stopped_after_first = true;
                    if self.options().verbose {
                        telemetry::ReplaceEvent::new(EventType::StoppedAfterFirst)
                            .emit(&mut self.logger);
                    }
                    self.check_abort()?;
                    break;
                }
            }

            self.check_abort()?;
        }

        // Write any pending data
        let flushed = self.matcher.release(Release::Emit, &mut *self.sink, sync);
        flushed.map_err(|e| self.write_failed(e))?;
        self.check_abort()?;

        // Transfer any input not processed yet
        if self.summary.stopped_after_first {
            loop {
                let byte = match self.next_byte(source, normalizer.as_mut()) {
                    Ok(Some(byte)) => byte,
                    Ok(None) => {
                        self.check_abort()?;
                        continue;
                    }
                    Err(ReadOutcome::EndOfStream) => break,
                    Err(ReadOutcome::Error(e)) => {
                        read_error = Some(e);
                        break;
                    }
                };
                let written = self.sink.write(SinkItem::Byte(byte), sync);
                written.map_err(|e| self.write_failed(e))?;
                self.check_abort()?;
            }
        }
        self.check_abort()?;

        if let Some(source) = read_error {
            return Err(self.read_failed(source));
        }

        // Flush output buffers
        let flushed = self.sink.write(SinkItem::Flush, sync);
        flushed.map_err(|e| self.write_failed(e))?;

        if self.options().verbose {
            telemetry::event_summary(self.summary.replacements, self.options().dry_run)
                .emit(&mut self.logger);
        }

        Ok(self.summary)
    }

    /// Read one byte and pass it through the line break filter
    ///
    /// `Ok(None)` means the byte was absorbed by the filter.
    fn next_byte<S: ByteSource + ?Sized>(
        &mut self,
        source: &mut S,
        normalizer: Option<&mut LineBreakNormalizer>,
    ) -> std::result::Result<Option<u8>, ReadOutcome> {
        let byte = source.read_byte()?;
        self.summary.bytes_read += 1;
        Ok(match normalizer {
            Some(normalizer) => normalizer.feed(byte),
            None => Some(byte),
        })
    }

    /// Replace (or, in a dry run, keep) the held match
    fn on_match(&mut self) -> Result<()> {
        let sync = self.sync();
        let dry_run = self.options().dry_run;
        self.summary.replacements += 1;

        if self.options().reports_matches() {
            let offset = self.summary.bytes_scanned - self.replacer.needle.len() as u64;
            telemetry::event_match(offset, dry_run).emit(&mut self.logger);
        }

        let written = if dry_run {
            self.matcher.release(Release::Emit, &mut *self.sink, sync)
        } else {
            self.matcher
                .release(Release::Discard, &mut *self.sink, sync)
                .and_then(|()| {
                    self.sink
                        .write_all_bytes(&self.replacer.replacement, sync)
                })
        };
        written.map_err(|e| self.write_failed(e))
    }

    /// Stop promptly if cancellation was requested
    ///
    /// Held bytes and the sink are flushed on a best-effort basis.
    fn check_abort(&mut self) -> Result<()> {
        if !self.abort.is_aborted() {
            return Ok(());
        }

        let sync = self.sync();
        let flushed = self
            .matcher
            .release(Release::Emit, &mut *self.sink, sync)
            .and_then(|()| self.sink.write(SinkItem::Flush, sync));
        if let Err(e) = flushed {
            warn!("flush after abort failed: {}", e);
        }

        telemetry::ReplaceEvent::new(EventType::Aborted)
            .with_count(self.summary.replacements)
            .emit(&mut self.logger);
        Err(ReplaceError::Aborted {
            position: self.summary.bytes_read,
            replacements: self.summary.replacements,
        })
    }

    fn write_failed(&mut self, source: io::Error) -> ReplaceError {
        telemetry::event_failure(EventType::WriteFailed, &source.to_string())
            .emit(&mut self.logger);
        ReplaceError::Write {
            position: self.summary.bytes_read,
            source,
        }
    }

    /// Held bytes were already written; push them out before reporting
    fn read_failed(&mut self, source: io::Error) -> ReplaceError {
        let sync = self.sync();
        if let Err(e) = self.sink.write(SinkItem::Flush, sync) {
            warn!("flush after read failure failed: {}", e);
        }
        telemetry::event_failure(EventType::ReadFailed, &source.to_string())
            .emit(&mut self.logger);
        ReplaceError::Read {
            position: self.summary.bytes_read,
            source,
        }
    }
}
