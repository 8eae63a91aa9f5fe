//! Streaming find-and-replace for byte streams
//!
//! Reads input one byte at a time, replaces every occurrence of a single
//! needle and writes the result, holding back at most one needle length
//! of input. Input size never affects memory use.
//!
//! ```
//! use streplace::{Needle, ReplaceOptions, Replacer};
//!
//! let replacer = Replacer::new(Needle::new("kokos").unwrap(), "X", ReplaceOptions::default()).unwrap();
//! let (output, summary) = replacer.replace_slice(b"kokokos kokof").unwrap();
//! assert_eq!(output, b"koX kokof");
//! assert_eq!(summary.replacements, 1);
//! ```

pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod io;
pub mod params;
pub mod selftest;
pub mod streaming;
pub mod telemetry;

pub use cancel::AbortFlag;
pub use config::{ConfigError, ReplaceOptions, MAX_PATTERN_LEN};
pub use engine::{KmpMatcher, Matcher, ReplaceSummary, Replacer, WindowMatcher};
pub use error::{ReplaceError, Result};
pub use io::{ByteSink, ByteSource, ReadOutcome, SinkItem};
pub use streaming::{Needle, NeedleError};
pub use telemetry::{LogFacade, Logger};

/// Run a single search-and-replace pass from `source` to `sink`
///
/// Shorthand for building a [`Replacer`] and calling [`Replacer::run`].
pub fn search_and_replace<S, W>(
    source: &mut S,
    sink: &mut W,
    needle: &[u8],
    replacement: &[u8],
    options: &ReplaceOptions,
    abort: &AbortFlag,
    logger: Option<&mut dyn Logger>,
) -> Result<ReplaceSummary>
where
    S: ByteSource + ?Sized,
    W: ByteSink + ?Sized,
{
    let needle = Needle::new(needle)?;
    Replacer::new(needle, replacement, options.clone())?.run(source, sink, abort, logger)
}
