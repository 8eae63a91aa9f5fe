//! Byte-level I/O collaborators
//!
//! The engine pulls one byte at a time from a [`ByteSource`] and pushes
//! one byte at a time into a [`ByteSink`]. Buffering is the adapters' job.

pub mod sink;
pub mod source;

pub use sink::{ByteSink, CountingSink, SinkItem, VecSink, WriterSink};
pub use source::{ByteSource, ReadOutcome, ReaderSource, SliceSource};

/// Adapter buffer size
pub const IO_BUFFER_SIZE: usize = 4096;
