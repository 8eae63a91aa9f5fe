//! Push-based byte sinks

use std::io::{self, ErrorKind, Write};

use super::IO_BUFFER_SIZE;

/// One unit pushed into a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkItem {
    /// A data byte
    Byte(u8),
    /// End of output: force buffered bytes out
    Flush,
}

/// A sink of bytes, written one at a time
///
/// `sync` asks the sink to push each physical write through to storage;
/// the engine only passes it along.
pub trait ByteSink {
    fn write(&mut self, item: SinkItem, sync: bool) -> io::Result<()>;

    /// Write a run of data bytes
    fn write_all_bytes(&mut self, bytes: &[u8], sync: bool) -> io::Result<()> {
        for &byte in bytes {
            self.write(SinkItem::Byte(byte), sync)?;
        }
        Ok(())
    }
}

impl<W: ByteSink + ?Sized> ByteSink for &mut W {
    fn write(&mut self, item: SinkItem, sync: bool) -> io::Result<()> {
        (**self).write(item, sync)
    }
}

/// In-memory sink
///
/// With a capacity limit, writes past the limit fail, which is how
/// tests exercise the engine's write-failure path.
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    buffer: Vec<u8>,
    limit: Option<usize>,
    flushed: Option<usize>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that refuses to hold more than `limit` bytes
    pub fn with_limit(limit: usize) -> Self {
        Self {
            buffer: Vec::new(),
            limit: Some(limit),
            flushed: None,
        }
    }

    /// Everything written so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Length at the last flush, if the sink was ever flushed
    pub fn flushed(&self) -> Option<usize> {
        self.flushed
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

impl ByteSink for VecSink {
    fn write(&mut self, item: SinkItem, _sync: bool) -> io::Result<()> {
        match item {
            SinkItem::Byte(byte) => {
                if self.limit.is_some_and(|limit| self.buffer.len() >= limit) {
                    return Err(io::Error::new(ErrorKind::WriteZero, "output buffer is full"));
                }
                self.buffer.push(byte);
            }
            SinkItem::Flush => self.flushed = Some(self.buffer.len()),
        }
        Ok(())
    }
}

/// Discards data, keeps count
#[derive(Debug, Default, Clone, Copy)]
pub struct CountingSink {
    pub bytes: u64,
    pub flushes: u64,
}

impl ByteSink for CountingSink {
    fn write(&mut self, item: SinkItem, _sync: bool) -> io::Result<()> {
        match item {
            SinkItem::Byte(_) => self.bytes += 1,
            SinkItem::Flush => self.flushes += 1,
        }
        Ok(())
    }
}

/// Buffered adapter over any [`Write`]
///
/// Bytes are collected and written out when the buffer fills up or a
/// flush item arrives. With `sync`, the inner writer is flushed after
/// every physical write.
pub struct WriterSink<W: Write> {
    inner: W,
    buffer: Vec<u8>,
    capacity: usize,
}

impl<W: Write> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        Self::with_capacity(IO_BUFFER_SIZE, inner)
    }

    pub fn with_capacity(capacity: usize, inner: W) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner,
            buffer: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Bytes buffered but not yet written
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Give back the wrapped writer; unflushed bytes are lost
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn write_out(&mut self, sync: bool) -> io::Result<()> {
        if !self.buffer.is_empty() {
            self.inner.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        if sync {
            self.inner.flush()?;
        }
        Ok(())
    }
}

impl<W: Write> ByteSink for WriterSink<W> {
    fn write(&mut self, item: SinkItem, sync: bool) -> io::Result<()> {
        match item {
            SinkItem::Byte(byte) => {
                self.buffer.push(byte);
                if self.buffer.len() >= self.capacity {
                    self.write_out(sync)?;
                }
                Ok(())
            }
            SinkItem::Flush => {
                self.write_out(false)?;
                self.inner.flush()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_flush_watermark() {
        let mut sink = VecSink::new();
        sink.write_all_bytes(b"abc", false).unwrap();
        assert_eq!(sink.flushed(), None);
        sink.write(SinkItem::Flush, false).unwrap();
        sink.write(SinkItem::Byte(b'd'), false).unwrap();
        assert_eq!(sink.flushed(), Some(3));
        assert_eq!(sink.as_bytes(), b"abcd");
    }

    #[test]
    fn test_vec_sink_limit() {
        let mut sink = VecSink::with_limit(2);
        assert!(sink.write_all_bytes(b"ab", false).is_ok());
        let err = sink.write(SinkItem::Byte(b'c'), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WriteZero);
        assert!(sink.write(SinkItem::Flush, false).is_ok());
    }

    #[test]
    fn test_writer_sink_buffers_until_full() {
        let mut sink = WriterSink::with_capacity(4, Vec::new());
        sink.write_all_bytes(b"abc", false).unwrap();
        assert!(sink.get_ref().is_empty());
        assert_eq!(sink.pending(), 3);

        sink.write(SinkItem::Byte(b'd'), false).unwrap();
        assert_eq!(sink.get_ref().as_slice(), b"abcd");
        assert_eq!(sink.pending(), 0);

        sink.write(SinkItem::Byte(b'e'), false).unwrap();
        sink.write(SinkItem::Flush, false).unwrap();
        assert_eq!(sink.into_inner(), b"abcde");
    }

    /// Writer that accepts a fixed number of bytes, then fails
    struct Limited {
        left: usize,
        flushes: usize,
    }

    impl Write for Limited {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.left == 0 {
                return Err(io::Error::new(ErrorKind::Other, "device full"));
            }
            let n = buf.len().min(self.left);
            self.left -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_writer_sink_propagates_failure() {
        let mut sink = WriterSink::with_capacity(2, Limited { left: 3, flushes: 0 });
        sink.write_all_bytes(b"ab", false).unwrap();
        assert!(sink.write_all_bytes(b"cd", false).is_err());
    }

    #[test]
    fn test_writer_sink_sync_flushes_inner() {
        let mut sink = WriterSink::with_capacity(2, Limited { left: 100, flushes: 0 });
        sink.write_all_bytes(b"abcd", true).unwrap();
        assert_eq!(sink.get_ref().flushes, 2);
        sink.write(SinkItem::Flush, true).unwrap();
        assert_eq!(sink.get_ref().flushes, 3);
    }
}
