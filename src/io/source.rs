//! Pull-based byte sources

use std::io::{self, ErrorKind, Read};

use super::IO_BUFFER_SIZE;

/// Why a read did not produce a byte
#[derive(Debug)]
pub enum ReadOutcome {
    /// Input exhausted, not an error
    EndOfStream,
    /// Hard failure of the underlying source
    Error(io::Error),
}

impl ReadOutcome {
    /// Check if this is plain end-of-stream
    pub fn is_end(&self) -> bool {
        matches!(self, ReadOutcome::EndOfStream)
    }
}

/// A source of bytes, read one at a time
///
/// Once `EndOfStream` has been returned, further calls keep returning it.
pub trait ByteSource {
    fn read_byte(&mut self) -> Result<u8, ReadOutcome>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> Result<u8, ReadOutcome> {
        (**self).read_byte()
    }
}

/// Reads from an in-memory slice
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes handed out so far
    pub fn consumed(&self) -> usize {
        self.pos
    }

    /// Bytes not read yet
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}

impl ByteSource for SliceSource<'_> {
    fn read_byte(&mut self) -> Result<u8, ReadOutcome> {
        match self.data.get(self.pos) {
            Some(&byte) => {
                self.pos += 1;
                Ok(byte)
            }
            None => Err(ReadOutcome::EndOfStream),
        }
    }
}

/// Buffered adapter over any [`Read`]
///
/// Transient conditions (`Interrupted`, `WouldBlock` on a pipe with no
/// data yet) are retried. A closed pipe counts as end-of-stream.
pub struct ReaderSource<R> {
    inner: R,
    buffer: Box<[u8]>,
    pos: usize,
    avail: usize,
    eof: bool,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(inner: R) -> Self {
        Self::with_capacity(IO_BUFFER_SIZE, inner)
    }

    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        Self {
            inner,
            buffer: vec![0u8; capacity.max(1)].into_boxed_slice(),
            pos: 0,
            avail: 0,
            eof: false,
        }
    }

    /// Give back the wrapped reader; buffered bytes are lost
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill(&mut self) -> Result<(), ReadOutcome> {
        self.pos = 0;
        self.avail = 0;
        loop {
            match self.inner.read(&mut self.buffer) {
                Ok(0) => {
                    self.eof = true;
                    return Err(ReadOutcome::EndOfStream);
                }
                Ok(n) => {
                    self.avail = n;
                    return Ok(());
                }
                Err(e) => match e.kind() {
                    ErrorKind::Interrupted => continue,
                    ErrorKind::WouldBlock => {
                        std::thread::yield_now();
                        continue;
                    }
                    ErrorKind::BrokenPipe | ErrorKind::UnexpectedEof => {
                        self.eof = true;
                        return Err(ReadOutcome::EndOfStream);
                    }
                    _ => return Err(ReadOutcome::Error(e)),
                },
            }
        }
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn read_byte(&mut self) -> Result<u8, ReadOutcome> {
        if self.eof {
            return Err(ReadOutcome::EndOfStream);
        }
        if self.pos >= self.avail {
            self.fill()?;
        }
        let byte = self.buffer[self.pos];
        self.pos += 1;
        Ok(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<S: ByteSource>(source: &mut S) -> Vec<u8> {
        let mut out = Vec::new();
        while let Ok(byte) = source.read_byte() {
            out.push(byte);
        }
        out
    }

    #[test]
    fn test_slice_source() {
        let mut source = SliceSource::new(b"abc");
        assert_eq!(drain(&mut source), b"abc");
        assert_eq!(source.consumed(), 3);
        assert!(source.read_byte().unwrap_err().is_end());
        assert!(source.read_byte().unwrap_err().is_end());
    }

    #[test]
    fn test_reader_source_crosses_buffer() {
        let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let mut source = ReaderSource::with_capacity(7, data.as_slice());
        assert_eq!(drain(&mut source), data);
        assert!(source.read_byte().unwrap_err().is_end());
    }

    /// Yields one byte, then an interruption, then another byte, then an error
    struct Flaky {
        step: usize,
    }

    impl Read for Flaky {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.step += 1;
            match self.step {
                1 => {
                    buf[0] = b'x';
                    Ok(1)
                }
                2 => Err(io::Error::new(ErrorKind::Interrupted, "signal")),
                3 => Err(io::Error::new(ErrorKind::WouldBlock, "no data yet")),
                4 => {
                    buf[0] = b'y';
                    Ok(1)
                }
                _ => Err(io::Error::new(ErrorKind::PermissionDenied, "denied")),
            }
        }
    }

    #[test]
    fn test_reader_source_retries_transient_errors() {
        let mut source = ReaderSource::new(Flaky { step: 0 });
        assert_eq!(source.read_byte().unwrap(), b'x');
        assert_eq!(source.read_byte().unwrap(), b'y');
        match source.read_byte() {
            Err(ReadOutcome::Error(e)) => assert_eq!(e.kind(), ErrorKind::PermissionDenied),
            other => panic!("expected read error, got {:?}", other),
        }
    }

    struct ClosedPipe;

    impl Read for ClosedPipe {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_broken_pipe_is_end_of_stream() {
        let mut source = ReaderSource::new(ClosedPipe);
        assert!(source.read_byte().unwrap_err().is_end());
    }
}
