//! Ring Buffer for Held Bytes
//!
//! Memory usage is FLAT regardless of input size.
//! This ring buffer:
//! - Uses a buffer reserved once, at most `needle_len` bytes
//! - Keeps bytes in arrival order, oldest first
//! - Releases bytes from the front into a sink
//! - Evicts the oldest byte when pushing into a full buffer

use std::io;

use crate::error::{ReplaceError, Result};
use crate::io::{ByteSink, SinkItem};

/// Fixed-capacity circular buffer of bytes
#[derive(Debug)]
pub struct RingBuffer {
    /// Storage, reserved once (no growth)
    buffer: Vec<u8>,
    /// Index of the oldest byte
    head: usize,
    /// Number of valid bytes
    len: usize,
}

impl RingBuffer {
    /// Create with fixed capacity, reporting allocation failure instead of aborting
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ReplaceError::InvalidParameter(
                "ring buffer capacity must be non-zero".to_string(),
            ));
        }
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(capacity)
            .map_err(|_| ReplaceError::Allocation {
                what: "ring buffer",
                requested: capacity,
            })?;
        buffer.resize(capacity, 0);

        Ok(Self {
            buffer,
            head: 0,
            len: 0,
        })
    }

    /// Buffer capacity
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    #[inline]
    fn physical(&self, index: usize) -> usize {
        let pos = self.head + index;
        if pos >= self.capacity() {
            pos - self.capacity()
        } else {
            pos
        }
    }

    /// Append a byte; if the buffer was full, the oldest byte is returned
    pub fn push(&mut self, byte: u8) -> Option<u8> {
        if self.is_full() {
            let evicted = self.buffer[self.head];
            self.buffer[self.head] = byte;
            self.head = self.physical(1);
            Some(evicted)
        } else {
            let tail = self.physical(self.len);
            self.buffer[tail] = byte;
            self.len += 1;
            None
        }
    }

    /// Byte at logical position `index` (0 = oldest)
    pub fn get(&self, index: usize) -> Option<u8> {
        (index < self.len).then(|| self.buffer[self.physical(index)])
    }

    /// Remove and return the oldest byte
    pub fn pop_front(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let byte = self.buffer[self.head];
        self.head = self.physical(1);
        self.len -= 1;
        Some(byte)
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.len).map(move |i| self.buffer[self.physical(i)])
    }

    /// Write the `count` oldest bytes to `sink` and drop them from the buffer
    ///
    /// A byte is only dropped once the sink accepted it.
    pub fn release_front<W: ByteSink + ?Sized>(
        &mut self,
        count: usize,
        sink: &mut W,
        sync: bool,
    ) -> io::Result<()> {
        for _ in 0..count.min(self.len) {
            sink.write(SinkItem::Byte(self.buffer[self.head]), sync)?;
            self.head = self.physical(1);
            self.len -= 1;
        }
        Ok(())
    }

    /// Write every held byte to `sink`, oldest first, leaving the buffer empty
    pub fn release_all<W: ByteSink + ?Sized>(&mut self, sink: &mut W, sync: bool) -> io::Result<()> {
        self.release_front(self.len, sink, sync)?;
        self.clear();
        Ok(())
    }

    /// Drop every held byte
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
        // Note: stale bytes are not zeroed - they'll be overwritten
    }
}
