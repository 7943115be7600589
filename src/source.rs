//! The producer side: anything that can report buffered bytes and hand them over.

use std::collections::VecDeque;
use std::io::{self, Read};

/// A transport-side byte buffer the framer pulls from.
///
/// Purpose: Decouple the framer from the physical transport. A serial port driver,
/// an in-memory queue and a test harness all look the same to `LineFramer::feed`.
pub trait ByteSource {
    /// Number of bytes that can be pulled right now without blocking.
    fn ready_count(&self) -> usize;

    /// Fills as much of `region` as possible and returns the number of bytes written.
    ///
    /// Must not block past what is already available. Returning fewer bytes than
    /// requested (including zero) ends the current pull. Only the first `n` bytes of
    /// `region` may be written: on a full ring the rest still holds buffered data.
    fn read_into(&mut self, region: &mut [u8]) -> io::Result<usize>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn ready_count(&self) -> usize {
        (**self).ready_count()
    }

    fn read_into(&mut self, region: &mut [u8]) -> io::Result<usize> {
        (**self).read_into(region)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn ready_count(&self) -> usize {
        (**self).ready_count()
    }

    fn read_into(&mut self, region: &mut [u8]) -> io::Result<usize> {
        (**self).read_into(region)
    }
}

/// Reading from a slice consumes it from the front, like `Read for &[u8]`.
impl ByteSource for &[u8] {
    fn ready_count(&self) -> usize {
        self.len()
    }

    fn read_into(&mut self, region: &mut [u8]) -> io::Result<usize> {
        let n = region.len().min(self.len());
        let (head, rest) = self.split_at(n);
        region[..n].copy_from_slice(head);
        *self = rest;
        Ok(n)
    }
}

/// An in-memory byte queue.
///
/// `max_read` caps the bytes handed out per `read_into` call, which simulates a
/// driver that returns short reads.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    queue: VecDeque<u8>,
    max_read: Option<usize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits every `read_into` call to at most `max_read` bytes.
    pub fn with_max_read(mut self, max_read: usize) -> Self {
        self.max_read = Some(max_read);
        self
    }

    /// Appends bytes to the back of the queue.
    pub fn push(&mut self, data: &[u8]) {
        self.queue.extend(data);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl ByteSource for MemorySource {
    fn ready_count(&self) -> usize {
        self.queue.len()
    }

    fn read_into(&mut self, region: &mut [u8]) -> io::Result<usize> {
        let limit = self.max_read.unwrap_or(usize::MAX);
        let n = region.len().min(limit).min(self.queue.len());
        for (dst, src) in region[..n].iter_mut().zip(self.queue.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }
}

/// Adapts a `std::io::Read` handle (for example a serial port opened elsewhere).
///
/// `Read` cannot report how much is buffered, so the source advertises a fixed
/// `ready_hint` until the reader signals end of stream. A hint above the ring's
/// capacity is harmless: only bytes the reader actually returns can evict old ones.
/// The wrapped reader must not write past the byte count it returns.
#[derive(Debug)]
pub struct ReaderSource<R: Read> {
    reader: R,
    ready_hint: usize,
    exhausted: bool,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R, ready_hint: usize) -> Self {
        Self {
            reader,
            ready_hint,
            exhausted: false,
        }
    }

    /// True once the wrapped reader returned end of stream.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn ready_count(&self) -> usize {
        if self.exhausted {
            0
        } else {
            self.ready_hint
        }
    }

    fn read_into(&mut self, region: &mut [u8]) -> io::Result<usize> {
        if region.is_empty() {
            return Ok(0);
        }
        let n = self.reader.read(region)?;
        if n == 0 {
            self.exhausted = true;
        }
        Ok(n)
    }
}
