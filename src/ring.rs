//! Fixed-capacity circular byte storage.
//!
//! `RingStore` only knows about bytes: where the oldest byte lives, where the next
//! byte goes and how many are valid. It has no notion of delimiters or frames;
//! that policy lives in `LineFramer`.
//!
//! All offsets taken by the methods below are *logical*, relative to the oldest
//! buffered byte (`head`). The physical position is `(head + offset) mod capacity`.

use crate::error::{Error, Result};
use crate::scratch::{ScratchPool, STACK_SCRATCH_THRESHOLD};

/// How `copy_out` delivers a logical range to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPath {
    /// The range is physically contiguous; the view borrows the storage directly.
    Borrowed,
    /// The range wraps and fits the stack scratch region.
    Stack,
    /// The range wraps and is linearized into a pooled heap buffer.
    Pooled,
}

/// Circular byte storage with head/tail/count bookkeeping.
///
/// Invariants: `head < capacity`, `tail < capacity`, `count <= capacity` and
/// `tail == (head + count) % capacity`. `count` disambiguates full from empty
/// when `head == tail`.
#[derive(Debug)]
pub struct RingStore {
    storage: Box<[u8]>,
    head: usize,
    tail: usize,
    count: usize,
}

impl RingStore {
    /// Allocates the storage once; it is never resized afterwards.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        Ok(Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            head: 0,
            tail: 0,
            count: 0,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Number of valid bytes currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Physical index of the oldest byte.
    #[inline]
    pub fn head(&self) -> usize {
        self.head
    }

    /// Physical index of the next write position.
    #[inline]
    pub fn tail(&self) -> usize {
        self.tail
    }

    #[inline]
    pub fn available_space(&self) -> usize {
        self.capacity() - self.count
    }

    /// Copies as much of `src` as fits, splitting at the physical end of storage.
    ///
    /// Returns the number of bytes written. Never overwrites buffered data; callers
    /// that must keep the newest bytes evict first.
    ///
    /// A standalone fill for callers that already hold the bytes. `LineFramer` reads
    /// straight from its source through `spare_mut`/`commit` and `oldest_mut`/`overwrite`.
    pub fn write(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.available_space());
        let first = n.min(self.capacity() - self.tail);
        self.storage[self.tail..self.tail + first].copy_from_slice(&src[..first]);
        self.storage[..n - first].copy_from_slice(&src[first..n]);
        self.commit(n);
        n
    }

    /// The contiguous free region starting at `tail`, truncated to `limit` bytes.
    ///
    /// Fill it, then `commit` the number of bytes actually written. An empty slice
    /// means the ring is full or `limit` is zero.
    pub fn spare_mut(&mut self, limit: usize) -> &mut [u8] {
        let free = self.available_space().min(limit);
        let contiguous = free.min(self.capacity() - self.tail);
        &mut self.storage[self.tail..self.tail + contiguous]
    }

    /// Marks `n` bytes after `tail` as written.
    pub fn commit(&mut self, n: usize) {
        assert!(n <= self.available_space(), "commit past ring capacity");
        self.tail = (self.tail + n) % self.capacity();
        self.count += n;
    }

    /// The oldest buffered bytes, starting at `head` and truncated to `limit` and to
    /// the physical end. Only meaningful on a full ring, where `head == tail`.
    ///
    /// Write newer bytes over the front of it, then call `overwrite` with the number
    /// written; bytes past that point are left as they were.
    pub fn oldest_mut(&mut self, limit: usize) -> &mut [u8] {
        debug_assert!(self.is_full());
        let len = limit.min(self.capacity() - self.head);
        &mut self.storage[self.head..self.head + len]
    }

    /// Replaces the `n` oldest bytes of a full ring with the `n` bytes just written
    /// through `oldest_mut`. `len()` is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the ring is not full or `n` runs past the physical end.
    pub fn overwrite(&mut self, n: usize) {
        assert!(self.is_full(), "overwrite on a ring that is not full");
        assert!(self.head + n <= self.capacity(), "overwrite past physical end");
        self.evict_front(n);
        self.commit(n);
    }

    /// Discards the oldest `n` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `n > len()`.
    pub fn evict_front(&mut self, n: usize) {
        assert!(n <= self.count, "evict_front({n}) with only {} bytes", self.count);
        self.head = (self.head + n) % self.capacity();
        self.count -= n;
    }

    /// Forgets all buffered bytes and realigns head and tail to zero.
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    /// The buffered bytes as two physically contiguous runs, oldest first.
    ///
    /// The second slice is empty unless the content wraps.
    pub fn as_slices(&self) -> (&[u8], &[u8]) {
        let first = self.count.min(self.capacity() - self.head);
        (
            &self.storage[self.head..self.head + first],
            &self.storage[..self.count - first],
        )
    }

    /// The byte at logical `offset`.
    #[inline]
    pub fn byte_at(&self, offset: usize) -> u8 {
        debug_assert!(offset < self.count);
        self.storage[(self.head + offset) % self.capacity()]
    }

    /// Which delivery path `copy_out` takes for the given range.
    pub fn copy_path(&self, start: usize, len: usize, stack_limit: usize) -> CopyPath {
        let begin = (self.head + start) % self.capacity();
        if begin + len <= self.capacity() {
            CopyPath::Borrowed
        } else if len <= stack_limit.min(STACK_SCRATCH_THRESHOLD) {
            CopyPath::Stack
        } else {
            CopyPath::Pooled
        }
    }

    /// Hands `f` a contiguous view of the logical range `[start, start + len)`.
    ///
    /// Non-wrapping ranges are borrowed straight from storage. Wrapping ranges are
    /// linearized into a stack array when `len <= stack_limit` (capped at
    /// `STACK_SCRATCH_THRESHOLD`) and into a buffer leased from `pool` otherwise.
    /// The view only lives for the duration of `f`.
    ///
    /// # Panics
    ///
    /// Panics if the range extends past the buffered bytes.
    pub fn copy_out<R>(
        &self,
        start: usize,
        len: usize,
        stack_limit: usize,
        pool: &ScratchPool,
        f: impl FnOnce(&[u8]) -> R,
    ) -> R {
        assert!(start + len <= self.count, "copy_out past buffered bytes");
        let capacity = self.capacity();
        let begin = (self.head + start) % capacity;

        match self.copy_path(start, len, stack_limit) {
            CopyPath::Borrowed => f(&self.storage[begin..begin + len]),
            CopyPath::Stack => {
                let first = capacity - begin;
                let mut stack = [0u8; STACK_SCRATCH_THRESHOLD];
                stack[..first].copy_from_slice(&self.storage[begin..]);
                stack[first..len].copy_from_slice(&self.storage[..len - first]);
                f(&stack[..len])
            }
            CopyPath::Pooled => {
                let first = capacity - begin;
                let mut lease = pool.lease(len);
                lease.extend_from_slice(&self.storage[begin..]);
                lease.extend_from_slice(&self.storage[..len - first]);
                f(&lease)
            }
        }
    }
}
