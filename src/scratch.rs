//! Scratch space for frames that straddle the ring's physical wrap point.
//!
//! Small frames are linearized into a fixed stack array. Larger frames lease a
//! heap buffer from a shared `ScratchPool`; the lease hands the buffer back to
//! the pool when dropped, so no buffer outlives a single `copy_out` call.

use parking_lot::Mutex;
use std::ops::Deref;
use std::sync::Arc;

/// Size of the stack region used for wrap-crossing frames.
///
/// Frames at or below this length never touch the heap.
pub const STACK_SCRATCH_THRESHOLD: usize = 512;

/// Default number of idle buffers retained by a pool.
pub const DEFAULT_MAX_POOLED: usize = 4;

/// A shared free list of reusable heap buffers.
///
/// Cloning a pool is cheap and yields a handle to the same free list, so several
/// framers can share one pool.
#[derive(Clone, Debug)]
pub struct ScratchPool {
    inner: Arc<PoolInner>,
}

#[derive(Debug)]
struct PoolInner {
    free_list: Mutex<Vec<Vec<u8>>>,
    max_pooled: usize,
}

impl ScratchPool {
    /// Creates an empty pool retaining at most `DEFAULT_MAX_POOLED` idle buffers.
    pub fn new() -> Self {
        Self::with_max_pooled(DEFAULT_MAX_POOLED)
    }

    /// Creates an empty pool retaining at most `max_pooled` idle buffers.
    pub fn with_max_pooled(max_pooled: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                free_list: Mutex::new(Vec::with_capacity(max_pooled)),
                max_pooled,
            }),
        }
    }

    /// Checks out an empty buffer with capacity for at least `min_capacity` bytes.
    ///
    /// Reuses the first idle buffer that is large enough; allocates otherwise.
    pub fn lease(&self, min_capacity: usize) -> ScratchLease {
        let reused = {
            let mut list = self.inner.free_list.lock();
            list.iter()
                .position(|buf| buf.capacity() >= min_capacity)
                .map(|index| list.swap_remove(index))
        };

        let buf = match reused {
            Some(mut buf) => {
                buf.clear();
                buf
            }
            None => Vec::with_capacity(min_capacity),
        };

        ScratchLease {
            buf,
            pool: Arc::clone(&self.inner),
        }
    }

    /// Number of idle buffers currently held by the pool.
    pub fn pooled(&self) -> usize {
        self.inner.free_list.lock().len()
    }

    /// Drops all idle buffers, returning how many were released.
    pub fn shrink(&self) -> usize {
        let mut list = self.inner.free_list.lock();
        let released = list.len();
        list.clear();
        list.shrink_to_fit();
        released
    }
}

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new()
    }
}

/// A buffer checked out from a `ScratchPool`, returned on drop.
pub struct ScratchLease {
    buf: Vec<u8>,
    pool: Arc<PoolInner>,
}

impl ScratchLease {
    /// Appends `data` to the leased buffer.
    pub fn extend_from_slice(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }
}

impl Deref for ScratchLease {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl Drop for ScratchLease {
    fn drop(&mut self) {
        let buf = std::mem::take(&mut self.buf);
        let mut list = self.pool.free_list.lock();
        if list.len() < self.pool.max_pooled {
            list.push(buf);
        }
    }
}
