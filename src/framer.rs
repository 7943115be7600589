//! The framing engine: fill, evict, search and emit.
//!
//! `LineFramer` owns a `RingStore` and turns "N bytes are ready" notifications into
//! delimiter-terminated frames. It never allocates on the steady-state path: frames
//! that do not cross the ring's physical end are handed out as borrowed slices, and
//! frames that do are linearized into scratch space for the duration of the callback.
//!
//! Overflow is lossy by contract. Once the ring is full, every byte that actually
//! arrives overwrites the oldest buffered byte, so the freshest input always survives;
//! the next frame may therefore be a truncated suffix of its original line.

use crate::config::FramerConfig;
use crate::error::Result;
use crate::handler::FrameHandler;
use crate::ring::RingStore;
use crate::scratch::ScratchPool;
use crate::search::Delimiter;
use crate::source::ByteSource;
use crate::stats::Statistics;
use std::io;
use tracing::{debug, trace, warn};

/// A single-owner framing engine.
///
/// `LineFramer` takes `&mut self` everywhere; wrap it in a `SharedFramer` to drive it
/// from several threads or from a transport notification.
///
/// ```rust
/// use linestream::{FnHandler, LineFramer};
///
/// let mut framer = LineFramer::new(100, b"\n")?;
/// let mut lines = Vec::new();
/// let mut handler = FnHandler::new(|frame: &[u8]| {
///     lines.push(String::from_utf8_lossy(frame).into_owned());
///     Ok(())
/// });
/// framer.feed_bytes(b"Hello\nWor", &mut handler)?;
/// framer.feed_bytes(b"ld\n", &mut handler)?;
/// drop(handler);
/// assert_eq!(lines, ["Hello", "World"]);
/// # Ok::<(), linestream::Error>(())
/// ```
#[derive(Debug)]
pub struct LineFramer {
    ring: RingStore,
    delimiter: Delimiter,
    // Logical offset of the first byte not yet ruled out as a delimiter start.
    search_start: usize,
    // Counters only; usage gauges are filled in by `statistics()`.
    stats: Statistics,
    scratch: ScratchPool,
    stack_limit: usize,
}

impl LineFramer {
    /// Creates a framer with a `capacity`-byte ring and the given delimiter.
    pub fn new(capacity: usize, delimiter: impl AsRef<[u8]>) -> Result<Self> {
        Self::from_config(
            &FramerConfig::lines()
                .with_capacity(capacity)
                .with_delimiter(delimiter),
        )
    }

    pub fn from_config(config: &FramerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ring: RingStore::new(config.capacity)?,
            delimiter: config.delimiter()?,
            search_start: 0,
            stats: Statistics::default(),
            scratch: ScratchPool::new(),
            stack_limit: config.stack_scratch_limit,
        })
    }

    /// Uses `pool` for wrap-crossing frames above the stack threshold.
    pub fn with_scratch_pool(mut self, pool: ScratchPool) -> Self {
        self.scratch = pool;
        self
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Bytes currently buffered (an incomplete frame, usually).
    pub fn buffered(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn delimiter(&self) -> &[u8] {
        self.delimiter.as_bytes()
    }

    /// Logical offset where the next delimiter scan starts. Always `<= buffered()`.
    pub fn search_start(&self) -> usize {
        self.search_start
    }

    pub fn scratch_pool(&self) -> &ScratchPool {
        &self.scratch
    }

    /// Runs one ingest cycle: pull up to `available` bytes, then emit frames.
    ///
    /// Bytes are read into free space first. Once the ring is full, each further read
    /// lands on top of the oldest buffered bytes, so the freshest input always survives.
    /// Only bytes that actually arrived can push older ones out: an overflow is
    /// recorded and reported through `on_overflow` with the number of bytes really
    /// dropped, never with the shortfall of an optimistic `available`.
    ///
    /// Pulling stops early on a short or zero-length read. An I/O error from the
    /// source is returned only after the bytes already pulled have been framed.
    pub fn feed<S, H>(&mut self, available: usize, source: &mut S, handler: &mut H) -> Result<()>
    where
        S: ByteSource + ?Sized,
        H: FrameHandler + ?Sized,
    {
        let mut dropped = 0;
        let pulled = self.pull(source, available, &mut dropped);

        if dropped > 0 {
            self.search_start = self.search_start.saturating_sub(dropped);
            self.stats.overflow_count += 1;
            self.stats.bytes_discarded_by_overflow += dropped as u64;
            warn!(
                evicted = dropped,
                capacity = self.ring.capacity(),
                requested = available,
                "ring buffer overflow, dropped oldest bytes"
            );
            handler.on_overflow(dropped);
        }
        self.stats.peak_buffer_usage = self.stats.peak_buffer_usage.max(self.ring.len());

        self.process_frames(handler)?;
        pulled?;
        Ok(())
    }

    /// Feeds a slice directly, as if a source had announced `data.len()` bytes.
    pub fn feed_bytes<H>(&mut self, data: &[u8], handler: &mut H) -> Result<()>
    where
        H: FrameHandler + ?Sized,
    {
        let mut source = data;
        self.feed(data.len(), &mut source, handler)
    }

    /// Extracts every complete frame currently buffered.
    ///
    /// Empty frames are counted and consumed without a callback. If the handler fails,
    /// the failing frame is still consumed and the error is returned; frames after it
    /// stay buffered for the next call.
    pub fn process_frames<H>(&mut self, handler: &mut H) -> Result<()>
    where
        H: FrameHandler + ?Sized,
    {
        let delimiter_len = self.delimiter.len();

        loop {
            if self.ring.len() < delimiter_len {
                return Ok(());
            }

            let Some(at) = self.delimiter.find_in(&self.ring, self.search_start) else {
                // Keep the last `len - 1` bytes unexamined: they may begin a delimiter
                // that completes on the next feed.
                self.search_start = self.ring.len() - delimiter_len + 1;
                return Ok(());
            };

            let delivered = if at == 0 {
                self.stats.empty_lines_skipped += 1;
                trace!("skipping empty frame");
                Ok(())
            } else {
                self.stats.lines_received += 1;
                trace!(
                    len = at,
                    path = ?self.ring.copy_path(0, at, self.stack_limit),
                    "emitting frame"
                );
                self.ring
                    .copy_out(0, at, self.stack_limit, &self.scratch, |frame| {
                        handler.on_frame(frame)
                    })
            };

            self.ring.evict_front(at + delimiter_len);
            self.search_start = 0;
            delivered?;
        }
    }

    /// Drops everything buffered and returns how many bytes were dropped.
    ///
    /// Always counts as one manual discard, even on an empty buffer. The dropped
    /// bytes join the overflow-discarded total; the peak usage mark is kept.
    pub fn discard_buffer(&mut self) -> usize {
        let discarded = self.ring.len();
        self.ring.clear();
        self.search_start = 0;
        self.stats.manual_discard_count += 1;
        self.stats.bytes_discarded_by_overflow += discarded as u64;
        debug!(discarded, "discarded buffered bytes");
        discarded
    }

    pub fn statistics(&self) -> Statistics {
        Statistics {
            current_buffer_usage: self.ring.len(),
            capacity: self.ring.capacity(),
            ..self.stats
        }
    }

    /// Pulls up to `remaining` bytes region by region, adding the number of old bytes
    /// overwritten on a full ring to `dropped`.
    fn pull<S>(
        &mut self,
        source: &mut S,
        mut remaining: usize,
        dropped: &mut usize,
    ) -> io::Result<()>
    where
        S: ByteSource + ?Sized,
    {
        while remaining > 0 {
            let full = self.ring.is_full();
            let region = if full {
                self.ring.oldest_mut(remaining)
            } else {
                self.ring.spare_mut(remaining)
            };
            let region_len = region.len();

            let n = read_region(source, region)?;
            if full {
                self.ring.overwrite(n);
                *dropped += n;
            } else {
                self.ring.commit(n);
            }
            self.stats.bytes_received += n as u64;
            remaining -= n;

            if n < region_len {
                debug!(requested = region_len, read = n, "short read from source");
                break;
            }
        }
        Ok(())
    }
}

/// One read into `region`, retrying a single `Interrupted` and mapping `WouldBlock`
/// to zero bytes.
fn read_region<S>(source: &mut S, region: &mut [u8]) -> io::Result<usize>
where
    S: ByteSource + ?Sized,
{
    let len = region.len();
    let n = match source.read_into(region) {
        Err(e) if e.kind() == io::ErrorKind::Interrupted => {
            debug!("interrupted read, retrying once");
            match source.read_into(region) {
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
                    ) =>
                {
                    0
                }
                other => other?,
            }
        }
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => 0,
        other => other?,
    };
    Ok(n.min(len))
}
