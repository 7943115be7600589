//! The consumer side: callbacks receiving frames and overflow notifications.

use crate::error::Result;

/// Receives frames extracted by a `LineFramer`.
///
/// Both methods run synchronously inside `feed`. In a `SharedFramer` they run while
/// the engine lock is held, so they must be quick and must not call back into the
/// same engine.
pub trait FrameHandler {
    /// Called once per non-empty frame, payload only (delimiter stripped).
    ///
    /// The slice may point straight into the ring buffer; it is only valid for the
    /// duration of this call. Returning an error aborts the current `feed`; the
    /// frame is still consumed.
    fn on_frame(&mut self, frame: &[u8]) -> Result<()>;

    /// Called when `discarded` of the oldest bytes were evicted to make room.
    ///
    /// The next frame delivered may be a truncated suffix of its original line.
    #[inline(always)]
    fn on_overflow(&mut self, _discarded: usize) {}
}

impl<H: FrameHandler + ?Sized> FrameHandler for &mut H {
    fn on_frame(&mut self, frame: &[u8]) -> Result<()> {
        (**self).on_frame(frame)
    }

    fn on_overflow(&mut self, discarded: usize) {
        (**self).on_overflow(discarded)
    }
}

impl<H: FrameHandler + ?Sized> FrameHandler for Box<H> {
    fn on_frame(&mut self, frame: &[u8]) -> Result<()> {
        (**self).on_frame(frame)
    }

    fn on_overflow(&mut self, discarded: usize) {
        (**self).on_overflow(discarded)
    }
}

/// A handler assembled from closures.
///
/// ```rust
/// use linestream::{FnHandler, LineFramer};
///
/// let mut lines = Vec::new();
/// let mut overflows = 0usize;
/// let mut handler = FnHandler::new(|frame: &[u8]| {
///     lines.push(frame.to_vec());
///     Ok(())
/// })
/// .with_overflow(|n| overflows += n);
///
/// let mut framer = LineFramer::new(64, b"\n")?;
/// framer.feed_bytes(b"one\ntwo\n", &mut handler)?;
/// drop(handler);
/// assert_eq!(lines, vec![b"one".to_vec(), b"two".to_vec()]);
/// assert_eq!(overflows, 0);
/// # Ok::<(), linestream::Error>(())
/// ```
pub struct FnHandler<F, O = fn(usize)> {
    on_frame: F,
    on_overflow: O,
}

impl<F> FnHandler<F>
where
    F: FnMut(&[u8]) -> Result<()>,
{
    pub fn new(on_frame: F) -> Self {
        Self {
            on_frame,
            on_overflow: |_| {},
        }
    }
}

impl<F, O> FnHandler<F, O>
where
    F: FnMut(&[u8]) -> Result<()>,
    O: FnMut(usize),
{
    /// Replaces the overflow callback.
    pub fn with_overflow<O2: FnMut(usize)>(self, on_overflow: O2) -> FnHandler<F, O2> {
        FnHandler {
            on_frame: self.on_frame,
            on_overflow,
        }
    }
}

impl<F, O> FrameHandler for FnHandler<F, O>
where
    F: FnMut(&[u8]) -> Result<()>,
    O: FnMut(usize),
{
    fn on_frame(&mut self, frame: &[u8]) -> Result<()> {
        (self.on_frame)(frame)
    }

    fn on_overflow(&mut self, discarded: usize) {
        (self.on_overflow)(discarded)
    }
}

/// An adapter that observes frames without copying or mutating them.
///
/// Callback timing: invoked exactly once per frame, before the inner handler.
pub struct ObservedHandler<H: FrameHandler, C: FnMut(&[u8])> {
    inner: H,
    callback: C,
}

impl<H: FrameHandler, C: FnMut(&[u8])> ObservedHandler<H, C> {
    pub fn new(inner: H, callback: C) -> Self {
        Self { inner, callback }
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H: FrameHandler, C: FnMut(&[u8])> FrameHandler for ObservedHandler<H, C> {
    fn on_frame(&mut self, frame: &[u8]) -> Result<()> {
        (self.callback)(frame);
        self.inner.on_frame(frame)
    }

    fn on_overflow(&mut self, discarded: usize) {
        self.inner.on_overflow(discarded)
    }
}

/// Extension methods for handlers to enable fluent composition.
pub trait FrameHandlerExt: FrameHandler + Sized {
    /// Observe frames before they reach this handler. Useful for metrics/logging.
    fn observed<C: FnMut(&[u8])>(self, callback: C) -> ObservedHandler<Self, C> {
        ObservedHandler::new(self, callback)
    }
}

impl<T: FrameHandler> FrameHandlerExt for T {}
