//! A lock-protected framing engine that can be attached to a transport.
//!
//! Every operation (`feed`, `discard_buffer`, `statistics`) takes the same
//! `parking_lot::Mutex`, so a control thread can discard stale data while the
//! transport thread is mid-receive without either seeing partial state.
//!
//! Handlers run while that lock is held. A handler that calls back into the same
//! `SharedFramer` deadlocks; hand work off to another thread or a queue instead.

use crate::config::FramerConfig;
use crate::error::{Error, Result};
use crate::framer::LineFramer;
use crate::handler::FrameHandler;
use crate::source::ByteSource;
use crate::stats::Statistics;
use crate::transport::{DataCallback, DataNotifier, SubscriptionId};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error};

struct Engine<S, H> {
    framer: LineFramer,
    source: S,
    handler: H,
    last_error: Option<Error>,
}

impl<S: ByteSource, H: FrameHandler> Engine<S, H> {
    fn feed(&mut self, available: usize) -> Result<()> {
        let Engine {
            framer,
            source,
            handler,
            ..
        } = self;
        framer.feed(available, source, handler)
    }
}

struct Attachment {
    notifier: Arc<dyn DataNotifier>,
    id: SubscriptionId,
}

/// A `LineFramer` bundled with its source and handler behind one mutex.
///
/// ```rust
/// use linestream::{FnHandler, FramerConfig, Loopback, SharedFramer};
/// use std::sync::{Arc, Mutex};
///
/// let device = Loopback::new();
/// let lines = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&lines);
/// let handler = FnHandler::new(move |frame: &[u8]| {
///     sink.lock().unwrap().push(frame.to_vec());
///     Ok(())
/// });
///
/// let engine = SharedFramer::new(&FramerConfig::lines(), device.clone(), handler)?;
/// engine.attach(Arc::new(device.clone()));
/// device.push(b"ping\n");
/// engine.detach();
///
/// assert_eq!(*lines.lock().unwrap(), vec![b"ping".to_vec()]);
/// # Ok::<(), linestream::Error>(())
/// ```
pub struct SharedFramer<S, H> {
    engine: Arc<Mutex<Engine<S, H>>>,
    attachment: Mutex<Option<Attachment>>,
}

impl<S: ByteSource, H: FrameHandler> SharedFramer<S, H> {
    pub fn new(config: &FramerConfig, source: S, handler: H) -> Result<Self> {
        Ok(Self::from_framer(LineFramer::from_config(config)?, source, handler))
    }

    pub fn from_framer(framer: LineFramer, source: S, handler: H) -> Self {
        Self {
            engine: Arc::new(Mutex::new(Engine {
                framer,
                source,
                handler,
                last_error: None,
            })),
            attachment: Mutex::new(None),
        }
    }

    /// Runs one ingest cycle for `available` announced bytes.
    pub fn feed(&self, available: usize) -> Result<()> {
        self.engine.lock().feed(available)
    }

    /// Runs one ingest cycle for whatever the source reports as ready.
    pub fn feed_ready(&self) -> Result<()> {
        let mut engine = self.engine.lock();
        let available = engine.source.ready_count();
        engine.feed(available)
    }

    pub fn discard_buffer(&self) -> usize {
        self.engine.lock().framer.discard_buffer()
    }

    pub fn statistics(&self) -> Statistics {
        self.engine.lock().framer.statistics()
    }

    /// Returns (and clears) the last error raised by a notification-driven feed.
    pub fn take_last_error(&self) -> Option<Error> {
        self.engine.lock().last_error.take()
    }

    /// Runs `f` with exclusive access to the handler, under the engine lock.
    pub fn with_handler<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        f(&mut self.engine.lock().handler)
    }
}

impl<S, H> SharedFramer<S, H>
where
    S: ByteSource + Send + 'static,
    H: FrameHandler + Send + 'static,
{
    /// Subscribes to `notifier`; each notification runs `feed` with the announced count.
    ///
    /// Returns false, leaving the existing subscription alone, if already attached.
    /// Errors raised while feeding from a notification are logged and kept for
    /// `take_last_error`.
    pub fn attach(&self, notifier: Arc<dyn DataNotifier>) -> bool {
        let mut attachment = self.attachment.lock();
        if attachment.is_some() {
            return false;
        }

        let engine = Arc::downgrade(&self.engine);
        let callback: DataCallback = Arc::new(move |available| {
            let Some(engine) = engine.upgrade() else {
                return;
            };
            let mut engine = engine.lock();
            if let Err(err) = engine.feed(available) {
                error!(error = %err, available, "feed from data notification failed");
                engine.last_error = Some(err);
            }
        });

        let id = notifier.subscribe(callback);
        debug!(?id, "attached to data notifier");
        *attachment = Some(Attachment { notifier, id });
        true
    }
}

impl<S, H> SharedFramer<S, H> {
    /// Unsubscribes from the attached notifier. Returns false if not attached.
    pub fn detach(&self) -> bool {
        match self.attachment.lock().take() {
            Some(Attachment { notifier, id }) => {
                notifier.unsubscribe(id);
                debug!(?id, "detached from data notifier");
                true
            }
            None => false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.lock().is_some()
    }
}

impl<S, H> Drop for SharedFramer<S, H> {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use crate::transport::Loopback;

    #[derive(Default)]
    struct Count(usize);

    impl FrameHandler for Count {
        fn on_frame(&mut self, _frame: &[u8]) -> Result<()> {
            self.0 += 1;
            Ok(())
        }
    }

    #[test]
    fn feed_ready_pulls_reported_bytes() {
        let mut source = MemorySource::new();
        source.push(b"a\nb\n");
        let engine = SharedFramer::new(&FramerConfig::lines(), source, Count::default()).unwrap();
        engine.feed_ready().unwrap();
        assert_eq!(engine.with_handler(|h| h.0), 2);
        assert_eq!(engine.statistics().lines_received, 2);
    }

    #[test]
    fn attach_and_detach_are_idempotent() {
        let device = Loopback::new();
        let engine =
            SharedFramer::new(&FramerConfig::lines(), device.clone(), Count::default()).unwrap();
        let notifier: Arc<dyn DataNotifier> = Arc::new(device.clone());

        assert!(engine.attach(Arc::clone(&notifier)));
        assert!(!engine.attach(Arc::clone(&notifier)));
        assert_eq!(device.subscriber_count(), 1);
        device.push(b"x\n");
        assert_eq!(engine.with_handler(|h| h.0), 1);

        assert!(engine.detach());
        assert!(!engine.detach());
        assert_eq!(device.subscriber_count(), 0);
        device.push(b"y\n");
        assert_eq!(engine.with_handler(|h| h.0), 1);
        assert_eq!(device.pending(), 2);
    }

    #[test]
    fn drop_detaches() {
        let device = Loopback::new();
        {
            let engine =
                SharedFramer::new(&FramerConfig::lines(), device.clone(), Count::default())
                    .unwrap();
            engine.attach(Arc::new(device.clone()));
            assert_eq!(device.subscriber_count(), 1);
        }
        assert_eq!(device.subscriber_count(), 0);
    }
}
