//! The "data available" side of a transport, plus an in-process loopback.
//!
//! Real transports (a serial port driver, a USB CDC endpoint) own their device and
//! merely call subscribers with the number of bytes they have buffered. `Loopback`
//! does the same thing in memory and is what the tests and benches drive.

use crate::source::ByteSource;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Callback invoked with the number of bytes a transport has ready.
pub type DataCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Handle returned by `DataNotifier::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A transport that announces "N bytes are ready".
pub trait DataNotifier: Send + Sync {
    /// Registers `callback`; it may be called from any thread.
    fn subscribe(&self, callback: DataCallback) -> SubscriptionId;

    /// Removes a subscription. Returns false if `id` was not registered.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// An in-memory transport: bytes pushed in are announced to subscribers and can be
/// pulled back out through `ByteSource`.
///
/// Clones share the same queue and subscriber list, so one clone can be handed to a
/// framer as its source while another plays the device side.
#[derive(Clone, Default)]
pub struct Loopback {
    inner: Arc<LoopbackInner>,
}

#[derive(Default)]
struct LoopbackInner {
    queue: Mutex<VecDeque<u8>>,
    subscribers: Mutex<Vec<(SubscriptionId, DataCallback)>>,
    next_id: AtomicU64,
}

impl Loopback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues `data` and notifies every subscriber with the queued byte count.
    ///
    /// Subscribers run on the calling thread after the queue lock is released.
    pub fn push(&self, data: &[u8]) {
        let ready = {
            let mut queue = self.inner.queue.lock();
            queue.extend(data);
            queue.len()
        };
        let subscribers: Vec<DataCallback> = self
            .inner
            .subscribers
            .lock()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in subscribers {
            callback(ready);
        }
    }

    /// Bytes queued but not yet pulled.
    pub fn pending(&self) -> usize {
        self.inner.queue.lock().len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }
}

impl ByteSource for Loopback {
    fn ready_count(&self) -> usize {
        self.pending()
    }

    fn read_into(&mut self, region: &mut [u8]) -> io::Result<usize> {
        let mut queue = self.inner.queue.lock();
        let n = region.len().min(queue.len());
        for (dst, src) in region[..n].iter_mut().zip(queue.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }
}

impl DataNotifier for Loopback {
    fn subscribe(&self, callback: DataCallback) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.subscribers.lock().push((id, callback));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.inner.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn push_notifies_with_queued_count() {
        let loopback = Loopback::new();
        let last = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&last);
        let id = loopback.subscribe(Arc::new(move |n| seen.store(n, Ordering::SeqCst)));

        loopback.push(b"abc");
        assert_eq!(last.load(Ordering::SeqCst), 3);
        loopback.push(b"de");
        assert_eq!(last.load(Ordering::SeqCst), 5);

        assert!(loopback.unsubscribe(id));
        assert!(!loopback.unsubscribe(id));
        loopback.push(b"f");
        assert_eq!(last.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn clones_share_queue() {
        let device = Loopback::new();
        let mut source = device.clone();
        device.push(b"hello");
        let mut buf = [0u8; 8];
        assert_eq!(source.read_into(&mut buf).unwrap(), 5);
        assert_eq!(&buf[..5], b"hello");
        assert_eq!(device.pending(), 0);
    }
}
