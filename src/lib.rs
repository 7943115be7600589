//! # LineStream (v0.1.0)
//!
//! Fixed-memory line framing for slow, chunked byte streams such as serial ports.
//!
//! ## Overview
//!
//! `linestream` re-segments an unbounded byte stream into delimiter-terminated frames
//! ("lines") while staying inside a fixed memory budget. Bytes land in a ring buffer
//! allocated once at construction; frames are handed to a callback as borrowed slices
//! that point straight into that buffer whenever they do not cross its physical end.
//!
//! ## Key Features
//!
//! * **Bounded Memory**: One ring buffer, no per-byte or per-frame allocation
//! * **Incremental Search**: Delimiter scans resume where the last one stopped, so
//!   trickling bytes in costs O(new bytes), and delimiters may straddle two feeds
//! * **Zero-Copy Frames**: Non-wrapping frames borrow the ring directly; wrapping frames
//!   are linearized on the stack or into a pooled buffer
//! * **Lossy, Observable Overflow**: When the producer outruns the buffer, the oldest
//!   bytes are evicted, counted and reported; the producer is never blocked
//! * **Thread Safe Engine**: `SharedFramer` serializes feeds, discards and statistics
//!   reads behind one lock and can attach to a transport's "data ready" notification
//!
//! ## Quick Start
//!
//! ```rust
//! use linestream::*;
//!
//! fn main() -> Result<()> {
//!     let mut framer = LineFramer::new(100, b"\n")?;
//!
//!     let mut lines = Vec::new();
//!     let mut handler = FnHandler::new(|frame: &[u8]| {
//!         lines.push(frame.to_vec());
//!         Ok(())
//!     });
//!
//!     // Bytes arrive in arbitrary chunks from the transport
//!     framer.feed_bytes(b"Hel", &mut handler)?;
//!     framer.feed_bytes(b"lo\nWorld\n", &mut handler)?;
//!     drop(handler);
//!
//!     assert_eq!(lines, vec![b"Hello".to_vec(), b"World".to_vec()]);
//!     assert_eq!(framer.statistics().lines_received, 2);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! * **`RingStore`**: wrap-aware circular storage; no framing policy
//! * **`LineFramer`**: the fill / evict / search / emit policy over a `RingStore`
//! * **`ByteSource`**: where bytes come from (a driver buffer, `MemorySource`, `Loopback`)
//! * **`FrameHandler`**: where frames go; receives `&[u8]` valid only for the call
//! * **`SharedFramer`**: a `LineFramer` plus source and handler behind one mutex

pub mod config;
pub mod error;
pub mod framer;
pub mod handler;
pub mod ring;
pub mod scratch;
pub mod search;
pub mod shared;
pub mod source;
pub mod stats;
pub mod transport;

// Re-export the main public API for user convenience.
pub use config::FramerConfig;
pub use error::{Error, Result};
pub use framer::LineFramer;
pub use handler::{FnHandler, FrameHandler, FrameHandlerExt, ObservedHandler};
pub use ring::{CopyPath, RingStore};
pub use scratch::{ScratchPool, STACK_SCRATCH_THRESHOLD};
pub use search::Delimiter;
pub use shared::SharedFramer;
pub use source::{ByteSource, MemorySource, ReaderSource};
pub use stats::Statistics;
pub use transport::{DataCallback, DataNotifier, Loopback, SubscriptionId};
