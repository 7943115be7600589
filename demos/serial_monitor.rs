//! Frames lines from stdin as if it were a serial port and prints running statistics.
//!
//! ```text
//! printf 'temp=21.5\r\nhum=40\r\n' | RUST_LOG=linestream=debug cargo run --example serial_monitor -- crlf 64
//! ```

use linestream::{ByteSource, FnHandler, FramerConfig, LineFramer, ReaderSource, Result};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let mut config = match args.next().as_deref() {
        Some("crlf") => FramerConfig::crlf(),
        _ => FramerConfig::lines(),
    };
    if let Some(capacity) = args.next().and_then(|c| c.parse().ok()) {
        config = config.with_capacity(capacity);
    }

    let mut framer = LineFramer::from_config(&config)?;
    // Serial drivers typically report a few dozen bytes at a time.
    let mut source = ReaderSource::new(io::stdin().lock(), 32);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut handler = FnHandler::new(|frame: &[u8]| {
        out.write_all(frame)?;
        out.write_all(b"\n")?;
        Ok(())
    })
    .with_overflow(|evicted| eprintln!("-- overflow: {evicted} bytes dropped"));

    while !source.is_exhausted() {
        framer.feed(source.ready_count(), &mut source, &mut handler)?;
    }
    drop(handler);

    let stats = framer.statistics();
    eprintln!(
        "-- {} lines, {} bytes, {} overflows ({} bytes lost), peak usage {:.0}%",
        stats.lines_received,
        stats.bytes_received,
        stats.overflow_count,
        stats.bytes_discarded_by_overflow,
        stats.peak_usage_rate() * 100.0
    );
    Ok(())
}
