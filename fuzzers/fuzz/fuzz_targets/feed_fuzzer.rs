#![no_main]
use linestream::{FnHandler, LineFramer};
use libfuzzer_sys::fuzz_target;

// Layout: [capacity, delimiter_len, chunk_len, delimiter..., stream...]
fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }
    let capacity = data[0] as usize % 64 + 1;
    let delimiter_len = data[1] as usize % 3 + 1;
    let chunk_len = data[2] as usize % 32 + 1;
    let rest = &data[3..];
    if rest.len() < delimiter_len {
        return;
    }
    let (delimiter, stream) = rest.split_at(delimiter_len);

    let Ok(mut framer) = LineFramer::new(capacity, delimiter) else {
        return;
    };
    let mut framed = 0u64;
    let mut handler = FnHandler::new(|frame: &[u8]| {
        assert!(!frame.is_empty());
        assert!(frame.len() + delimiter.len() <= capacity);
        framed += frame.len() as u64 + delimiter.len() as u64;
        Ok(())
    });

    let mut peak = 0;
    for chunk in stream.chunks(chunk_len) {
        framer.feed_bytes(chunk, &mut handler).unwrap();
        assert!(framer.buffered() <= capacity);
        assert!(framer.search_start() <= framer.buffered());
        let stats = framer.statistics();
        assert!(stats.peak_buffer_usage >= peak);
        peak = stats.peak_buffer_usage;
    }
    drop(handler);

    let stats = framer.statistics();
    let skipped = stats.empty_lines_skipped * delimiter.len() as u64;
    assert_eq!(
        stats.bytes_received,
        framed + skipped + stats.bytes_discarded_by_overflow + stats.current_buffer_usage as u64
    );
});
