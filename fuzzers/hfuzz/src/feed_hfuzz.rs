use honggfuzz::fuzz;
use linestream::{FnHandler, LineFramer};

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let Some((&chunk_len, stream)) = data.split_first() else {
                return;
            };
            let Ok(mut framer) = LineFramer::new(32, b"\r\n") else {
                return;
            };
            let mut handler = FnHandler::new(|frame: &[u8]| {
                assert!(frame.len() <= 30);
                Ok(())
            });
            for chunk in stream.chunks(chunk_len as usize % 16 + 1) {
                framer.feed_bytes(chunk, &mut handler).unwrap();
                assert!(framer.buffered() <= framer.capacity());
            }
        });
    }
}
