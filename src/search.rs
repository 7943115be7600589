//! Delimiter matching over the (possibly wrapped) contents of a `RingStore`.

use crate::error::{Error, Result};
use crate::ring::RingStore;

/// The fixed byte sequence that terminates a frame.
///
/// Always at least one byte long; immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiter {
    bytes: Box<[u8]>,
}

impl Delimiter {
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self> {
        let bytes = bytes.as_ref();
        if bytes.is_empty() {
            return Err(Error::EmptyDelimiter);
        }
        Ok(Self {
            bytes: bytes.into(),
        })
    }

    /// `\n`
    pub fn line_feed() -> Self {
        Self {
            bytes: Box::new([b'\n']),
        }
    }

    /// `\r\n`
    pub fn crlf() -> Self {
        Self {
            bytes: Box::new([b'\r', b'\n']),
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Finds the first match that starts at or after logical offset `from`.
    ///
    /// Returns the logical offset of the match start. Only matches lying entirely
    /// inside the buffered bytes are reported.
    pub fn find_in(&self, ring: &RingStore, from: usize) -> Option<usize> {
        let count = ring.len();
        if count < self.len() || from > count - self.len() {
            return None;
        }
        let last_start = count - self.len();
        let first = self.bytes[0];

        if self.len() == 1 {
            return position_from(ring, from, first);
        }

        let mut at = from;
        while let Some(candidate) = position_from(ring, at, first) {
            if candidate > last_start {
                return None;
            }
            if self.matches_at(ring, candidate) {
                return Some(candidate);
            }
            at = candidate + 1;
        }
        None
    }

    fn matches_at(&self, ring: &RingStore, start: usize) -> bool {
        self.bytes[1..]
            .iter()
            .enumerate()
            .all(|(k, &b)| ring.byte_at(start + 1 + k) == b)
    }
}

/// Logical offset of the first `byte` at or after `from`, scanning each contiguous run.
fn position_from(ring: &RingStore, from: usize, byte: u8) -> Option<usize> {
    let (front, back) = ring.as_slices();
    if from < front.len() {
        if let Some(pos) = front[from..].iter().position(|&b| b == byte) {
            return Some(from + pos);
        }
    }
    let back_from = from.saturating_sub(front.len());
    if back_from >= back.len() {
        return None;
    }
    back[back_from..]
        .iter()
        .position(|&b| b == byte)
        .map(|pos| front.len() + back_from + pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapped_ring(capacity: usize, skew: usize, content: &[u8]) -> RingStore {
        let mut ring = RingStore::new(capacity).unwrap();
        ring.write(&vec![0xEE; skew]);
        ring.evict_front(skew);
        assert_eq!(ring.write(content), content.len());
        ring
    }

    #[test]
    fn empty_delimiter_is_rejected() {
        assert!(matches!(Delimiter::new(b""), Err(Error::EmptyDelimiter)));
    }

    #[test]
    fn single_byte_across_wrap() {
        let delim = Delimiter::line_feed();
        for skew in 0..10 {
            let ring = wrapped_ring(10, skew, b"abc\ndef\n");
            assert_eq!(delim.find_in(&ring, 0), Some(3), "skew {skew}");
            assert_eq!(delim.find_in(&ring, 4), Some(7), "skew {skew}");
            assert_eq!(delim.find_in(&ring, 8), None, "skew {skew}");
        }
    }

    #[test]
    fn multi_byte_straddling_wrap() {
        let delim = Delimiter::crlf();
        for skew in 0..12 {
            let ring = wrapped_ring(12, skew, b"ab\rc\r\nxy");
            assert_eq!(delim.find_in(&ring, 0), Some(4), "skew {skew}");
            assert_eq!(delim.find_in(&ring, 5), None, "skew {skew}");
        }
    }

    #[test]
    fn partial_match_at_end_is_not_reported() {
        let delim = Delimiter::new(b"END").unwrap();
        let ring = wrapped_ring(16, 5, b"payloadEN");
        assert_eq!(delim.find_in(&ring, 0), None);
    }

    #[test]
    fn overlapping_prefix_candidates() {
        let delim = Delimiter::new(b"aab").unwrap();
        let ring = wrapped_ring(16, 14, b"xaaab");
        assert_eq!(delim.find_in(&ring, 0), Some(2));
    }

    #[test]
    fn search_from_past_last_start() {
        let delim = Delimiter::crlf();
        let ring = wrapped_ring(8, 0, b"\r\n");
        assert_eq!(delim.find_in(&ring, 0), Some(0));
        assert_eq!(delim.find_in(&ring, 1), None);
        assert_eq!(delim.find_in(&ring, 2), None);
    }
}
