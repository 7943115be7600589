//! Counters and gauges describing a framer's lifetime.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A consistent snapshot of a framer's counters.
///
/// Counters never decrease. `peak_buffer_usage` is a high-water mark that survives
/// `discard_buffer`. `current_buffer_usage` and `capacity` describe the ring at the
/// moment the snapshot was taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Statistics {
    /// Non-empty frames delivered to the handler.
    pub lines_received: u64,
    /// Bytes pulled from the source into the ring.
    pub bytes_received: u64,
    /// Number of `feed` calls that had to evict data.
    pub overflow_count: u64,
    /// Bytes lost to overflow eviction and to `discard_buffer`.
    pub bytes_discarded_by_overflow: u64,
    /// Zero-length frames that were consumed without a callback.
    pub empty_lines_skipped: u64,
    /// Calls to `discard_buffer`, including ones on an empty buffer.
    pub manual_discard_count: u64,
    /// Highest `current_buffer_usage` ever observed.
    pub peak_buffer_usage: usize,
    /// Bytes buffered when the snapshot was taken.
    pub current_buffer_usage: usize,
    /// Ring size in bytes.
    pub capacity: usize,
}

impl Statistics {
    /// Fraction of the ring currently occupied, in `[0.0, 1.0]`.
    pub fn usage_rate(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.current_buffer_usage as f64 / self.capacity as f64
    }

    /// Fraction of the ring occupied at the high-water mark.
    pub fn peak_usage_rate(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.peak_buffer_usage as f64 / self.capacity as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_rate_of_half_full_ring() {
        let stats = Statistics {
            current_buffer_usage: 25,
            peak_buffer_usage: 40,
            capacity: 50,
            ..Default::default()
        };
        assert!((stats.usage_rate() - 0.5).abs() < f64::EPSILON);
        assert!((stats.peak_usage_rate() - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn default_snapshot_reports_zero_usage() {
        assert_eq!(Statistics::default().usage_rate(), 0.0);
    }
}
