//! Construction parameters for a framer.

use crate::error::{Error, Result};
use crate::scratch::STACK_SCRATCH_THRESHOLD;
use crate::search::Delimiter;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default ring capacity in bytes.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Parameters for building a `LineFramer` or `SharedFramer`.
///
/// ```rust
/// use linestream::FramerConfig;
///
/// let config = FramerConfig::crlf().with_capacity(256);
/// assert!(config.validate().is_ok());
/// assert!(FramerConfig::lines().with_delimiter(b"").validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FramerConfig {
    /// Ring buffer size in bytes. Frames longer than this are always truncated.
    pub capacity: usize,
    /// Frame terminator; must be non-empty.
    pub delimiter: Vec<u8>,
    /// Wrap-crossing frames up to this length are linearized on the stack.
    /// Values above `STACK_SCRATCH_THRESHOLD` are rejected.
    pub stack_scratch_limit: usize,
}

impl Default for FramerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            delimiter: vec![b'\n'],
            stack_scratch_limit: STACK_SCRATCH_THRESHOLD,
        }
    }
}

impl FramerConfig {
    /// `\n`-terminated lines with the default capacity.
    pub fn lines() -> Self {
        Self::default()
    }

    /// `\r\n`-terminated lines with the default capacity.
    pub fn crlf() -> Self {
        Self {
            delimiter: b"\r\n".to_vec(),
            ..Self::default()
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl AsRef<[u8]>) -> Self {
        self.delimiter = delimiter.as_ref().to_vec();
        self
    }

    pub fn with_stack_scratch_limit(mut self, limit: usize) -> Self {
        self.stack_scratch_limit = limit;
        self
    }

    /// Checks every field; the same checks run when a framer is built.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        if self.delimiter.is_empty() {
            return Err(Error::EmptyDelimiter);
        }
        if self.stack_scratch_limit > STACK_SCRATCH_THRESHOLD {
            return Err(Error::invalid_config(format!(
                "stack_scratch_limit {} exceeds the {} byte stack region",
                self.stack_scratch_limit, STACK_SCRATCH_THRESHOLD
            )));
        }
        Ok(())
    }

    pub(crate) fn delimiter(&self) -> Result<Delimiter> {
        Delimiter::new(&self.delimiter)
    }
}
