use thiserror::Error;

/// Custom error types for the linestream library.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying I/O errors reported by a `ByteSource`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A framer was configured with a zero-length delimiter.
    #[error("Delimiter must contain at least one byte")]
    EmptyDelimiter,

    /// A framer was configured with a zero-byte ring buffer.
    #[error("Buffer capacity must be greater than zero")]
    ZeroCapacity,

    /// Configuration rejected for any other reason.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Error raised by a consumer's frame handler and propagated out of `feed`.
    #[error("Frame handler failed: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Create a new `InvalidConfig` error with a descriptive message.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Wrap an arbitrary consumer error so it can be returned from a handler.
    pub fn handler(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Handler(err.into())
    }

    /// Returns true for errors that prevent an engine from being constructed.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Self::EmptyDelimiter | Self::ZeroCapacity | Self::InvalidConfig { .. }
        )
    }
}

/// Result type alias for the library operations.
pub type Result<T> = std::result::Result<T, Error>;
