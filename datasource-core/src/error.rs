//! Error types for data sources

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for data source operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error produced by a user-supplied generator
pub type GeneratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for data source operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed construction input or call arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The path could not be opened for reading
    #[error("Cannot open {}: {source}", .path.display())]
    CannotOpen {
        /// Path that failed to open
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A stream-backed source reached the end of its input
    #[error("End of stream")]
    EndOfStream,

    /// An array-backed source was read past its last element
    #[error("Index {index} out of range for source of length {len}")]
    OutOfRange {
        /// Cursor position at the time of the read
        index: usize,
        /// Number of elements in the source
        len: usize,
    },

    /// A token could not be converted to the target type
    #[error("Failed to parse token {token:?}: {reason}")]
    ParseFailure {
        /// The offending token
        token: String,
        /// Conversion error message
        reason: String,
    },

    /// The stream is in a failed state from an earlier read and must be reset
    #[error("Stream is in a failed state")]
    StreamFailed,

    /// IO error during a read or seek
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A generator callable failed
    #[error("Generator failed: {0}")]
    Generator(#[source] GeneratorError),
}

impl Error {
    /// Wrap an arbitrary error raised by a generator
    pub fn generator<E>(err: E) -> Self
    where
        E: Into<GeneratorError>,
    {
        Error::Generator(err.into())
    }

    /// Whether this error signals exhaustion of a finite source
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Error::EndOfStream | Error::OutOfRange { .. })
    }
}
