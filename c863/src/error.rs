//! Error types for c863.

use std::io;
use thiserror::Error;

/// Result type for c863 operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for c863 operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error on the serial line.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serial port error.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// The device could not be opened or configured.
    #[error("Could not open {path}: {source}")]
    Open {
        /// Device path that was requested.
        path: String,
        /// Underlying cause.
        #[source]
        source: Box<Error>,
    },

    /// Another line is already open in this process.
    #[error("A serial line is already open; cannot open {0}")]
    Busy(String),

    /// Operation attempted on a line that was closed or released.
    #[error("Serial line is closed")]
    LineClosed,

    /// Command text that cannot be framed.
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap an error as an open failure for `path`.
    pub(crate) fn open(path: &str, source: impl Into<Error>) -> Self {
        Self::Open {
            path: path.to_string(),
            source: Box::new(source.into()),
        }
    }
}
