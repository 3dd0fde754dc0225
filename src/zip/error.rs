//! Error types for archive decoding.
//!
//! Failures are split so a caller can tell "corrupt" (`Format`) apart from
//! "valid but not something this reader handles" (`Unsupported`).

use std::io;
use thiserror::Error;

/// The error type for every archive operation.
#[derive(Debug, Error)]
pub enum ZipError {
    /// Malformed structure: bad signature, inconsistent offsets or sizes,
    /// or a record cut short by the end of the source.
    #[error("invalid ZIP archive: {0}")]
    Format(String),

    /// Well-formed but outside what this reader handles (Zip64, multi-disk,
    /// encryption, unknown compression methods).
    #[error("unsupported ZIP feature: {0}")]
    Unsupported(String),

    /// Failure reported by the underlying byte source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A deflated member's stream is internally inconsistent.
    #[error("decompression failed: {0}")]
    Decompression(String),

    /// No member with the given name or index.
    #[error("member not found: {0}")]
    NotFound(String),

    /// A member stream was read while closed.
    #[error("member stream is not open")]
    NotOpen,

    /// A member name would be written outside the extraction root.
    #[error("refusing to extract unsafe path: {0}")]
    UnsafePath(String),
}

/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, ZipError>;

impl ZipError {
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    pub fn decompression(message: impl Into<String>) -> Self {
        Self::Decompression(message.into())
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    pub fn is_decompression(&self) -> bool {
        matches!(self, Self::Decompression(_))
    }

    /// Recover a `ZipError` that crossed an `io::Read` boundary.
    ///
    /// Errors that did not originate here come back as `Io`.
    pub fn from_io(err: io::Error) -> Self {
        match err.downcast::<ZipError>() {
            Ok(zip) => zip,
            Err(err) => Self::Io(err),
        }
    }
}

impl From<ZipError> for io::Error {
    fn from(err: ZipError) -> Self {
        match err {
            ZipError::Io(inner) => inner,
            ZipError::NotFound(_) => io::Error::new(io::ErrorKind::NotFound, err),
            ZipError::NotOpen => io::Error::other(err),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
