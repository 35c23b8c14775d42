//! Crate-wide error type.
//!
//! Capacity-exceeded bounded compression is deliberately **not** represented
//! here: [`crate::Lz4Compressor::compress_into`] signals it through its zero
//! sentinel return value, because running out of destination space is a
//! normal outcome the caller handles by storing the payload uncompressed.

use thiserror::Error;

/// Errors returned by the LZ4 block codec.
#[derive(Debug, Error)]
pub enum Lz4BlockError {
    /// The compressed stream is malformed: a token, length extension, offset,
    /// or copy would fall outside the declared input/output bounds.
    #[error("corrupt block stream at input byte {offset}: {reason}")]
    CorruptStream {
        /// Input position at which the stream became undecodable.
        offset: usize,
        /// What went wrong at that position.
        reason: &'static str,
    },

    /// Invalid compressor configuration, raised eagerly at construction.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A known-size decompression produced fewer bytes than declared.
    #[error("decompressed size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// I/O failure in a reader- or writer-backed operation.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Lz4BlockError>;
