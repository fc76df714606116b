//! Error types for local-header scanning and entry extraction.

use thiserror::Error;
use time::OffsetDateTime;

/// Every failure the scanner or the entry opener can report.
#[derive(Debug, Error)]
pub enum ZipError {
    /// An error from the underlying stream or the inflate decoder.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A fixed-width field decoder was handed the wrong number of bytes.
    #[error("Malformed fixed field: expected {expected} bytes, got {actual}")]
    MalformedFixedField { expected: usize, actual: usize },

    /// The record at `offset` starts with neither the local header nor the
    /// central directory signature.
    #[error("Invalid signature {found:02x?} at offset {offset}")]
    InvalidSignature { offset: u64, found: [u8; 4] },

    /// Only stored (0) and deflated (8) entries are supported.
    #[error("Unsupported compression method: {0}")]
    UnsupportedCompressionMethod(u16),

    /// The stream ended before `expected` bytes of `context` were available.
    #[error("Short read in {context}: expected {expected} bytes, got {actual}")]
    ShortRead {
        context: &'static str,
        expected: u64,
        actual: u64,
    },

    /// A modification time later than the current clock (strict mode).
    #[error("Modification time {0} lies in the future")]
    FutureTimestamp(OffsetDateTime),

    /// A packed date or time component is out of range (strict mode).
    #[error("Invalid {field} in MS-DOS timestamp: {value}")]
    InvalidDateRange { field: &'static str, value: u16 },

    /// Decompressed content would exceed the configured bound.
    #[error("Entry size {size} exceeds the limit of {limit} bytes")]
    SizeLimitExceeded { size: u64, limit: u64 },

    #[error("Checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// Decompressed length differs from the size recorded in the header.
    #[error("Size mismatch: header declares {expected} bytes, content has {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    /// A local header with a zero-length name (strict mode).
    #[error("Local header at offset {offset} has an empty file name")]
    EmptyName { offset: u64 },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ZipError>;
