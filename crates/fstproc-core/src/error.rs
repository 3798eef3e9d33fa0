//! Shared low-level error type.

use std::io;

/// Result alias used throughout the codec layer.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while reading or writing the byte-level container format.
///
/// Higher layers (`fstproc-container`, `fstproc-transducer`) wrap this in
/// their own, more specific error enums via `#[from]`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The stream ended before a multibyte integer or a string payload
    /// could be fully read.
    #[error("truncated container: needed {needed} more byte(s) at offset {at}")]
    Truncated {
        /// Bytes still required to finish the pending read.
        needed: usize,
        /// Byte offset (since the start of this read) where the read gave up.
        at: u64,
    },

    /// A multibyte integer decoded to a value that does not fit in `u32`.
    #[error("varint overflows 32 bits")]
    VarintOverflow,

    /// A length-prefixed UTF-16 string did not decode to valid text.
    #[error("invalid UTF-16 string data")]
    InvalidUtf16,

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
