//! Error types for buffer operations.

use std::fmt;

/// Result type for buffer operations.
pub type BufResult<T> = Result<T, BufError>;

/// Errors that can occur during byte-level reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufError {
    /// Attempted to read past the readable limit.
    UnexpectedEof {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// Attempted to write outside the buffer's current capacity.
    OutOfRange {
        /// Offset of the write.
        offset: usize,
        /// Number of bytes written at `offset`.
        len: usize,
        /// Current capacity in bytes.
        capacity: usize,
    },

    /// The backend cannot grow to the requested capacity.
    CapacityExceeded {
        /// Capacity that was requested.
        requested: usize,
        /// Maximum capacity the backend can provide.
        max: usize,
    },

    /// A character cannot be represented as a single octet.
    UnencodableChar {
        /// The offending character.
        ch: char,
    },
}

impl fmt::Display for BufError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bytes but only {available} bytes available"
                )
            }
            Self::OutOfRange {
                offset,
                len,
                capacity,
            } => {
                write!(
                    f,
                    "write of {len} bytes at offset {offset} exceeds capacity {capacity}"
                )
            }
            Self::CapacityExceeded { requested, max } => {
                write!(
                    f,
                    "cannot grow buffer to {requested} bytes, maximum is {max}"
                )
            }
            Self::UnencodableChar { ch } => {
                write!(
                    f,
                    "character {ch:?} (U+{:04X}) is not a single-octet character",
                    u32::from(*ch)
                )
            }
        }
    }
}

impl std::error::Error for BufError {}
