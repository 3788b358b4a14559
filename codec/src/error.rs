//! Error types for codec operations.

use std::fmt;

use buffer::BufError;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during message encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Byte-level buffer error not covered by a more specific variant.
    Buffer(BufError),

    /// Fewer bytes remain than the message or field requires.
    OutOfBounds { needed: usize, available: usize },

    /// A tag byte does not match the descriptor being decoded against.
    TypeMismatch { expected: u8, found: u8 },

    /// The value does not have the shape the descriptor expects.
    ContractViolation { field: String, reason: ValueReason },

    /// Message size limit exceeded.
    LimitsExceeded { limit: usize, actual: usize },

    /// Caller-provided output is too small.
    OutputTooSmall { needed: usize, available: usize },
}

/// Details for contract violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueReason {
    /// A required field has no value.
    MissingField,
    /// The value has a field the descriptor does not declare.
    UnknownField,
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    FixedArrayLength {
        expected: usize,
        actual: usize,
    },
    /// A dynamic array has more elements than its count prefix can hold.
    ArrayTooLong {
        len: usize,
    },
    /// A string is longer than its length prefix can hold.
    StringTooLong {
        len: usize,
    },
    UnencodableChar {
        ch: char,
    },
    UnknownFlag {
        flag: String,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffer(e) => write!(f, "buffer error: {e}"),
            Self::OutOfBounds { needed, available } => {
                write!(f, "out of bounds: need {needed} bytes, have {available}")
            }
            Self::TypeMismatch { expected, found } => {
                write!(f, "type tag mismatch: expected {expected}, found {found}")
            }
            Self::ContractViolation { field, reason } => {
                write!(f, "invalid value for field {field:?}: {reason}")
            }
            Self::LimitsExceeded { limit, actual } => {
                write!(f, "message bytes limit exceeded: {actual} > {limit}")
            }
            Self::OutputTooSmall { needed, available } => {
                write!(f, "output too small: need {needed}, have {available}")
            }
        }
    }
}

impl fmt::Display for ValueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField => write!(f, "required field is missing"),
            Self::UnknownField => write!(f, "field is not declared by the message"),
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected {expected} but got {found}")
            }
            Self::FixedArrayLength { expected, actual } => {
                write!(f, "expected {expected} elements, got {actual}")
            }
            Self::ArrayTooLong { len } => {
                write!(f, "dynamic array of {len} elements exceeds 255")
            }
            Self::StringTooLong { len } => {
                write!(f, "string of {len} characters exceeds 65535")
            }
            Self::UnencodableChar { ch } => {
                write!(f, "character {ch:?} is not a single octet")
            }
            Self::UnknownFlag { flag } => write!(f, "unknown flag {flag:?}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Buffer(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BufError> for CodecError {
    fn from(err: BufError) -> Self {
        match err {
            BufError::UnexpectedEof {
                requested,
                available,
            } => Self::OutOfBounds {
                needed: requested,
                available,
            },
            BufError::CapacityExceeded { requested, max } => Self::OutputTooSmall {
                needed: requested,
                available: max,
            },
            other => Self::Buffer(other),
        }
    }
}
