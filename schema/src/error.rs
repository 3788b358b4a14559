//! Schema compilation errors.

use std::fmt;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur when declaring or compiling a message type.
///
/// All of these are raised once, when a message type is declared, and are
/// fatal to that declaration. Encode and decode never produce them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Type tag is not an integer in `[0, 255]`.
    InvalidTypeTag { value: i64 },

    /// Fixed-array length is negative or not representable.
    InvalidFixedArrayLength { length: i64 },

    /// Flag set declares more than eight flags.
    TooManyFlags { field: String, count: usize },

    /// Flag set declares the same flag name twice.
    DuplicateFlag { field: String, flag: String },

    /// Definition declares the same field name twice.
    DuplicateField { field: String },

    /// Minimum wire size no longer fits a 32-bit byte length.
    LayoutTooLarge { field: String, minimum: u64 },

    /// Two messages in one set share a name.
    DuplicateMessage { name: String },

    /// Two messages in one set share a type tag.
    DuplicateTypeTag {
        tag: u8,
        first: String,
        second: String,
    },

    /// A field references a message that has not been declared.
    UnknownMessage { field: String, name: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTypeTag { value } => {
                write!(f, "invalid type tag {value}, must be in [0, 255]")
            }
            Self::InvalidFixedArrayLength { length } => {
                write!(f, "invalid fixed array length {length}")
            }
            Self::TooManyFlags { field, count } => {
                write!(f, "flag set {field:?} declares {count} flags, maximum is 8")
            }
            Self::DuplicateFlag { field, flag } => {
                write!(f, "flag set {field:?} declares flag {flag:?} twice")
            }
            Self::DuplicateField { field } => {
                write!(f, "field {field:?} declared twice")
            }
            Self::LayoutTooLarge { field, minimum } => {
                write!(
                    f,
                    "minimum size {minimum} bytes at field {field:?} exceeds a 32-bit length"
                )
            }
            Self::DuplicateMessage { name } => {
                write!(f, "message {name:?} declared twice")
            }
            Self::DuplicateTypeTag { tag, first, second } => {
                write!(
                    f,
                    "type tag {tag} used by both {first:?} and {second:?}"
                )
            }
            Self::UnknownMessage { field, name } => {
                write!(f, "field {field:?} references unknown message {name:?}")
            }
        }
    }
}

impl std::error::Error for SchemaError {}
