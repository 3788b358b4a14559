//! Field tags, type tags, and field kinds.

use std::fmt;
use std::sync::Arc;

use crate::error::{SchemaError, SchemaResult};
use crate::MessageDescriptor;

/// A fixed-width primitive kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldTag {
    UInt8,
    UInt16,
    UInt32,
    Int8,
    Int16,
    Int32,
    Float32,
    Float64,
}

#[derive(Debug, Clone, Copy)]
struct TagInfo {
    name: &'static str,
    width: usize,
}

/// Registry table indexed by [`FieldTag::ordinal`].
const TAG_TABLE: [TagInfo; 8] = [
    TagInfo { name: "uint8", width: 1 },
    TagInfo { name: "uint16", width: 2 },
    TagInfo { name: "uint32", width: 4 },
    TagInfo { name: "int8", width: 1 },
    TagInfo { name: "int16", width: 2 },
    TagInfo { name: "int32", width: 4 },
    TagInfo { name: "float32", width: 4 },
    TagInfo { name: "float64", width: 8 },
];

impl FieldTag {
    /// Every tag, in ordinal order.
    pub const ALL: [Self; 8] = [
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Float32,
        Self::Float64,
    ];

    /// Returns the tag's index into the registry table.
    #[must_use]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// Returns the number of bytes a value of this tag occupies on the wire.
    #[must_use]
    pub const fn byte_width(self) -> usize {
        TAG_TABLE[self.ordinal()].width
    }

    /// Returns the canonical lowercase name (`"uint8"`, `"float64"`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        TAG_TABLE[self.ordinal()].name
    }

    /// Looks up a tag by its canonical name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.name() == name)
    }
}

impl fmt::Display for FieldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A message's one-byte type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TypeTag(u8);

impl TypeTag {
    /// Creates a type tag, failing if `value` is outside `[0, 255]`.
    pub fn new(value: u32) -> SchemaResult<Self> {
        u8::try_from(value)
            .map(Self)
            .map_err(|_| SchemaError::InvalidTypeTag {
                value: i64::from(value),
            })
    }

    /// Returns the raw tag byte.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<u8> for TypeTag {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<TypeTag> for u8 {
    fn from(tag: TypeTag) -> Self {
        tag.0
    }
}

impl TryFrom<i64> for TypeTag {
    type Error = SchemaError;

    fn try_from(value: i64) -> SchemaResult<Self> {
        u8::try_from(value)
            .map(Self)
            .map_err(|_| SchemaError::InvalidTypeTag { value })
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The element type of an array field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// A fixed-width primitive.
    Primitive(FieldTag),
    /// A nested message; each element carries its own type tag.
    Message(Arc<MessageDescriptor>),
    /// A length-prefixed single-octet string.
    String,
}

impl Element {
    /// Minimum wire size of one element.
    #[must_use]
    pub fn min_size(&self) -> usize {
        match self {
            Self::Primitive(tag) => tag.byte_width(),
            Self::Message(desc) => desc.minimum_byte_length(),
            Self::String => 2,
        }
    }

    /// Returns `true` if every element has the same, statically known size.
    #[must_use]
    pub fn is_fixed_size(&self) -> bool {
        match self {
            Self::Primitive(_) => true,
            Self::Message(desc) => desc.is_fixed_size(),
            Self::String => false,
        }
    }

    /// Returns `true` if the element is or transitively contains a string.
    #[must_use]
    pub fn contains_strings(&self) -> bool {
        match self {
            Self::Primitive(_) => false,
            Self::Message(desc) => desc.contains_strings(),
            Self::String => true,
        }
    }
}

impl From<FieldTag> for Element {
    fn from(tag: FieldTag) -> Self {
        Self::Primitive(tag)
    }
}

impl From<Arc<MessageDescriptor>> for Element {
    fn from(desc: Arc<MessageDescriptor>) -> Self {
        Self::Message(desc)
    }
}

/// The kind of one field in a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// A fixed-width primitive.
    Primitive(FieldTag),
    /// Exactly `len` elements with no length prefix.
    FixedArray { element: Element, len: usize },
    /// A one-byte count (0..=255) followed by that many elements.
    DynamicArray(Element),
    /// Up to eight named booleans packed into one byte.
    Flags(Vec<String>),
    /// A two-byte length followed by single-octet characters.
    String,
    /// A presence byte, then the wrapped message if present.
    Optional(Arc<MessageDescriptor>),
    /// A required nested message, inline.
    Message(Arc<MessageDescriptor>),
}

impl FieldKind {
    /// Creates a primitive field kind.
    #[must_use]
    pub const fn primitive(tag: FieldTag) -> Self {
        Self::Primitive(tag)
    }

    /// Creates a nested message field kind.
    #[must_use]
    pub fn message(desc: &Arc<MessageDescriptor>) -> Self {
        Self::Message(Arc::clone(desc))
    }

    /// Creates an optional message field kind.
    #[must_use]
    pub fn optional(desc: &Arc<MessageDescriptor>) -> Self {
        Self::Optional(Arc::clone(desc))
    }

    /// Creates a dynamic array field kind.
    #[must_use]
    pub fn dynamic_array(element: impl Into<Element>) -> Self {
        Self::DynamicArray(element.into())
    }

    /// Creates a fixed array field kind.
    #[must_use]
    pub fn fixed_array(element: impl Into<Element>, len: usize) -> Self {
        Self::FixedArray {
            element: element.into(),
            len,
        }
    }

    /// Creates a fixed array field kind from an untrusted length.
    pub fn fixed_array_checked(element: impl Into<Element>, len: i64) -> SchemaResult<Self> {
        let len = u32::try_from(len)
            .ok()
            .and_then(|len| usize::try_from(len).ok())
            .ok_or(SchemaError::InvalidFixedArrayLength { length: len })?;
        Ok(Self::fixed_array(element, len))
    }

    /// Creates a flag set field kind.
    #[must_use]
    pub fn flags<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Flags(names.into_iter().map(Into::into).collect())
    }

    /// Creates a string field kind.
    #[must_use]
    pub const fn string() -> Self {
        Self::String
    }

    /// Minimum wire size of this field.
    ///
    /// Saturates instead of overflowing; the compiler rejects layouts whose
    /// minimum does not fit a 32-bit length.
    #[must_use]
    pub fn min_size(&self) -> usize {
        match self {
            Self::Primitive(tag) => tag.byte_width(),
            Self::FixedArray { element, len } => element.min_size().saturating_mul(*len),
            Self::DynamicArray(_) | Self::Flags(_) | Self::Optional(_) => 1,
            Self::String => 2,
            Self::Message(desc) => desc.minimum_byte_length(),
        }
    }

    /// Returns `true` if the field always occupies exactly [`min_size`](Self::min_size) bytes.
    #[must_use]
    pub fn is_fixed_size(&self) -> bool {
        match self {
            Self::Primitive(_) | Self::Flags(_) => true,
            Self::FixedArray { element, .. } => element.is_fixed_size(),
            Self::DynamicArray(_) | Self::String | Self::Optional(_) => false,
            Self::Message(desc) => desc.is_fixed_size(),
        }
    }
}

impl From<FieldTag> for FieldKind {
    fn from(tag: FieldTag) -> Self {
        Self::Primitive(tag)
    }
}
