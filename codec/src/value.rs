//! In-memory message values.

use std::collections::BTreeMap;

use crate::error::{CodecError, CodecResult, ValueReason};

/// A decoded or to-be-encoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    I8(i8),
    I16(i16),
    I32(i32),
    F32(f32),
    F64(f64),
    Str(String),
    Array(Vec<Value>),
    Flags(FlagSet),
    Message(Message),
}

impl Value {
    /// Returns a short name for the value's variant.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::U8(_) => "uint8",
            Self::U16(_) => "uint16",
            Self::U32(_) => "uint32",
            Self::I8(_) => "int8",
            Self::I16(_) => "int16",
            Self::I32(_) => "int32",
            Self::F32(_) => "float32",
            Self::F64(_) => "float64",
            Self::Str(_) => "string",
            Self::Array(_) => "array",
            Self::Flags(_) => "flags",
            Self::Message(_) => "message",
        }
    }

    /// Returns the nested message, if this is one.
    #[must_use]
    pub const fn as_message(&self) -> Option<&Message> {
        match self {
            Self::Message(message) => Some(message),
            _ => None,
        }
    }

    /// Returns the array elements, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the flag set, if this is one.
    #[must_use]
    pub const fn as_flags(&self) -> Option<&FlagSet> {
        match self {
            Self::Flags(flags) => Some(flags),
            _ => None,
        }
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_primitive!(
    u8 => U8,
    u16 => U16,
    u32 => U32,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    f32 => F32,
    f64 => F64,
);

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<Message> for Value {
    fn from(value: Message) -> Self {
        Self::Message(value)
    }
}

impl From<FlagSet> for Value {
    fn from(value: FlagSet) -> Self {
        Self::Flags(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

/// A message's fields, keyed by name.
///
/// Iteration is in name order, which matches wire order. An absent optional
/// field is represented by leaving its key out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    fields: BTreeMap<String, Value>,
}

impl Message {
    /// Creates an empty message.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Sets a field, returning the message.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a field, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Removes a field.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Returns a field's value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns `true` if the field is set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns the number of set fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no fields are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<S: Into<String>, V: Into<Value>> FromIterator<(S, V)> for Message {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Named booleans of a flag-set field.
///
/// Flags that are not set read as `false`. Equality compares only the flags
/// that are `true`, so a sparse set equals its decoded form.
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    flags: BTreeMap<String, bool>,
}

impl FlagSet {
    /// Creates an empty flag set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            flags: BTreeMap::new(),
        }
    }

    /// Sets a flag, returning the set.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, on: bool) -> Self {
        self.set(name, on);
        self
    }

    /// Sets a flag.
    pub fn set(&mut self, name: impl Into<String>, on: bool) {
        self.flags.insert(name.into(), on);
    }

    /// Returns a flag's state.
    #[must_use]
    pub fn get(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Iterates explicitly set flags in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(name, on)| (name.as_str(), *on))
    }

    /// Returns the number of explicitly set flags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Returns `true` if no flags are explicitly set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl FlagSet {
    fn raised(&self) -> impl Iterator<Item = &str> {
        self.iter().filter_map(|(name, on)| on.then_some(name))
    }
}

impl PartialEq for FlagSet {
    fn eq(&self, other: &Self) -> bool {
        self.raised().eq(other.raised())
    }
}

impl Eq for FlagSet {}

impl<S: Into<String>> FromIterator<(S, bool)> for FlagSet {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        Self {
            flags: iter
                .into_iter()
                .map(|(name, on)| (name.into(), on))
                .collect(),
        }
    }
}

pub(crate) fn violation(field: &str, reason: ValueReason) -> CodecError {
    CodecError::ContractViolation {
        field: field.to_string(),
        reason,
    }
}

fn mismatch(field: &str, expected: &'static str, found: &Value) -> CodecError {
    violation(
        field,
        ValueReason::TypeMismatch {
            expected,
            found: found.kind_name(),
        },
    )
}

pub(crate) fn required<'m>(message: &'m Message, field: &str) -> CodecResult<&'m Value> {
    message
        .get(field)
        .ok_or_else(|| violation(field, ValueReason::MissingField))
}

pub(crate) fn expect_message<'v>(value: &'v Value, field: &str) -> CodecResult<&'v Message> {
    value
        .as_message()
        .ok_or_else(|| mismatch(field, "message", value))
}

pub(crate) fn expect_array<'v>(value: &'v Value, field: &str) -> CodecResult<&'v [Value]> {
    value.as_array().ok_or_else(|| mismatch(field, "array", value))
}

pub(crate) fn expect_fixed_array<'v>(
    value: &'v Value,
    field: &str,
    len: usize,
) -> CodecResult<&'v [Value]> {
    let items = expect_array(value, field)?;
    if items.len() != len {
        return Err(violation(
            field,
            ValueReason::FixedArrayLength {
                expected: len,
                actual: items.len(),
            },
        ));
    }
    Ok(items)
}

pub(crate) fn expect_str<'v>(value: &'v Value, field: &str) -> CodecResult<&'v str> {
    value.as_str().ok_or_else(|| mismatch(field, "string", value))
}

pub(crate) fn expect_flags<'v>(value: &'v Value, field: &str) -> CodecResult<&'v FlagSet> {
    value.as_flags().ok_or_else(|| mismatch(field, "flags", value))
}

pub(crate) fn type_mismatch(field: &str, expected: &'static str, found: &Value) -> CodecError {
    mismatch(field, expected, found)
}
