//! Schema compiler and compiled message descriptors.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::error::{SchemaError, SchemaResult};
use crate::{Definition, Element, FieldKind, TypeTag};

const MAX_FLAGS: usize = 8;

/// Whether, and how, an entry carries string data.
///
/// Lets the encoder size string content before allocating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringContent {
    /// No string data, directly or transitively.
    None,
    /// The entry is a string.
    Direct,
    /// The entry is an array of strings.
    Elements,
    /// The entry holds nested messages that transitively contain strings.
    Nested,
    /// A dynamic array of messages that contain strings. The encoder sizes
    /// it, strings included, when it reaches the array.
    Deferred,
}

impl StringContent {
    fn classify(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::String => Self::Direct,
            FieldKind::FixedArray { element, .. } => match element {
                Element::String => Self::Elements,
                Element::Message(desc) if desc.contains_strings() => Self::Nested,
                Element::Primitive(_) | Element::Message(_) => Self::None,
            },
            FieldKind::DynamicArray(element) => match element {
                Element::String => Self::Elements,
                Element::Message(desc) if desc.contains_strings() => Self::Deferred,
                Element::Primitive(_) | Element::Message(_) => Self::None,
            },
            FieldKind::Message(desc) | FieldKind::Optional(desc) if desc.contains_strings() => {
                Self::Nested
            }
            FieldKind::Primitive(_)
            | FieldKind::Flags(_)
            | FieldKind::Message(_)
            | FieldKind::Optional(_) => Self::None,
        }
    }
}

/// One compiled field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub kind: FieldKind,
    pub strings: StringContent,
}

/// The compiled, immutable layout of one message type.
///
/// Built once per message type and shared by every encode and decode call.
/// Nested message fields share their descriptor through [`Arc`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    type_tag: TypeTag,
    entries: Vec<Entry>,
    minimum_byte_length: usize,
    fixed_size: bool,
    contains_strings: bool,
}

impl MessageDescriptor {
    /// Compiles a definition into a descriptor.
    ///
    /// Entries are ordered by field name (byte-wise lexicographic), not by
    /// declaration order.
    pub fn compile(type_tag: u8, definition: Definition) -> SchemaResult<Arc<Self>> {
        let type_tag = TypeTag::from(type_tag);
        let mut fields = definition.into_fields();
        fields.sort_by(|(a, _), (b, _)| a.cmp(b));

        if let Some(pair) = fields.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(SchemaError::DuplicateField {
                field: pair[0].0.clone(),
            });
        }

        let mut minimum: u64 = 1;
        let mut fixed_size = true;
        let mut contains_strings = false;
        let mut entries = Vec::with_capacity(fields.len());

        for (name, kind) in fields {
            validate_kind(&name, &kind)?;

            minimum = minimum.saturating_add(wire_minimum(&kind));
            if minimum > u64::from(u32::MAX) {
                return Err(SchemaError::LayoutTooLarge {
                    field: name,
                    minimum,
                });
            }

            fixed_size &= kind.is_fixed_size();
            let strings = StringContent::classify(&kind);
            contains_strings |= strings != StringContent::None;
            entries.push(Entry {
                name,
                kind,
                strings,
            });
        }

        let minimum_byte_length = usize::try_from(minimum).map_err(|_| {
            SchemaError::LayoutTooLarge {
                field: entries.last().map(|e| e.name.clone()).unwrap_or_default(),
                minimum,
            }
        })?;

        debug!(
            type_tag = type_tag.get(),
            entries = entries.len(),
            minimum_byte_length,
            fixed_size,
            contains_strings,
            "compiled message descriptor"
        );

        Ok(Arc::new(Self {
            type_tag,
            entries,
            minimum_byte_length,
            fixed_size,
            contains_strings,
        }))
    }

    /// Returns the message's type tag.
    #[must_use]
    pub const fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    /// Returns entries in wire order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Looks up an entry by field name.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries
            .binary_search_by(|entry| entry.name.as_str().cmp(name))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// Minimum encoded size: the tag byte plus each entry's fixed or minimum size.
    #[must_use]
    pub const fn minimum_byte_length(&self) -> usize {
        self.minimum_byte_length
    }

    /// Returns `true` if every encoding is exactly
    /// [`minimum_byte_length`](Self::minimum_byte_length) bytes.
    ///
    /// Selects the encoder's fixed-size path.
    #[must_use]
    pub const fn is_fixed_size(&self) -> bool {
        self.fixed_size
    }

    /// Returns `true` if any entry is or transitively contains a string.
    #[must_use]
    pub const fn contains_strings(&self) -> bool {
        self.contains_strings
    }
}

fn wire_minimum(kind: &FieldKind) -> u64 {
    match kind {
        FieldKind::FixedArray { element, len } => {
            (element.min_size() as u64).saturating_mul(*len as u64)
        }
        other => other.min_size() as u64,
    }
}

fn validate_kind(field: &str, kind: &FieldKind) -> SchemaResult<()> {
    if let FieldKind::Flags(names) = kind {
        if names.len() > MAX_FLAGS {
            return Err(SchemaError::TooManyFlags {
                field: field.to_string(),
                count: names.len(),
            });
        }
        let mut seen = HashSet::new();
        for name in names {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::DuplicateFlag {
                    field: field.to_string(),
                    flag: name.clone(),
                });
            }
        }
    }
    Ok(())
}
