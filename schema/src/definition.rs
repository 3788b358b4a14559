//! Message definitions.

use crate::FieldKind;

/// A declarative field layout for one message type.
///
/// Field order here is irrelevant to the wire format: the compiler sorts
/// fields by name so independent declarations of the same fields always
/// produce the same layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definition {
    fields: Vec<(String, FieldKind)>,
}

impl Definition {
    /// Creates an empty definition.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Adds a field to the definition.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, kind: impl Into<FieldKind>) -> Self {
        self.fields.push((name.into(), kind.into()));
        self
    }

    /// Returns the number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no fields are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldKind)> {
        self.fields.iter().map(|(name, kind)| (name.as_str(), kind))
    }

    pub(crate) fn into_fields(self) -> Vec<(String, FieldKind)> {
        self.fields
    }
}

impl<S: Into<String>> FromIterator<(S, FieldKind)> for Definition {
    fn from_iter<I: IntoIterator<Item = (S, FieldKind)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, kind)| (name.into(), kind))
                .collect(),
        }
    }
}
