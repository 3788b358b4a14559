//! Named collections of descriptors sharing one tag namespace.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{SchemaError, SchemaResult};
use crate::{MessageDescriptor, TypeTag};

/// Descriptors that must be distinguishable by type tag in one context.
///
/// Names and type tags are unique within a set. Iteration follows
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    messages: Vec<(String, Arc<MessageDescriptor>)>,
    by_name: BTreeMap<String, usize>,
    by_tag: BTreeMap<TypeTag, usize>,
}

impl SchemaSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named descriptor.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        desc: Arc<MessageDescriptor>,
    ) -> SchemaResult<()> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(SchemaError::DuplicateMessage { name });
        }
        let tag = desc.type_tag();
        if let Some(&idx) = self.by_tag.get(&tag) {
            return Err(SchemaError::DuplicateTypeTag {
                tag: tag.get(),
                first: self.messages[idx].0.clone(),
                second: name,
            });
        }

        let idx = self.messages.len();
        self.by_name.insert(name.clone(), idx);
        self.by_tag.insert(tag, idx);
        self.messages.push((name, desc));
        Ok(())
    }

    /// Looks up a descriptor by message name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<MessageDescriptor>> {
        self.by_name.get(name).map(|&idx| &self.messages[idx].1)
    }

    /// Looks up a message by type tag.
    #[must_use]
    pub fn by_tag(&self, tag: TypeTag) -> Option<(&str, &Arc<MessageDescriptor>)> {
        self.by_tag.get(&tag).map(|&idx| {
            let (name, desc) = &self.messages[idx];
            (name.as_str(), desc)
        })
    }

    /// Iterates `(name, descriptor)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<MessageDescriptor>)> {
        self.messages.iter().map(|(name, desc)| (name.as_str(), desc))
    }

    /// Returns the number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the set holds no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Definition, FieldTag};

    fn desc(tag: u8) -> Arc<MessageDescriptor> {
        MessageDescriptor::compile(tag, Definition::new().field("v", FieldTag::UInt8)).unwrap()
    }

    #[test]
    fn insert_and_lookup() {
        let mut set = SchemaSet::new();
        set.insert("Ping", desc(1)).unwrap();
        set.insert("Pong", desc(2)).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("Pong").unwrap().type_tag().get(), 2);
        let (name, _) = set.by_tag(TypeTag::from(1)).unwrap();
        assert_eq!(name, "Ping");
        assert!(set.by_tag(TypeTag::from(3)).is_none());
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut set = SchemaSet::new();
        set.insert("Zed", desc(1)).unwrap();
        set.insert("Abe", desc(2)).unwrap();
        let names: Vec<&str> = set.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Zed", "Abe"]);
    }

    #[test]
    fn rejects_duplicate_tag() {
        let mut set = SchemaSet::new();
        set.insert("Ping", desc(1)).unwrap();
        let err = set.insert("Pong", desc(1)).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateTypeTag {
                tag: 1,
                first: "Ping".to_string(),
                second: "Pong".to_string(),
            }
        );
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn rejects_duplicate_name() {
        let mut set = SchemaSet::new();
        set.insert("Ping", desc(1)).unwrap();
        let err = set.insert("Ping", desc(2)).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateMessage { .. }));
        assert!(SchemaSet::new().is_empty());
    }
}
