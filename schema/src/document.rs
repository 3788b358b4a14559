//! Serializable schema documents.
//!
//! A document lists messages in declaration order. A field is written as a
//! type name (`"uint8"`, `"string"`, or a previously declared message), or
//! as an object for arrays, flag sets, and optional messages:
//!
//! ```json
//! {
//!   "messages": [
//!     { "name": "Point", "tag": 1, "fields": { "x": "int32", "y": "int32" } },
//!     { "name": "Path", "tag": 2, "fields": {
//!         "points": { "array": "Point" },
//!         "grid": { "array": "uint8", "length": 4 },
//!         "state": { "flags": ["open", "dirty"] },
//!         "origin": { "optional": "Point" },
//!         "label": "string"
//!     } }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};
use crate::{Definition, Element, FieldKind, FieldTag, MessageDescriptor, SchemaSet, TypeTag};

const STRING_TYPE: &str = "string";

/// A list of message declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub messages: Vec<MessageDocument>,
}

/// One message declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDocument {
    pub name: String,
    pub tag: i64,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDocument>,
}

/// One field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldDocument {
    /// A primitive name, `"string"`, or a message name.
    Named(String),
    /// A dynamic array, or a fixed array when `length` is present.
    Array {
        array: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<i64>,
    },
    /// A flag set.
    Flags { flags: Vec<String> },
    /// An optional message.
    Optional { optional: String },
}

impl SchemaDocument {
    /// Compiles every message, in order, into a [`SchemaSet`].
    ///
    /// Message references resolve against messages declared earlier in the
    /// document.
    pub fn resolve(&self) -> SchemaResult<SchemaSet> {
        let mut set = SchemaSet::new();
        for message in &self.messages {
            let tag = TypeTag::try_from(message.tag)?;
            let mut definition = Definition::new();
            for (field, doc) in &message.fields {
                definition = definition.field(field.clone(), resolve_field(&set, field, doc)?);
            }
            let desc = MessageDescriptor::compile(tag.get(), definition)?;
            set.insert(message.name.clone(), desc)?;
        }
        Ok(set)
    }
}

fn resolve_field(set: &SchemaSet, field: &str, doc: &FieldDocument) -> SchemaResult<FieldKind> {
    match doc {
        FieldDocument::Named(name) => Ok(match resolve_element(set, field, name)? {
            Element::Primitive(tag) => FieldKind::Primitive(tag),
            Element::Message(desc) => FieldKind::Message(desc),
            Element::String => FieldKind::String,
        }),
        FieldDocument::Array { array, length } => {
            let element = resolve_element(set, field, array)?;
            match length {
                Some(len) => FieldKind::fixed_array_checked(element, *len),
                None => Ok(FieldKind::DynamicArray(element)),
            }
        }
        FieldDocument::Flags { flags } => Ok(FieldKind::Flags(flags.clone())),
        FieldDocument::Optional { optional } => {
            Ok(FieldKind::Optional(resolve_message(set, field, optional)?))
        }
    }
}

fn resolve_element(set: &SchemaSet, field: &str, name: &str) -> SchemaResult<Element> {
    if name == STRING_TYPE {
        return Ok(Element::String);
    }
    if let Some(tag) = FieldTag::from_name(name) {
        return Ok(Element::Primitive(tag));
    }
    resolve_message(set, field, name).map(Element::Message)
}

fn resolve_message(
    set: &SchemaSet,
    field: &str,
    name: &str,
) -> SchemaResult<Arc<MessageDescriptor>> {
    set.get(name)
        .cloned()
        .ok_or_else(|| SchemaError::UnknownMessage {
            field: field.to_string(),
            name: name.to_string(),
        })
}
