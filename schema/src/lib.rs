//! Message definitions and the schema compiler for the tagwire codec.
//!
//! This crate defines how structured messages are laid out on the wire:
//! - Primitive field tags and their byte widths
//! - Definitions (field name to field kind)
//! - The schema compiler producing immutable [`MessageDescriptor`]s
//! - Deterministic layout hashing
//! - Named descriptor sets and (with the `serde` feature) schema documents
//!
//! # Design Principles
//!
//! - **Runtime-first** - Definitions are built at runtime, no derive macros.
//! - **Explicit schemas** - No reflection on arbitrary Rust types.
//! - **Order-stable layouts** - Fields are sorted by name, so declaration
//!   order never changes the wire format.
//!
//! # Example
//!
//! ```
//! use schema::{Definition, FieldKind, FieldTag, MessageDescriptor};
//!
//! let point = MessageDescriptor::compile(
//!     1,
//!     Definition::new()
//!         .field("y", FieldTag::Int32)
//!         .field("x", FieldTag::Int32),
//! )
//! .unwrap();
//! assert_eq!(point.minimum_byte_length(), 9);
//! assert!(point.is_fixed_size());
//!
//! let path = MessageDescriptor::compile(
//!     2,
//!     Definition::new().field("points", FieldKind::dynamic_array(point)),
//! )
//! .unwrap();
//! assert!(!path.is_fixed_size());
//! ```

mod definition;
mod descriptor;
#[cfg(feature = "serde")]
mod document;
mod error;
mod field;
mod hash;
mod set;

pub use definition::Definition;
pub use descriptor::{Entry, MessageDescriptor, StringContent};
#[cfg(feature = "serde")]
pub use document::{FieldDocument, MessageDocument, SchemaDocument};
pub use error::{SchemaError, SchemaResult};
pub use field::{Element, FieldKind, FieldTag, TypeTag};
pub use hash::layout_hash;
pub use set::SchemaSet;

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn public_api_exports() {
        let _ = Definition::new();
        let _ = FieldKind::string();
        let _ = Element::String;
        let _ = SchemaSet::new();
        let desc = MessageDescriptor::compile(0, Definition::new()).unwrap();
        let _ = layout_hash(&desc);

        let _: SchemaResult<()> = Ok(());
    }

    #[test]
    fn type_tag_is_one_byte() {
        assert_eq!(size_of::<TypeTag>(), 1);
    }

    #[test]
    fn descriptors_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MessageDescriptor>();
    }
}
