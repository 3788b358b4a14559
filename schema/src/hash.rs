//! Deterministic layout hashing.

use blake3::Hasher;

use crate::{Element, FieldKind, MessageDescriptor};

/// Computes a deterministic fingerprint of a descriptor's wire layout.
///
/// Covers the type tag and every entry in wire order, recursing into nested
/// descriptors. Two descriptors compiled from the same fields in any
/// declaration order hash equal. The hash never appears on the wire.
#[must_use]
pub fn layout_hash(desc: &MessageDescriptor) -> u64 {
    let mut hasher = Hasher::new();
    write_descriptor(&mut hasher, desc);

    let hash = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(head)
}

fn write_descriptor(hasher: &mut Hasher, desc: &MessageDescriptor) {
    write_u8(hasher, desc.type_tag().get());
    write_len(hasher, desc.entries().len());

    for entry in desc.entries() {
        write_str(hasher, &entry.name);
        write_kind(hasher, &entry.kind);
    }
}

fn write_kind(hasher: &mut Hasher, kind: &FieldKind) {
    match kind {
        FieldKind::Primitive(tag) => {
            write_u8(hasher, 0);
            write_u8(hasher, tag.ordinal() as u8);
        }
        FieldKind::FixedArray { element, len } => {
            write_u8(hasher, 1);
            write_len(hasher, *len);
            write_element(hasher, element);
        }
        FieldKind::DynamicArray(element) => {
            write_u8(hasher, 2);
            write_element(hasher, element);
        }
        FieldKind::Flags(names) => {
            write_u8(hasher, 3);
            write_len(hasher, names.len());
            for name in names {
                write_str(hasher, name);
            }
        }
        FieldKind::String => {
            write_u8(hasher, 4);
        }
        FieldKind::Optional(desc) => {
            write_u8(hasher, 5);
            write_descriptor(hasher, desc);
        }
        FieldKind::Message(desc) => {
            write_u8(hasher, 6);
            write_descriptor(hasher, desc);
        }
    }
}

fn write_element(hasher: &mut Hasher, element: &Element) {
    match element {
        Element::Primitive(tag) => {
            write_u8(hasher, 0);
            write_u8(hasher, tag.ordinal() as u8);
        }
        Element::Message(desc) => {
            write_u8(hasher, 1);
            write_descriptor(hasher, desc);
        }
        Element::String => {
            write_u8(hasher, 2);
        }
    }
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

fn write_len(hasher: &mut Hasher, value: usize) {
    hasher.update(&(value as u64).to_le_bytes());
}

fn write_str(hasher: &mut Hasher, value: &str) {
    write_len(hasher, value.len());
    hasher.update(value.as_bytes());
}
