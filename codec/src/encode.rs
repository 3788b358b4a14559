//! Message encoding.
//!
//! Two write strategies share one writer:
//! - **Fixed**: descriptors without variable-size parts are written into a
//!   buffer of exactly `minimum_byte_length` bytes that never grows.
//! - **Growable**: the buffer starts at the minimum plus all precountable
//!   string content, and grows by exactly the bytes each dynamic array or
//!   present optional adds once it is reached.

use buffer::{latin1, ByteBuffer, SliceBuffer, VecBuffer};
use schema::{Element, Entry, FieldKind, MessageDescriptor};

use crate::error::{CodecError, CodecResult, ValueReason};
use crate::limits::CodecLimits;
use crate::registry::write_primitive;
use crate::size::{encoded_len, string_extra};
use crate::value::{
    expect_array, expect_fixed_array, expect_flags, expect_message, expect_str, required,
    violation, Message, Value,
};

/// Which write strategy an encode call used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodePath {
    Fixed,
    Growable,
}

/// Allocation statistics of one encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeStats {
    pub path: EncodePath,
    /// Bytes allocated before the first write.
    pub initial_capacity: usize,
    /// Number of times the buffer grew.
    pub reallocations: usize,
    /// Encoded length.
    pub len: usize,
}

/// Encodes `msg` using default limits.
///
/// # Errors
///
/// [`CodecError::ContractViolation`] if `msg` does not match `desc`.
pub fn encode(msg: &Message, desc: &MessageDescriptor) -> CodecResult<Vec<u8>> {
    encode_with_limits(msg, desc, &CodecLimits::default())
}

/// Encodes `msg`, failing if the output would exceed `limits`.
pub fn encode_with_limits(
    msg: &Message,
    desc: &MessageDescriptor,
    limits: &CodecLimits,
) -> CodecResult<Vec<u8>> {
    encode_with_stats(msg, desc, limits).map(|(bytes, _)| bytes)
}

/// Encodes `msg` and reports how the output buffer was allocated.
pub fn encode_with_stats(
    msg: &Message,
    desc: &MessageDescriptor,
    limits: &CodecLimits,
) -> CodecResult<(Vec<u8>, EncodeStats)> {
    let (path, initial) = plan(msg, desc, limits)?;
    let writer = write(VecBuffer::with_capacity(initial), path, initial, msg, desc, limits)?;

    let stats = EncodeStats {
        path,
        initial_capacity: initial,
        reallocations: writer.reallocations,
        len: writer.cursor,
    };
    let mut bytes = writer.buf.into_inner();
    bytes.truncate(stats.len);
    Ok((bytes, stats))
}

/// Encodes `msg` into caller-provided storage, returning the encoded length.
///
/// # Errors
///
/// [`CodecError::OutputTooSmall`] if the encoding does not fit in `out`.
pub fn encode_into(msg: &Message, desc: &MessageDescriptor, out: &mut [u8]) -> CodecResult<usize> {
    let limits = CodecLimits::default();
    let (path, initial) = plan(msg, desc, &limits)?;
    let buf = SliceBuffer::new(out, initial)?;
    let writer = write(buf, path, initial, msg, desc, &limits)?;
    Ok(writer.cursor)
}

fn plan(
    msg: &Message,
    desc: &MessageDescriptor,
    limits: &CodecLimits,
) -> CodecResult<(EncodePath, usize)> {
    let minimum = desc.minimum_byte_length();
    let (path, initial) = if desc.is_fixed_size() {
        (EncodePath::Fixed, minimum)
    } else {
        let extra = string_extra(msg, desc)?;
        (EncodePath::Growable, minimum.saturating_add(extra))
    };
    limits.check(initial)?;
    Ok((path, initial))
}

fn write<B: ByteBuffer>(
    buf: B,
    path: EncodePath,
    initial: usize,
    msg: &Message,
    desc: &MessageDescriptor,
    limits: &CodecLimits,
) -> CodecResult<Writer<B>> {
    let mut writer = Writer {
        buf,
        path,
        cursor: 0,
        committed: initial,
        max: limits.max_message_bytes,
        reallocations: 0,
        prepaid: 0,
    };
    writer.write_message(msg, desc)?;
    debug_assert_eq!(
        writer.cursor, writer.committed,
        "encoded length differs from committed length"
    );
    Ok(writer)
}

struct Writer<B> {
    buf: B,
    path: EncodePath,
    cursor: usize,
    /// Bytes known to be needed so far.
    committed: usize,
    max: usize,
    reallocations: usize,
    /// Depth of writes whose size was already reserved by an enclosing array.
    prepaid: usize,
}

impl<B: ByteBuffer> Writer<B> {
    fn reserving(&self) -> bool {
        self.path == EncodePath::Growable && self.prepaid == 0
    }

    /// Commits `additional` bytes, growing the buffer at most once.
    fn reserve(&mut self, additional: usize) -> CodecResult<()> {
        if additional == 0 || !self.reserving() {
            return Ok(());
        }
        let committed = self.committed.checked_add(additional).unwrap_or(usize::MAX);
        if committed > self.max {
            return Err(CodecError::LimitsExceeded {
                limit: self.max,
                actual: committed,
            });
        }
        self.committed = committed;
        if committed > self.buf.capacity() {
            self.buf.grow_to(committed)?;
            self.reallocations += 1;
        }
        Ok(())
    }

    fn put_u8(&mut self, value: u8) -> CodecResult<()> {
        self.buf.set(self.cursor, value)?;
        self.cursor += 1;
        Ok(())
    }

    fn write_message(&mut self, msg: &Message, desc: &MessageDescriptor) -> CodecResult<()> {
        if let Some((name, _)) = msg.iter().find(|(name, _)| desc.entry(name).is_none()) {
            return Err(violation(name, ValueReason::UnknownField));
        }
        self.put_u8(desc.type_tag().get())?;
        for entry in desc.entries() {
            self.write_entry(msg, entry)?;
        }
        Ok(())
    }

    fn write_entry(&mut self, msg: &Message, entry: &Entry) -> CodecResult<()> {
        let name = entry.name.as_str();
        match &entry.kind {
            FieldKind::Optional(child) => match msg.get(name) {
                None => self.put_u8(0),
                Some(value) => {
                    let nested = expect_message(value, name)?;
                    self.put_u8(1)?;
                    self.reserve(child.minimum_byte_length())?;
                    self.write_message(nested, child)
                }
            },
            FieldKind::Primitive(tag) => {
                let value = required(msg, name)?;
                self.cursor += write_primitive(&mut self.buf, self.cursor, *tag, value, name)?;
                Ok(())
            }
            FieldKind::FixedArray { element, len } => {
                let items = expect_fixed_array(required(msg, name)?, name, *len)?;
                items
                    .iter()
                    .try_for_each(|item| self.write_element(element, item, name))
            }
            FieldKind::DynamicArray(element) => {
                let items = expect_array(required(msg, name)?, name)?;
                self.write_dynamic(element, items, name)
            }
            FieldKind::Flags(names) => {
                let flags = expect_flags(required(msg, name)?, name)?;
                let declared = |flag: &str| names.iter().any(|n| n.as_str() == flag);
                if let Some((unknown, _)) = flags.iter().find(|(flag, _)| !declared(flag)) {
                    return Err(violation(
                        name,
                        ValueReason::UnknownFlag {
                            flag: unknown.to_string(),
                        },
                    ));
                }
                let bits = names
                    .iter()
                    .enumerate()
                    .filter(|(_, flag)| flags.get(flag))
                    .fold(0u8, |bits, (i, _)| bits | (1 << i));
                self.put_u8(bits)
            }
            FieldKind::String => {
                let value = required(msg, name)?;
                self.write_string(value, name)
            }
            FieldKind::Message(child) => {
                let nested = expect_message(required(msg, name)?, name)?;
                self.write_message(nested, child)
            }
        }
    }

    fn write_dynamic(&mut self, element: &Element, items: &[Value], field: &str) -> CodecResult<()> {
        let count = u8::try_from(items.len())
            .map_err(|_| violation(field, ValueReason::ArrayTooLong { len: items.len() }))?;
        self.put_u8(count)?;
        if items.is_empty() {
            return Ok(());
        }

        match element {
            Element::Primitive(tag) => {
                self.reserve(items.len() * tag.byte_width())?;
                items
                    .iter()
                    .try_for_each(|item| self.write_element(element, item, field))
            }
            // Precounted with the rest of the string content.
            Element::String => items
                .iter()
                .try_for_each(|item| self.write_element(element, item, field)),
            Element::Message(child) => {
                if self.reserving() {
                    let mut additional = 0usize;
                    for item in items {
                        let len = encoded_len(expect_message(item, field)?, child)?;
                        additional = additional.saturating_add(len);
                    }
                    self.reserve(additional)?;
                }
                self.prepaid += 1;
                let result = items
                    .iter()
                    .try_for_each(|item| self.write_element(element, item, field));
                self.prepaid -= 1;
                result
            }
        }
    }

    fn write_element(&mut self, element: &Element, item: &Value, field: &str) -> CodecResult<()> {
        match element {
            Element::Primitive(tag) => {
                self.cursor += write_primitive(&mut self.buf, self.cursor, *tag, item, field)?;
                Ok(())
            }
            Element::String => self.write_string(item, field),
            Element::Message(child) => self.write_message(expect_message(item, field)?, child),
        }
    }

    fn write_string(&mut self, value: &Value, field: &str) -> CodecResult<()> {
        let text = expect_str(value, field)?;
        if let Some(ch) = latin1::first_unencodable(text) {
            return Err(violation(field, ValueReason::UnencodableChar { ch }));
        }
        let len = latin1::encoded_len(text);
        let prefix =
            u16::try_from(len).map_err(|_| violation(field, ValueReason::StringTooLong { len }))?;
        self.buf.set(self.cursor, prefix)?;
        self.cursor += 2;
        self.cursor += latin1::encode_into(&mut self.buf, self.cursor, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FlagSet;
    use schema::{Definition, FieldTag};
    use std::sync::Arc;

    fn point() -> Arc<MessageDescriptor> {
        MessageDescriptor::compile(
            9,
            Definition::new()
                .field("x", FieldTag::Int32)
                .field("y", FieldTag::Int32),
        )
        .unwrap()
    }

    fn pt(x: i32, y: i32) -> Message {
        Message::new().with("x", x).with("y", y)
    }

    #[test]
    fn empty_message_is_tag_byte() {
        let desc = MessageDescriptor::compile(7, Definition::new()).unwrap();
        let (bytes, stats) =
            encode_with_stats(&Message::new(), &desc, &CodecLimits::default()).unwrap();
        assert_eq!(bytes, vec![7]);
        assert_eq!(stats.path, EncodePath::Fixed);
        assert_eq!(stats.reallocations, 0);
    }

    #[test]
    fn primitives_use_fixed_path() {
        let desc = MessageDescriptor::compile(
            1,
            Definition::new()
                .field("b", FieldTag::Int16)
                .field("a", FieldTag::UInt8),
        )
        .unwrap();
        let msg = Message::new().with("a", 200u8).with("b", -1000i16);
        let (bytes, stats) = encode_with_stats(&msg, &desc, &CodecLimits::default()).unwrap();
        let b = (-1000i16).to_le_bytes();
        assert_eq!(bytes, vec![1, 200, b[0], b[1]]);
        assert_eq!(stats.path, EncodePath::Fixed);
        assert_eq!(stats.initial_capacity, 4);
    }

    #[test]
    fn dynamic_primitive_array_grows_once() {
        let desc = MessageDescriptor::compile(
            3,
            Definition::new().field("xs", FieldKind::dynamic_array(FieldTag::Int32)),
        )
        .unwrap();
        let msg = Message::new().with("xs", vec![1i32, -2, 3]);
        let (bytes, stats) = encode_with_stats(&msg, &desc, &CodecLimits::default()).unwrap();
        assert_eq!(bytes.len(), 2 + 12);
        assert_eq!(bytes[1], 3);
        assert_eq!(&bytes[2..6], &1i32.to_le_bytes());
        assert_eq!(&bytes[6..10], &(-2i32).to_le_bytes());
        assert_eq!(stats.path, EncodePath::Growable);
        assert_eq!(stats.initial_capacity, 2);
        assert_eq!(stats.reallocations, 1);
    }

    #[test]
    fn empty_dynamic_array_does_not_grow() {
        let desc = MessageDescriptor::compile(
            3,
            Definition::new().field("xs", FieldKind::dynamic_array(FieldTag::Int32)),
        )
        .unwrap();
        let msg = Message::new().with("xs", Value::Array(Vec::new()));
        let (bytes, stats) = encode_with_stats(&msg, &desc, &CodecLimits::default()).unwrap();
        assert_eq!(bytes, vec![3, 0]);
        assert_eq!(stats.reallocations, 0);
    }

    #[test]
    fn strings_need_no_reallocation() {
        let desc = MessageDescriptor::compile(
            4,
            Definition::new()
                .field("name", FieldKind::string())
                .field("tags", FieldKind::dynamic_array(Element::String)),
        )
        .unwrap();
        let msg = Message::new()
            .with("name", "abc")
            .with("tags", vec!["x", "yz"]);
        let (bytes, stats) = encode_with_stats(&msg, &desc, &CodecLimits::default()).unwrap();
        assert_eq!(stats.reallocations, 0);
        assert_eq!(stats.initial_capacity, bytes.len());
        assert_eq!(
            bytes,
            vec![4, 3, 0, b'a', b'b', b'c', 2, 1, 0, b'x', 2, 0, b'y', b'z']
        );
    }

    #[test]
    fn message_arrays_reserve_once_for_all_elements() {
        let inner = MessageDescriptor::compile(
            2,
            Definition::new()
                .field("text", FieldKind::string())
                .field("xs", FieldKind::dynamic_array(FieldTag::UInt8)),
        )
        .unwrap();
        let desc = MessageDescriptor::compile(
            1,
            Definition::new().field("items", FieldKind::dynamic_array(inner)),
        )
        .unwrap();
        let item = |text: &str, xs: Vec<u8>| Value::from(Message::new().with("text", text).with("xs", xs));
        let msg = Message::new().with(
            "items",
            Value::Array(vec![item("ab", vec![1, 2, 3]), item("", vec![]), item("xyz", vec![9])]),
        );
        let (bytes, stats) = encode_with_stats(&msg, &desc, &CodecLimits::default()).unwrap();
        assert_eq!(stats.reallocations, 1);
        assert_eq!(bytes.len(), encoded_len(&msg, &desc).unwrap());
    }

    #[test]
    fn optional_absent_and_present() {
        let desc = MessageDescriptor::compile(
            5,
            Definition::new().field("p", FieldKind::optional(&point())),
        )
        .unwrap();
        let absent = encode(&Message::new(), &desc).unwrap();
        assert_eq!(absent, vec![5, 0]);

        let (present, stats) =
            encode_with_stats(&Message::new().with("p", pt(1, 2)), &desc, &CodecLimits::default())
                .unwrap();
        assert_eq!(present.len(), 2 + 9);
        assert_eq!(present[1], 1);
        assert_eq!(present[2], 9);
        assert_eq!(stats.reallocations, 1);
    }

    #[test]
    fn flags_pack_in_declared_order() {
        let desc = MessageDescriptor::compile(
            6,
            Definition::new().field("f", FieldKind::flags(["f1", "f2", "f3", "f4", "f5"])),
        )
        .unwrap();
        let flags = FlagSet::new()
            .with("f1", true)
            .with("f2", false)
            .with("f3", true)
            .with("f5", true);
        let msg = Message::new().with("f", flags);
        let bytes = encode(&msg, &desc).unwrap();
        assert_eq!(bytes, vec![6, 0b10101]);
        assert_eq!(crate::decode(&bytes, &desc).unwrap(), msg);
    }

    #[test]
    fn unknown_flag_rejected() {
        let desc = MessageDescriptor::compile(
            6,
            Definition::new().field("f", FieldKind::flags(["a"])),
        )
        .unwrap();
        let err = encode(&Message::new().with("f", FlagSet::new().with("b", true)), &desc)
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::ContractViolation {
                field: "f".to_string(),
                reason: ValueReason::UnknownFlag {
                    flag: "b".to_string()
                }
            }
        );
    }

    #[test]
    fn missing_field_rejected() {
        let err = encode(&Message::new().with("x", 1i32), &point()).unwrap_err();
        assert_eq!(
            err,
            CodecError::ContractViolation {
                field: "y".to_string(),
                reason: ValueReason::MissingField
            }
        );
    }

    #[test]
    fn unknown_field_rejected() {
        let err = encode(&pt(1, 2).with("z", 3i32), &point()).unwrap_err();
        assert_eq!(
            err,
            CodecError::ContractViolation {
                field: "z".to_string(),
                reason: ValueReason::UnknownField
            }
        );
    }

    #[test]
    fn fixed_array_length_enforced() {
        let desc = MessageDescriptor::compile(
            8,
            Definition::new().field("v", FieldKind::fixed_array(FieldTag::UInt8, 3)),
        )
        .unwrap();
        assert_eq!(
            encode(&Message::new().with("v", vec![1u8, 2, 3]), &desc).unwrap(),
            vec![8, 1, 2, 3]
        );
        let err = encode(&Message::new().with("v", vec![1u8, 2]), &desc).unwrap_err();
        assert!(matches!(
            err,
            CodecError::ContractViolation {
                reason: ValueReason::FixedArrayLength { .. },
                ..
            }
        ));
    }

    #[test]
    fn dynamic_array_count_limit() {
        let desc = MessageDescriptor::compile(
            3,
            Definition::new().field("xs", FieldKind::dynamic_array(FieldTag::UInt8)),
        )
        .unwrap();
        let ok = Message::new().with("xs", vec![0u8; 255]);
        assert_eq!(encode(&ok, &desc).unwrap().len(), 2 + 255);

        let err = encode(&Message::new().with("xs", vec![0u8; 256]), &desc).unwrap_err();
        assert_eq!(
            err,
            CodecError::ContractViolation {
                field: "xs".to_string(),
                reason: ValueReason::ArrayTooLong { len: 256 }
            }
        );
    }

    #[test]
    fn unencodable_string_rejected() {
        let desc =
            MessageDescriptor::compile(4, Definition::new().field("s", FieldKind::string()))
                .unwrap();
        let err = encode(&Message::new().with("s", "snow\u{2603}"), &desc).unwrap_err();
        assert_eq!(
            err,
            CodecError::ContractViolation {
                field: "s".to_string(),
                reason: ValueReason::UnencodableChar { ch: '\u{2603}' }
            }
        );
    }

    #[test]
    fn wrong_primitive_variant_rejected() {
        let err = encode(&Message::new().with("x", 1u32).with("y", 2i32), &point()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::ContractViolation {
                reason: ValueReason::TypeMismatch { .. },
                ..
            }
        ));
    }

    #[test]
    fn limits_reject_large_messages() {
        let desc = MessageDescriptor::compile(
            3,
            Definition::new().field("xs", FieldKind::dynamic_array(FieldTag::UInt32)),
        )
        .unwrap();
        let limits = CodecLimits {
            max_message_bytes: 10,
        };
        let small = Message::new().with("xs", vec![1u32, 2]);
        assert!(encode_with_limits(&small, &desc, &limits).is_ok());
        let large = Message::new().with("xs", vec![1u32, 2, 3]);
        assert_eq!(
            encode_with_limits(&large, &desc, &limits).unwrap_err(),
            CodecError::LimitsExceeded {
                limit: 10,
                actual: 14
            }
        );
    }

    #[test]
    fn encode_into_matches_encode() {
        let desc = MessageDescriptor::compile(
            4,
            Definition::new()
                .field("name", FieldKind::string())
                .field("pts", FieldKind::dynamic_array(point())),
        )
        .unwrap();
        let msg = Message::new()
            .with("name", "path")
            .with("pts", Value::Array(vec![pt(1, 2).into(), pt(3, 4).into()]));
        let expected = encode(&msg, &desc).unwrap();

        let mut out = [0xAAu8; 64];
        let len = encode_into(&msg, &desc, &mut out).unwrap();
        assert_eq!(&out[..len], expected.as_slice());
    }

    #[test]
    fn encode_into_reports_small_output() {
        let desc = MessageDescriptor::compile(
            3,
            Definition::new().field("xs", FieldKind::dynamic_array(FieldTag::UInt32)),
        )
        .unwrap();
        let msg = Message::new().with("xs", vec![1u32, 2]);

        let mut tiny = [0u8; 1];
        assert!(matches!(
            encode_into(&msg, &desc, &mut tiny),
            Err(CodecError::OutputTooSmall { .. })
        ));
        let mut short = [0u8; 6];
        assert!(matches!(
            encode_into(&msg, &desc, &mut short),
            Err(CodecError::OutputTooSmall { .. })
        ));
    }
}
