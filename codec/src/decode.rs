//! Message decoding.

use buffer::{latin1, ByteReader};
use schema::{Element, FieldKind, MessageDescriptor};

use crate::error::{CodecError, CodecResult};
use crate::limits::CodecLimits;
use crate::registry::read_primitive;
use crate::value::{FlagSet, Message, Value};

/// Decodes one message from the start of `bytes`.
///
/// Bytes past the end of the message are ignored.
pub fn decode(bytes: &[u8], desc: &MessageDescriptor) -> CodecResult<Message> {
    let mut cursor = 0;
    decode_at(bytes, &mut cursor, bytes.len(), desc)
}

/// Decodes one message from the start of `bytes`, reading at most
/// `limits.max_message_bytes`.
pub fn decode_with_limits(
    bytes: &[u8],
    desc: &MessageDescriptor,
    limits: &CodecLimits,
) -> CodecResult<Message> {
    let mut cursor = 0;
    let limit = bytes.len().min(limits.max_message_bytes);
    decode_at(bytes, &mut cursor, limit, desc)
}

/// Decodes one message from `bytes[*cursor..limit]`.
///
/// `limit` is an absolute offset into `bytes`. On success `cursor` is
/// advanced past the message, so consecutive messages in one buffer can be
/// decoded by calling this repeatedly. On failure `cursor` is left unchanged.
///
/// # Errors
///
/// - [`CodecError::OutOfBounds`] if fewer than the descriptor's minimum
///   bytes remain, or a variable-length part runs past `limit`
/// - [`CodecError::TypeMismatch`] if a message's tag byte does not match
///   its descriptor
pub fn decode_at(
    bytes: &[u8],
    cursor: &mut usize,
    limit: usize,
    desc: &MessageDescriptor,
) -> CodecResult<Message> {
    let mut reader = ByteReader::with_bounds(bytes, *cursor, limit)?;
    let message = read_message(&mut reader, desc)?;
    *cursor = reader.position();
    Ok(message)
}

fn read_message(reader: &mut ByteReader<'_>, desc: &MessageDescriptor) -> CodecResult<Message> {
    let needed = desc.minimum_byte_length();
    let available = reader.remaining();
    if available < needed {
        return Err(CodecError::OutOfBounds { needed, available });
    }

    let expected = desc.type_tag().get();
    let found = reader.read_u8()?;
    if found != expected {
        return Err(CodecError::TypeMismatch { expected, found });
    }

    let mut message = Message::new();
    for entry in desc.entries() {
        if let FieldKind::Optional(child) = &entry.kind {
            if reader.read_u8()? != 0 {
                message.insert(entry.name.clone(), read_message(reader, child)?);
            }
            continue;
        }
        let value = read_kind(reader, &entry.kind)?;
        message.insert(entry.name.clone(), value);
    }
    Ok(message)
}

fn read_kind(reader: &mut ByteReader<'_>, kind: &FieldKind) -> CodecResult<Value> {
    match kind {
        FieldKind::Primitive(tag) => Ok(read_primitive(*tag, reader)?),
        FieldKind::FixedArray { element, len } => read_elements(reader, element, *len),
        FieldKind::DynamicArray(element) => {
            let count = usize::from(reader.read_u8()?);
            read_elements(reader, element, count)
        }
        FieldKind::Flags(names) => {
            let bits = reader.read_u8()?;
            Ok(Value::Flags(
                names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| (name.as_str(), bits & (1 << i) != 0))
                    .collect::<FlagSet>(),
            ))
        }
        FieldKind::String => read_string(reader),
        FieldKind::Message(child) | FieldKind::Optional(child) => {
            Ok(Value::Message(read_message(reader, child)?))
        }
    }
}

fn read_elements(reader: &mut ByteReader<'_>, element: &Element, count: usize) -> CodecResult<Value> {
    // Every element occupies at least one byte, so the remaining input
    // bounds the allocation.
    let mut items = Vec::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        let item = match element {
            Element::Primitive(tag) => read_primitive(*tag, reader)?,
            Element::String => read_string(reader)?,
            Element::Message(child) => Value::Message(read_message(reader, child)?),
        };
        items.push(item);
    }
    Ok(Value::Array(items))
}

fn read_string(reader: &mut ByteReader<'_>) -> CodecResult<Value> {
    let len = usize::from(reader.read::<u16>()?);
    let bytes = reader.read_bytes(len)?;
    Ok(Value::Str(latin1::decode(bytes)))
}
