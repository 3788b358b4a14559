//! Encoded size computation.

use buffer::latin1;
use schema::{Element, Entry, FieldKind, MessageDescriptor, StringContent};

use crate::error::{CodecResult, ValueReason};
use crate::value::{
    expect_array, expect_message, expect_str, required, violation, Message, Value,
};

const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Returns the exact number of bytes `encode` produces for `msg`.
///
/// Fails on the same shape violations the encoder reports for the parts of
/// the value it has to inspect.
pub fn encoded_len(msg: &Message, desc: &MessageDescriptor) -> CodecResult<usize> {
    if desc.is_fixed_size() {
        return Ok(desc.minimum_byte_length());
    }
    let mut total = 1usize;
    for entry in desc.entries() {
        total = total.saturating_add(entry_len(msg, entry)?);
    }
    Ok(total)
}

fn entry_len(msg: &Message, entry: &Entry) -> CodecResult<usize> {
    let name = entry.name.as_str();
    match &entry.kind {
        FieldKind::Optional(child) => match msg.get(name) {
            None => Ok(1),
            Some(value) => {
                Ok(1usize.saturating_add(encoded_len(expect_message(value, name)?, child)?))
            }
        },
        FieldKind::FixedArray { element, .. } if !element.is_fixed_size() => {
            elements_len(expect_array(required(msg, name)?, name)?, element, name)
        }
        FieldKind::DynamicArray(element) => {
            let items = expect_array(required(msg, name)?, name)?;
            Ok(1usize.saturating_add(elements_len(items, element, name)?))
        }
        FieldKind::String => string_len(expect_str(required(msg, name)?, name)?, name),
        FieldKind::Message(child) => encoded_len(expect_message(required(msg, name)?, name)?, child),
        FieldKind::Primitive(_) | FieldKind::FixedArray { .. } | FieldKind::Flags(_) => {
            required(msg, name)?;
            Ok(entry.kind.min_size())
        }
    }
}

fn elements_len(items: &[Value], element: &Element, field: &str) -> CodecResult<usize> {
    match element {
        Element::Primitive(tag) => Ok(items.len().saturating_mul(tag.byte_width())),
        Element::String => items.iter().try_fold(0usize, |acc, item| {
            Ok(acc.saturating_add(string_len(expect_str(item, field)?, field)?))
        }),
        Element::Message(child) => items.iter().try_fold(0usize, |acc, item| {
            Ok(acc.saturating_add(encoded_len(expect_message(item, field)?, child)?))
        }),
    }
}

/// Wire size of one string: the two-byte length prefix plus one byte per character.
pub(crate) fn string_len(text: &str, field: &str) -> CodecResult<usize> {
    let len = latin1::encoded_len(text);
    if len > MAX_STRING_LEN {
        return Err(violation(field, ValueReason::StringTooLong { len }));
    }
    Ok(2 + len)
}

/// Bytes of string content beyond the descriptor's minimum.
///
/// Covers direct strings, arrays of strings, required and fixed-array nested
/// messages, and present optionals. Dynamic arrays of messages contribute
/// nothing here; the encoder sizes them when it reaches them.
pub(crate) fn string_extra(msg: &Message, desc: &MessageDescriptor) -> CodecResult<usize> {
    if !desc.contains_strings() {
        return Ok(0);
    }
    let mut extra = 0usize;
    for entry in desc.entries() {
        if matches!(entry.strings, StringContent::None | StringContent::Deferred) {
            continue;
        }
        extra = extra.saturating_add(entry_string_extra(msg, entry)?);
    }
    Ok(extra)
}

fn entry_string_extra(msg: &Message, entry: &Entry) -> CodecResult<usize> {
    let name = entry.name.as_str();
    if let FieldKind::Optional(child) = &entry.kind {
        return match msg.get(name) {
            None => Ok(0),
            Some(value) => string_extra(expect_message(value, name)?, child),
        };
    }

    let value = required(msg, name)?;
    match &entry.kind {
        // The minimum already holds the length prefix.
        FieldKind::String => Ok(string_len(expect_str(value, name)?, name)? - 2),
        FieldKind::FixedArray { element, .. } => match element {
            Element::String => expect_array(value, name)?
                .iter()
                .try_fold(0usize, |acc, item| {
                    Ok(acc.saturating_add(string_len(expect_str(item, name)?, name)? - 2))
                }),
            Element::Message(child) => expect_array(value, name)?
                .iter()
                .try_fold(0usize, |acc, item| {
                    Ok(acc.saturating_add(string_extra(expect_message(item, name)?, child)?))
                }),
            Element::Primitive(_) => Ok(0),
        },
        FieldKind::DynamicArray(Element::String) => {
            elements_len(expect_array(value, name)?, &Element::String, name)
        }
        FieldKind::Message(child) => string_extra(expect_message(value, name)?, child),
        FieldKind::DynamicArray(_)
        | FieldKind::Primitive(_)
        | FieldKind::Flags(_)
        | FieldKind::Optional(_) => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CodecError;
    use schema::{Definition, FieldTag};
    use std::sync::Arc;

    fn label() -> Arc<MessageDescriptor> {
        MessageDescriptor::compile(2, Definition::new().field("text", FieldKind::string())).unwrap()
    }

    #[test]
    fn fixed_size_is_minimum() {
        let desc = MessageDescriptor::compile(
            1,
            Definition::new()
                .field("a", FieldTag::UInt8)
                .field("b", FieldTag::Int16),
        )
        .unwrap();
        let msg = Message::new().with("a", 200u8).with("b", -1000i16);
        assert_eq!(encoded_len(&msg, &desc).unwrap(), 4);
        assert_eq!(string_extra(&msg, &desc).unwrap(), 0);
    }

    #[test]
    fn string_extra_counts_direct_and_nested() {
        let inner = label();
        let desc = MessageDescriptor::compile(
            3,
            Definition::new()
                .field("name", FieldKind::string())
                .field("inner", FieldKind::message(&inner))
                .field("maybe", FieldKind::optional(&inner)),
        )
        .unwrap();
        let text = |s: &str| Message::new().with("text", s);
        let msg = Message::new()
            .with("name", "abc")
            .with("inner", text("hello"))
            .with("maybe", text("xy"));
        assert_eq!(string_extra(&msg, &desc).unwrap(), 3 + 5 + 2);
        // minimum: tag + name prefix + inner (tag + prefix) + presence
        assert_eq!(desc.minimum_byte_length(), 1 + 2 + 3 + 1);
        // present optional adds the child minimum on top
        assert_eq!(
            encoded_len(&msg, &desc).unwrap(),
            desc.minimum_byte_length() + 10 + inner.minimum_byte_length()
        );
    }

    #[test]
    fn dynamic_string_arrays_count_prefixes() {
        let desc = MessageDescriptor::compile(
            4,
            Definition::new().field("tags", FieldKind::dynamic_array(Element::String)),
        )
        .unwrap();
        let msg = Message::new().with("tags", vec!["a", "", "xyz"]);
        assert_eq!(string_extra(&msg, &desc).unwrap(), 3 * 2 + 4);
        assert_eq!(encoded_len(&msg, &desc).unwrap(), 1 + 1 + 3 * 2 + 4);
    }

    #[test]
    fn dynamic_message_arrays_are_not_precounted() {
        let inner = label();
        let desc = MessageDescriptor::compile(
            5,
            Definition::new().field("labels", FieldKind::dynamic_array(inner)),
        )
        .unwrap();
        assert_eq!(desc.entries()[0].strings, StringContent::Deferred);
        assert!(desc.contains_strings());
        let msg = Message::new().with(
            "labels",
            Value::Array(vec![Message::new().with("text", "abcd").into()]),
        );
        assert_eq!(string_extra(&msg, &desc).unwrap(), 0);
        assert_eq!(encoded_len(&msg, &desc).unwrap(), 1 + 1 + 1 + 2 + 4);
    }

    #[test]
    fn high_octets_count_one_byte() {
        assert_eq!(string_len("caf\u{e9}", "s").unwrap(), 2 + 4);
    }

    #[test]
    fn overlong_string_rejected() {
        let text = "a".repeat(MAX_STRING_LEN + 1);
        let err = string_len(&text, "s").unwrap_err();
        assert_eq!(
            err,
            CodecError::ContractViolation {
                field: "s".to_string(),
                reason: ValueReason::StringTooLong {
                    len: MAX_STRING_LEN + 1
                }
            }
        );
        assert!(string_len(&text[1..], "s").is_ok());
    }
}
