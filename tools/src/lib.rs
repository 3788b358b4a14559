//! Inspection, encoding, and decoding tools for the tagwire codec.
//!
//! This crate provides utilities for understanding schemas and packets:
//!
//! - Report each message's wire layout, minimum size, and layout hash
//! - Convert between JSON and codec values under a schema
//! - Decode a packet as a named message, or identify it by its type tag
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the codec is doing.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use codec::{
    decode_with_limits, encode_with_limits, encoded_len, CodecLimits, Dispatcher, FlagSet,
    Message, Value,
};
use schema::{
    layout_hash, Element, FieldKind, FieldTag, MessageDescriptor, SchemaDocument, SchemaSet,
};
use serde::Serialize;
use serde_json::{Map, Value as Json};
use tracing::debug;

/// Parses and compiles a JSON schema document.
pub fn load_schema_set(json: &str) -> Result<SchemaSet> {
    let doc: SchemaDocument = serde_json::from_str(json).context("parse schema json")?;
    doc.resolve()
        .map_err(|err| anyhow!("schema compilation failed: {err}"))
}

fn lookup<'s>(set: &'s SchemaSet, name: &str) -> Result<&'s Arc<MessageDescriptor>> {
    set.get(name)
        .ok_or_else(|| anyhow!("unknown message {name:?}"))
}

// ---------------------------------------------------------------------------
// Layout reports
// ---------------------------------------------------------------------------

/// Wire layout of every message in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutReport {
    pub messages: Vec<MessageLayout>,
}

/// Wire layout of one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageLayout {
    pub name: String,
    pub type_tag: u8,
    pub minimum_byte_length: usize,
    pub fixed_size: bool,
    pub contains_strings: bool,
    pub layout_hash: String,
    pub entries: Vec<EntryLayout>,
}

/// One entry, in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryLayout {
    pub name: String,
    pub kind: String,
    pub min_size: usize,
    pub fixed_size: bool,
}

/// Builds a layout report for every message, in schema order.
pub fn layout_report(set: &SchemaSet) -> LayoutReport {
    let messages = set
        .iter()
        .map(|(name, desc)| MessageLayout {
            name: name.to_string(),
            type_tag: desc.type_tag().get(),
            minimum_byte_length: desc.minimum_byte_length(),
            fixed_size: desc.is_fixed_size(),
            contains_strings: desc.contains_strings(),
            layout_hash: format!("0x{:016x}", layout_hash(desc)),
            entries: desc
                .entries()
                .iter()
                .map(|entry| EntryLayout {
                    name: entry.name.clone(),
                    kind: describe_kind(set, &entry.kind),
                    min_size: entry.kind.min_size(),
                    fixed_size: entry.kind.is_fixed_size(),
                })
                .collect(),
        })
        .collect();
    LayoutReport { messages }
}

fn message_name(set: &SchemaSet, desc: &MessageDescriptor) -> String {
    set.by_tag(desc.type_tag())
        .map_or_else(|| format!("message#{}", desc.type_tag()), |(name, _)| name.to_string())
}

fn describe_element(set: &SchemaSet, element: &Element) -> String {
    match element {
        Element::Primitive(tag) => tag.name().to_string(),
        Element::Message(desc) => message_name(set, desc),
        Element::String => "string".to_string(),
    }
}

fn describe_kind(set: &SchemaSet, kind: &FieldKind) -> String {
    match kind {
        FieldKind::Primitive(tag) => tag.name().to_string(),
        FieldKind::FixedArray { element, len } => {
            format!("{}[{len}]", describe_element(set, element))
        }
        FieldKind::DynamicArray(element) => format!("{}[]", describe_element(set, element)),
        FieldKind::Flags(names) => format!("flags({})", names.join(", ")),
        FieldKind::String => "string".to_string(),
        FieldKind::Optional(desc) => format!("{}?", message_name(set, desc)),
        FieldKind::Message(desc) => message_name(set, desc),
    }
}

/// Renders a layout report as indented text.
pub fn format_layout(report: &LayoutReport) -> String {
    let mut out = String::new();
    for message in &report.messages {
        let path = if message.fixed_size { "fixed" } else { "growable" };
        let _ = writeln!(
            out,
            "{} (tag {}): min {} bytes, {path} path, hash {}",
            message.name, message.type_tag, message.minimum_byte_length, message.layout_hash
        );
        for entry in &message.entries {
            let size = if entry.fixed_size { "" } else { "+" };
            let _ = writeln!(
                out,
                "  {:<16} {:<24} {}{size} bytes",
                entry.name, entry.kind, entry.min_size
            );
        }
    }
    out
}

// ---------------------------------------------------------------------------
// JSON conversion
// ---------------------------------------------------------------------------

/// Converts a codec value to JSON.
///
/// Flag sets become objects of booleans. Non-finite floats become `null`.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::U8(v) => Json::from(*v),
        Value::U16(v) => Json::from(*v),
        Value::U32(v) => Json::from(*v),
        Value::I8(v) => Json::from(*v),
        Value::I16(v) => Json::from(*v),
        Value::I32(v) => Json::from(*v),
        Value::F32(v) => Json::from(f64::from(*v)),
        Value::F64(v) => Json::from(*v),
        Value::Str(text) => Json::from(text.as_str()),
        Value::Array(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Flags(flags) => Json::Object(
            flags
                .iter()
                .map(|(name, on)| (name.to_string(), Json::Bool(on)))
                .collect(),
        ),
        Value::Message(msg) => message_to_json(msg),
    }
}

/// Converts a message to a JSON object. Absent optional fields are omitted.
pub fn message_to_json(msg: &Message) -> Json {
    Json::Object(
        msg.iter()
            .map(|(name, value)| (name.to_string(), value_to_json(value)))
            .collect(),
    )
}

/// Builds a message from a JSON object under `desc`.
///
/// Optional fields may be missing or `null`. Unknown keys are rejected.
pub fn message_from_json(json: &Json, desc: &MessageDescriptor) -> Result<Message> {
    let object = json
        .as_object()
        .ok_or_else(|| anyhow!("expected a JSON object, got {json}"))?;
    if let Some(key) = object.keys().find(|key| desc.entry(key).is_none()) {
        bail!("unknown field {key:?}");
    }

    let mut msg = Message::new();
    for entry in desc.entries() {
        let field = entry.name.as_str();
        match (object.get(field), &entry.kind) {
            (None | Some(Json::Null), FieldKind::Optional(_)) => {}
            (None, _) => bail!("missing field {field:?}"),
            (Some(json), kind) => {
                let value = value_from_json(json, kind)
                    .with_context(|| format!("field {field:?}"))?;
                msg.insert(field, value);
            }
        }
    }
    Ok(msg)
}

/// Builds a field value from JSON under `kind`.
pub fn value_from_json(json: &Json, kind: &FieldKind) -> Result<Value> {
    match kind {
        FieldKind::Primitive(tag) => primitive_from_json(json, *tag),
        FieldKind::FixedArray { element, .. } | FieldKind::DynamicArray(element) => {
            let items = json
                .as_array()
                .ok_or_else(|| anyhow!("expected an array, got {json}"))?;
            items
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    element_from_json(item, element).with_context(|| format!("element {idx}"))
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        FieldKind::Flags(_) => flags_from_json(json).map(Value::Flags),
        FieldKind::String => string_from_json(json),
        FieldKind::Optional(desc) | FieldKind::Message(desc) => {
            message_from_json(json, desc).map(Value::Message)
        }
    }
}

fn element_from_json(json: &Json, element: &Element) -> Result<Value> {
    match element {
        Element::Primitive(tag) => primitive_from_json(json, *tag),
        Element::Message(desc) => message_from_json(json, desc).map(Value::Message),
        Element::String => string_from_json(json),
    }
}

fn string_from_json(json: &Json) -> Result<Value> {
    json.as_str()
        .map(Value::from)
        .ok_or_else(|| anyhow!("expected a string, got {json}"))
}

fn flags_from_json(json: &Json) -> Result<FlagSet> {
    let object = json
        .as_object()
        .ok_or_else(|| anyhow!("expected an object of booleans, got {json}"))?;
    object
        .iter()
        .map(|(name, on)| {
            on.as_bool()
                .map(|on| (name.as_str(), on))
                .ok_or_else(|| anyhow!("flag {name:?}: expected a boolean, got {on}"))
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn primitive_from_json(json: &Json, tag: FieldTag) -> Result<Value> {
    let out_of_range = || anyhow!("expected {tag}, got {json}");
    let unsigned = || json.as_u64().ok_or_else(out_of_range);
    let signed = || json.as_i64().ok_or_else(out_of_range);
    Ok(match tag {
        FieldTag::UInt8 => Value::U8(u8::try_from(unsigned()?).map_err(|_| out_of_range())?),
        FieldTag::UInt16 => Value::U16(u16::try_from(unsigned()?).map_err(|_| out_of_range())?),
        FieldTag::UInt32 => Value::U32(u32::try_from(unsigned()?).map_err(|_| out_of_range())?),
        FieldTag::Int8 => Value::I8(i8::try_from(signed()?).map_err(|_| out_of_range())?),
        FieldTag::Int16 => Value::I16(i16::try_from(signed()?).map_err(|_| out_of_range())?),
        FieldTag::Int32 => Value::I32(i32::try_from(signed()?).map_err(|_| out_of_range())?),
        FieldTag::Float32 => Value::F32(json.as_f64().ok_or_else(out_of_range)? as f32),
        FieldTag::Float64 => Value::F64(json.as_f64().ok_or_else(out_of_range)?),
    })
}

// ---------------------------------------------------------------------------
// Packets
// ---------------------------------------------------------------------------

/// Encodes a JSON value as the named message.
pub fn encode_message_json(
    json: &Json,
    set: &SchemaSet,
    name: &str,
    limits: &CodecLimits,
) -> Result<Vec<u8>> {
    let desc = lookup(set, name)?;
    let msg = message_from_json(json, desc).with_context(|| format!("message {name:?}"))?;
    encode_with_limits(&msg, desc, limits).with_context(|| format!("encode {name:?}"))
}

/// A decoded packet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeOutput {
    pub message: String,
    pub type_tag: u8,
    /// Bytes the message occupies.
    pub byte_len: usize,
    /// Bytes after the message that were not read.
    pub trailing_bytes: usize,
    pub value: Json,
}

fn decode_output(
    name: &str,
    desc: &MessageDescriptor,
    msg: &Message,
    total: usize,
) -> Result<DecodeOutput> {
    let byte_len = encoded_len(msg, desc).context("measure decoded message")?;
    Ok(DecodeOutput {
        message: name.to_string(),
        type_tag: desc.type_tag().get(),
        byte_len,
        trailing_bytes: total.saturating_sub(byte_len),
        value: message_to_json(msg),
    })
}

/// Decodes `bytes` as the named message.
pub fn decode_message_json(
    bytes: &[u8],
    set: &SchemaSet,
    name: &str,
    limits: &CodecLimits,
) -> Result<DecodeOutput> {
    let desc = lookup(set, name)?;
    let msg = decode_with_limits(bytes, desc, limits).with_context(|| format!("decode {name:?}"))?;
    decode_output(name, desc, &msg, bytes.len())
}

/// A dispatcher over every message of a schema, yielding the matched name.
pub type PacketDispatcher<'s> = Dispatcher<'s, (&'s str, Message)>;

/// Builds a dispatcher for every message in `set`. Build once, reuse per packet.
pub fn packet_dispatcher<'s>(set: &'s SchemaSet, limits: &CodecLimits) -> PacketDispatcher<'s> {
    let mut dispatcher = Dispatcher::with_limits(limits.clone());
    for (name, desc) in set.iter() {
        dispatcher.register(desc, move |msg| (name, msg));
    }
    dispatcher
}

/// Identifies `bytes` by its leading type tag and decodes it.
pub fn inspect_packet(
    bytes: &[u8],
    set: &SchemaSet,
    dispatcher: &mut PacketDispatcher<'_>,
) -> Result<DecodeOutput> {
    let tag = bytes.first().copied().context("empty packet")?;
    let (name, msg) = dispatcher
        .dispatch(bytes)
        .context("dispatch packet")?
        .ok_or_else(|| anyhow!("no message with type tag {tag}"))?;
    debug!(message = name, tag, len = bytes.len(), "identified packet");
    let desc = lookup(set, name)?;
    decode_output(name, desc, &msg, bytes.len())
}

/// Renders a decoded packet as indented text.
pub fn format_decode_pretty(output: &DecodeOutput) -> String {
    let mut out = format!(
        "{} (tag {}, {} bytes",
        output.message, output.type_tag, output.byte_len
    );
    if output.trailing_bytes > 0 {
        let _ = write!(out, ", {} trailing", output.trailing_bytes);
    }
    out.push_str(")\n");
    if let Json::Object(fields) = &output.value {
        write_fields(&mut out, fields, 1);
    }
    out
}

fn write_fields(out: &mut String, fields: &Map<String, Json>, depth: usize) {
    let indent = "  ".repeat(depth);
    for (name, value) in fields {
        match value {
            Json::Object(nested) => {
                let _ = writeln!(out, "{indent}{name}:");
                write_fields(out, nested, depth + 1);
            }
            Json::Array(items) if items.iter().any(Json::is_object) => {
                let _ = writeln!(out, "{indent}{name}: [{}]", items.len());
                for (idx, item) in items.iter().enumerate() {
                    let _ = writeln!(out, "{indent}  [{idx}]");
                    if let Json::Object(nested) = item {
                        write_fields(out, nested, depth + 2);
                    }
                }
            }
            other => {
                let _ = writeln!(out, "{indent}{name}: {other}");
            }
        }
    }
}
