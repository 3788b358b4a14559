//! Primitive accessors indexed by field tag.

use buffer::{BufResult, ByteBuffer, ByteReader};
use schema::FieldTag;

use crate::error::CodecResult;
use crate::value::{type_mismatch, Value};

/// Reads one primitive of kind `tag`.
pub(crate) fn read_primitive(tag: FieldTag, reader: &mut ByteReader<'_>) -> BufResult<Value> {
    Ok(match tag {
        FieldTag::UInt8 => Value::U8(reader.read()?),
        FieldTag::UInt16 => Value::U16(reader.read()?),
        FieldTag::UInt32 => Value::U32(reader.read()?),
        FieldTag::Int8 => Value::I8(reader.read()?),
        FieldTag::Int16 => Value::I16(reader.read()?),
        FieldTag::Int32 => Value::I32(reader.read()?),
        FieldTag::Float32 => Value::F32(reader.read()?),
        FieldTag::Float64 => Value::F64(reader.read()?),
    })
}

/// Writes `value` as a primitive of kind `tag` at `offset`, returning its width.
///
/// The value variant must match the tag exactly; no numeric conversion is
/// performed.
pub(crate) fn write_primitive<B: ByteBuffer>(
    buf: &mut B,
    offset: usize,
    tag: FieldTag,
    value: &Value,
    field: &str,
) -> CodecResult<usize> {
    match (tag, value) {
        (FieldTag::UInt8, Value::U8(v)) => buf.set(offset, *v)?,
        (FieldTag::UInt16, Value::U16(v)) => buf.set(offset, *v)?,
        (FieldTag::UInt32, Value::U32(v)) => buf.set(offset, *v)?,
        (FieldTag::Int8, Value::I8(v)) => buf.set(offset, *v)?,
        (FieldTag::Int16, Value::I16(v)) => buf.set(offset, *v)?,
        (FieldTag::Int32, Value::I32(v)) => buf.set(offset, *v)?,
        (FieldTag::Float32, Value::F32(v)) => buf.set(offset, *v)?,
        (FieldTag::Float64, Value::F64(v)) => buf.set(offset, *v)?,
        (tag, other) => return Err(type_mismatch(field, tag.name(), other)),
    }
    Ok(tag.byte_width())
}
