//! Single-octet string codec.
//!
//! Characters U+0000..=U+00FF map one-to-one onto byte values 0..=255.
//! Multi-byte code points are not representable.

use crate::buffer::ByteBuffer;
use crate::error::{BufError, BufResult};

/// Returns the encoded byte length of `text` (one byte per character).
///
/// Does not validate; [`encode_into`] rejects unencodable characters.
#[must_use]
pub fn encoded_len(text: &str) -> usize {
    text.chars().count()
}

/// Encodes `text` into `buf` at `offset`, returning the number of bytes written.
pub fn encode_into<B: ByteBuffer>(
    buf: &mut B,
    offset: usize,
    text: &str,
) -> BufResult<usize> {
    if text.is_ascii() {
        buf.set_bytes(offset, text.as_bytes())?;
        return Ok(text.len());
    }
    let len = encoded_len(text);
    let capacity = buf.capacity();
    match offset.checked_add(len) {
        Some(end) if end <= capacity => {}
        _ => {
            return Err(BufError::OutOfRange {
                offset,
                len,
                capacity,
            })
        }
    }
    let out = &mut buf.as_bytes_mut()[offset..offset + len];
    for (slot, ch) in out.iter_mut().zip(text.chars()) {
        *slot = u8::try_from(u32::from(ch)).map_err(|_| BufError::UnencodableChar { ch })?;
    }
    Ok(len)
}

/// Decodes single-octet characters.
#[must_use]
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Returns the first character that cannot be encoded, if any.
#[must_use]
pub fn first_unencodable(text: &str) -> Option<char> {
    text.chars().find(|&ch| u32::from(ch) > 0xFF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VecBuffer;

    #[test]
    fn ascii_roundtrip() {
        let mut buf = VecBuffer::with_capacity(5);
        let written = encode_into(&mut buf, 0, "hello").unwrap();
        assert_eq!(written, 5);
        assert_eq!(buf.as_bytes(), b"hello");
        assert_eq!(decode(buf.as_bytes()), "hello");
    }

    #[test]
    fn high_octets_are_one_byte_each() {
        let text = "caf\u{e9}\u{ff}";
        assert_eq!(encoded_len(text), 5);
        assert_eq!(text.len(), 7, "utf-8 length differs from wire length");

        let mut buf = VecBuffer::with_capacity(5);
        encode_into(&mut buf, 0, text).unwrap();
        assert_eq!(buf.as_bytes(), &[b'c', b'a', b'f', 0xE9, 0xFF]);
        assert_eq!(decode(buf.as_bytes()), text);
    }

    #[test]
    fn multi_byte_code_point_rejected() {
        let mut buf = VecBuffer::with_capacity(3);
        let err = encode_into(&mut buf, 0, "a\u{20ac}b").unwrap_err();
        assert_eq!(err, BufError::UnencodableChar { ch: '\u{20ac}' });
        assert_eq!(first_unencodable("a\u{20ac}b"), Some('\u{20ac}'));
        assert_eq!(first_unencodable("plain"), None);
    }

    #[test]
    fn encode_past_capacity_rejected() {
        let mut buf = VecBuffer::with_capacity(3);
        let err = encode_into(&mut buf, 1, "abc").unwrap_err();
        assert!(matches!(err, BufError::OutOfRange { offset: 1, len: 3, .. }));

        let err = encode_into(&mut buf, 1, "\u{e9}\u{e9}\u{e9}").unwrap_err();
        assert!(matches!(err, BufError::OutOfRange { offset: 1, len: 3, .. }));
    }

    #[test]
    fn empty_string() {
        let mut buf = VecBuffer::new();
        assert_eq!(encode_into(&mut buf, 0, "").unwrap(), 0);
        assert_eq!(decode(&[]), "");
    }
}
