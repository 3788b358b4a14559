//! Bounded byte reader.

use crate::error::{BufError, BufResult};
use crate::primitive::Primitive;

/// A cursor over a byte slice that never reads past its limit.
///
/// All read operations are bounds-checked and return errors on failure.
/// The reader never panics on malformed input.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader over the whole slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Creates a reader over `data[..limit]` starting at `start`.
    ///
    /// Fails if `limit` exceeds the slice or `start` exceeds `limit`.
    pub fn with_bounds(data: &'a [u8], start: usize, limit: usize) -> BufResult<Self> {
        if limit > data.len() {
            return Err(BufError::UnexpectedEof {
                requested: limit,
                available: data.len(),
            });
        }
        if start > limit {
            return Err(BufError::UnexpectedEof {
                requested: start,
                available: limit,
            });
        }
        Ok(Self {
            data: &data[..limit],
            pos: start,
        })
    }

    /// Returns the number of bytes remaining before the limit.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` if no bytes remain.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the current byte offset into the underlying slice.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the next byte without advancing.
    pub fn peek_u8(&self) -> BufResult<u8> {
        self.ensure(1)?;
        Ok(self.data[self.pos])
    }

    /// Reads one byte.
    pub fn read_u8(&mut self) -> BufResult<u8> {
        let value = self.peek_u8()?;
        self.pos += 1;
        Ok(value)
    }

    /// Reads a little-endian primitive.
    pub fn read<P: Primitive>(&mut self) -> BufResult<P> {
        let bytes = self.read_bytes(P::WIDTH)?;
        Ok(P::read_le(bytes))
    }

    /// Reads `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> BufResult<&'a [u8]> {
        self.ensure(len)?;
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn ensure(&self, len: usize) -> BufResult<()> {
        let available = self.remaining();
        if len > available {
            return Err(BufError::UnexpectedEof {
                requested: len,
                available,
            });
        }
        Ok(())
    }
}
