//! Byte buffer capability and its concrete backends.

use crate::error::{BufError, BufResult};
use crate::primitive::Primitive;

/// A block of bytes with typed accessors and exact, copy-preserving growth.
///
/// `capacity` is the number of addressable bytes. All accessors are
/// bounds-checked against it. Backends must produce byte-identical contents
/// for the same sequence of writes.
pub trait ByteBuffer {
    /// Returns the number of addressable bytes.
    fn capacity(&self) -> usize;

    /// Returns the addressable bytes (`len == capacity`).
    fn as_bytes(&self) -> &[u8];

    /// Returns the addressable bytes mutably (`len == capacity`).
    fn as_bytes_mut(&mut self) -> &mut [u8];

    /// Grows the buffer to exactly `new_capacity` bytes.
    ///
    /// Previously written bytes are preserved. Requests at or below the
    /// current capacity are a no-op.
    fn grow_to(&mut self, new_capacity: usize) -> BufResult<()>;

    /// Reads a primitive at `offset`.
    fn get<P: Primitive>(&self, offset: usize) -> BufResult<P> {
        let bytes = self.as_bytes();
        let end = offset.checked_add(P::WIDTH);
        match end {
            Some(end) if end <= bytes.len() => Ok(P::read_le(&bytes[offset..end])),
            _ => Err(BufError::UnexpectedEof {
                requested: P::WIDTH,
                available: bytes.len().saturating_sub(offset),
            }),
        }
    }

    /// Writes a primitive at `offset`.
    fn set<P: Primitive>(&mut self, offset: usize, value: P) -> BufResult<()> {
        let capacity = self.capacity();
        let range = checked_range(offset, P::WIDTH, capacity)?;
        value.write_le(&mut self.as_bytes_mut()[range]);
        Ok(())
    }

    /// Copies raw bytes to `offset`.
    fn set_bytes(&mut self, offset: usize, src: &[u8]) -> BufResult<()> {
        let capacity = self.capacity();
        let range = checked_range(offset, src.len(), capacity)?;
        self.as_bytes_mut()[range].copy_from_slice(src);
        Ok(())
    }
}

fn checked_range(offset: usize, len: usize, capacity: usize) -> BufResult<std::ops::Range<usize>> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(offset..end),
        _ => Err(BufError::OutOfRange {
            offset,
            len,
            capacity,
        }),
    }
}

/// Owned, heap-backed buffer.
///
/// Growth allocates exactly the requested capacity and copies the old
/// contents; it never over-allocates by a multiplicative factor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VecBuffer {
    bytes: Vec<u8>,
}

impl VecBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Creates a zero-filled buffer of exactly `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity],
        }
    }

    /// Consumes the buffer and returns its bytes.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.bytes
    }
}

impl ByteBuffer for VecBuffer {
    #[inline]
    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    fn grow_to(&mut self, new_capacity: usize) -> BufResult<()> {
        if new_capacity <= self.bytes.len() {
            return Ok(());
        }
        let mut grown = Vec::with_capacity(new_capacity);
        grown.extend_from_slice(&self.bytes);
        grown.resize(new_capacity, 0);
        self.bytes = grown;
        Ok(())
    }
}

impl From<VecBuffer> for Vec<u8> {
    fn from(buf: VecBuffer) -> Self {
        buf.bytes
    }
}

/// Buffer over caller-provided storage.
///
/// The addressable window starts at the requested capacity and may grow up
/// to the length of the backing slice. Growing past it fails with
/// [`BufError::CapacityExceeded`].
#[derive(Debug)]
pub struct SliceBuffer<'a> {
    out: &'a mut [u8],
    capacity: usize,
}

impl<'a> SliceBuffer<'a> {
    /// Creates a buffer whose first `capacity` bytes of `out` are addressable.
    pub fn new(out: &'a mut [u8], capacity: usize) -> BufResult<Self> {
        if capacity > out.len() {
            return Err(BufError::CapacityExceeded {
                requested: capacity,
                max: out.len(),
            });
        }
        out[..capacity].fill(0);
        Ok(Self { out, capacity })
    }
}

impl ByteBuffer for SliceBuffer<'_> {
    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn as_bytes(&self) -> &[u8] {
        &self.out[..self.capacity]
    }

    #[inline]
    fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.out[..self.capacity]
    }

    fn grow_to(&mut self, new_capacity: usize) -> BufResult<()> {
        if new_capacity <= self.capacity {
            return Ok(());
        }
        if new_capacity > self.out.len() {
            return Err(BufError::CapacityExceeded {
                requested: new_capacity,
                max: self.out.len(),
            });
        }
        self.out[self.capacity..new_capacity].fill(0);
        self.capacity = new_capacity;
        Ok(())
    }
}
