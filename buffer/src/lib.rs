//! Byte buffer, bounded reader, and single-octet string primitives for the
//! tagwire codec.
//!
//! This crate provides the byte-level collaborators the codec consumes:
//! - [`ByteBuffer`], a block of bytes with typed accessors and exact growth,
//!   with an owned ([`VecBuffer`]) and a caller-provided ([`SliceBuffer`]) backend
//! - [`ByteReader`], a cursor that never reads past its limit
//! - [`latin1`], the single-octet string codec
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **One byte order** - Every multi-byte primitive is little-endian on the wire.
//! - **No domain knowledge** - This crate knows nothing about schemas or messages.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use buffer::{ByteBuffer, ByteReader, VecBuffer};
//!
//! let mut buf = VecBuffer::with_capacity(3);
//! buf.set(0, 200u8).unwrap();
//! buf.set(1, -1000i16).unwrap();
//!
//! let bytes = buf.into_inner();
//! let mut reader = ByteReader::new(&bytes);
//! assert_eq!(reader.read::<u8>().unwrap(), 200);
//! assert_eq!(reader.read::<i16>().unwrap(), -1000);
//! ```

mod buffer;
mod error;
pub mod latin1;
mod primitive;
mod reader;

pub use buffer::{ByteBuffer, SliceBuffer, VecBuffer};
pub use error::{BufError, BufResult};
pub use primitive::Primitive;
pub use reader::ByteReader;
