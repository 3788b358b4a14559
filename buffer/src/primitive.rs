//! Fixed-width primitives and their little-endian wire representation.

/// A fixed-width value with a little-endian wire representation.
///
/// Every multi-byte primitive is stored little-endian, independent of the
/// host byte order and of the buffer backend performing the access.
pub trait Primitive: Copy {
    /// Number of bytes this primitive occupies on the wire.
    const WIDTH: usize;

    /// Reads the value from exactly `WIDTH` bytes.
    fn read_le(bytes: &[u8]) -> Self;

    /// Writes the value into exactly `WIDTH` bytes.
    fn write_le(self, out: &mut [u8]);
}

macro_rules! impl_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::WIDTH]);
                    <$ty>::from_le_bytes(raw)
                }

                #[inline]
                fn write_le(self, out: &mut [u8]) {
                    out[..Self::WIDTH].copy_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_primitive!(u8, u16, u32, i8, i16, i32, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_match_wire_format() {
        assert_eq!(u8::WIDTH, 1);
        assert_eq!(u16::WIDTH, 2);
        assert_eq!(u32::WIDTH, 4);
        assert_eq!(i8::WIDTH, 1);
        assert_eq!(i16::WIDTH, 2);
        assert_eq!(i32::WIDTH, 4);
        assert_eq!(f32::WIDTH, 4);
        assert_eq!(f64::WIDTH, 8);
    }

    #[test]
    fn multi_byte_values_are_little_endian() {
        let mut out = [0u8; 4];
        0x1234_5678u32.write_le(&mut out);
        assert_eq!(out, [0x78, 0x56, 0x34, 0x12]);

        let mut out = [0u8; 2];
        (-1000i16).write_le(&mut out);
        assert_eq!(out, [0x18, 0xFC]);
    }

    #[test]
    fn read_le_ignores_trailing_bytes() {
        let bytes = [0x01, 0x02, 0xFF, 0xFF];
        assert_eq!(u16::read_le(&bytes), 0x0201);
    }

    #[test]
    fn floats_roundtrip_bit_exact() {
        let mut out = [0u8; 8];
        f64::NAN.write_le(&mut out);
        assert!(f64::read_le(&out).is_nan());

        let mut out = [0u8; 4];
        (-0.0f32).write_le(&mut out);
        assert_eq!(f32::read_le(&out).to_bits(), (-0.0f32).to_bits());
    }
}
