//! endian.rs
//! Byte order selection and the fixed-width primitive codec.
//!
//! Design notes:
//! - Integers are written as exactly 1/2/4/8 bytes in the chosen order.
//! - Signed values share the bit pattern of their unsigned counterpart.
//! - Floats travel as their raw IEEE-754 bits through the integer path,
//!   so NaN payloads and infinities round-trip untouched.

use std::fmt;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

/// Byte order for multi-byte values.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    pub fn is_little(self) -> bool {
        matches!(self, Endian::Little)
    }

    pub fn is_big(self) -> bool {
        matches!(self, Endian::Big)
    }
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endian::Little => write!(f, "little-endian"),
            Endian::Big => write!(f, "big-endian"),
        }
    }
}

/// A fixed-width value the stream knows how to put on the wire.
///
/// `put` receives a slice of exactly `WIDTH` bytes; `get` is handed the same.
pub trait Primitive: Copy + Sized {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Short type name for error messages and logs.
    const NAME: &'static str;

    fn put(self, endian: Endian, out: &mut [u8]);

    fn get(endian: Endian, buf: &[u8]) -> Self;
}

impl Primitive for u8 {
    const WIDTH: usize = 1;
    const NAME: &'static str = "u8";

    #[inline]
    fn put(self, _: Endian, out: &mut [u8]) {
        out[0] = self;
    }

    #[inline]
    fn get(_: Endian, buf: &[u8]) -> Self {
        buf[0]
    }
}

impl Primitive for i8 {
    const WIDTH: usize = 1;
    const NAME: &'static str = "i8";

    #[inline]
    fn put(self, _: Endian, out: &mut [u8]) {
        out[0] = self as u8;
    }

    #[inline]
    fn get(_: Endian, buf: &[u8]) -> Self {
        buf[0] as i8
    }
}

// Multi-byte integers dispatch on the byte order to byteorder's codec.
macro_rules! int_primitive {
    ($ty:ty, $width:expr, $write:ident, $read:ident) => {
        impl Primitive for $ty {
            const WIDTH: usize = $width;
            const NAME: &'static str = stringify!($ty);

            #[inline]
            fn put(self, endian: Endian, out: &mut [u8]) {
                match endian {
                    Endian::Little => LittleEndian::$write(out, self),
                    Endian::Big => BigEndian::$write(out, self),
                }
            }

            #[inline]
            fn get(endian: Endian, buf: &[u8]) -> Self {
                match endian {
                    Endian::Little => LittleEndian::$read(buf),
                    Endian::Big => BigEndian::$read(buf),
                }
            }
        }
    };
}

int_primitive!(u16, 2, write_u16, read_u16);
int_primitive!(u32, 4, write_u32, read_u32);
int_primitive!(u64, 8, write_u64, read_u64);
int_primitive!(i16, 2, write_i16, read_i16);
int_primitive!(i32, 4, write_i32, read_i32);
int_primitive!(i64, 8, write_i64, read_i64);

// Floats go through their integer bit pattern, never through a float codec.
macro_rules! float_primitive {
    ($ty:ty, $bits:ty) => {
        impl Primitive for $ty {
            const WIDTH: usize = <$bits as Primitive>::WIDTH;
            const NAME: &'static str = stringify!($ty);

            #[inline]
            fn put(self, endian: Endian, out: &mut [u8]) {
                self.to_bits().put(endian, out)
            }

            #[inline]
            fn get(endian: Endian, buf: &[u8]) -> Self {
                <$ty>::from_bits(<$bits>::get(endian, buf))
            }
        }
    };
}

float_primitive!(f32, u32);
float_primitive!(f64, u64);
