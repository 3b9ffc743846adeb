//! stream/mod.rs
//! The `Stream` contract shared by both backings.
//!
//! Design notes:
//! - A backing supplies three things: an all-or-nothing `read_into`, a
//!   `write_raw`, and its default byte order. Every typed operation below is
//!   built on those, so both backings produce byte-identical encodings.
//! - Byte order is per call (`*_with`) with a construction-time default.
//! - There is no seek. Buffer streams override the composite reads so a
//!   failed string leaves cursor and counters where they were.
//! - No schema is enforced: fields must be read in the order they were written.
//!
//! Not thread-safe by contract: one stream serves one encode or decode run.

pub mod buffer;
pub mod channel;

pub use buffer::BufferStream;
pub use channel::{ChannelStream, FileReader, FileWriter};

use crate::constants::CSTRING_TERMINATOR;
use crate::endian::{Endian, Primitive};
use crate::telemetry::StreamCounters;
use crate::types::{Result, StreamError};
use crate::utils::trim_at_nul;

macro_rules! single_byte_ops {
    ($($ty:ty => $read:ident, $write:ident;)*) => {
        $(
            #[doc = concat!("Read one `", stringify!($ty), "`.")]
            fn $read(&mut self) -> Result<$ty> {
                read_primitive::<$ty, Self>(self, Endian::Little)
            }

            #[doc = concat!("Write one `", stringify!($ty), "`.")]
            fn $write(&mut self, v: $ty) -> Result<()> {
                write_primitive::<$ty, Self>(self, v, Endian::Little)
            }
        )*
    };
}

macro_rules! multi_byte_ops {
    ($($ty:ty => $read:ident, $read_with:ident, $write:ident, $write_with:ident;)*) => {
        $(
            #[doc = concat!("Read a `", stringify!($ty), "` in the stream's default byte order.")]
            fn $read(&mut self) -> Result<$ty> {
                let endian = self.endian();
                self.$read_with(endian)
            }

            #[doc = concat!("Read a `", stringify!($ty), "` in the given byte order.")]
            fn $read_with(&mut self, endian: Endian) -> Result<$ty> {
                read_primitive::<$ty, Self>(self, endian)
            }

            #[doc = concat!("Write a `", stringify!($ty), "` in the stream's default byte order.")]
            fn $write(&mut self, v: $ty) -> Result<()> {
                let endian = self.endian();
                self.$write_with(v, endian)
            }

            #[doc = concat!("Write a `", stringify!($ty), "` in the given byte order.")]
            fn $write_with(&mut self, v: $ty, endian: Endian) -> Result<()> {
                write_primitive::<$ty, Self>(self, v, endian)
            }
        )*
    };
}

pub trait Stream {
    /// Default byte order, fixed at construction.
    fn endian(&self) -> Endian;

    /// Fill `buf` completely or fail without handing out partial data.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Transfer all of `data` or fail.
    fn write_raw(&mut self, data: &[u8]) -> Result<()>;

    /// Bytes consumed so far (the cursor in buffer mode).
    fn offset(&self) -> usize;

    fn counters(&self) -> &StreamCounters;

    /// Upper bound on a single length-prefixed payload, if the backing has one.
    fn max_payload_len(&self) -> Option<usize> {
        None
    }

    /// Read exactly `n` bytes.
    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; n];
        self.read_into(&mut out)?;
        Ok(out)
    }

    /// Append raw bytes.
    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.write_raw(data)
    }

    /// Decode hex text and append the bytes. Bad hex is `MalformedInput`,
    /// which [`StreamError::is_fatal`] reports as a caller defect.
    fn write_hex(&mut self, text: &str) -> Result<()> {
        let data = hex::decode(text)?;
        self.write_raw(&data)
    }

    single_byte_ops! {
        u8 => read_u8, write_u8;
        i8 => read_i8, write_i8;
    }

    multi_byte_ops! {
        u16 => read_u16, read_u16_with, write_u16, write_u16_with;
        u32 => read_u32, read_u32_with, write_u32, write_u32_with;
        u64 => read_u64, read_u64_with, write_u64, write_u64_with;
        i16 => read_i16, read_i16_with, write_i16, write_i16_with;
        i32 => read_i32, read_i32_with, write_i32, write_i32_with;
        i64 => read_i64, read_i64_with, write_i64, write_i64_with;
        f32 => read_f32, read_f32_with, write_f32, write_f32_with;
        f64 => read_f64, read_f64_with, write_f64, write_f64_with;
    }

    /// `u16` byte length followed by the UTF-8 bytes.
    fn write_string(&mut self, s: &str) -> Result<()> {
        let endian = self.endian();
        self.write_string_with(s, endian)
    }

    fn write_string_with(&mut self, s: &str, endian: Endian) -> Result<()> {
        let len = u16::try_from(s.len()).map_err(|_| StreamError::LengthOverflow {
            len: s.len(),
            max: u16::MAX as u64,
        })?;
        write_prefixed(self, len, s.as_bytes(), endian)
    }

    /// `u64` byte length followed by the UTF-8 bytes.
    fn write_string64(&mut self, s: &str) -> Result<()> {
        let endian = self.endian();
        self.write_string64_with(s, endian)
    }

    fn write_string64_with(&mut self, s: &str, endian: Endian) -> Result<()> {
        write_prefixed(self, s.len() as u64, s.as_bytes(), endian)
    }

    fn read_string(&mut self) -> Result<String> {
        let endian = self.endian();
        self.read_string_with(endian)
    }

    fn read_string_with(&mut self, endian: Endian) -> Result<String> {
        read_prefixed::<u16, Self>(self, endian)
    }

    fn read_string64(&mut self) -> Result<String> {
        let endian = self.endian();
        self.read_string64_with(endian)
    }

    fn read_string64_with(&mut self, endian: Endian) -> Result<String> {
        read_prefixed::<u64, Self>(self, endian)
    }

    /// Fixed-width field of exactly `width` bytes: the first `width` bytes of
    /// `s`, zero-padded. Truncation is by byte, so a cut multi-byte char only
    /// reads back through [`Stream::read_cstring_bytes`].
    fn write_cstring(&mut self, s: &str, width: usize) -> Result<()> {
        self.write_cstring_bytes(s.as_bytes(), width)
    }

    fn write_cstring_bytes(&mut self, content: &[u8], width: usize) -> Result<()> {
        let mut field = vec![0u8; width];
        let n = content.len().min(width);
        field[..n].copy_from_slice(&content[..n]);
        self.write_raw(&field)
    }

    /// Consume exactly `width` bytes; the content ends at the first NUL and
    /// must be UTF-8.
    fn read_cstring(&mut self, width: usize) -> Result<String> {
        let start = self.offset();
        into_utf8(self.read_cstring_bytes(width)?, start)
    }

    /// Like [`Stream::read_cstring`] without the UTF-8 check.
    fn read_cstring_bytes(&mut self, width: usize) -> Result<Vec<u8>> {
        let mut field = self.read_bytes(width)?;
        let n = trim_at_nul(&field).len();
        field.truncate(n);
        Ok(field)
    }

    /// Content bytes followed by a single NUL. Content holding a NUL of its
    /// own will not read back intact.
    fn write_cstring_unsized(&mut self, s: &str) -> Result<()> {
        self.write_cstring_unsized_bytes(s.as_bytes())
    }

    fn write_cstring_unsized_bytes(&mut self, content: &[u8]) -> Result<()> {
        let mut out = Vec::with_capacity(content.len() + 1);
        out.extend_from_slice(content);
        out.push(CSTRING_TERMINATOR);
        self.write_raw(&out)
    }

    /// Read up to and including a NUL; returns the content before it.
    fn read_cstring_unsized(&mut self) -> Result<String> {
        let start = self.offset();
        into_utf8(self.read_cstring_unsized_bytes()?, start)
    }

    fn read_cstring_unsized_bytes(&mut self) -> Result<Vec<u8>> {
        read_until_nul(self)
    }
}

/// Generic element operations. Blanket-implemented for every [`Stream`],
/// `dyn Stream` included, so codecs taking `S: Stream + ?Sized` can use them.
pub trait StreamExt: Stream {
    /// Generic form of the typed reads.
    fn read<T: Primitive>(&mut self) -> Result<T> {
        let endian = self.endian();
        read_primitive::<T, Self>(self, endian)
    }

    /// Generic form of the typed writes.
    fn write<T: Primitive>(&mut self, v: T) -> Result<()> {
        let endian = self.endian();
        write_primitive::<T, Self>(self, v, endian)
    }

    /// Read `N` values back to back. No length goes on the wire.
    fn read_array<T: Primitive, const N: usize>(&mut self) -> Result<[T; N]> {
        let endian = self.endian();
        self.read_array_with(endian)
    }

    fn read_array_with<T: Primitive, const N: usize>(&mut self, endian: Endian) -> Result<[T; N]> {
        let raw = self.read_bytes(run_len::<T>(N)?)?;
        Ok(std::array::from_fn(|i| T::get(endian, &raw[i * T::WIDTH..(i + 1) * T::WIDTH])))
    }

    /// Read a run of `count` values whose length is known from elsewhere
    /// (a sibling field or the schema).
    fn read_vec<T: Primitive>(&mut self, count: usize) -> Result<Vec<T>> {
        let endian = self.endian();
        self.read_vec_with(count, endian)
    }

    fn read_vec_with<T: Primitive>(&mut self, count: usize, endian: Endian) -> Result<Vec<T>> {
        let total = run_len::<T>(count)?;
        let total = payload_len(&*self, total as u64)?;
        let raw = self.read_bytes(total)?;
        Ok(raw.chunks_exact(T::WIDTH).map(|c| T::get(endian, c)).collect())
    }

    /// Overwrite every element of `out`, reading one run of `out.len()` values.
    fn fill_slice<T: Primitive>(&mut self, out: &mut [T]) -> Result<()> {
        let endian = self.endian();
        self.fill_slice_with(out, endian)
    }

    fn fill_slice_with<T: Primitive>(&mut self, out: &mut [T], endian: Endian) -> Result<()> {
        let raw = self.read_bytes(run_len::<T>(out.len())?)?;
        for (slot, c) in out.iter_mut().zip(raw.chunks_exact(T::WIDTH)) {
            *slot = T::get(endian, c);
        }
        Ok(())
    }

    /// Write every value of `values` back to back in one transfer.
    fn write_slice<T: Primitive>(&mut self, values: &[T]) -> Result<()> {
        let endian = self.endian();
        self.write_slice_with(values, endian)
    }

    fn write_slice_with<T: Primitive>(&mut self, values: &[T], endian: Endian) -> Result<()> {
        let mut out = vec![0u8; run_len::<T>(values.len())?];
        for (v, c) in values.iter().copied().zip(out.chunks_exact_mut(T::WIDTH)) {
            v.put(endian, c);
        }
        self.write_raw(&out)
    }
}

impl<S: Stream + ?Sized> StreamExt for S {}

fn read_primitive<T: Primitive, S: Stream + ?Sized>(s: &mut S, endian: Endian) -> Result<T> {
    let mut tmp = [0u8; 8];
    let buf = &mut tmp[..T::WIDTH];
    s.read_into(buf)?;
    Ok(T::get(endian, buf))
}

fn write_primitive<T: Primitive, S: Stream + ?Sized>(s: &mut S, v: T, endian: Endian) -> Result<()> {
    let mut tmp = [0u8; 8];
    let buf = &mut tmp[..T::WIDTH];
    v.put(endian, buf);
    s.write_raw(buf)
}

// Prefix and body go out in one write so a buffer stream never holds half a string.
fn write_prefixed<P: Primitive, S: Stream + ?Sized>(
    s: &mut S,
    len: P,
    body: &[u8],
    endian: Endian,
) -> Result<()> {
    let mut out = vec![0u8; P::WIDTH + body.len()];
    len.put(endian, &mut out[..P::WIDTH]);
    out[P::WIDTH..].copy_from_slice(body);
    s.write_raw(&out)
}

fn read_prefixed<P, S>(s: &mut S, endian: Endian) -> Result<String>
where
    P: Primitive + Into<u64>,
    S: Stream + ?Sized,
{
    let start = s.offset();
    let len: u64 = read_primitive::<P, S>(s, endian)?.into();
    let len = payload_len(&*s, len)?;
    let body = s.read_bytes(len)?;
    into_utf8(body, start)
}

fn read_until_nul<S: Stream + ?Sized>(s: &mut S) -> Result<Vec<u8>> {
    let limit = s.max_payload_len();
    let mut content = Vec::new();
    loop {
        let b = s.read_u8()?;
        if b == CSTRING_TERMINATOR {
            return Ok(content);
        }
        if let Some(max) = limit {
            if content.len() >= max {
                return Err(StreamError::LengthLimit { len: content.len() as u64 + 1, max });
            }
        }
        content.push(b);
    }
}

/// Convert a length read off the wire into an allocation size, honouring the
/// backing's payload limit.
fn payload_len<S: Stream + ?Sized>(s: &S, len: u64) -> Result<usize> {
    let max = s.max_payload_len().unwrap_or(usize::MAX);
    match usize::try_from(len) {
        Ok(n) if n <= max => Ok(n),
        _ => Err(StreamError::LengthLimit { len, max }),
    }
}

// Byte length of a run of `count` values.
fn run_len<T: Primitive>(count: usize) -> Result<usize> {
    count.checked_mul(T::WIDTH).ok_or(StreamError::LengthLimit {
        len: count as u64,
        max: usize::MAX / T::WIDTH,
    })
}

fn into_utf8(bytes: Vec<u8>, pos: usize) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| StreamError::InvalidUtf8 { pos })
}
