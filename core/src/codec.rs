//! codec.rs
//!
//! The contract generated types implement on top of a [`Stream`].
//!
//! Implementors supply the two stream-level operations; the standalone forms
//! come for free:
//! - `encode` builds a fresh buffer stream, writes the value, returns its bytes.
//! - `encode_stream` appends the value to an existing stream.
//! - `decode` parses a value from a standalone byte slice and rejects leftovers.
//! - `decode_stream` consumes the value from an existing stream in place.
//!
//! `encoded_len` and `encode_into` serve callers that size or own the output
//! buffer themselves.
//!
//! This crate defines the contract only; it ships no implementations.

use log::debug;

use std::io;

use crate::stream::{BufferStream, ChannelStream, Stream};
use crate::types::{Result, StreamError};

pub trait Codec: Sized {
    fn encode_stream<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<()>;

    fn decode_stream<S: Stream + ?Sized>(stream: &mut S) -> Result<Self>;

    fn encode(&self) -> Result<Vec<u8>> {
        let mut stream = BufferStream::new();
        self.encode_stream(&mut stream)?;
        Ok(stream.into_vec())
    }

    /// Encoded size in bytes. The default runs the encoder into a discarding
    /// sink; generated code with a fixed layout can return a constant.
    fn encoded_len(&self) -> Result<usize> {
        let mut sink = ChannelStream::writer(io::sink());
        self.encode_stream(&mut sink)?;
        Ok(sink.counters().bytes_written as usize)
    }

    /// Encode into the front of `buf` and return the number of bytes used.
    /// `buf` is left untouched when it is too small.
    fn encode_into(&self, buf: &mut [u8]) -> Result<usize> {
        let bytes = self.encode()?;
        if bytes.len() > buf.len() {
            return Err(StreamError::BufferTooSmall { need: bytes.len(), have: buf.len() });
        }
        buf[..bytes.len()].copy_from_slice(&bytes);
        Ok(bytes.len())
    }

    fn decode(data: &[u8]) -> Result<Self> {
        let mut stream = BufferStream::from(data);
        let value = Self::decode_stream(&mut stream)?;
        if !stream.is_exhausted() {
            let remaining = stream.remaining();
            debug!("codec: {} bytes left after decode", remaining);
            return Err(StreamError::TrailingData { remaining });
        }
        Ok(value)
    }

    /// Decode into `self`, replacing its contents only on success.
    fn decode_in_place(&mut self, data: &[u8]) -> Result<()> {
        *self = Self::decode(data)?;
        Ok(())
    }
}
