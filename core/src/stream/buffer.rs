//! stream/buffer.rs
//!
//! In-memory stream over an owned, growable byte vector.
//!
//! Design notes:
//! - Writes append; the vector only ever grows until `reset`.
//! - Reads walk a cursor with `0 <= pos <= size`. The extent is validated
//!   before anything is consumed, so a failed read leaves `pos` untouched.
//!   Composite reads (strings, C-strings) keep the same guarantee: cursor and
//!   counters go back to where they were and one failure is counted.
//! - Size is always the number of bytes held, so bytes written into a stream
//!   can be read back from the same stream.

use bytes::Bytes;
use log::{debug, trace};

use crate::config::StreamOptions;
use crate::constants::DEFAULT_ENDIAN;
use crate::endian::Endian;
use crate::stream::{self, Stream};
use crate::telemetry::StreamCounters;
use crate::types::{Result, StreamError};
use crate::utils::preview_bytes;

#[derive(Debug, Clone)]
pub struct BufferStream {
    data: Vec<u8>,
    pos: usize,
    endian: Endian,
    counters: StreamCounters,
}

impl Default for BufferStream {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferStream {
    /// Empty, growable stream for encoding.
    pub fn new() -> Self {
        Self::with_options(&StreamOptions::default())
    }

    /// Empty stream with `capacity` bytes reserved. Size is still zero.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_options(&StreamOptions::default().with_capacity(capacity))
    }

    pub fn with_options(opts: &StreamOptions) -> Self {
        let data = match opts.capacity_hint {
            Some(cap) => Vec::with_capacity(cap),
            None => Vec::new(),
        };
        trace!("buffer stream: new ({}, capacity {})", opts.endian, data.capacity());
        Self { data, pos: 0, endian: opts.endian, counters: StreamCounters::default() }
    }

    /// Decode-mode stream: takes ownership of `data`, cursor at 0.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::from_bytes_with_endian(data, DEFAULT_ENDIAN)
    }

    pub fn from_bytes_with_endian(data: impl Into<Vec<u8>>, endian: Endian) -> Self {
        let data = data.into();
        trace!("buffer stream: from {} ({})", preview_bytes(&data), endian);
        Self { data, pos: 0, endian, counters: StreamCounters::default() }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Everything written (or supplied at construction), independent of the cursor.
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.data)
    }

    /// Drop all data and rewind, keeping the allocation and byte order.
    pub fn reset(&mut self) {
        trace!("buffer stream: reset after {} bytes", self.data.len());
        self.data.clear();
        self.pos = 0;
        self.counters = StreamCounters::default();
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn read_slice(&mut self, n: usize) -> Result<&[u8]> {
        let end = self.check(n)?;
        let start = self.pos;
        self.pos = end;
        self.counters.add_read(n);
        Ok(&self.data[start..end])
    }

    /// Borrow the next `n` bytes without moving the cursor.
    pub fn peek(&self, n: usize) -> Result<&[u8]> {
        let end = self.check(n)?;
        Ok(&self.data[self.pos..end])
    }

    // End offset of an `n`-byte read, or the bounds error.
    fn check(&self, n: usize) -> Result<usize> {
        match self.pos.checked_add(n) {
            Some(end) if end <= self.data.len() => Ok(end),
            _ => Err(StreamError::OutOfBounds { need: n, have: self.remaining(), pos: self.pos }),
        }
    }

    fn fail<T>(&mut self, e: StreamError) -> Result<T> {
        debug!("buffer stream: read failed: {}", e);
        self.counters.add_read_failure();
        Err(e)
    }

    // Run a multi-step read; on failure restore cursor and counters.
    fn atomically<T>(&mut self, read: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let (pos, counters) = (self.pos, self.counters.clone());
        let out = read(self);
        if let Err(e) = &out {
            debug!("buffer stream: composite read at {} failed: {}", pos, e);
            self.pos = pos;
            self.counters = counters;
            self.counters.add_read_failure();
        }
        out
    }
}

impl From<Vec<u8>> for BufferStream {
    fn from(data: Vec<u8>) -> Self {
        Self::from_bytes(data)
    }
}

impl From<&[u8]> for BufferStream {
    fn from(data: &[u8]) -> Self {
        Self::from_bytes(data.to_vec())
    }
}

impl Stream for BufferStream {
    fn endian(&self) -> Endian {
        self.endian
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.check(buf.len()) {
            Ok(end) => {
                buf.copy_from_slice(&self.data[self.pos..end]);
                self.pos = end;
                self.counters.add_read(buf.len());
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    // Bounds first, so a bogus length never turns into a large allocation.
    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        if let Err(e) = self.check(n) {
            return self.fail(e);
        }
        Ok(self.read_slice(n)?.to_vec())
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        self.data.extend_from_slice(data);
        self.counters.add_write(data.len());
        Ok(())
    }

    fn offset(&self) -> usize {
        self.pos
    }

    fn counters(&self) -> &StreamCounters {
        &self.counters
    }

    fn read_string_with(&mut self, endian: Endian) -> Result<String> {
        self.atomically(|s| stream::read_prefixed::<u16, Self>(s, endian))
    }

    fn read_string64_with(&mut self, endian: Endian) -> Result<String> {
        self.atomically(|s| stream::read_prefixed::<u64, Self>(s, endian))
    }

    fn read_cstring(&mut self, width: usize) -> Result<String> {
        self.atomically(|s| {
            let start = s.pos;
            stream::into_utf8(s.read_cstring_bytes(width)?, start)
        })
    }

    fn read_cstring_unsized(&mut self) -> Result<String> {
        self.atomically(|s| {
            let start = s.pos;
            stream::into_utf8(stream::read_until_nul(s)?, start)
        })
    }

    fn read_cstring_unsized_bytes(&mut self) -> Result<Vec<u8>> {
        self.atomically(|s| stream::read_until_nul(s))
    }
}
