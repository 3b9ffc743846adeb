//! stream/channel.rs
//!
//! Sequential stream over a `Read` source and/or a `Write` sink.
//!
//! Design notes:
//! - No size, no cursor, no seeking. `offset` only counts bytes consumed.
//! - Reads loop over short reads and `Interrupted` until the request is
//!   filled; a zero-length read first means the source is exhausted.
//! - Writes loop the same way; a zero-length write is a sink failure.
//! - Calls block as long as the wrapped endpoint blocks. Timeouts belong to
//!   the endpoint.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use log::{debug, trace};

use crate::config::StreamOptions;
use crate::endian::Endian;
use crate::stream::Stream;
use crate::telemetry::StreamCounters;
use crate::types::{Result, StreamError};

#[derive(Debug)]
pub struct ChannelStream<R, W> {
    reader: Option<R>,
    writer: Option<W>,
    endian: Endian,
    max_payload_len: usize,
    consumed: usize,
    counters: StreamCounters,
}

impl<R: Read> ChannelStream<R, io::Sink> {
    /// Read-only stream; writes fail with `SinkFailure`.
    pub fn reader(reader: R) -> Self {
        Self::reader_with_options(reader, &StreamOptions::default())
    }

    pub fn reader_with_options(reader: R, opts: &StreamOptions) -> Self {
        ChannelStream::with_options(Some(reader), None, opts)
    }
}

impl<W: Write> ChannelStream<io::Empty, W> {
    /// Write-only stream; reads fail with `SourceFailure`.
    pub fn writer(writer: W) -> Self {
        Self::writer_with_options(writer, &StreamOptions::default())
    }

    pub fn writer_with_options(writer: W, opts: &StreamOptions) -> Self {
        ChannelStream::with_options(None, Some(writer), opts)
    }
}

/// Read-only stream over a buffered file.
pub type FileReader = ChannelStream<BufReader<File>, io::Sink>;
/// Write-only stream over a buffered file. Call `flush` before dropping.
pub type FileWriter = ChannelStream<io::Empty, BufWriter<File>>;

impl FileReader {
    pub fn open(path: impl AsRef<Path>, opts: &StreamOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        trace!("channel stream: reading {}", path.display());
        Ok(Self::reader_with_options(BufReader::new(file), opts))
    }
}

impl FileWriter {
    /// Create (or truncate) `path`.
    pub fn create(path: impl AsRef<Path>, opts: &StreamOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        trace!("channel stream: writing {}", path.display());
        Ok(Self::writer_with_options(BufWriter::new(file), opts))
    }
}

impl<R: Read, W: Write> ChannelStream<R, W> {
    pub fn duplex(reader: R, writer: W) -> Self {
        Self::with_options(Some(reader), Some(writer), &StreamOptions::default())
    }

    pub fn with_options(reader: Option<R>, writer: Option<W>, opts: &StreamOptions) -> Self {
        trace!(
            "channel stream: new (source: {}, sink: {}, {})",
            reader.is_some(),
            writer.is_some(),
            opts.endian
        );
        Self {
            reader,
            writer,
            endian: opts.endian,
            max_payload_len: opts.max_payload_len,
            consumed: 0,
            counters: StreamCounters::default(),
        }
    }

    pub fn has_source(&self) -> bool {
        self.reader.is_some()
    }

    pub fn has_sink(&self) -> bool {
        self.writer.is_some()
    }

    pub fn get_reader(&self) -> Option<&R> {
        self.reader.as_ref()
    }

    pub fn get_writer(&self) -> Option<&W> {
        self.writer.as_ref()
    }

    /// Flush the sink, if any.
    pub fn flush(&mut self) -> Result<()> {
        match self.writer.as_mut() {
            Some(w) => w.flush().map_err(|e| StreamError::SinkFailure(e.to_string())),
            None => Ok(()),
        }
    }

    pub fn into_inner(self) -> (Option<R>, Option<W>) {
        (self.reader, self.writer)
    }
}

impl<R: Read, W: Write> Stream for ChannelStream<R, W> {
    fn endian(&self) -> Endian {
        self.endian
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        let res = match self.reader.as_mut() {
            Some(r) => fill(r, buf, &mut self.counters),
            None => Err(StreamError::SourceFailure("stream has no source".into())),
        };
        match res {
            Ok(()) => {
                self.consumed += buf.len();
                self.counters.add_read(buf.len());
                Ok(())
            }
            Err(e) => {
                debug!("channel stream: read of {} bytes at {} failed: {}", buf.len(), self.consumed, e);
                self.counters.add_read_failure();
                Err(e)
            }
        }
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        let res = match self.writer.as_mut() {
            Some(w) => drain(w, data),
            None => Err(StreamError::SinkFailure("stream has no sink".into())),
        };
        match res {
            Ok(()) => {
                self.counters.add_write(data.len());
                Ok(())
            }
            Err(e) => {
                debug!("channel stream: write of {} bytes failed: {}", data.len(), e);
                self.counters.add_write_failure();
                Err(e)
            }
        }
    }

    fn offset(&self) -> usize {
        self.consumed
    }

    fn counters(&self) -> &StreamCounters {
        &self.counters
    }

    fn max_payload_len(&self) -> Option<usize> {
        Some(self.max_payload_len)
    }
}

// Read until `buf` is full, retrying short reads.
fn fill<R: Read>(r: &mut R, buf: &mut [u8], counters: &mut StreamCounters) -> Result<()> {
    let mut off = 0;
    while off < buf.len() {
        match r.read(&mut buf[off..]) {
            Ok(0) => {
                return Err(StreamError::SourceFailure(format!(
                    "source exhausted after {} of {} bytes",
                    off,
                    buf.len()
                )))
            }
            Ok(n) => {
                off += n;
                if off < buf.len() {
                    counters.add_short_read();
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(StreamError::SourceFailure(e.to_string())),
        }
    }
    Ok(())
}

// Write all of `data`, retrying partial writes.
fn drain<W: Write>(w: &mut W, data: &[u8]) -> Result<()> {
    let mut off = 0;
    while off < data.len() {
        match w.write(&data[off..]) {
            Ok(0) => {
                return Err(StreamError::SinkFailure(format!(
                    "sink accepted {} of {} bytes",
                    off,
                    data.len()
                )))
            }
            Ok(n) => off += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(StreamError::SinkFailure(e.to_string())),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reader_only_rejects_writes() {
        let mut s = ChannelStream::reader(Cursor::new(vec![7u8]));
        assert!(matches!(s.write_u8(1), Err(StreamError::SinkFailure(_))));
        assert_eq!(s.read_u8().unwrap(), 7);
        assert_eq!(s.counters().write_failures, 1);
    }

    #[test]
    fn writer_only_rejects_reads() {
        let mut s = ChannelStream::writer(Vec::new());
        assert!(matches!(s.read_u8(), Err(StreamError::SourceFailure(_))));
        s.write_u16(0x0102).unwrap();
        let (_, w) = s.into_inner();
        assert_eq!(w.unwrap(), vec![0x02, 0x01]);
    }

    #[test]
    fn exhausted_source() {
        let mut s = ChannelStream::reader(Cursor::new(vec![1u8, 2]));
        let err = s.read_u32().unwrap_err();
        assert!(matches!(err, StreamError::SourceFailure(_)));
        assert!(err.is_eof());
        assert_eq!(s.offset(), 0);
    }

    #[test]
    fn offset_counts_consumed_bytes() {
        let mut s = ChannelStream::reader(Cursor::new(vec![0u8; 16]));
        s.read_u64().unwrap();
        s.read_u16().unwrap();
        assert_eq!(s.offset(), 10);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = FileReader::open("/definitely/not/here.bin", &StreamOptions::default()).unwrap_err();
        assert!(matches!(err, StreamError::Io(_)));
    }

    #[test]
    fn duplex_round_trip() {
        let mut s = ChannelStream::duplex(Cursor::new(vec![0xAAu8]), Vec::new());
        assert!(s.has_source() && s.has_sink());
        s.write_u8(0x55).unwrap();
        s.flush().unwrap();
        assert_eq!(s.read_u8().unwrap(), 0xAA);
        assert_eq!(s.get_writer().unwrap(), &vec![0x55]);
    }
}
