use std::io;
use thiserror::Error;

/// Unified stream error covering bounds, endpoint failures, and bad caller input.
/// - Data errors (`OutOfBounds`, `SourceFailure`, `SinkFailure`, ...) are recoverable:
///   the caller abandons the current encode/decode attempt.
/// - `MalformedInput` is a programmer/config defect; see [`StreamError::is_fatal`].
#[derive(Debug, Error)]
pub enum StreamError {
    /// Buffer mode: the read extent runs past the end of the data.
    #[error("unable to read {need} bytes at position {pos}: out of bounds ({have} remaining)")]
    OutOfBounds { need: usize, have: usize, pos: usize },

    /// Channel mode: the source is exhausted or failed before supplying the bytes.
    #[error("source failure: {0}")]
    SourceFailure(String),

    /// Channel mode: the sink could not accept the bytes in full.
    #[error("sink failure: {0}")]
    SinkFailure(String),

    /// Caller input independent of stream state (e.g. non-hex text).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A length-prefixed string did not hold UTF-8.
    #[error("invalid utf-8 in string at position {pos}")]
    InvalidUtf8 { pos: usize },

    /// Payload too long for its length prefix.
    #[error("length {len} does not fit the prefix (max {max})")]
    LengthOverflow { len: usize, max: u64 },

    /// Declared length exceeds the configured payload limit.
    #[error("length {len} exceeds payload limit {max}")]
    LengthLimit { len: u64, max: usize },

    /// Caller-supplied output slice cannot hold the encoding.
    #[error("output buffer too small: need {need} bytes, have {have}")]
    BufferTooSmall { need: usize, have: usize },

    /// Standalone decode left unread bytes behind.
    #[error("{remaining} trailing bytes after decode")]
    TrailingData { remaining: usize },

    /// I/O error not mapped to a source/sink failure.
    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl StreamError {
    /// True for errors that indicate a caller defect rather than bad data.
    /// Callers may abort on these instead of propagating.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StreamError::MalformedInput(_))
    }

    /// True when the error came from missing data (either backing).
    pub fn is_eof(&self) -> bool {
        matches!(self, StreamError::OutOfBounds { .. } | StreamError::SourceFailure(_))
    }
}

impl From<io::Error> for StreamError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => StreamError::SourceFailure(e.to_string()),
            io::ErrorKind::WriteZero => StreamError::SinkFailure(e.to_string()),
            _ => StreamError::Io(e),
        }
    }
}

impl From<hex::FromHexError> for StreamError {
    fn from(e: hex::FromHexError) -> Self {
        StreamError::MalformedInput(format!("invalid hex: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, StreamError>;
