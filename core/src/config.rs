//! config.rs
//! Construction-time stream configuration.
//!
//! Design notes:
//! - Options are read once when a stream is built and never mutated afterwards;
//!   the byte order in particular is an immutable field of the stream.
//! - `serde` support lets hosts keep stream settings next to their own config.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ENDIAN, DEFAULT_MAX_PAYLOAD_LEN};
use crate::endian::Endian;
use crate::types::StreamError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    /// Default byte order for calls that don't pass one.
    pub endian: Endian,
    /// Bytes to reserve up front in buffer mode. Does not change the size.
    pub capacity_hint: Option<usize>,
    /// Upper bound on a single length-prefixed or unsized read in channel mode.
    pub max_payload_len: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            endian: DEFAULT_ENDIAN,
            capacity_hint: None,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }
}

impl StreamOptions {
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity_hint = Some(capacity);
        self
    }

    pub fn with_max_payload_len(mut self, max: usize) -> Self {
        self.max_payload_len = max;
        self
    }

    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self, StreamError> {
        let opts: StreamOptions = serde_json::from_str(s)
            .map_err(|e| StreamError::MalformedInput(format!("stream options: {}", e)))?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn to_json(&self) -> Result<String, StreamError> {
        serde_json::to_string(self)
            .map_err(|e| StreamError::MalformedInput(format!("stream options: {}", e)))
    }

    pub fn validate(&self) -> Result<(), StreamError> {
        if self.max_payload_len == 0 {
            return Err(StreamError::MalformedInput("max_payload_len must be non-zero".into()));
        }
        Ok(())
    }
}
