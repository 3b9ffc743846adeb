//! telemetry/counters.rs
//! Per-stream counters.
//!
//! Summary: counts operations and bytes moved through one stream instance.
//! Owned by the stream, so no locks or atomics are involved.
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCounters {
    pub reads: u64,
    pub writes: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub read_failures: u64,
    pub write_failures: u64,
    /// Channel mode: extra `read` calls needed because the source returned short.
    pub short_reads: u64,
}

impl StreamCounters {
    pub fn add_read(&mut self, len: usize) {
        self.reads += 1;
        self.bytes_read += len as u64;
    }

    pub fn add_write(&mut self, len: usize) {
        self.writes += 1;
        self.bytes_written += len as u64;
    }

    pub fn add_read_failure(&mut self) {
        self.read_failures += 1;
    }

    pub fn add_write_failure(&mut self) {
        self.write_failures += 1;
    }

    pub fn add_short_read(&mut self) {
        self.short_reads += 1;
    }

    pub fn failures(&self) -> u64 {
        self.read_failures + self.write_failures
    }

    pub fn merge(&mut self, other: &StreamCounters) {
        self.reads += other.reads;
        self.writes += other.writes;
        self.bytes_read += other.bytes_read;
        self.bytes_written += other.bytes_written;
        self.read_failures += other.read_failures;
        self.write_failures += other.write_failures;
        self.short_reads += other.short_reads;
    }

    pub fn to_json(&self) -> String {
        // Plain integer fields; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl AddAssign for StreamCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
