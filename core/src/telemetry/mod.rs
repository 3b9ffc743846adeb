//! telemetry/mod.rs
//! Per-stream counters for observability of encode/decode runs.

pub mod counters;

pub use counters::*;
