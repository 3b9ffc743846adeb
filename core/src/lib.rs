//! pstream-core
//!
//! Bounds-checked, typed binary streams for generated codecs.
//! One `Stream` contract, two backings: an owned growable buffer and a
//! sequential reader/writer channel.

#![forbid(unsafe_code)]

// Shared and top level
pub mod config;
pub mod constants;
pub mod endian;
pub mod types;
pub mod utils;

pub mod codec;
pub mod stream;
pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::codec::Codec;
    pub use crate::config::StreamOptions;
    pub use crate::endian::{Endian, Primitive};
    pub use crate::stream::{BufferStream, ChannelStream, Stream, StreamExt};
    pub use crate::types::{Result, StreamError};
}
