//! constants.rs
//! Wire constants shared by both stream backings.

use crate::endian::Endian;

/// Byte order used when a stream is built without explicit options.
pub const DEFAULT_ENDIAN: Endian = Endian::Little;

/// Width in bytes of the `String` length prefix (u16).
pub const STRING_PREFIX_LEN: usize = 2;
/// Width in bytes of the `String64` length prefix (u64).
pub const STRING64_PREFIX_LEN: usize = 8;

/// Terminator byte for unsized C-strings.
pub const CSTRING_TERMINATOR: u8 = 0x00;

/// Max payload a channel stream will allocate for a single length-prefixed
/// read (32 MiB). Buffer streams are bounded by their data instead.
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 32 * 1024 * 1024;

/// Number of leading bytes shown when previewing data in errors/logs.
pub const PREVIEW_LEN: usize = 16;
