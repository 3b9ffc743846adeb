use crate::constants::PREVIEW_LEN;

/// Render bytes for logs: printable ASCII as a byte-string, everything else as hex.
pub fn fmt_bytes(b: &[u8]) -> String {
    if b.iter().all(|&c| c.is_ascii_graphic() || c == b' ') {
        format!("b\"{}\"", String::from_utf8_lossy(b))
    } else {
        format!("0x{}", hex::encode(b))
    }
}

/// Like [`fmt_bytes`], but only the first `PREVIEW_LEN` bytes plus a length note.
pub fn preview_bytes(b: &[u8]) -> String {
    if b.len() <= PREVIEW_LEN {
        fmt_bytes(b)
    } else {
        format!("{}.. ({} bytes)", fmt_bytes(&b[..PREVIEW_LEN]), b.len())
    }
}

/// Content of a fixed C-string field: everything before the first NUL.
pub fn trim_at_nul(b: &[u8]) -> &[u8] {
    match b.iter().position(|&c| c == 0) {
        Some(end) => &b[..end],
        None => b,
    }
}
