// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

pub mod frame;

use crate::id::SegmentId;
use std::io::Write;

/// Size, in bytes, of the fixed segment header.
pub const HEADER_SIZE: u64 = 1024;

/// Magic bytes identifying a segment file, written at offset 0.
pub const MAGIC: [u8; 4] = *b"BKLO";

/// Name of the file a segment is stored under, relative to its storage directory.
#[must_use]
pub fn segment_file_name(id: SegmentId) -> String {
    format!("{id:x}.log")
}

/// Writes a fresh 1024-byte header (magic followed by zeroed reserved bytes).
///
/// # Errors
///
/// Will return `Err` if an I/O error occurs.
pub fn write_header<W: Write>(writer: &mut W) -> std::io::Result<()> {
    let mut header = [0u8; HEADER_SIZE as usize];
    #[allow(clippy::indexing_slicing)]
    header[..MAGIC.len()].copy_from_slice(&MAGIC);
    writer.write_all(&header)
}
