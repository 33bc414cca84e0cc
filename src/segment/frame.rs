// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{ledger::EntryId, ledger::LedgerId, slice::Slice};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Size, in bytes, of the identity prefix (`ledgerId` followed by `entryId`)
/// every frame carries ahead of its opaque payload.
pub const IDENTITY_LEN: u32 = 16;

/// Frames longer than this are still read and written, but cross the
/// threshold the original bookie author flagged as worth a warning - a single
/// entry this large is almost always a misconfigured caller.
pub const MAX_SANE_FRAME_LEN: u32 = 1024 * 1024;

/// A single decoded entry frame: the identity it was written under and its
/// opaque payload.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Ledger the frame belongs to.
    pub ledger_id: LedgerId,
    /// Entry number within that ledger.
    pub entry_id: EntryId,
    /// Opaque bytes the caller handed to `add_entry`.
    pub payload: Slice,
}

/// Writes one frame: a 4-byte big-endian length prefix, the 16-byte identity,
/// then the payload. Returns the number of bytes written.
///
/// # Errors
///
/// Will return `Err` if an I/O error occurs.
pub fn write_frame<W: Write>(
    writer: &mut W,
    ledger_id: LedgerId,
    entry_id: EntryId,
    payload: &[u8],
) -> std::io::Result<u64> {
    let len = u32::try_from(payload.len())
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "payload too large"))?
        .checked_add(IDENTITY_LEN)
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "payload too large"))?;

    if len > MAX_SANE_FRAME_LEN {
        log::warn!(
            "writing frame of {len} bytes for ledger {ledger_id} entry {entry_id}, \
             which exceeds the {MAX_SANE_FRAME_LEN}-byte sanity bound"
        );
    }

    writer.write_u32::<BigEndian>(len)?;
    writer.write_u64::<BigEndian>(ledger_id)?;
    writer.write_u64::<BigEndian>(entry_id)?;
    writer.write_all(payload)?;

    Ok(u64::from(len) + 4)
}

/// Reads the 4-byte length prefix at the current reader position, without
/// consuming the frame body.
///
/// # Errors
///
/// Will return `Err` if an I/O error occurs.
pub fn read_frame_len<R: Read>(reader: &mut R) -> std::io::Result<u32> {
    let len = reader.read_u32::<BigEndian>()?;

    if len < IDENTITY_LEN {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("frame length {len} is shorter than the identity prefix"),
        ));
    }

    if len > MAX_SANE_FRAME_LEN {
        log::warn!("read frame length {len} exceeds the {MAX_SANE_FRAME_LEN}-byte sanity bound");
    }

    Ok(len)
}

/// Reads a full frame body (identity + payload) of `len` bytes, as previously
/// returned by [`read_frame_len`].
///
/// # Errors
///
/// Will return `Err` if an I/O error occurs or `len` is shorter than the
/// identity prefix.
pub fn read_frame_body<R: Read>(reader: &mut R, len: u32) -> std::io::Result<Frame> {
    if len < IDENTITY_LEN {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("frame length {len} is shorter than the identity prefix"),
        ));
    }

    let ledger_id = reader.read_u64::<BigEndian>()?;
    let entry_id = reader.read_u64::<BigEndian>()?;

    #[allow(clippy::cast_possible_truncation)]
    let payload_len = (len - IDENTITY_LEN) as usize;
    let payload = Slice::from_reader(reader, payload_len)?;

    Ok(Frame {
        ledger_id,
        entry_id,
        payload,
    })
}
