// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    id::SegmentId,
    index::SegmentLedgerIndex,
    ledger::LedgerId,
    registry::segment_path,
    segment::{self, frame},
};
use std::{
    collections::HashSet,
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::Path,
};

/// Scans a single, fully-written segment end to end and returns the set of
/// ledgers that have at least one entry in it.
///
/// Used both at startup (once per closed segment) and at rollover (on the
/// segment that just stopped being active), so both code paths agree on what
/// a segment's ledger set is.
///
/// A torn tail - a frame whose length prefix claims more bytes than remain in
/// the file, or a short read partway through a frame - is expected after an
/// unclean shutdown. It is logged and treated as the end of the segment
/// rather than a fatal error; every entry read up to that point is kept.
///
/// # Errors
///
/// Will return `Err` if the segment file cannot be opened, or its header is
/// missing or too short to read.
pub fn scan_segment(path: &Path) -> crate::Result<HashSet<LedgerId>> {
    let mut file = File::open(path)?;
    let mut ledgers = HashSet::new();

    file.seek(SeekFrom::Start(segment::HEADER_SIZE))?;

    loop {
        match frame::read_frame_len(&mut file) {
            Ok(len) => match frame::read_frame_body(&mut file, len) {
                Ok(decoded) => {
                    ledgers.insert(decoded.ledger_id);
                }
                Err(e) => {
                    log::warn!(
                        "torn entry while scanning {}: {e}, stopping scan here",
                        path.display()
                    );
                    break;
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => {
                log::warn!(
                    "torn length prefix while scanning {}: {e}, stopping scan here",
                    path.display()
                );
                break;
            }
        }
    }

    Ok(ledgers)
}

/// Scans every segment in `[0, active_segment_id)` across `dirs` and installs
/// each one's ledger set into `index`. The active segment itself is
/// deliberately excluded - it is still being written to, so any scan of it
/// would race the writer.
///
/// # Errors
///
/// Will return `Err` if a segment file exists but cannot be opened.
pub fn recover_all(
    dirs: &[std::path::PathBuf],
    active_segment_id: SegmentId,
    index: &SegmentLedgerIndex,
) -> crate::Result<()> {
    for id in 0..active_segment_id {
        let Some(path) = dirs.iter().map(|dir| segment_path(dir, id)).find(|p| p.exists()) else {
            continue;
        };

        let ledgers = scan_segment(&path)?;
        log::debug!("recovered segment {id}: {} ledger(s)", ledgers.len());
        index.install(id, ledgers);
    }

    Ok(())
}
