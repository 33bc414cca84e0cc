// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    channel::BufferedChannel,
    directory::DirectoryManager,
    id::{IdGenerator, SegmentId},
    index::SegmentLedgerIndex,
    ledger::{EntryId, LedgerId},
    location::Location,
    recovery,
    registry::{segment_path, SegmentRegistry},
    segment::{self, frame},
};
use std::{
    fs::File,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

struct ActiveSegment {
    id: SegmentId,
    channel: Arc<BufferedChannel>,
    dir: std::path::PathBuf,
}

/// Appends entries to the currently active segment, rolling over to a fresh
/// segment once the active one crosses the configured size threshold.
///
/// All mutating operations serialize through a single lock - the entry log
/// is a single append point by design, matching the original bookie's
/// one-writer-per-log model. Reads do not take this lock; they go through
/// [`SegmentRegistry`] instead.
pub struct Writer {
    active: Mutex<ActiveSegment>,
    id_generator: IdGenerator,
    directories: DirectoryManager,
    registry: Arc<SegmentRegistry>,
    segment_index: Arc<SegmentLedgerIndex>,
    size_limit: u64,
    something_written: AtomicBool,
}

impl Writer {
    /// Opens the writer on top of an already-recovered state: `next_segment_id`
    /// is the ID to allocate for the very first segment this writer creates.
    ///
    /// # Errors
    ///
    /// Will return `Err` if a fresh segment cannot be created.
    pub fn open(
        directories: DirectoryManager,
        registry: Arc<SegmentRegistry>,
        segment_index: Arc<SegmentLedgerIndex>,
        next_segment_id: SegmentId,
        size_limit: u64,
    ) -> crate::Result<Self> {
        let id_generator = IdGenerator::new(next_segment_id);
        let active = Self::create_segment(&directories, &id_generator, &registry)?;

        Ok(Self {
            active: Mutex::new(active),
            id_generator,
            directories,
            registry,
            segment_index,
            size_limit,
            something_written: AtomicBool::new(false),
        })
    }

    /// Appends a single entry, rolling over to a new segment first if the
    /// active one has crossed the size threshold.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an I/O error occurs while writing or, if
    /// rollover is needed, while creating the next segment.
    pub fn add_entry(
        &self,
        ledger_id: LedgerId,
        entry_id: EntryId,
        payload: &[u8],
    ) -> crate::Result<Location> {
        let mut active = self.active.lock().expect("lock is poisoned");

        if active.channel.position() >= self.size_limit {
            self.rollover_locked(&mut active)?;
        }

        let offset = active.channel.write(&Self::encode(ledger_id, entry_id, payload)?)?;
        let payload_offset = offset + 4 + u64::from(frame::IDENTITY_LEN);

        // The active segment stays out of `segment_index` until it is sealed
        // at rollover (or folded in by startup recovery) - it is re-derived
        // from the frames themselves rather than tracked incrementally here,
        // so a crash mid-write can never leave the index disagreeing with
        // what actually landed on disk.
        self.something_written.store(true, Ordering::SeqCst);

        Location::new(active.id, payload_offset)
    }

    fn encode(ledger_id: LedgerId, entry_id: EntryId, payload: &[u8]) -> crate::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(payload.len() + 16 + 4);
        frame::write_frame(&mut buf, ledger_id, entry_id, payload)?;
        Ok(buf)
    }

    /// Flushes the active segment's write buffer to disk.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an I/O error occurs.
    pub fn flush(&self, durable: bool) -> crate::Result<()> {
        let active = self.active.lock().expect("lock is poisoned");
        active.channel.flush(durable)?;
        Ok(())
    }

    /// Returns `true` and clears the flag if any entry has been written since
    /// the last call. Used by callers that want to skip flushing an idle log.
    pub fn test_and_clear_something_written(&self) -> bool {
        self.something_written.swap(false, Ordering::SeqCst)
    }

    /// Returns the ID of the segment currently being written to.
    pub fn active_segment_id(&self) -> SegmentId {
        self.active.lock().expect("lock is poisoned").id
    }

    fn rollover_locked(&self, active: &mut ActiveSegment) -> crate::Result<()> {
        active.channel.flush(true)?;

        log::info!("rolling over from segment {}", active.id);

        // The segment that's about to stop being active has its full ledger
        // set known only once it's done being written to; rescanning it here
        // is the same path recovery uses at startup, so both paths produce
        // identical ledger sets for the same bytes.
        let ledgers = recovery::scan_segment(&segment_path(&active.dir, active.id))?;
        self.segment_index.install(active.id, ledgers);

        let fresh = Self::create_segment(&self.directories, &self.id_generator, &self.registry)?;
        *active = fresh;

        Ok(())
    }

    fn create_segment(
        directories: &DirectoryManager,
        id_generator: &IdGenerator,
        registry: &Arc<SegmentRegistry>,
    ) -> crate::Result<ActiveSegment> {
        let id = id_generator.next();
        let dir = directories.pick_random().to_path_buf();
        let path = segment_path(&dir, id);

        let mut file = File::options()
            .create_new(true)
            .read(true)
            .write(true)
            .open(&path)?;
        segment::write_header(&mut file)?;

        // Every configured directory's marker tracks the highest segment ID
        // ever allocated, not just the one a segment happened to land in -
        // the chosen directory is rewritten first since it's the one that
        // matters most if a crash interrupts the loop partway through.
        DirectoryManager::persist_last_id(&dir, id)?;
        for other_dir in directories.dirs() {
            if other_dir != &dir {
                DirectoryManager::persist_last_id(other_dir, id)?;
            }
        }

        let channel = Arc::new(BufferedChannel::for_writing(file, segment::HEADER_SIZE));
        registry.install(id, Arc::clone(&channel));

        log::info!("opened segment {id} in {}", dir.display());

        Ok(ActiveSegment { id, channel, dir })
    }
}
