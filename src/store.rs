// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    collaborators::{ActiveLedgerManager, CoordinationReadiness, LedgerIndex},
    config::Config,
    directory::DirectoryManager,
    error::Error,
    gc::GarbageCollector,
    index::SegmentLedgerIndex,
    ledger::{EntryId, LedgerId},
    location::Location,
    recovery,
    registry::SegmentRegistry,
    segment::frame,
    writer::Writer,
};
use std::sync::{Arc, Mutex};

/// A disk-resident, append-only entry log.
///
/// Cloning an [`EntryLogStore`] is cheap - it is a handle onto a shared,
/// reference-counted inner state, the same facade the rest of this crate's
/// components use internally.
#[derive(Clone)]
pub struct EntryLogStore(Arc<Inner>);

impl std::ops::Deref for EntryLogStore {
    type Target = Inner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Shared state behind [`EntryLogStore`]'s cheap-clone handle.
#[allow(clippy::module_name_repetitions)]
pub struct Inner {
    config: Config,
    directories: DirectoryManager,
    registry: Arc<SegmentRegistry>,
    segment_index: Arc<SegmentLedgerIndex>,
    writer: Writer,
    gc: Mutex<Option<GarbageCollector>>,
}

impl EntryLogStore {
    /// Opens an entry log store, recovering whatever segments already exist
    /// in `config`'s storage directories.
    ///
    /// Recovery is driven entirely by the `lastId` markers and segment files
    /// already on disk - there is no separate store-level version marker.
    /// A directory with no markers and no segment files is treated as a
    /// brand new store.
    ///
    /// # Errors
    ///
    /// Will return `Err` if a storage directory cannot be created, an
    /// existing segment cannot be scanned, or a fresh segment cannot be
    /// opened.
    pub fn open(config: Config) -> crate::Result<Self> {
        for dir in config.ledger_dirs() {
            std::fs::create_dir_all(dir)?;
        }

        let directories = DirectoryManager::new(config.ledger_dirs().to_vec());
        let next_segment_id = directories.load_last_id()?;

        let registry = Arc::new(SegmentRegistry::new(config.ledger_dirs().to_vec()));
        let segment_index = Arc::new(SegmentLedgerIndex::new());

        recovery::recover_all(config.ledger_dirs(), next_segment_id, &segment_index)?;

        let writer = Writer::open(
            directories,
            Arc::clone(&registry),
            Arc::clone(&segment_index),
            next_segment_id,
            config.entry_log_size_limit,
        )?;

        // `Writer::open` re-derives its own `DirectoryManager` for rollover,
        // so build a second, equally-configured one for the store's own use
        // (picking directories for anything outside the writer's hot path).
        let directories = DirectoryManager::new(config.ledger_dirs().to_vec());

        Ok(Self(Arc::new(Inner {
            config,
            directories,
            registry,
            segment_index,
            writer,
            gc: Mutex::new(None),
        })))
    }

    /// Appends an entry, returning the [`Location`] a later [`Self::read_entry`]
    /// call needs to retrieve it.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an I/O error occurs.
    pub fn add_entry(
        &self,
        ledger_id: LedgerId,
        entry_id: EntryId,
        payload: &[u8],
    ) -> crate::Result<Location> {
        self.writer.add_entry(ledger_id, entry_id, payload)
    }

    /// Reads back the entry previously written at `location`, verifying that
    /// it still belongs to `ledger_id`/`entry_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the segment no longer exists (it may
    /// have been garbage collected), [`Error::IdentityMismatch`] if the bytes
    /// at `location` belong to a different entry, or an I/O error.
    pub fn read_entry(
        &self,
        ledger_id: LedgerId,
        entry_id: EntryId,
        location: Location,
    ) -> crate::Result<crate::slice::Slice> {
        let segment_id = location.segment_id();
        let channel = self
            .registry
            .get_channel(segment_id, ledger_id, location)?;

        // `location.offset()` points at the first payload byte, i.e. past the
        // 4-byte length prefix and the 16-byte identity the writer embedded
        // ahead of it - walk both back out to recover the frame.
        let prefix_offset = location
            .offset()
            .checked_sub(4 + u64::from(frame::IDENTITY_LEN))
            .ok_or(Error::ShortRead { expected: 4, actual: 0 })?;

        let len_bytes = read_checked(&channel, prefix_offset, 4)?;
        #[allow(clippy::indexing_slicing)]
        let len = u32::from_be_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]);

        let body = read_checked(&channel, prefix_offset + 4, len as usize)?;
        let mut cursor = std::io::Cursor::new(body);
        let decoded = frame::read_frame_body(&mut cursor, len)?;

        if decoded.ledger_id != ledger_id || decoded.entry_id != entry_id {
            return Err(Error::IdentityMismatch {
                expected_ledger: ledger_id,
                expected_entry: entry_id,
                found_ledger: decoded.ledger_id,
                found_entry: decoded.entry_id,
            });
        }

        Ok(decoded.payload)
    }

    /// Flushes the active segment's write buffer to disk.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an I/O error occurs.
    pub fn flush(&self, durable: bool) -> crate::Result<()> {
        self.writer.flush(durable)
    }

    /// Returns `true` and clears the flag if any entry has been written
    /// since the last call.
    pub fn test_and_clear_something_written(&self) -> bool {
        self.writer.test_and_clear_something_written()
    }

    /// Starts the background garbage collector, replacing any collector
    /// already running.
    pub fn start_gc(
        &self,
        active_ledgers: Arc<dyn ActiveLedgerManager>,
        ledger_index: Arc<dyn LedgerIndex>,
        readiness: Arc<dyn CoordinationReadiness>,
    ) {
        let collector = GarbageCollector::spawn(
            Arc::clone(&self.registry),
            Arc::clone(&self.segment_index),
            active_ledgers,
            ledger_index,
            readiness,
            self.config.gc_wait_time,
        );

        let mut gc = self.gc.lock().expect("lock is poisoned");
        if let Some(previous) = gc.replace(collector) {
            previous.shutdown();
        }
    }

    /// Stops the background garbage collector, if one is running, then
    /// durably flushes the active segment.
    pub fn shutdown(&self) {
        if let Some(collector) = self.gc.lock().expect("lock is poisoned").take() {
            collector.shutdown();
        }

        if let Err(e) = self.writer.flush(true) {
            log::warn!("error flushing active segment during shutdown: {e}");
        }
    }

    /// Returns the directory manager backing this store's segment placement.
    #[doc(hidden)]
    #[must_use]
    pub fn directories(&self) -> &DirectoryManager {
        &self.directories
    }
}

/// Reads `len` bytes at `offset` from `channel`, surfacing a short,
/// torn-tail read as [`Error::ShortRead`] rather than a bare I/O error - the
/// underlying channel can only fail this way by running past its own
/// logical end, never by an actual OS-level read error.
fn read_checked(channel: &crate::channel::BufferedChannel, offset: u64, len: usize) -> crate::Result<Vec<u8>> {
    channel.read(offset, len).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::ShortRead { expected: len, actual: 0 }
        } else {
            Error::Io(e)
        }
    })
}
