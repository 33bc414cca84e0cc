// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    channel::BufferedChannel,
    error::Error,
    id::SegmentId,
    ledger::LedgerId,
    location::Location,
    segment::segment_file_name,
};
use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

/// Keeps one open [`BufferedChannel`] per segment the store has touched.
///
/// Segments are opened lazily on first access and kept open until
/// [`SegmentRegistry::evict`] closes and unlinks them during garbage
/// collection. A double-checked lookup avoids opening the same segment twice
/// when two readers race.
pub struct SegmentRegistry {
    dirs: Vec<PathBuf>,
    channels: Mutex<crate::HashMap<SegmentId, Arc<BufferedChannel>>>,
}

impl SegmentRegistry {
    /// Creates an empty registry over the given storage directories.
    #[must_use]
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            channels: Mutex::new(crate::HashMap::default()),
        }
    }

    /// Installs an already-open channel for `segment_id`, used by the writer
    /// right after it creates a fresh segment.
    pub fn install(&self, segment_id: SegmentId, channel: Arc<BufferedChannel>) {
        self.channels
            .lock()
            .expect("lock is poisoned")
            .insert(segment_id, channel);
    }

    /// Returns the channel for `segment_id`, opening its file for reading if
    /// this is the first access since process start.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no file for `segment_id` exists in any
    /// configured storage directory. Propagates I/O errors encountered while
    /// opening the file.
    pub fn get_channel(
        &self,
        segment_id: SegmentId,
        ledger_id: LedgerId,
        location: Location,
    ) -> crate::Result<Arc<BufferedChannel>> {
        {
            let channels = self.channels.lock().expect("lock is poisoned");
            if let Some(channel) = channels.get(&segment_id) {
                return Ok(Arc::clone(channel));
            }
        }

        let path = self.locate_on_disk(segment_id).ok_or(Error::NotFound {
            segment_id,
            ledger_id,
            location,
        })?;

        let mut channels = self.channels.lock().expect("lock is poisoned");
        if let Some(channel) = channels.get(&segment_id) {
            return Ok(Arc::clone(channel));
        }

        let file = File::open(&path)?;
        let len = file.metadata()?.len();
        let channel = Arc::new(BufferedChannel::for_reading(file, len));
        channels.insert(segment_id, Arc::clone(&channel));

        Ok(channel)
    }

    /// Closes and removes `segment_id` from the registry, then unlinks its
    /// file from disk. A no-op if the segment was never opened or already
    /// evicted.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the file exists but cannot be removed.
    pub fn evict(&self, segment_id: SegmentId) -> crate::Result<()> {
        {
            let mut channels = self.channels.lock().expect("lock is poisoned");
            channels.remove(&segment_id);
            // Dropping the last `Arc<BufferedChannel>` closes the underlying
            // `File` handle before we unlink below.
        }

        if let Some(path) = self.locate_on_disk(segment_id) {
            std::fs::remove_file(path)?;
        }

        Ok(())
    }

    fn locate_on_disk(&self, segment_id: SegmentId) -> Option<PathBuf> {
        let name = segment_file_name(segment_id);

        self.dirs
            .iter()
            .map(|dir| dir.join(&name))
            .find(|candidate| candidate.exists())
    }
}

/// Returns the full path a segment would live at, given the directory it was
/// allocated in.
#[must_use]
pub fn segment_path(dir: &Path, segment_id: SegmentId) -> PathBuf {
    dir.join(segment_file_name(segment_id))
}
