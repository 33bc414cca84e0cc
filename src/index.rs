// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{id::SegmentId, ledger::LedgerId};
use std::collections::HashSet;
use std::sync::Mutex;

/// Tracks which ledgers have at least one entry in each segment.
///
/// Populated by the recovery scanner at startup and at rollover, consulted
/// and mutated by the garbage collector. This is in-memory only - it is
/// rebuilt by rescanning segments on every process start, never persisted.
#[derive(Default)]
pub struct SegmentLedgerIndex {
    segments: Mutex<crate::HashMap<SegmentId, HashSet<LedgerId>>>,
}

impl SegmentLedgerIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `ledger_id` has an entry in `segment_id`. Idempotent.
    pub fn record(&self, segment_id: SegmentId, ledger_id: LedgerId) {
        self.segments
            .lock()
            .expect("lock is poisoned")
            .entry(segment_id)
            .or_default()
            .insert(ledger_id);
    }

    /// Replaces the full ledger set for `segment_id`, used by the recovery
    /// scanner once it has finished scanning a segment end to end.
    pub fn install(&self, segment_id: SegmentId, ledgers: HashSet<LedgerId>) {
        self.segments
            .lock()
            .expect("lock is poisoned")
            .insert(segment_id, ledgers);
    }

    /// Returns the set of ledgers known to have entries in `segment_id`.
    #[must_use]
    pub fn get_ledgers(&self, segment_id: SegmentId) -> HashSet<LedgerId> {
        self.segments
            .lock()
            .expect("lock is poisoned")
            .get(&segment_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Removes `ledger_id` from every segment's set. Returns the segments
    /// that became empty as a result - callers use this to find segments
    /// that are now fully garbage.
    pub fn remove_ledger(&self, ledger_id: LedgerId) -> Vec<SegmentId> {
        let mut segments = self.segments.lock().expect("lock is poisoned");
        let mut emptied = Vec::new();

        for (segment_id, ledgers) in segments.iter_mut() {
            if ledgers.remove(&ledger_id) && ledgers.is_empty() {
                emptied.push(*segment_id);
            }
        }

        emptied
    }

    /// Drops all bookkeeping for `segment_id`, once its file has been
    /// unlinked.
    pub fn remove_segment(&self, segment_id: SegmentId) {
        self.segments.lock().expect("lock is poisoned").remove(&segment_id);
    }

    /// Returns `true` if `segment_id` has no ledgers left (and is therefore a
    /// garbage collection candidate), including segments the index has never
    /// heard of.
    #[must_use]
    pub fn is_empty(&self, segment_id: SegmentId) -> bool {
        self.segments
            .lock()
            .expect("lock is poisoned")
            .get(&segment_id)
            .map_or(true, HashSet::is_empty)
    }

    /// Returns every segment ID the index currently tracks.
    #[must_use]
    pub fn segment_ids(&self) -> Vec<SegmentId> {
        self.segments
            .lock()
            .expect("lock is poisoned")
            .keys()
            .copied()
            .collect()
    }
}
