// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    collaborators::{ActiveLedgerManager, CoordinationReadiness, LedgerIndex},
    index::SegmentLedgerIndex,
    registry::SegmentRegistry,
};
use std::{
    sync::{mpsc, Arc},
    thread::JoinHandle,
    time::Duration,
};

/// Runs periodic garbage collection on a background thread.
///
/// Each cycle: skip if the coordination client isn't ready, ask the active
/// ledger manager which ledgers are now dead, tell the ledger index to drop
/// their local state, then drop any segment whose ledger set has become
/// empty as a result. Waiting between cycles is done with `recv_timeout` on a
/// shutdown channel rather than a condvar, so [`GarbageCollector::shutdown`]
/// wakes the loop immediately instead of waiting out the rest of the
/// interval.
pub struct GarbageCollector {
    shutdown_tx: mpsc::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl GarbageCollector {
    /// Spawns the background collection thread.
    #[must_use]
    pub fn spawn(
        registry: Arc<SegmentRegistry>,
        segment_index: Arc<SegmentLedgerIndex>,
        active_ledgers: Arc<dyn ActiveLedgerManager>,
        ledger_index: Arc<dyn LedgerIndex>,
        readiness: Arc<dyn CoordinationReadiness>,
        wait_time: Duration,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel();

        let handle = std::thread::spawn(move || loop {
            match shutdown_rx.recv_timeout(wait_time) {
                Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    run_cycle(
                        &registry,
                        &segment_index,
                        active_ledgers.as_ref(),
                        ledger_index.as_ref(),
                        readiness.as_ref(),
                    );
                }
            }
        });

        Self {
            shutdown_tx,
            handle: Some(handle),
        }
    }

    /// Signals the background thread to stop and waits for it to exit.
    pub fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for GarbageCollector {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub(crate) fn run_cycle(
    registry: &SegmentRegistry,
    segment_index: &SegmentLedgerIndex,
    active_ledgers: &dyn ActiveLedgerManager,
    ledger_index: &dyn LedgerIndex,
    readiness: &dyn CoordinationReadiness,
) {
    if !readiness.is_ready() {
        log::debug!("skipping gc cycle, coordination client not ready");
        return;
    }

    let segment_ids = segment_index.segment_ids();
    if segment_ids.is_empty() {
        return;
    }

    let mut dead_ledgers = Vec::new();
    active_ledgers.garbage_collect_ledgers(&mut |ledger_id| dead_ledgers.push(ledger_id));

    let mut emptied_segments: std::collections::HashSet<_> = std::collections::HashSet::new();

    for ledger_id in dead_ledgers {
        if let Err(e) = ledger_index.delete_ledger(ledger_id) {
            log::warn!("failed to delete ledger {ledger_id} from external index: {e}");
            continue;
        }

        emptied_segments.extend(segment_index.remove_ledger(ledger_id));
    }

    // Segment GC proper: re-check every tracked segment's ledger set against
    // current liveness, independent of whatever the manager's enumeration
    // callback surfaced above. This is what actually implements "for each
    // segment, drop ledgers the manager no longer considers active" - the
    // ledger GC pass above only catches ledgers the manager proactively
    // reports, which a manager with no enumeration support (or one that
    // forgets a ledger between cycles) would never trigger.
    for segment_id in &segment_ids {
        for ledger_id in segment_index.get_ledgers(*segment_id) {
            if !active_ledgers.contains_active_ledger(ledger_id) {
                emptied_segments.extend(segment_index.remove_ledger(ledger_id));
            }
        }
    }

    // A segment can also start out with an empty ledger set (the writer
    // rolled over before anything was ever appended to it) without any
    // ledger removal ever touching it; sweep those in too.
    emptied_segments.extend(segment_ids.into_iter().filter(|id| segment_index.is_empty(*id)));

    for segment_id in emptied_segments {
        if !segment_index.is_empty(segment_id) {
            // A write raced the GC cycle and landed a fresh entry in this
            // segment after it was reported empty.
            continue;
        }

        match registry.evict(segment_id) {
            Ok(()) => {
                segment_index.remove_segment(segment_id);
                log::info!("garbage collected segment {segment_id}");
            }
            Err(e) => log::warn!("failed to evict segment {segment_id}: {e}"),
        }
    }
}
