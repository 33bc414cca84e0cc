// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    collaborators::{ActiveLedgerManager, CoordinationReadiness, LedgerIndex},
    ledger::LedgerId,
};
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

/// In-memory [`ActiveLedgerManager`], for tests only.
///
/// Ledgers start out active; marking one inactive is what makes it a GC
/// candidate.
#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Default)]
pub struct MockActiveLedgerManager(Arc<Mutex<HashSet<LedgerId>>>);

impl MockActiveLedgerManager {
    /// Marks `ledger_id` as active.
    pub fn activate(&self, ledger_id: LedgerId) {
        self.0.lock().expect("lock is poisoned").insert(ledger_id);
    }

    /// Marks `ledger_id` as no longer active (a GC candidate).
    pub fn deactivate(&self, ledger_id: LedgerId) {
        self.0
            .lock()
            .expect("lock is poisoned")
            .remove(&ledger_id);
    }
}

impl ActiveLedgerManager for MockActiveLedgerManager {
    fn contains_active_ledger(&self, ledger_id: LedgerId) -> bool {
        self.0.lock().expect("lock is poisoned").contains(&ledger_id)
    }

    fn garbage_collect_ledgers(&self, callback: &mut dyn FnMut(LedgerId)) {
        // NOTE: this mock has no notion of "ledgers it knows about but that
        // are now dead" beyond what the test deactivated; real managers track
        // their own universe of ledger IDs. Tests call `deactivate` and then
        // drive segment GC directly via `contains_active_ledger`, so this is
        // a no-op by default.
        let _ = callback;
    }
}

/// In-memory [`LedgerIndex`], for tests only. Records which ledgers had their
/// local index state dropped.
#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Default)]
pub struct MockLedgerIndex(Arc<Mutex<Vec<LedgerId>>>);

impl MockLedgerIndex {
    /// Returns the ledgers that `delete_ledger` has been called with, in order.
    #[must_use]
    pub fn deleted(&self) -> Vec<LedgerId> {
        self.0.lock().expect("lock is poisoned").clone()
    }
}

impl LedgerIndex for MockLedgerIndex {
    fn delete_ledger(&self, ledger_id: LedgerId) -> std::io::Result<()> {
        self.0.lock().expect("lock is poisoned").push(ledger_id);
        Ok(())
    }
}

/// [`CoordinationReadiness`] that is always ready, for tests only.
#[derive(Clone, Copy, Default)]
pub struct AlwaysReady;

impl CoordinationReadiness for AlwaysReady {
    fn is_ready(&self) -> bool {
        true
    }
}
