// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::ledger::LedgerId;

/// External authority on whether a ledger is still live.
///
/// Implemented and owned by the host (the bookie); the store only ever holds
/// a trait object handed to it at construction.
#[allow(clippy::module_name_repetitions)]
pub trait ActiveLedgerManager: Send + Sync {
    /// Returns `true` if `ledger_id` is still considered active.
    fn contains_active_ledger(&self, ledger_id: LedgerId) -> bool;

    /// Invokes `callback` once for every ledger the manager no longer
    /// considers live.
    fn garbage_collect_ledgers(&self, callback: &mut dyn FnMut(LedgerId));
}

/// External persistent mapping from `(ledgerId, entryId)` to [`crate::Location`].
///
/// The store never reads from this collaborator; it only notifies it when a
/// ledger should have its local index state dropped.
#[allow(clippy::module_name_repetitions)]
pub trait LedgerIndex: Send + Sync {
    /// Best-effort, ledger-local cleanup. May fail with an I/O error, which
    /// the caller logs and continues past (spec: per-ledger GC errors don't
    /// abort the cycle).
    ///
    /// # Errors
    ///
    /// Will return `Err` if an I/O error occurs.
    fn delete_ledger(&self, ledger_id: LedgerId) -> std::io::Result<()>;
}

/// Readiness gate for a coordination service client (e.g. a consensus/metadata
/// service). The GC loop skips its cycle entirely while this returns `false`.
#[allow(clippy::module_name_repetitions)]
pub trait CoordinationReadiness: Send + Sync {
    /// Returns `true` once the client is ready to be relied upon.
    fn is_ready(&self) -> bool;
}
