// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use entry_log_store::{AlwaysReady, Config, EntryLogStore, MockActiveLedgerManager, MockLedgerIndex};
use std::{path::Path, sync::Arc};

/// Opens a store with a small size limit so rollover tests don't need to
/// write megabytes of filler to trigger it.
pub fn open_with_limit(dir: &Path, size_limit: u64) -> entry_log_store::Result<EntryLogStore> {
    EntryLogStore::open(Config::new(vec![dir.to_path_buf()]).entry_log_size_limit(size_limit))
}

/// Opens a store with generous defaults, for tests that don't care about
/// rollover.
pub fn open(dir: &Path) -> entry_log_store::Result<EntryLogStore> {
    open_with_limit(dir, 16 * 1024 * 1024)
}

pub fn always_ready_collaborators() -> (Arc<MockActiveLedgerManager>, Arc<MockLedgerIndex>, Arc<AlwaysReady>) {
    (
        Arc::new(MockActiveLedgerManager::default()),
        Arc::new(MockLedgerIndex::default()),
        Arc::new(AlwaysReady),
    )
}
