// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Small scratch binary exercising the entry log store end to end.
//!
//! Not a CLI in any real sense - loading configuration, wiring up logging
//! transport, and driving an actual bookie sit above this crate. This is
//! just a manual smoke test an implementer can `cargo run` while poking at
//! the store.

use entry_log_store::{AlwaysReady, Config, EntryLogStore, MockActiveLedgerManager, MockLedgerIndex};
use std::{path::Path, sync::Arc, time::Duration};

fn main() -> entry_log_store::Result<()> {
    let data_dir = Path::new("entry_log_store_scratch");
    if data_dir.try_exists()? {
        std::fs::remove_dir_all(data_dir)?;
    }
    std::fs::create_dir_all(data_dir)?;

    let store = EntryLogStore::open(
        Config::new(vec![data_dir]).entry_log_size_limit(4 * 1024 * 1024),
    )?;

    let mut locations = Vec::new();

    for ledger_id in 0..5u64 {
        for entry_id in 0..20u64 {
            let payload = format!("ledger {ledger_id} entry {entry_id}");
            let location = store.add_entry(ledger_id, entry_id, payload.as_bytes())?;
            locations.push((ledger_id, entry_id, location));
        }
    }

    store.flush(true)?;
    println!("wrote {} entries", locations.len());

    for (ledger_id, entry_id, location) in &locations {
        let payload = store.read_entry(*ledger_id, *entry_id, *location)?;
        assert_eq!(
            format!("ledger {ledger_id} entry {entry_id}").as_bytes(),
            &*payload
        );
    }
    println!("read back all entries successfully");

    let active_ledgers = Arc::new(MockActiveLedgerManager::default());
    for ledger_id in 0..5u64 {
        active_ledgers.activate(ledger_id);
    }
    let ledger_index = Arc::new(MockLedgerIndex::default());

    store.start_gc(
        active_ledgers.clone(),
        ledger_index,
        Arc::new(AlwaysReady),
    );

    // Retire ledger 0; the background collector picks it up on its next
    // cycle (`gc_wait_time`, 15 minutes by default - lower it via
    // `Config::gc_wait_time` to see this sooner).
    active_ledgers.deactivate(0);
    std::thread::sleep(Duration::from_millis(50));

    store.shutdown();

    Ok(())
}
