// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! An append-only, segmented entry log store for a bookie-style ledger service.
//!
//! Entries belonging to many independent, append-only ledgers are multiplexed
//! into a shared sequence of fixed-size segment files:
//!
//! `[entry][entry][entry][entry][entry]...`
//!
//! Each write returns an opaque [`Location`] handle; retrieving the entry later
//! means handing that handle back to [`EntryLogStore::read_entry`]. There is no
//! index from `(ledgerId, entryId)` to [`Location`] inside this crate - that
//! mapping is the host's responsibility (see the [`collaborators`] traits).
//! This store only knows how entries land on disk, how segments roll over,
//! and how to reclaim segments once every ledger that wrote into them is dead.
//!
//! As ledgers are deleted, segments end up holding entries for no live ledger
//! at all. A background [`GarbageCollector`](crate::gc::GarbageCollector) asks
//! the host which ledgers have died, forgets them, and unlinks any segment
//! that consequently has nothing left worth keeping.
//!
//! # Example usage
//!
//! ```
//! use entry_log_store::{AlwaysReady, Config, EntryLogStore, MockActiveLedgerManager, MockLedgerIndex};
//! use std::sync::Arc;
//!
//! # fn main() -> entry_log_store::Result<()> {
//! let folder = tempfile::tempdir()?;
//!
//! let store = EntryLogStore::open(Config::new(vec![folder.path()]))?;
//!
//! let location = store.add_entry(/* ledger */ 1, /* entry */ 0, b"hello ledger")?;
//! store.flush(true)?;
//!
//! let payload = store.read_entry(1, 0, location)?;
//! assert_eq!(b"hello ledger", &*payload);
//!
//! store.start_gc(
//!     Arc::new(MockActiveLedgerManager::default()),
//!     Arc::new(MockLedgerIndex::default()),
//!     Arc::new(AlwaysReady),
//! );
//! store.shutdown();
//! #
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs, clippy::cargo)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![warn(clippy::multiple_crate_versions)]

mod channel;
pub mod collaborators;
mod config;
mod directory;
mod error;
mod gc;
mod id;
mod index;
mod ledger;
mod location;
mod mock;
mod path;
mod recovery;
mod registry;
mod segment;
mod slice;
mod store;
mod writer;

pub(crate) type HashMap<K, V> = std::collections::HashMap<K, V, xxhash_rust::xxh3::Xxh3Builder>;

pub use {
    collaborators::{ActiveLedgerManager, CoordinationReadiness, LedgerIndex},
    config::Config,
    error::{Error, Result},
    id::SegmentId,
    ledger::{EntryId, LedgerId},
    location::Location,
    slice::{EntryPayload, Slice},
    store::EntryLogStore,
};

#[doc(hidden)]
pub use gc::GarbageCollector;

#[doc(hidden)]
pub use mock::{AlwaysReady, MockActiveLedgerManager, MockLedgerIndex};
