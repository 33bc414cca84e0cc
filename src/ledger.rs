// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

/// Identifies a logical, append-only ledger multiplexed into the entry log
#[allow(clippy::module_name_repetitions)]
pub type LedgerId = u64;

/// Identifies a single entry within a ledger
#[allow(clippy::module_name_repetitions)]
pub type EntryId = u64;
