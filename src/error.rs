// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{id::SegmentId, ledger::LedgerId, location::Location};

/// Represents errors that can occur in the entry log store
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O error
    Io(std::io::Error),

    /// A read targeted a segment whose file could not be found in any
    /// configured storage directory
    NotFound {
        /// Segment the caller expected to find
        segment_id: SegmentId,
        /// Ledger the read was performed on behalf of
        ledger_id: LedgerId,
        /// Location that could not be resolved
        location: Location,
    },

    /// An underlying read returned fewer bytes than requested
    ShortRead {
        /// Bytes requested
        expected: usize,
        /// Bytes actually read
        actual: usize,
    },

    /// The decoded frame's `(ledgerId, entryId)` disagreed with the caller's request
    IdentityMismatch {
        /// Ledger the caller asked for
        expected_ledger: LedgerId,
        /// Entry the caller asked for
        expected_entry: u64,
        /// Ledger actually stored at the location
        found_ledger: LedgerId,
        /// Entry actually stored at the location
        found_entry: u64,
    },

    /// A `(segment_id, offset)` pair could not be packed into a 64-bit [`Location`]
    /// because one of its parts does not fit in 32 bits
    LocationOverflow {
        /// Segment ID that overflowed
        segment_id: SegmentId,
        /// Offset that overflowed
        offset: u64,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EntryLogStoreError: {self:?}")
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Entry log store result
pub type Result<T> = std::result::Result<T, Error>;
