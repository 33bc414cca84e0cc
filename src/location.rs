// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{error::Error, id::SegmentId};

/// An opaque handle returned by [`crate::EntryLogStore::add_entry`] and consumed
/// by [`crate::EntryLogStore::read_entry`].
///
/// Encoded as `(segment_id << 32) | offset`, where `offset` is the file offset
/// of the first payload byte. Both `segment_id` and `offset` must therefore fit
/// in 32 bits - construction fails rather than silently truncating.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Location(u64);

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.segment_id(), self.offset())
    }
}

impl Location {
    /// Packs a segment ID and a payload offset into a [`Location`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::LocationOverflow`] if either part doesn't fit in 32 bits.
    pub fn new(segment_id: SegmentId, offset: u64) -> crate::Result<Self> {
        if segment_id > u64::from(u32::MAX) || offset > u64::from(u32::MAX) {
            return Err(Error::LocationOverflow { segment_id, offset });
        }

        Ok(Self((segment_id << 32) | offset))
    }

    /// Returns the segment ID this location points into.
    #[must_use]
    pub fn segment_id(&self) -> SegmentId {
        self.0 >> 32
    }

    /// Returns the byte offset of the entry's payload within its segment.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.0 & 0xFFFF_FFFF
    }

    /// Returns the raw 64-bit encoding.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<Location> for u64 {
    fn from(value: Location) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn location_round_trip() -> crate::Result<()> {
        let loc = Location::new(7, 1049)?;
        assert_eq!(7, loc.segment_id());
        assert_eq!(1049, loc.offset());
        assert_eq!((7u64 << 32) | 1049, loc.as_u64());
        Ok(())
    }

    #[test]
    fn location_rejects_oversized_segment_id() {
        let err = Location::new(u64::from(u32::MAX) + 1, 0);
        assert!(matches!(err, Err(Error::LocationOverflow { .. })));
    }

    #[test]
    fn location_rejects_oversized_offset() {
        let err = Location::new(0, u64::from(u32::MAX) + 1);
        assert!(matches!(err, Err(Error::LocationOverflow { .. })));
    }

    #[test]
    fn location_accepts_boundary_values() -> crate::Result<()> {
        Location::new(u64::from(u32::MAX), u64::from(u32::MAX))?;
        Ok(())
    }
}
