// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use std::{ops::Deref, sync::Arc};

/// An immutable byte buffer that can be cloned without copying its contents.
///
/// Used for entry payloads: once a payload has been read off disk, handing it
/// to multiple callers (or caching it) should not require re-copying the bytes.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Slice(Arc<[u8]>);

impl Slice {
    /// Constructs a [`Slice`] from a byte slice, copying it once into an `Arc`.
    #[must_use]
    pub fn new(bytes: &[u8]) -> Self {
        Self(Arc::from(bytes))
    }

    /// Reads exactly `len` bytes from `reader` into a new [`Slice`].
    pub fn from_reader<R: std::io::Read>(reader: &mut R, len: usize) -> std::io::Result<Self> {
        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf)?;
        Ok(Self(Arc::from(buf)))
    }
}

impl Deref for Slice {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for Slice {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Slice {
    fn from(value: Vec<u8>) -> Self {
        Self(Arc::from(value))
    }
}

impl From<&[u8]> for Slice {
    fn from(value: &[u8]) -> Self {
        Self::new(value)
    }
}

impl<const N: usize> From<[u8; N]> for Slice {
    fn from(value: [u8; N]) -> Self {
        Self(Arc::from(value.to_vec()))
    }
}

impl PartialEq<[u8]> for Slice {
    fn eq(&self, other: &[u8]) -> bool {
        &*self.0 == other
    }
}

/// The opaque bytes of a single entry's payload, as handed to the caller of
/// [`crate::EntryLogStore::add_entry`] (excluding the 16-byte ledger/entry identity
/// prefix, which the store manages itself).
#[allow(clippy::module_name_repetitions)]
pub type EntryPayload = Slice;

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn slice_from_reader_round_trip() -> std::io::Result<()> {
        let data = b"hello world";
        let mut cursor = std::io::Cursor::new(data.to_vec());
        let slice = Slice::from_reader(&mut cursor, data.len())?;
        assert_eq!(&*slice, data);
        Ok(())
    }

    #[test]
    fn slice_clone_shares_allocation() {
        let slice = Slice::new(b"payload");
        let clone = slice.clone();
        assert_eq!(slice, clone);
    }
}
