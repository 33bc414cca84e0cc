// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::id::SegmentId;
use rand::Rng;
use std::{
    io::{Read, Write},
    path::{Path, PathBuf},
};

/// Name of the per-directory marker file that records the highest segment ID
/// ever allocated under that directory.
const LAST_ID_FILE: &str = "lastId";

/// Picks storage directories for new segments and persists the durable,
/// crash-safe `lastId` marker each directory keeps.
///
/// Directory selection is uniform-random across the configured directories,
/// the same "spread writes, don't round-robin" policy the original bookie
/// uses to avoid skewing wear toward one disk when segments are short-lived.
pub struct DirectoryManager {
    dirs: Vec<PathBuf>,
}

impl DirectoryManager {
    /// Wraps an already-absolutized list of storage directories.
    ///
    /// # Panics
    ///
    /// Panics if `dirs` is empty.
    #[must_use]
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        assert!(!dirs.is_empty(), "need at least one ledger directory");
        Self { dirs }
    }

    /// Returns the configured storage directories.
    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Picks one configured directory uniformly at random.
    #[must_use]
    pub fn pick_random(&self) -> &Path {
        #[allow(clippy::indexing_slicing)]
        let idx = rand::thread_rng().gen_range(0..self.dirs.len());
        #[allow(clippy::indexing_slicing)]
        &self.dirs[idx]
    }

    /// Scans every configured directory's `lastId` marker and returns the
    /// next segment ID to allocate (one past the highest marker seen, or `0`
    /// if none exist yet).
    ///
    /// # Errors
    ///
    /// Will return `Err` if a marker file exists but cannot be read, or its
    /// contents cannot be parsed.
    pub fn load_last_id(&self) -> crate::Result<SegmentId> {
        let mut max_seen: Option<SegmentId> = None;

        for dir in &self.dirs {
            let marker = dir.join(LAST_ID_FILE);

            if !marker.exists() {
                continue;
            }

            let mut contents = String::new();
            std::fs::File::open(&marker)?.read_to_string(&mut contents)?;

            let id = SegmentId::from_str_radix(contents.trim(), 16).map_err(|_| {
                crate::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("malformed lastId marker at {}", marker.display()),
                ))
            })?;

            max_seen = Some(max_seen.map_or(id, |current| current.max(id)));
        }

        Ok(max_seen.map_or(0, |id| id + 1))
    }

    /// Durably records `id` as the highest segment ID allocated under `dir`,
    /// via write-to-temp-then-rename so a crash mid-write never leaves a
    /// torn marker behind.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an I/O error occurs.
    pub fn persist_last_id(dir: &Path, id: SegmentId) -> crate::Result<()> {
        rewrite_atomic(&dir.join(LAST_ID_FILE), format!("{id:x}\n").as_bytes())
    }
}

/// Atomically rewrites `path`'s contents: writes `bytes` to a fresh temp file
/// in the same directory, fsyncs it, then renames it over `path`.
fn rewrite_atomic(path: &Path, bytes: &[u8]) -> crate::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn load_last_id_is_zero_when_no_markers_exist() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let manager = DirectoryManager::new(vec![dir.path().to_path_buf()]);
        assert_eq!(0, manager.load_last_id()?);
        Ok(())
    }

    #[test]
    fn persist_then_load_round_trips() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let manager = DirectoryManager::new(vec![dir.path().to_path_buf()]);

        DirectoryManager::persist_last_id(dir.path(), 41)?;
        assert_eq!(42, manager.load_last_id()?);

        Ok(())
    }

    #[test]
    fn load_last_id_takes_max_across_directories() -> crate::Result<()> {
        let dir_a = tempfile::tempdir()?;
        let dir_b = tempfile::tempdir()?;
        let manager = DirectoryManager::new(vec![
            dir_a.path().to_path_buf(),
            dir_b.path().to_path_buf(),
        ]);

        DirectoryManager::persist_last_id(dir_a.path(), 5)?;
        DirectoryManager::persist_last_id(dir_b.path(), 99)?;

        assert_eq!(100, manager.load_last_id()?);

        Ok(())
    }

    #[test]
    fn pick_random_always_returns_a_configured_dir() {
        let dirs = vec![
            PathBuf::from("/tmp/a"),
            PathBuf::from("/tmp/b"),
            PathBuf::from("/tmp/c"),
        ];
        let manager = DirectoryManager::new(dirs.clone());

        for _ in 0..20 {
            assert!(dirs.contains(&manager.pick_random().to_path_buf()));
        }
    }
}
