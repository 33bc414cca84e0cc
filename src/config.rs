// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::path::absolute_path;
use std::{path::PathBuf, time::Duration};

/// Default threshold (bytes) that triggers a segment rollover.
pub const DEFAULT_SEGMENT_SIZE_BYTES: u64 = 256 * 1_024 * 1_024;

/// Default interval between garbage collection cycles.
pub const DEFAULT_GC_WAIT_TIME: Duration = Duration::from_secs(15 * 60);

/// Entry log store configuration.
///
/// Loading this from a config file or CLI flags is the hosting binary's
/// responsibility - this type is constructed programmatically.
#[derive(Clone, Debug)]
pub struct Config {
    /// Storage directories the store rotates new segments across.
    pub(crate) ledger_dirs: Vec<PathBuf>,

    /// Threshold (bytes) that triggers a segment rollover.
    pub(crate) entry_log_size_limit: u64,

    /// Interval between garbage collection cycles.
    pub(crate) gc_wait_time: Duration,
}

impl Config {
    /// Creates a new configuration builder over the given storage directories.
    ///
    /// # Panics
    ///
    /// Panics if `ledger_dirs` is empty - a store needs somewhere to put segments.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(ledger_dirs: Vec<P>) -> Self {
        assert!(!ledger_dirs.is_empty(), "need at least one ledger directory");

        Self {
            ledger_dirs: ledger_dirs.into_iter().map(absolute_path).collect(),
            entry_log_size_limit: DEFAULT_SEGMENT_SIZE_BYTES,
            gc_wait_time: DEFAULT_GC_WAIT_TIME,
        }
    }

    /// Sets the segment size threshold that triggers rollover.
    #[must_use]
    pub fn entry_log_size_limit(mut self, bytes: u64) -> Self {
        self.entry_log_size_limit = bytes;
        self
    }

    /// Sets the interval between garbage collection cycles.
    #[must_use]
    pub fn gc_wait_time(mut self, interval: Duration) -> Self {
        self.gc_wait_time = interval;
        self
    }

    /// Returns the configured storage directories.
    #[must_use]
    pub fn ledger_dirs(&self) -> &[PathBuf] {
        &self.ledger_dirs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    #[should_panic(expected = "need at least one ledger directory")]
    fn config_rejects_empty_dirs() {
        let _ = Config::new(Vec::<PathBuf>::new());
    }

    #[test]
    fn config_builder_overrides_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::new(vec![dir.path()])
            .entry_log_size_limit(1024)
            .gc_wait_time(Duration::from_secs(5));

        assert_eq!(1024, config.entry_log_size_limit);
        assert_eq!(Duration::from_secs(5), config.gc_wait_time);
    }
}
