// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use path_absolutize::Absolutize;
use std::path::PathBuf;

/// Resolves a path to an absolute one without requiring it to exist.
///
/// Storage directories are recorded by their absolute path so that a store
/// reopened from a different working directory still finds its segments.
#[must_use]
pub fn absolute_path<P: Into<PathBuf>>(path: P) -> PathBuf {
    let path = path.into();

    // NOTE: `absolutize` only touches the path string, it does not require
    // the path to exist on disk, which matters because directories may be
    // created lazily.
    #[allow(clippy::expect_used)]
    path.absolutize()
        .expect("path should be absolutizable")
        .into_owned()
}
