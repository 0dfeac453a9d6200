//! Timestamp-based change detection.
//!
//! The host hands over a [`TimestampSnapshot`] of every file it watches at
//! the start of each cycle. The detector compares it against the snapshot it
//! kept from the previous cycle and answers a single question: did any
//! *input* file change? The answer is binary. A rebuild always recombines
//! every input, never just the changed ones.
//!
//! ## Comparison Rules
//!
//! For each watched file in the current snapshot:
//!
//! | Side | Value | Fallback |
//! |------|-------|----------|
//! | baseline | previous timestamp | pipeline start time |
//! | current | current timestamp | +∞ (always newer) |
//!
//! A file is changed iff `baseline < current`. Falling back to the start
//! time means files that already existed when the pipeline started are not
//! reported as changed on the first comparison. A file whose timestamp is
//! unknown (deleted, unreadable) always counts as changed.
//!
//! An empty snapshot means the host has no timestamps yet, which is the
//! first-build signal: the detector answers "rebuild" without comparing.

use crate::resolve::InputFileSet;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Watched path → last modification time, `None` when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimestampSnapshot {
    entries: BTreeMap<PathBuf, Option<SystemTime>>,
}

impl TimestampSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the on-disk modification times of `paths`.
    ///
    /// Files that cannot be stat'ed are recorded with an unknown time.
    pub fn from_files<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths
            .into_iter()
            .map(|p| {
                let path = p.as_ref();
                let modified = fs::metadata(path).and_then(|m| m.modified()).ok();
                (path.to_path_buf(), modified)
            })
            .collect()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, modified: Option<SystemTime>) {
        self.entries.insert(path.into(), modified);
    }

    /// Known modification time for `path`; `None` if absent or unknown.
    pub fn modified(&self, path: &Path) -> Option<SystemTime> {
        self.entries.get(path).copied().flatten()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(PathBuf, Option<SystemTime>)> for TimestampSnapshot {
    fn from_iter<T: IntoIterator<Item = (PathBuf, Option<SystemTime>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Decides whether relevant inputs changed since the previous cycle.
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    start_time: SystemTime,
    previous: TimestampSnapshot,
}

impl ChangeDetector {
    pub fn new(start_time: SystemTime) -> Self {
        Self {
            start_time,
            previous: TimestampSnapshot::default(),
        }
    }

    pub fn start_time(&self) -> SystemTime {
        self.start_time
    }

    /// Snapshot stored by the last call to [`should_rebuild`](Self::should_rebuild).
    pub fn previous(&self) -> &TimestampSnapshot {
        &self.previous
    }

    /// Watched files in `current` that are newer than their baseline.
    pub fn changed_files<'a>(
        &'a self,
        current: &'a TimestampSnapshot,
    ) -> impl Iterator<Item = &'a Path> + 'a {
        current.paths().filter(move |path| {
            let baseline = self.previous.modified(path).unwrap_or(self.start_time);
            match current.modified(path) {
                Some(modified) => baseline < modified,
                None => true,
            }
        })
    }

    /// Whether the pipeline must rebuild for this cycle.
    ///
    /// Always replaces the stored snapshot with `current`, whatever the
    /// answer.
    pub fn should_rebuild(&mut self, current: &TimestampSnapshot, relevant: &InputFileSet) -> bool {
        let rebuild =
            current.is_empty() || self.changed_files(current).any(|f| relevant.contains(f));
        self.previous = current.clone();
        rebuild
    }
}
