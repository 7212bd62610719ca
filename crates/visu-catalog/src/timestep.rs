//! Ordered (file, timestamp) registry with nearest-time lookup.

use std::path::{Path, PathBuf};

/// One registered state file and the simulation time stored in it.
#[derive(Clone, Debug, PartialEq)]
pub struct FileEntry {
    path: PathBuf,
    timestamp: f64,
}

impl FileEntry {
    /// Create an entry.
    pub fn new(path: impl Into<PathBuf>, timestamp: f64) -> Self {
        Self {
            path: path.into(),
            timestamp,
        }
    }

    /// Path of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Simulation time of the state file.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }
}

/// State files of a time series, in registration order.
///
/// Registration order is not required to be time order; lookups never
/// assume sortedness. Path and timestamp share one entry, so a reset can
/// never leave them out of step.
#[derive(Clone, Debug, Default)]
pub struct TimestepIndex {
    entries: Vec<FileEntry>,
}

impl TimestepIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file. Returns its index.
    pub fn register(&mut self, path: impl Into<PathBuf>, timestamp: f64) -> usize {
        self.entries.push(FileEntry::new(path, timestamp));
        self.entries.len() - 1
    }

    /// Index of the entry whose timestamp is closest to `query`.
    ///
    /// Ties go to the earliest-registered entry: only a strictly smaller
    /// distance replaces the current best. Returns `None` when empty.
    pub fn nearest_index(&self, query: f64) -> Option<usize> {
        let first = self.entries.first()?;
        let mut best = 0;
        let mut best_dist = (first.timestamp - query).abs();
        for (i, entry) in self.entries.iter().enumerate().skip(1) {
            let dist = (entry.timestamp - query).abs();
            if dist < best_dist {
                best = i;
                best_dist = dist;
            }
        }
        Some(best)
    }

    /// Remove every entry.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Number of registered files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no file is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&FileEntry> {
        self.entries.get(index)
    }

    /// The first registered file; variable discovery reads from it.
    pub fn primary(&self) -> Option<&FileEntry> {
        self.entries.first()
    }

    /// Timestamps in registration order.
    pub fn timestamps(&self) -> Vec<f64> {
        self.entries.iter().map(FileEntry::timestamp).collect()
    }

    /// `(min, max)` over all timestamps, or `None` when empty.
    ///
    /// These are the extremes, not the first and last registered times; the
    /// two only agree when files are registered in increasing time order.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        let first = self.entries.first()?.timestamp;
        Some(
            self.entries
                .iter()
                .fold((first, first), |(lo, hi), e| {
                    (lo.min(e.timestamp), hi.max(e.timestamp))
                }),
        )
    }
}
