//! Test doubles and buffer fixtures for visu development.
//!
//! - [`MockSolver`]: scripted [`Solver`](visu_reader::Solver) that records
//!   every call and counts releases.
//! - [`ThreadCommunicator`]: a process group simulated with threads.
//! - [`MapTimeAttribute`]: timestamps from a map.
//! - [`fixtures`]: raw solver buffers for quad and hex grids.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod comm;
pub mod fixtures;
pub mod solver;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use visu_reader::TimeAttribute;

pub use comm::{CommEvent, ThreadCommunicator};
pub use fixtures::RawBlock;
pub use solver::{MockSolver, RecordedProduce};

/// Timestamps looked up by path.
#[derive(Clone, Debug, Default)]
pub struct MapTimeAttribute {
    times: HashMap<PathBuf, f64>,
}

impl MapTimeAttribute {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, path: impl Into<PathBuf>, time: f64) -> Self {
        self.times.insert(path.into(), time);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, time: f64) {
        self.times.insert(path.into(), time);
    }
}

impl TimeAttribute for MapTimeAttribute {
    fn read_time(&self, path: &Path) -> Option<f64> {
        self.times.get(path).copied()
    }
}

/// A fresh, existing directory under the system temp dir.
///
/// Unique per process and call, so parallel tests never share one.
pub fn scratch_dir(tag: &str) -> PathBuf {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    let n = NEXT.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("visu-{tag}-{}-{n}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

/// Create `count` empty state files `<dir>/state_<i>.h5`.
pub fn state_files(dir: &Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("state_{i:04}.h5"));
            std::fs::write(&path, b"").expect("create state file");
            path
        })
        .collect()
}
