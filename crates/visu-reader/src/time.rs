//! Simulation time stored in a state file.

use std::path::Path;

/// Reads the `Time` attribute of a state file.
pub trait TimeAttribute {
    /// Simulation time of `path`, or `None` when the file has no readable
    /// attribute.
    fn read_time(&self, path: &Path) -> Option<f64>;
}

impl<F> TimeAttribute for F
where
    F: Fn(&Path) -> Option<f64>,
{
    fn read_time(&self, path: &Path) -> Option<f64> {
        self(path)
    }
}

/// A source that never finds a time; every file lands at 0.0.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTimeAttribute;

impl TimeAttribute for NoTimeAttribute {
    fn read_time(&self, _path: &Path) -> Option<f64> {
        None
    }
}
