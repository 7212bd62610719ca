//! Catalog lookup errors.

use std::error::Error;
use std::fmt;

/// Errors from [`VariableCatalog`](crate::VariableCatalog) lookups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogError {
    /// A positional lookup past the end of the catalog.
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// Number of entries in the catalog.
        len: usize,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "variable index {index} out of bounds (catalog has {len})")
            }
        }
    }
}

impl Error for CatalogError {}
