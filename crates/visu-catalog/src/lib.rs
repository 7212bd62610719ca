//! File-set bookkeeping for the visu reader.
//!
//! [`TimestepIndex`] tracks which state files make up a loaded time series
//! and resolves a requested time to the nearest file. [`VariableCatalog`]
//! holds the user's per-variable selection, discovered once per file set
//! and edited through the host GUI.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod timestep;

pub use catalog::{CatalogEvent, CatalogObserver, SubscriptionId, VariableCatalog, DEFAULT_ENABLED};
pub use error::CatalogError;
pub use timestep::{FileEntry, TimestepIndex};
