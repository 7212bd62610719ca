//! Core types for the visu solver-output reader.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! transport-layer views over buffers handed back by the external solver
//! ([`FlatBuffer`], [`PackedNameTable`]), the mesh mode selector
//! ([`MeshDimension`]), and the validation error type ([`MarshalError`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod buffer;
pub mod dimension;
pub mod error;
pub mod names;

pub use buffer::FlatBuffer;
pub use dimension::MeshDimension;
pub use error::MarshalError;
pub use names::{PackedNameTable, NAME_SLOT_WIDTH};
