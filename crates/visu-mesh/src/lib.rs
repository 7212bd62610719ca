//! Mesh marshalling for the visu reader.
//!
//! The solver hands back every block as loose flat arrays. [`marshal`]
//! checks their shapes against each other and rebuilds one [`MeshBlock`]:
//! points, single-topology cells and named point-data arrays. [`vtu`] writes
//! a block to an ASCII VTK file for inspection outside the host.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod block;
pub mod marshal;
pub mod vtu;

pub use block::{CellKind, FieldArray, MeshBlock};
pub use marshal::{marshal, MarshalInput};
pub use vtu::{export_vtu, write_vtu};
