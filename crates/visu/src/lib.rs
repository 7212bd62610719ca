//! Visu: reads discontinuous-Galerkin solver state files as unstructured
//! mesh blocks for a visualization pipeline.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the visu sub-crates. The C ABI lives separately in `visu-ffi`.
//!
//! # Quick start
//!
//! ```rust
//! use std::path::Path;
//! use visu::prelude::*;
//!
//! // A solver that offers two variables and never produces data.
//! struct Offering;
//! impl Solver for Offering {
//!     fn request_information(&mut self, _comm: i32, _file: &Path) -> Result<Vec<u8>, SolverError> {
//!         Ok(PackedNameTable::encode(["Density", "Pressure"]).unwrap())
//!     }
//!     fn produce(&mut self, _comm: i32, _req: &ProduceRequest<'_>) -> Result<(), SolverError> {
//!         Err(SolverError::Failed { operation: "produce", reason: "offline".into() })
//!     }
//!     fn output(&self) -> SolverOutput<'_> {
//!         SolverOutput::default()
//!     }
//!     fn release(&mut self) {}
//! }
//!
//! let mut reader = Reader::new(
//!     ReaderConfig::default(),
//!     Offering,
//!     SerialCommunicator::default(),
//!     NoTimeAttribute,
//! );
//! reader.add_file(std::env::temp_dir().join("case_State_0000.h5")).unwrap();
//!
//! let mut info = OutputInformation::default();
//! assert_eq!(reader.request_information(&mut info).unwrap(), 2);
//! assert_eq!(info.time_steps, vec![0.0]);
//! assert!(reader.catalog().is_enabled("Density"));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `visu-core` | Buffer views, packed names, mesh dimension, marshal errors |
//! | [`catalog`] | `visu-catalog` | Timestep index and variable catalog |
//! | [`params`] | `visu-params` | Solver settings and scratch parameter files |
//! | [`mesh`] | `visu-mesh` | Mesh blocks, marshalling, VTU export |
//! | [`reader`] | `visu-reader` | The two-phase reader and its solver/communicator seams |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Buffer views and shared types (`visu-core`).
pub use visu_core as types;

/// Timestep index and variable catalog (`visu-catalog`).
///
/// [`catalog::TimestepIndex`] maps host times to state files;
/// [`catalog::VariableCatalog`] tracks which variables are loaded.
pub use visu_catalog as catalog;

/// Solver settings (`visu-params`).
pub use visu_params as params;

/// Mesh blocks rebuilt from solver buffers (`visu-mesh`).
///
/// [`mesh::marshal`] validates and copies one block;
/// [`mesh::export_vtu`] writes it as an ASCII VTK unstructured grid.
pub use visu_mesh as mesh;

/// The reader (`visu-reader`).
///
/// [`reader::Reader`] drives discovery and execution against a
/// [`reader::Solver`] on every process of a [`reader::Communicator`].
pub use visu_reader as reader;

/// Common imports for typical visu usage.
///
/// ```rust
/// use visu::prelude::*;
/// ```
pub mod prelude {
    // Shared types
    pub use visu_core::{FlatBuffer, MarshalError, MeshDimension, PackedNameTable};

    // Catalog
    pub use visu_catalog::{TimestepIndex, VariableCatalog};

    // Settings
    pub use visu_params::{NodeType, VisuParameters};

    // Mesh
    pub use visu_mesh::{export_vtu, CellKind, FieldArray, MeshBlock};

    // Reader
    pub use visu_reader::{
        BlockKind, Communicator, DataObject, ExecutionRequest, NoTimeAttribute,
        OutputInformation, PhaseError, ProduceRequest, Reader, ReaderConfig, SerialCommunicator,
        Solver, SolverError, SolverOutput, TimeAttribute,
    };
}
