//! Solver settings serialization.
//!
//! Before every data-production call the reader writes the active
//! visualization settings to a transient `key = value` file that the
//! external solver parses:
//!
//! ```text
//! NVisu = 5
//! NodeTypeVisu = VISU
//! VisuDimension = 3
//! DGonly = F
//! MeshFile = ../mesh/cube_mesh.h5
//! VarName = Density
//! VarName = Mach
//! ```
//!
//! [`VisuParameters`] holds the values, [`ParameterFile`] owns the file on
//! disk for as long as the solver needs it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod file;
pub mod node_type;
pub mod settings;

pub use error::ParamsError;
pub use file::ParameterFile;
pub use node_type::NodeType;
pub use settings::VisuParameters;
