//! Pipeline adapter between a visualization host and the external
//! post-processing solver.
//!
//! [`Reader`] implements the host's two-phase protocol on top of three
//! seams: the [`Solver`] producing flat buffers, the [`Communicator`] of a
//! distributed run, and the [`TimeAttribute`] source for state-file times.
//! Output lands in a [`DataObject`] holding a [`MultiBlockDataSet`] with the
//! DG mesh in block 0 and the FV mesh in block 1.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod comm;
pub mod config;
pub mod error;
pub mod output;
pub mod reader;
pub mod solver;
pub mod time;

pub use comm::{rendezvous, Communicator, SerialCommunicator, Topology};
pub use config::{ConfigError, ReaderConfig};
pub use error::PhaseError;
pub use output::{
    BlockKind, BlockSummary, DataObject, ExecutionRequest, LoadSummary, MultiBlockDataSet,
    OutputInformation,
};
pub use reader::Reader;
pub use solver::{
    BlockBuffers, ProduceRequest, Solver, SolverError, SolverOutput, SolverSession,
};
pub use time::{NoTimeAttribute, TimeAttribute};
