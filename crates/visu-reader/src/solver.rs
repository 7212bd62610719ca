//! The seam to the external post-processing solver.
//!
//! A production call hands back DG and FV buffers that stay owned by the
//! solver until [`Solver::release`]. [`SolverSession`] pairs the two: its
//! output borrows the session, and dropping it releases exactly once.

use std::error::Error;
use std::fmt;
use std::path::Path;

use visu_core::FlatBuffer;

/// Failure reported by the solver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolverError {
    /// The solver returned a non-zero status.
    Status {
        /// Operation that failed.
        operation: &'static str,
        /// Status code returned.
        code: i32,
    },
    /// The solver could not be reached or misbehaved.
    Failed {
        /// Operation that failed.
        operation: &'static str,
        /// Description.
        reason: String,
    },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { operation, code } => {
                write!(f, "solver {operation} returned status {code}")
            }
            Self::Failed { operation, reason } => write!(f, "solver {operation} failed: {reason}"),
        }
    }
}

impl Error for SolverError {}

/// Flat buffers for one block, as produced by the solver.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockBuffers<'a> {
    /// x,y,z triples.
    pub coords: FlatBuffer<'a, f64>,
    /// All variables, concatenated.
    pub values: FlatBuffer<'a, f64>,
    /// Per-cell vertex ids.
    pub nodeids: FlatBuffer<'a, i32>,
}

/// Everything one production call returned.
///
/// Names and component counts are shared by both blocks.
#[derive(Clone, Copy, Debug, Default)]
pub struct SolverOutput<'a> {
    /// High-order block.
    pub dg: BlockBuffers<'a>,
    /// Finite-volume sub-cell block.
    pub fv: BlockBuffers<'a>,
    /// Packed 255-byte name slots.
    pub varnames: FlatBuffer<'a, u8>,
    /// Components per variable.
    pub components: FlatBuffer<'a, i32>,
}

/// Files handed to one production call.
#[derive(Clone, Copy, Debug)]
pub struct ProduceRequest<'a> {
    /// User-supplied solver parameter file, if any.
    pub parameter_override: Option<&'a Path>,
    /// The transient visualization settings file.
    pub settings_file: &'a Path,
    /// State file to visualize.
    pub state_file: &'a Path,
}

/// The external solver.
///
/// `comm` is the communicator handle from
/// [`Communicator::handle`](crate::Communicator::handle).
pub trait Solver {
    /// List the variables available for `state_file` as packed name slots.
    fn request_information(&mut self, comm: i32, state_file: &Path)
        -> Result<Vec<u8>, SolverError>;

    /// Produce DG and FV buffers. They remain valid until
    /// [`release`](Solver::release).
    fn produce(&mut self, comm: i32, request: &ProduceRequest<'_>) -> Result<(), SolverError>;

    /// Buffers from the last production call. Empty before any.
    fn output(&self) -> SolverOutput<'_>;

    /// Free the buffers of the last production call.
    fn release(&mut self);
}

impl<S: Solver + ?Sized> Solver for Box<S> {
    fn request_information(
        &mut self,
        comm: i32,
        state_file: &Path,
    ) -> Result<Vec<u8>, SolverError> {
        (**self).request_information(comm, state_file)
    }

    fn produce(&mut self, comm: i32, request: &ProduceRequest<'_>) -> Result<(), SolverError> {
        (**self).produce(comm, request)
    }

    fn output(&self) -> SolverOutput<'_> {
        (**self).output()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// One production call's exclusive hold on the solver.
///
/// Created just before [`produce`](SolverSession::produce); releases the
/// solver's buffers when dropped, even if production failed.
pub struct SolverSession<'s, S: Solver + ?Sized> {
    solver: &'s mut S,
}

impl<'s, S: Solver + ?Sized> SolverSession<'s, S> {
    /// Take the solver for one production call.
    pub fn new(solver: &'s mut S) -> Self {
        Self { solver }
    }

    /// Run production.
    pub fn produce(&mut self, comm: i32, request: &ProduceRequest<'_>) -> Result<(), SolverError> {
        self.solver.produce(comm, request)
    }

    /// Borrow the produced buffers. They cannot outlive the session.
    pub fn output(&self) -> SolverOutput<'_> {
        self.solver.output()
    }
}

impl<S: Solver + ?Sized> Drop for SolverSession<'_, S> {
    fn drop(&mut self) {
        self.solver.release();
    }
}

impl<S: Solver + ?Sized> fmt::Debug for SolverSession<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverSession").finish_non_exhaustive()
    }
}
