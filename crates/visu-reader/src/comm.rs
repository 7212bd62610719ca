//! Process coordination for distributed runs.
//!
//! Every process executes the same phase sequence. The only collective
//! operations are [`Communicator::barrier`] and [`Communicator::all_ok`];
//! the reader never lets one process skip a collective its peers enter.

/// Rank and size of the local process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Topology {
    /// Zero-based rank.
    pub rank: usize,
    /// Number of processes.
    pub size: usize,
}

/// The distributed runtime, as seen by one process.
pub trait Communicator {
    /// Rank of this process.
    fn rank(&self) -> usize;

    /// Number of processes in the group.
    fn size(&self) -> usize;

    /// Communicator handle passed through to the solver (Fortran style).
    fn handle(&self) -> i32;

    /// Block until every process has entered the barrier.
    fn barrier(&self);

    /// Logical AND of `local` across all processes. Collective.
    fn all_ok(&self, local: bool) -> bool;

    /// Rank and size together.
    fn topology(&self) -> Topology {
        Topology {
            rank: self.rank(),
            size: self.size(),
        }
    }
}

impl<C: Communicator + ?Sized> Communicator for &C {
    fn rank(&self) -> usize {
        (**self).rank()
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn handle(&self) -> i32 {
        (**self).handle()
    }

    fn barrier(&self) {
        (**self).barrier()
    }

    fn all_ok(&self, local: bool) -> bool {
        (**self).all_ok(local)
    }
}

/// A single-process group.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialCommunicator {
    handle: i32,
}

impl SerialCommunicator {
    /// A serial group exposing `handle` to the solver.
    pub fn with_handle(handle: i32) -> Self {
        Self { handle }
    }
}

impl Communicator for SerialCommunicator {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn handle(&self) -> i32 {
        self.handle
    }

    fn barrier(&self) {}

    fn all_ok(&self, local: bool) -> bool {
        local
    }
}

/// Run `f` between two barriers.
///
/// Both barriers are entered whatever `f` returns, so every process leaves
/// the rendezvous at the same logical step.
pub fn rendezvous<C, R>(comm: &C, f: impl FnOnce() -> R) -> R
where
    C: Communicator + ?Sized,
{
    comm.barrier();
    let out = f();
    comm.barrier();
    out
}
