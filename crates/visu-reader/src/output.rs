//! Host-facing data objects and phase results.

use std::fmt;
use std::path::PathBuf;

use smallvec::SmallVec;
use visu_mesh::MeshBlock;

/// Which of the two output blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// High-order DG representation, block 0.
    Dg,
    /// Finite-volume sub-cell representation, block 1.
    Fv,
}

impl BlockKind {
    /// Both blocks, in slot order.
    pub const ALL: [BlockKind; 2] = [BlockKind::Dg, BlockKind::Fv];

    /// Slot in the multi-block container.
    pub fn index(self) -> usize {
        match self {
            Self::Dg => 0,
            Self::Fv => 1,
        }
    }

    /// Block for a slot index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dg => "DG",
            Self::Fv => "FV",
        })
    }
}

/// What the information phase publishes to the host.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutputInformation {
    /// Timestamps in registration order.
    pub time_steps: Vec<f64>,
    /// Smallest and largest timestamp.
    pub time_range: Option<(f64, f64)>,
    /// The reader accepts piece requests (every process loads its part).
    pub can_handle_piece_request: bool,
}

/// Host parameters for one execution.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExecutionRequest {
    /// Requested time, if the host asked for one.
    pub update_time: Option<f64>,
}

impl ExecutionRequest {
    /// Request the timestep closest to `time`.
    pub fn at(time: f64) -> Self {
        Self {
            update_time: Some(time),
        }
    }
}

/// A container of optional mesh blocks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiBlockDataSet {
    blocks: SmallVec<[Option<MeshBlock>; 2]>,
}

impl MultiBlockDataSet {
    /// An empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots.
    pub fn n_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Grow to at least `n` slots. Existing slots are kept.
    pub fn ensure_blocks(&mut self, n: usize) {
        if self.blocks.len() < n {
            self.blocks.resize(n, None);
        }
    }

    /// Block in slot `index`, if set.
    pub fn block(&self, index: usize) -> Option<&MeshBlock> {
        self.blocks.get(index).and_then(Option::as_ref)
    }

    /// Fill or clear slot `index`, growing the container as needed.
    pub fn set_block(&mut self, index: usize, block: Option<MeshBlock>) {
        self.ensure_blocks(index + 1);
        self.blocks[index] = block;
    }

    /// Block for `kind`.
    pub fn get(&self, kind: BlockKind) -> Option<&MeshBlock> {
        self.block(kind.index())
    }
}

/// The output object the host hands to the data phase.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DataObject {
    /// The expected container.
    MultiBlock(MultiBlockDataSet),
    /// A single grid; not accepted by the reader.
    Unstructured(MeshBlock),
    /// No object.
    #[default]
    Empty,
}

impl DataObject {
    /// A fresh multi-block container.
    pub fn multi_block() -> Self {
        Self::MultiBlock(MultiBlockDataSet::new())
    }

    /// Type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::MultiBlock(_) => "MultiBlockDataSet",
            Self::Unstructured(_) => "UnstructuredGrid",
            Self::Empty => "None",
        }
    }

    /// Downcast to the multi-block container.
    pub fn as_multi_block(&self) -> Option<&MultiBlockDataSet> {
        match self {
            Self::MultiBlock(mb) => Some(mb),
            _ => None,
        }
    }

    /// Mutable downcast to the multi-block container.
    pub fn as_multi_block_mut(&mut self) -> Option<&mut MultiBlockDataSet> {
        match self {
            Self::MultiBlock(mb) => Some(mb),
            _ => None,
        }
    }
}

/// Shape of one produced block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockSummary {
    /// Point count.
    pub points: usize,
    /// Cell count.
    pub cells: usize,
    /// Attached arrays.
    pub fields: usize,
}

impl BlockSummary {
    pub(crate) fn of(block: &MeshBlock) -> Self {
        Self {
            points: block.n_points(),
            cells: block.n_cells(),
            fields: block.n_fields(),
        }
    }
}

/// Result of a successful data phase.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadSummary {
    /// Index of the loaded timestep.
    pub timestep: usize,
    /// State file loaded.
    pub state_file: PathBuf,
    /// Simulation time of that file.
    pub time: f64,
    /// DG block shape.
    pub dg: BlockSummary,
    /// FV block shape.
    pub fv: BlockSummary,
}
