//! Validation errors for malformed solver output.
//!
//! Every variant describes a producer/consumer mismatch in the flat buffers
//! returned by the external solver. None of them is ever resolved by
//! truncating data.

use std::error::Error;
use std::fmt;

/// Buffers handed back by the solver do not describe a consistent mesh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarshalError {
    /// The coordinate buffer length is not a multiple of 3.
    CoordsNotTriples {
        /// Length of the coordinate buffer.
        len: usize,
    },
    /// The connectivity buffer does not split into whole cells.
    RaggedConnectivity {
        /// Length of the node-id buffer.
        len: usize,
        /// Vertices per cell for the selected topology.
        arity: usize,
    },
    /// A cell references a point that does not exist.
    NodeIdOutOfRange {
        /// Index of the offending cell.
        cell: usize,
        /// The node id found in the buffer.
        node_id: i64,
        /// Number of points in the block.
        n_points: usize,
    },
    /// The packed name table length is not a multiple of the slot width.
    MalformedNameTable {
        /// Length of the table in bytes.
        len: usize,
        /// Expected slot width.
        slot_width: usize,
    },
    /// A name slot is blank.
    EmptyName {
        /// Slot index.
        index: usize,
    },
    /// A name slot is not valid UTF-8.
    InvalidName {
        /// Slot index.
        index: usize,
    },
    /// A name does not fit into one slot.
    NameTooLong {
        /// The offending name.
        name: String,
        /// Slot width.
        slot_width: usize,
    },
    /// Fewer component counts than variable names were supplied.
    ComponentTableTooShort {
        /// Number of decoded names.
        names: usize,
        /// Number of component counts.
        components: usize,
    },
    /// A variable declares zero or negative components.
    InvalidComponentCount {
        /// Variable name.
        name: String,
        /// The declared count.
        count: i64,
    },
    /// The value buffer does not split evenly across all components.
    ValuesNotDivisible {
        /// Length of the value buffer.
        len: usize,
        /// Sum of all component counts.
        total_components: usize,
    },
    /// The per-variable slot count does not split into whole tuples.
    ComponentSplit {
        /// Variable name.
        name: String,
        /// Scalar slots per component unit.
        size_per_var: usize,
        /// Components of this variable.
        components: usize,
    },
}

impl fmt::Display for MarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CoordsNotTriples { len } => {
                write!(f, "coordinate buffer length {len} is not a multiple of 3")
            }
            Self::RaggedConnectivity { len, arity } => {
                write!(
                    f,
                    "node-id buffer length {len} is not a multiple of cell arity {arity}"
                )
            }
            Self::NodeIdOutOfRange {
                cell,
                node_id,
                n_points,
            } => write!(
                f,
                "cell {cell} references node {node_id}, but block has {n_points} points"
            ),
            Self::MalformedNameTable { len, slot_width } => write!(
                f,
                "name table length {len} is not a multiple of slot width {slot_width}"
            ),
            Self::EmptyName { index } => write!(f, "variable name slot {index} is empty"),
            Self::InvalidName { index } => {
                write!(f, "variable name slot {index} is not valid UTF-8")
            }
            Self::NameTooLong { name, slot_width } => {
                write!(f, "variable name '{name}' exceeds {slot_width} bytes")
            }
            Self::ComponentTableTooShort { names, components } => write!(
                f,
                "{names} variable names but only {components} component counts"
            ),
            Self::InvalidComponentCount { name, count } => {
                write!(f, "variable '{name}' declares {count} components")
            }
            Self::ValuesNotDivisible {
                len,
                total_components,
            } => write!(
                f,
                "value buffer length {len} does not divide into {total_components} components"
            ),
            Self::ComponentSplit {
                name,
                size_per_var,
                components,
            } => write!(
                f,
                "variable '{name}': {size_per_var} slots do not split into {components}-component tuples"
            ),
        }
    }
}

impl Error for MarshalError {}
