//! Unstructured mesh blocks with named point-data arrays.

use indexmap::IndexMap;
use visu_core::{MarshalError, MeshDimension};

/// Cell topology of a block. Fixed per block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Four-vertex quadrilateral (2D output).
    Quad,
    /// Eight-vertex hexahedron (3D output).
    Hexahedron,
}

impl CellKind {
    /// Topology used for a mesh dimension.
    pub fn from_dimension(dim: MeshDimension) -> Self {
        match dim {
            MeshDimension::Two => Self::Quad,
            MeshDimension::Three => Self::Hexahedron,
        }
    }

    /// Vertices per cell.
    pub fn arity(self) -> usize {
        match self {
            Self::Quad => 4,
            Self::Hexahedron => 8,
        }
    }

    /// VTK cell type id (`VTK_QUAD = 9`, `VTK_HEXAHEDRON = 12`).
    pub fn vtk_type(self) -> u8 {
        match self {
            Self::Quad => 9,
            Self::Hexahedron => 12,
        }
    }
}

/// A named array of fixed-width tuples, stored component-fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldArray {
    name: String,
    components: usize,
    values: Vec<f64>,
}

impl FieldArray {
    /// Create an array. `values.len()` must be a multiple of `components`.
    pub fn new(
        name: impl Into<String>,
        components: usize,
        values: Vec<f64>,
    ) -> Result<Self, MarshalError> {
        let name = name.into();
        if components == 0 {
            return Err(MarshalError::InvalidComponentCount { name, count: 0 });
        }
        if values.len() % components != 0 {
            return Err(MarshalError::ComponentSplit {
                name,
                size_per_var: values.len(),
                components,
            });
        }
        Ok(Self {
            name,
            components,
            values,
        })
    }

    /// Array name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Components per tuple.
    pub fn components(&self) -> usize {
        self.components
    }

    /// Number of tuples.
    pub fn tuple_count(&self) -> usize {
        self.values.len() / self.components
    }

    /// Raw values, component-fastest.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Tuple `index`, or `None` past the end.
    pub fn tuple(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.components)?;
        self.values.get(start..start + self.components)
    }

    /// Iterate over tuples.
    pub fn tuples(&self) -> std::slice::ChunksExact<'_, f64> {
        self.values.chunks_exact(self.components)
    }
}

/// One unstructured grid: points, single-topology cells, and point data.
///
/// Built wholesale by [`marshal`](crate::marshal); there is no incremental
/// update.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshBlock {
    kind: CellKind,
    points: Vec<[f64; 3]>,
    connectivity: Vec<u32>,
    fields: IndexMap<String, FieldArray>,
}

impl MeshBlock {
    /// An empty block of the given topology.
    pub fn new(kind: CellKind) -> Self {
        Self {
            kind,
            points: Vec::new(),
            connectivity: Vec::new(),
            fields: IndexMap::new(),
        }
    }

    pub(crate) fn from_parts(kind: CellKind, points: Vec<[f64; 3]>, connectivity: Vec<u32>) -> Self {
        debug_assert_eq!(connectivity.len() % kind.arity(), 0);
        Self {
            kind,
            points,
            connectivity,
            fields: IndexMap::new(),
        }
    }

    /// Attach an array, replacing any array of the same name.
    pub fn insert_field(&mut self, field: FieldArray) -> Option<FieldArray> {
        self.fields.insert(field.name.clone(), field)
    }

    /// Cell topology.
    pub fn kind(&self) -> CellKind {
        self.kind
    }

    /// Point coordinates.
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Number of points.
    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    /// Number of cells.
    pub fn n_cells(&self) -> usize {
        self.connectivity.len() / self.kind.arity()
    }

    /// Vertex ids of cell `index`, in the order the solver gave them.
    pub fn cell(&self, index: usize) -> Option<&[u32]> {
        let arity = self.kind.arity();
        let start = index.checked_mul(arity)?;
        self.connectivity.get(start..start + arity)
    }

    /// Iterate over cells.
    pub fn cells(&self) -> std::slice::ChunksExact<'_, u32> {
        self.connectivity.chunks_exact(self.kind.arity())
    }

    /// Flat connectivity, `n_cells() * kind().arity()` ids.
    pub fn connectivity(&self) -> &[u32] {
        &self.connectivity
    }

    /// Array by name.
    pub fn field(&self, name: &str) -> Option<&FieldArray> {
        self.fields.get(name)
    }

    /// Array by position.
    pub fn field_at(&self, index: usize) -> Option<&FieldArray> {
        self.fields.get_index(index).map(|(_, f)| f)
    }

    /// Arrays in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldArray> {
        self.fields.values()
    }

    /// Number of arrays.
    pub fn n_fields(&self) -> usize {
        self.fields.len()
    }
}
