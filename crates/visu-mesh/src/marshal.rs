//! Rebuild a [`MeshBlock`] from the solver's flat output buffers.
//!
//! Inputs per block:
//!
//! | Buffer | Shape reconstructed from |
//! |---|---|
//! | `coords` | x,y,z triples |
//! | `nodeids` | fixed cell arity (4 or 8) |
//! | `values` | all variables concatenated, split by `components` |
//! | `varnames` | 255-byte name slots |
//! | `components` | one count per variable |
//!
//! Any length mismatch is a [`MarshalError`]; nothing is truncated.

use visu_core::{FlatBuffer, MarshalError, PackedNameTable};

use crate::block::{CellKind, FieldArray, MeshBlock};

/// Borrowed solver buffers for one block.
#[derive(Clone, Copy, Debug)]
pub struct MarshalInput<'a> {
    /// Flattened x,y,z point coordinates.
    pub coords: FlatBuffer<'a, f64>,
    /// Flattened per-cell vertex ids.
    pub nodeids: FlatBuffer<'a, i32>,
    /// All variable data, concatenated.
    pub values: FlatBuffer<'a, f64>,
    /// Variable names.
    pub varnames: PackedNameTable<'a>,
    /// Scalar components per variable.
    pub components: FlatBuffer<'a, i32>,
    /// Cell topology.
    pub kind: CellKind,
}

/// Build a complete block.
pub fn marshal(input: &MarshalInput<'_>) -> Result<MeshBlock, MarshalError> {
    let points = build_points(input.coords)?;
    let connectivity = build_connectivity(input.nodeids, input.kind, points.len())?;
    let fields = split_fields(input.values, input.varnames, input.components)?;

    let mut block = MeshBlock::from_parts(input.kind, points, connectivity);
    for field in fields {
        let name = field.name().to_owned();
        if block.insert_field(field).is_some() {
            log::warn!("variable '{name}' produced twice; keeping the later array");
        }
    }
    log::debug!(
        "marshalled {} points, {} cells, {} arrays",
        block.n_points(),
        block.n_cells(),
        block.n_fields()
    );
    Ok(block)
}

/// Reinterpret flattened coordinates as points, verbatim.
///
/// 2D output still carries a z coordinate.
pub fn build_points(coords: FlatBuffer<'_, f64>) -> Result<Vec<[f64; 3]>, MarshalError> {
    if coords.len() % 3 != 0 {
        return Err(MarshalError::CoordsNotTriples { len: coords.len() });
    }
    Ok(coords
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect())
}

/// Validate node ids and group them into cells of `kind.arity()`.
///
/// Vertex order is kept exactly; winding is the solver's business.
pub fn build_connectivity(
    nodeids: FlatBuffer<'_, i32>,
    kind: CellKind,
    n_points: usize,
) -> Result<Vec<u32>, MarshalError> {
    let arity = kind.arity();
    if nodeids.len() % arity != 0 {
        return Err(MarshalError::RaggedConnectivity {
            len: nodeids.len(),
            arity,
        });
    }
    nodeids
        .iter()
        .enumerate()
        .map(|(i, &id)| match u32::try_from(id) {
            Ok(v) if (v as usize) < n_points => Ok(v),
            _ => Err(MarshalError::NodeIdOutOfRange {
                cell: i / arity,
                node_id: i64::from(id),
                n_points,
            }),
        })
        .collect()
}

/// Split the concatenated value buffer into one array per variable.
///
/// With `total` the sum of all component counts, every variable owns
/// `size_per_var = values.len() / total` consecutive slots, read as
/// `size_per_var / c` tuples of its `c` components. The running offset
/// advances by `size_per_var * c` per variable, so the walk ends exactly at
/// `values.len()`.
pub fn split_fields(
    values: FlatBuffer<'_, f64>,
    varnames: PackedNameTable<'_>,
    components: FlatBuffer<'_, i32>,
) -> Result<Vec<FieldArray>, MarshalError> {
    let n_var = varnames.len();
    if n_var == 0 {
        return Ok(Vec::new());
    }
    if components.len() < n_var {
        return Err(MarshalError::ComponentTableTooShort {
            names: n_var,
            components: components.len(),
        });
    }
    let names = varnames.decode()?;
    let counts = &components[..n_var];
    if let Some((name, &c)) = names.iter().zip(counts).find(|(_, &c)| c < 0) {
        return Err(MarshalError::InvalidComponentCount {
            name: name.clone(),
            count: i64::from(c),
        });
    }
    let total: usize = counts.iter().map(|&c| c as usize).sum();
    if total == 0 {
        log::debug!("no components selected, skipping field assignment");
        return Ok(Vec::new());
    }
    if values.len() % total != 0 {
        return Err(MarshalError::ValuesNotDivisible {
            len: values.len(),
            total_components: total,
        });
    }
    let size_per_var = values.len() / total;

    let mut fields = Vec::with_capacity(n_var);
    let mut offset = 0usize;
    for (name, &c) in names.into_iter().zip(counts) {
        let c = c as usize;
        if c == 0 {
            return Err(MarshalError::InvalidComponentCount { name, count: 0 });
        }
        if size_per_var % c != 0 {
            return Err(MarshalError::ComponentSplit {
                name,
                size_per_var,
                components: c,
            });
        }
        let data = values[offset..offset + size_per_var].to_vec();
        fields.push(FieldArray::new(name, c, data)?);
        offset += size_per_var * c;
    }
    debug_assert_eq!(offset, values.len());
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<u8> {
        PackedNameTable::encode(list).unwrap()
    }

    #[test]
    fn single_quad() {
        let coords = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0];
        let nodeids = [0, 1, 2, 3];
        let input = MarshalInput {
            coords: FlatBuffer::new(&coords),
            nodeids: FlatBuffer::new(&nodeids),
            values: FlatBuffer::empty(),
            varnames: PackedNameTable::empty(),
            components: FlatBuffer::empty(),
            kind: CellKind::Quad,
        };
        let block = marshal(&input).unwrap();
        assert_eq!(block.n_points(), 4);
        assert_eq!(block.n_cells(), 1);
        assert_eq!(block.cell(0), Some(&[0, 1, 2, 3][..]));
        assert_eq!(block.points()[2], [1.0, 1.0, 0.0]);
        assert_eq!(block.n_fields(), 0);
    }

    #[test]
    fn zero_points_give_empty_arrays_per_variable() {
        let table = names(&["Density", "Velocity"]);
        let fields = split_fields(
            FlatBuffer::empty(),
            PackedNameTable::new(&table).unwrap(),
            FlatBuffer::new(&[1, 3]),
        )
        .unwrap();
        let shapes: Vec<(&str, usize, usize)> = fields
            .iter()
            .map(|f| (f.name(), f.components(), f.tuple_count()))
            .collect();
        assert_eq!(shapes, vec![("Density", 1, 0), ("Velocity", 3, 0)]);

        let block = marshal(&MarshalInput {
            coords: FlatBuffer::empty(),
            nodeids: FlatBuffer::empty(),
            values: FlatBuffer::empty(),
            varnames: PackedNameTable::new(&table).unwrap(),
            components: FlatBuffer::new(&[1, 3]),
            kind: CellKind::Hexahedron,
        })
        .unwrap();
        assert_eq!((block.n_points(), block.n_cells(), block.n_fields()), (0, 0, 2));
        assert_eq!(block.field("Velocity").unwrap().tuple_count(), 0);
    }

    #[test]
    fn vertex_order_is_preserved() {
        let coords = [0.0; 24];
        let nodeids = [7, 3, 5, 1, 0, 2, 4, 6];
        let conn =
            build_connectivity(FlatBuffer::new(&nodeids), CellKind::Hexahedron, 8).unwrap();
        assert_eq!(conn, vec![7, 3, 5, 1, 0, 2, 4, 6]);
        assert_eq!(build_points(FlatBuffer::new(&coords)).unwrap().len(), 8);
    }

    #[test]
    fn ragged_connectivity_is_rejected() {
        let nodeids = [0, 1, 2, 3, 0, 1];
        assert_eq!(
            build_connectivity(FlatBuffer::new(&nodeids), CellKind::Quad, 4),
            Err(MarshalError::RaggedConnectivity { len: 6, arity: 4 })
        );
    }

    #[test]
    fn out_of_range_node_id_is_rejected() {
        let nodeids = [0, 1, 2, 3, 0, 1, 2, -1];
        assert_eq!(
            build_connectivity(FlatBuffer::new(&nodeids), CellKind::Quad, 4),
            Err(MarshalError::NodeIdOutOfRange {
                cell: 1,
                node_id: -1,
                n_points: 4
            })
        );
        let nodeids = [0, 1, 2, 4];
        assert!(build_connectivity(FlatBuffer::new(&nodeids), CellKind::Quad, 4).is_err());
    }

    #[test]
    fn coords_must_be_triples() {
        let coords = [0.0; 7];
        assert_eq!(
            build_points(FlatBuffer::new(&coords)),
            Err(MarshalError::CoordsNotTriples { len: 7 })
        );
    }

    #[test]
    fn scalar_and_vector_split() {
        let size_per_var = 6;
        let values: Vec<f64> = (0..size_per_var * 4).map(f64::from).collect();
        let table = names(&["Pressure", "Velocity"]);
        let components = [1, 3];
        let fields = split_fields(
            FlatBuffer::new(&values),
            PackedNameTable::new(&table).unwrap(),
            FlatBuffer::new(&components),
        )
        .unwrap();

        assert_eq!(fields.len(), 2);
        let p = &fields[0];
        assert_eq!((p.name(), p.components(), p.tuple_count()), ("Pressure", 1, 6));
        assert_eq!(p.values(), &values[0..6]);

        let v = &fields[1];
        assert_eq!((v.name(), v.components(), v.tuple_count()), ("Velocity", 3, 2));
        assert_eq!(v.values(), &values[6..12]);
        assert_eq!(v.tuple(1), Some(&[9.0, 10.0, 11.0][..]));
    }

    #[test]
    fn component_split_mismatch_is_rejected() {
        let values = vec![0.0; 8];
        let table = names(&["Pressure", "Velocity"]);
        let components = [1, 3];
        assert_eq!(
            split_fields(
                FlatBuffer::new(&values),
                PackedNameTable::new(&table).unwrap(),
                FlatBuffer::new(&components),
            ),
            Err(MarshalError::ComponentSplit {
                name: "Velocity".into(),
                size_per_var: 2,
                components: 3
            })
        );
    }

    #[test]
    fn values_must_divide_by_total_components() {
        let values = vec![0.0; 7];
        let table = names(&["Pressure", "Velocity"]);
        let components = [1, 3];
        assert_eq!(
            split_fields(
                FlatBuffer::new(&values),
                PackedNameTable::new(&table).unwrap(),
                FlatBuffer::new(&components),
            ),
            Err(MarshalError::ValuesNotDivisible {
                len: 7,
                total_components: 4
            })
        );
    }

    #[test]
    fn zero_total_components_skips_fields() {
        let values = vec![1.0; 4];
        let table = names(&["Density"]);
        let components = [0];
        let fields = split_fields(
            FlatBuffer::new(&values),
            PackedNameTable::new(&table).unwrap(),
            FlatBuffer::new(&components),
        )
        .unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn zero_component_among_others_is_rejected() {
        let values = vec![1.0; 4];
        let table = names(&["Density", "Ghost"]);
        let components = [1, 0];
        assert!(matches!(
            split_fields(
                FlatBuffer::new(&values),
                PackedNameTable::new(&table).unwrap(),
                FlatBuffer::new(&components),
            ),
            Err(MarshalError::InvalidComponentCount { count: 0, .. })
        ));
    }

    #[test]
    fn short_component_table_is_rejected() {
        let values = vec![1.0; 4];
        let table = names(&["Density", "Mach"]);
        let components = [1];
        assert_eq!(
            split_fields(
                FlatBuffer::new(&values),
                PackedNameTable::new(&table).unwrap(),
                FlatBuffer::new(&components),
            ),
            Err(MarshalError::ComponentTableTooShort {
                names: 2,
                components: 1
            })
        );
    }

    #[test]
    fn duplicate_names_keep_later_array() {
        let coords = [0.0; 12];
        let nodeids = [0, 1, 2, 3];
        let values = [1.0, 1.0, 2.0, 2.0];
        let table = names(&["Density", "Density"]);
        let components = [1, 1];
        let block = marshal(&MarshalInput {
            coords: FlatBuffer::new(&coords),
            nodeids: FlatBuffer::new(&nodeids),
            values: FlatBuffer::new(&values),
            varnames: PackedNameTable::new(&table).unwrap(),
            components: FlatBuffer::new(&components),
            kind: CellKind::Quad,
        })
        .unwrap();
        assert_eq!(block.n_fields(), 1);
        assert_eq!(block.field("Density").unwrap().values(), &[2.0, 2.0]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn split_walk_covers_values_exactly(
                comps in prop::collection::vec(1i32..4, 1..6),
                units in 1usize..5,
            ) {
                // size_per_var must split for every component count: use lcm-friendly 12.
                let size_per_var = 12 * units;
                let total: usize = comps.iter().map(|&c| c as usize).sum();
                let values: Vec<f64> = (0..size_per_var * total).map(|i| i as f64).collect();
                let var_names: Vec<String> = (0..comps.len()).map(|i| format!("v{i}")).collect();
                let table = PackedNameTable::encode(&var_names).unwrap();

                let fields = split_fields(
                    FlatBuffer::new(&values),
                    PackedNameTable::new(&table).unwrap(),
                    FlatBuffer::new(&comps),
                ).unwrap();

                let mut offset = 0;
                for (field, &c) in fields.iter().zip(&comps) {
                    let c = c as usize;
                    prop_assert_eq!(field.components(), c);
                    prop_assert_eq!(field.tuple_count(), size_per_var / c);
                    prop_assert_eq!(field.values()[0], values[offset]);
                    offset += size_per_var * c;
                }
                prop_assert_eq!(offset, values.len());
            }
        }
    }
}
