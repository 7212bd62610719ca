//! Raw solver buffers for structured test grids.
//!
//! Everything here is plain `Vec` data, so crates below `visu-reader` can
//! use the fixtures without sharing types across the dev-dependency cycle.

use visu_core::PackedNameTable;

/// Owned buffers for one block, shaped the way the solver returns them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawBlock {
    pub coords: Vec<f64>,
    pub nodeids: Vec<i32>,
    pub values: Vec<f64>,
}

impl RawBlock {
    pub fn n_points(&self) -> usize {
        self.coords.len() / 3
    }
}

/// `nx * ny` unit quads in the z = 0 plane, counter-clockwise vertices.
pub fn quad_grid(nx: usize, ny: usize) -> RawBlock {
    let id = |i: usize, j: usize| (j * (nx + 1) + i) as i32;
    let mut coords = Vec::with_capacity((nx + 1) * (ny + 1) * 3);
    for j in 0..=ny {
        for i in 0..=nx {
            coords.extend_from_slice(&[i as f64, j as f64, 0.0]);
        }
    }
    let mut nodeids = Vec::with_capacity(nx * ny * 4);
    for j in 0..ny {
        for i in 0..nx {
            nodeids.extend_from_slice(&[id(i, j), id(i + 1, j), id(i + 1, j + 1), id(i, j + 1)]);
        }
    }
    RawBlock {
        coords,
        nodeids,
        values: Vec::new(),
    }
}

/// `n^3` unit hexahedra, VTK vertex order.
pub fn hex_grid(n: usize) -> RawBlock {
    let m = n + 1;
    let id = |i: usize, j: usize, k: usize| ((k * m + j) * m + i) as i32;
    let mut coords = Vec::with_capacity(m * m * m * 3);
    for k in 0..m {
        for j in 0..m {
            for i in 0..m {
                coords.extend_from_slice(&[i as f64, j as f64, k as f64]);
            }
        }
    }
    let mut nodeids = Vec::with_capacity(n * n * n * 8);
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                nodeids.extend_from_slice(&[
                    id(i, j, k),
                    id(i + 1, j, k),
                    id(i + 1, j + 1, k),
                    id(i, j + 1, k),
                    id(i, j, k + 1),
                    id(i + 1, j, k + 1),
                    id(i + 1, j + 1, k + 1),
                    id(i, j + 1, k + 1),
                ]);
            }
        }
    }
    RawBlock {
        coords,
        nodeids,
        values: Vec::new(),
    }
}

/// Concatenated values for `components`, `size_per_var` slots per
/// component unit.
///
/// Variable `v` owns `size_per_var` values starting at its offset;
/// the value at slot `i` is `1000 * v + i`.
pub fn values_for(size_per_var: usize, components: &[i32]) -> Vec<f64> {
    let total: usize = components.iter().map(|&c| c.max(0) as usize).sum();
    let mut values = vec![0.0; size_per_var * total];
    let mut offset = 0;
    for (v, &c) in components.iter().enumerate() {
        for i in 0..size_per_var {
            if let Some(slot) = values.get_mut(offset + i) {
                *slot = (1000 * v + i) as f64;
            }
        }
        offset += size_per_var * c.max(0) as usize;
    }
    values
}

/// Pack names into 255-byte slots.
pub fn packed_names(names: &[&str]) -> Vec<u8> {
    PackedNameTable::encode(names).expect("fixture names must pack")
}
