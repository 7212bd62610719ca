//! Synthetic solver buffers for benchmarking the marshalling path.
//!
//! - [`hex_profile`]: an `n^3` hexahedral grid with jittered points
//! - [`variable_names`]: solver-style names (`Var000`, `Var001`, ...)

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use visu_core::{FlatBuffer, MarshalError, PackedNameTable};
use visu_mesh::{CellKind, MarshalInput};

/// Owned buffers shaped like one block of solver output.
#[derive(Clone, Debug)]
pub struct SolverBuffers {
    pub coords: Vec<f64>,
    pub nodeids: Vec<i32>,
    pub values: Vec<f64>,
    pub varnames: Vec<u8>,
    pub components: Vec<i32>,
    pub kind: CellKind,
}

impl SolverBuffers {
    /// Borrow the buffers the way the reader does after a solver call.
    pub fn input(&self) -> Result<MarshalInput<'_>, MarshalError> {
        Ok(MarshalInput {
            coords: FlatBuffer::new(&self.coords),
            nodeids: FlatBuffer::new(&self.nodeids),
            values: FlatBuffer::new(&self.values),
            varnames: PackedNameTable::new(&self.varnames)?,
            components: FlatBuffer::new(&self.components),
            kind: self.kind,
        })
    }

    pub fn n_points(&self) -> usize {
        self.coords.len() / 3
    }
}

/// Names `Var000` .. for `n` variables.
pub fn variable_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("Var{i:03}")).collect()
}

/// Build an `n^3` hexahedral grid carrying one variable per entry of
/// `components`.
///
/// Points are jittered by up to a tenth of the spacing and values are
/// uniform in `[0, 1)`; both depend only on `seed`.
pub fn hex_profile(n: usize, components: &[i32], seed: u64) -> Result<SolverBuffers, MarshalError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let m = n + 1;
    let id = |i: usize, j: usize, k: usize| ((k * m + j) * m + i) as i32;

    let mut coords = Vec::with_capacity(m * m * m * 3);
    for k in 0..m {
        for j in 0..m {
            for i in 0..m {
                for c in [i, j, k] {
                    coords.push(c as f64 + rng.random_range(-0.1..0.1));
                }
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

    let n_points = m * m * m;
    let total: usize = components.iter().map(|&c| c.max(0) as usize).sum();
    let values = (0..n_points * total).map(|_| rng.random::<f64>()).collect();
    let varnames = PackedNameTable::encode(variable_names(components.len()))?;

    Ok(SolverBuffers {
        coords,
        nodeids,
        values,
        varnames,
        components: components.to_vec(),
        kind: CellKind::Hexahedron,
    })
}
