//! A scripted solver.

use std::path::{Path, PathBuf};

use visu_core::FlatBuffer;
use visu_reader::{BlockBuffers, ProduceRequest, Solver, SolverError, SolverOutput};

use crate::fixtures::{packed_names, RawBlock};

/// What one `produce` call was given.
///
/// The settings file is read during the call, since the reader removes it
/// right after.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedProduce {
    pub comm: i32,
    pub settings: String,
    pub settings_file: PathBuf,
    pub state_file: PathBuf,
    pub parameter_override: Option<PathBuf>,
}

/// Solver double with scripted output and failure injection.
///
/// Buffers are only visible between a successful `produce` and the next
/// `release`, so tests catch reads after release.
#[derive(Clone, Debug, Default)]
pub struct MockSolver {
    offered: Vec<u8>,
    dg: RawBlock,
    fv: RawBlock,
    varnames: Vec<u8>,
    components: Vec<i32>,
    fail_information: Option<i32>,
    fail_produce: Option<i32>,
    live: bool,
    pub information_calls: Vec<(i32, PathBuf)>,
    pub produced: Vec<RecordedProduce>,
    pub releases: usize,
}

impl MockSolver {
    /// A solver offering `names` and producing empty blocks.
    pub fn offering(names: &[&str]) -> Self {
        Self {
            offered: packed_names(names),
            ..Default::default()
        }
    }

    /// Offer a raw name table, malformed or not.
    pub fn with_offered_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.offered = bytes;
        self
    }

    /// Output for each production call.
    pub fn with_output(
        mut self,
        dg: RawBlock,
        fv: RawBlock,
        names: &[&str],
        components: &[i32],
    ) -> Self {
        self.dg = dg;
        self.fv = fv;
        self.varnames = packed_names(names);
        self.components = components.to_vec();
        self
    }

    /// Replace the FV block only.
    pub fn with_fv(mut self, fv: RawBlock) -> Self {
        self.fv = fv;
        self
    }

    /// `request_information` returns status `code`.
    pub fn failing_information(mut self, code: i32) -> Self {
        self.fail_information = Some(code);
        self
    }

    /// `produce` returns status `code`.
    pub fn failing_produce(mut self, code: i32) -> Self {
        self.fail_produce = Some(code);
        self
    }

    /// Buffers are currently handed out.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Settings of the last production call.
    pub fn last_settings(&self) -> Option<&str> {
        self.produced.last().map(|p| p.settings.as_str())
    }

    fn block<'a>(&self, raw: &'a RawBlock) -> BlockBuffers<'a> {
        if !self.live {
            return BlockBuffers::default();
        }
        BlockBuffers {
            coords: FlatBuffer::new(&raw.coords),
            values: FlatBuffer::new(&raw.values),
            nodeids: FlatBuffer::new(&raw.nodeids),
        }
    }
}

impl Solver for MockSolver {
    fn request_information(
        &mut self,
        comm: i32,
        state_file: &Path,
    ) -> Result<Vec<u8>, SolverError> {
        self.information_calls.push((comm, state_file.to_path_buf()));
        if let Some(code) = self.fail_information {
            return Err(SolverError::Status {
                operation: "request_information",
                code,
            });
        }
        Ok(self.offered.clone())
    }

    fn produce(&mut self, comm: i32, request: &ProduceRequest<'_>) -> Result<(), SolverError> {
        let settings = std::fs::read_to_string(request.settings_file).map_err(|e| {
            SolverError::Failed {
                operation: "produce",
                reason: format!("cannot read settings: {e}"),
            }
        })?;
        self.produced.push(RecordedProduce {
            comm,
            settings,
            settings_file: request.settings_file.to_path_buf(),
            state_file: request.state_file.to_path_buf(),
            parameter_override: request.parameter_override.map(Path::to_path_buf),
        });
        if let Some(code) = self.fail_produce {
            return Err(SolverError::Status {
                operation: "produce",
                code,
            });
        }
        self.live = true;
        Ok(())
    }

    fn output(&self) -> SolverOutput<'_> {
        if !self.live {
            return SolverOutput::default();
        }
        SolverOutput {
            dg: self.block(&self.dg),
            fv: self.block(&self.fv),
            varnames: FlatBuffer::new(&self.varnames),
            components: FlatBuffer::new(&self.components),
        }
    }

    fn release(&mut self) {
        self.live = false;
        self.releases += 1;
    }
}
