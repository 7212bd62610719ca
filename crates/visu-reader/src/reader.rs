//! The two-phase reader driven by the visualization host.
//!
//! The host first calls [`Reader::request_information`] (publish timesteps,
//! discover variables), then [`Reader::request_data`] whenever it needs the
//! mesh for a time. Both phases run on every process of a distributed run.
//!
//! # Collective structure
//!
//! ```text
//! information:  local setup ─ all_ok ─ barrier ─ solver.request_information ─ barrier
//! data:         local setup ─ all_ok ─ barrier ─ solver.produce ─ barrier ─ marshal ─ barrier
//! ```
//!
//! Local setup never touches a collective, and a failed agreement makes
//! every process skip the solver together.

use std::io;
use std::path::{Path, PathBuf};

use visu_catalog::{FileEntry, TimestepIndex, VariableCatalog};
use visu_core::{MeshDimension, PackedNameTable};
use visu_mesh::{marshal, CellKind, MarshalInput, MeshBlock};
use visu_params::{NodeType, ParameterFile};

use crate::comm::{rendezvous, Communicator, Topology};
use crate::config::ReaderConfig;
use crate::error::PhaseError;
use crate::output::{
    BlockKind, BlockSummary, DataObject, ExecutionRequest, LoadSummary, OutputInformation,
};
use crate::solver::{BlockBuffers, ProduceRequest, Solver, SolverOutput, SolverSession};
use crate::time::{NoTimeAttribute, TimeAttribute};

/// Pipeline adapter around one solver instance.
pub struct Reader<S, C, T = NoTimeAttribute> {
    config: ReaderConfig,
    config_dirty: bool,
    solver: S,
    comm: C,
    time_source: T,
    timesteps: TimestepIndex,
    catalog: VariableCatalog,
    files_dirty: bool,
    loaded: Option<PathBuf>,
}

impl<S, C, T> Reader<S, C, T>
where
    S: Solver,
    C: Communicator,
    T: TimeAttribute,
{
    /// Create a reader with an empty file set and catalog.
    ///
    /// A relative scratch directory is resolved against the current
    /// directory now, like the paths given to [`add_file`](Self::add_file).
    pub fn new(config: ReaderConfig, solver: S, comm: C, time_source: T) -> Self {
        Self {
            config: anchored(config),
            config_dirty: true,
            solver,
            comm,
            time_source,
            timesteps: TimestepIndex::new(),
            catalog: VariableCatalog::new(),
            files_dirty: false,
            loaded: None,
        }
    }

    // ── File set ───────────────────────────────────────────────────

    /// Register a state file and read its timestamp.
    ///
    /// Relative paths are resolved against the current directory now, since
    /// the phases change directory. Returns the timestep index.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> io::Result<usize> {
        let path = std::path::absolute(path.as_ref())?;
        let time = self.time_source.read_time(&path).unwrap_or_else(|| {
            log::warn!("no Time attribute in {}, using 0.0", path.display());
            0.0
        });
        let index = self.timesteps.register(path, time);
        self.files_dirty = true;
        log::debug!("registered timestep {index} at t = {time}");
        Ok(index)
    }

    /// Forget every registered file.
    pub fn remove_all_files(&mut self) {
        self.timesteps.reset();
        self.files_dirty = true;
        self.loaded = None;
    }

    /// Registered files.
    pub fn timesteps(&self) -> &TimestepIndex {
        &self.timesteps
    }

    // ── Phases ─────────────────────────────────────────────────────

    /// Publish the time series and discover variables from the primary file.
    ///
    /// Time information is filled in even when a later step fails. Returns
    /// the number of newly discovered variables.
    pub fn request_information(
        &mut self,
        info: &mut OutputInformation,
    ) -> Result<usize, PhaseError> {
        let Topology { rank, size } = self.comm.topology();
        log::info!(
            "[rank {rank}/{size}] request information, {} files",
            self.timesteps.len()
        );
        info.time_steps = self.timesteps.timestamps();
        info.time_range = self.timesteps.time_range();
        info.can_handle_piece_request = true;

        let local = self
            .timesteps
            .primary()
            .map(|e| e.path().to_path_buf())
            .ok_or(PhaseError::NoFiles)
            .and_then(|path| {
                enter_parent(&path)?;
                Ok(path)
            });
        let primary = self.agree(local)?;

        let handle = self.comm.handle();
        let solver = &mut self.solver;
        let bytes = rendezvous(&self.comm, || solver.request_information(handle, &primary))?;
        let names = PackedNameTable::new(&bytes)
            .and_then(|table| table.decode())
            .map_err(PhaseError::Names)?;

        let added = self.catalog.discover(&names);
        log::info!(
            "[rank {rank}/{size}] {} variables offered, {added} new",
            names.len()
        );
        Ok(added)
    }

    /// Whether the host must call [`request_data`](Self::request_data) to
    /// see the current state for `update_time`.
    pub fn needs_execution(&self, update_time: Option<f64>) -> bool {
        if self.config_dirty || self.files_dirty || self.catalog.is_dirty() {
            return true;
        }
        let wanted = self
            .resolve(update_time)
            .and_then(|i| self.timesteps.get(i))
            .map(FileEntry::path);
        match (&self.loaded, wanted) {
            (Some(loaded), Some(wanted)) => loaded.as_path() != wanted,
            _ => true,
        }
    }

    /// Run the solver for the timestep nearest to the requested time and
    /// fill `output` with the DG (block 0) and FV (block 1) meshes.
    ///
    /// A block whose buffers fail validation is cleared and reported as
    /// [`PhaseError::Validation`]; the other block is still filled.
    pub fn request_data(
        &mut self,
        request: &ExecutionRequest,
        output: &mut DataObject,
    ) -> Result<LoadSummary, PhaseError> {
        let Topology { rank, size } = self.comm.topology();
        log::info!("[rank {rank}/{size}] request data, time {:?}", request.update_time);

        let result = self.execute(request, output);
        self.comm.barrier();

        match &result {
            Ok(summary) => {
                self.config_dirty = false;
                self.files_dirty = false;
                self.catalog.mark_clean();
                self.loaded = Some(summary.state_file.clone());
                log::info!(
                    "[rank {rank}/{size}] loaded timestep {} (t = {}): DG {} cells, FV {} cells",
                    summary.timestep,
                    summary.time,
                    summary.dg.cells,
                    summary.fv.cells
                );
            }
            Err(e) => log::warn!("[rank {rank}/{size}] request data failed: {e}"),
        }
        result
    }

    fn execute(
        &mut self,
        request: &ExecutionRequest,
        output: &mut DataObject,
    ) -> Result<LoadSummary, PhaseError> {
        let local = self.prepare(request);
        let (timestep, entry, settings) = self.agree(local)?;

        let handle = self.comm.handle();
        let produce = ProduceRequest {
            parameter_override: self.config.parameter_override(),
            settings_file: settings.path(),
            state_file: entry.path(),
        };
        let mut session = SolverSession::new(&mut self.solver);
        rendezvous(&self.comm, || session.produce(handle, &produce))?;

        let found = output.type_name();
        let Some(blocks) = output.as_multi_block_mut() else {
            return Err(PhaseError::OutputType { found });
        };
        blocks.ensure_blocks(BlockKind::ALL.len());

        let kind = CellKind::from_dimension(self.config.dimension);
        let out = session.output();
        let mut shapes = [BlockSummary::default(); 2];
        let mut failure = None;
        for block in BlockKind::ALL {
            let buffers = match block {
                BlockKind::Dg => out.dg,
                BlockKind::Fv => out.fv,
            };
            match marshal_block(&out, buffers, kind) {
                Ok(mesh) => {
                    shapes[block.index()] = BlockSummary::of(&mesh);
                    log::debug!(
                        "{block} block: {} points, {} cells, {} arrays",
                        mesh.n_points(),
                        mesh.n_cells(),
                        mesh.n_fields()
                    );
                    blocks.set_block(block.index(), Some(mesh));
                }
                Err(source) => {
                    log::warn!("{block} block rejected: {source}");
                    blocks.set_block(block.index(), None);
                    failure.get_or_insert(PhaseError::Validation { block, source });
                }
            }
        }
        drop(session);
        drop(settings);

        match failure {
            Some(e) => Err(e),
            None => Ok(LoadSummary {
                timestep,
                time: entry.timestamp(),
                state_file: entry.path().to_path_buf(),
                dg: shapes[BlockKind::Dg.index()],
                fv: shapes[BlockKind::Fv.index()],
            }),
        }
    }

    /// Everything up to the solver call. Touches no collective.
    fn prepare(
        &self,
        request: &ExecutionRequest,
    ) -> Result<(usize, FileEntry, ParameterFile), PhaseError> {
        self.config.validate()?;
        let timestep = self
            .resolve(request.update_time)
            .ok_or(PhaseError::NoFiles)?;
        let entry = self
            .timesteps
            .get(timestep)
            .cloned()
            .ok_or(PhaseError::NoFiles)?;
        enter_parent(entry.path())?;
        let params = self.config.to_parameters(self.catalog.enabled_names());
        let settings = ParameterFile::create_in(&self.config.scratch_dir, &params)?;
        Ok((timestep, entry, settings))
    }

    /// All processes learn whether every local setup succeeded.
    fn agree<V>(&self, local: Result<V, PhaseError>) -> Result<V, PhaseError> {
        let all = self.comm.all_ok(local.is_ok());
        match local {
            Err(e) => {
                log::warn!("[rank {}] local setup failed: {e}", self.comm.rank());
                Err(e)
            }
            Ok(_) if !all => Err(PhaseError::PeerFailed),
            Ok(v) => Ok(v),
        }
    }

    fn resolve(&self, update_time: Option<f64>) -> Option<usize> {
        match update_time {
            Some(t) => self.timesteps.nearest_index(t),
            None => (!self.timesteps.is_empty()).then_some(0),
        }
    }

    // ── Configuration ──────────────────────────────────────────────

    /// Current configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Replace the whole configuration.
    ///
    /// A relative scratch directory is resolved against the current
    /// directory now.
    pub fn set_config(&mut self, config: ReaderConfig) {
        let config = anchored(config);
        let changed = self.config != config;
        self.config = config;
        self.config_dirty |= changed;
    }

    /// Set the interpolation degree. Validated at the next data phase.
    pub fn set_resolution(&mut self, resolution: u32) {
        self.config_dirty |= replace_if_changed(&mut self.config.resolution, resolution);
    }

    /// Set the node type.
    pub fn set_node_type(&mut self, node_type: NodeType) {
        self.config_dirty |= replace_if_changed(&mut self.config.node_type, node_type);
    }

    /// Select 2D or 3D output.
    pub fn set_dimension(&mut self, dimension: MeshDimension) {
        self.config_dirty |= replace_if_changed(&mut self.config.dimension, dimension);
    }

    /// Skip the FV block.
    pub fn set_dg_only(&mut self, dg_only: bool) {
        self.config_dirty |= replace_if_changed(&mut self.config.dg_only, dg_only);
    }

    /// Use another mesh file than the state file references.
    pub fn set_mesh_override(&mut self, mesh: Option<PathBuf>) {
        self.config_dirty |= replace_if_changed(&mut self.config.mesh_override, mesh);
    }

    /// Pass a solver parameter file alongside the generated settings.
    pub fn set_parameter_override(&mut self, file: Option<PathBuf>) {
        self.config_dirty |= replace_if_changed(&mut self.config.parameter_override, file);
    }

    /// Node types the host may offer.
    pub fn node_type_list(&self) -> &'static [NodeType] {
        &NodeType::ALL
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// The variable selection.
    pub fn catalog(&self) -> &VariableCatalog {
        &self.catalog
    }

    /// Mutable variable selection (host GUI edits).
    pub fn catalog_mut(&mut self) -> &mut VariableCatalog {
        &mut self.catalog
    }

    /// State file of the last successful data phase.
    pub fn loaded_file(&self) -> Option<&Path> {
        self.loaded.as_deref()
    }

    /// The solver.
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// The communicator.
    pub fn communicator(&self) -> &C {
        &self.comm
    }
}

impl<S, C, T> std::fmt::Debug for Reader<S, C, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("config", &self.config)
            .field("timesteps", &self.timesteps)
            .field("catalog", &self.catalog)
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}

fn marshal_block(
    out: &SolverOutput<'_>,
    buffers: BlockBuffers<'_>,
    kind: CellKind,
) -> Result<MeshBlock, visu_core::MarshalError> {
    let varnames = PackedNameTable::new(out.varnames.as_slice())?;
    marshal(&MarshalInput {
        coords: buffers.coords,
        nodeids: buffers.nodeids,
        values: buffers.values,
        varnames,
        components: out.components,
        kind,
    })
}

/// Resolve a relative scratch directory against the current directory.
///
/// An empty path stays empty so that validation still reports it.
fn anchored(mut config: ReaderConfig) -> ReaderConfig {
    if let Ok(dir) = std::path::absolute(&config.scratch_dir) {
        config.scratch_dir = dir;
    }
    config
}

fn enter_parent(path: &Path) -> Result<(), PhaseError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => return Ok(()),
    };
    std::env::set_current_dir(dir).map_err(|source| PhaseError::ChangeDirectory {
        dir: dir.to_path_buf(),
        source,
    })
}

fn replace_if_changed<V: PartialEq>(slot: &mut V, value: V) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
