//! C callback seams: bridges [`VisuReaderDef`] to the reader's `Solver`,
//! `Communicator` and `TimeAttribute` traits.
//!
//! Paths go to the solver as `(len, bytes)` pairs without a terminating
//! NUL; the time callback receives a NUL-terminated path.

use std::ffi::{c_char, c_void, CString};
use std::path::Path;

use visu_core::FlatBuffer;
use visu_reader::{
    BlockBuffers, Communicator, ProduceRequest, Solver, SolverError, SolverOutput, TimeAttribute,
};

use crate::types::{VisuCharArray, VisuSolverOutput};

/// `(user_data, comm, path_len, path, varnames_out) -> status`.
pub type VisuRequestInformationFn =
    unsafe extern "C" fn(*mut c_void, i32, i32, *const c_char, *mut VisuCharArray) -> i32;

/// `(user_data, comm, prm_len, prm, settings_len, settings, state_len, state, out) -> status`.
pub type VisuProduceFn = unsafe extern "C" fn(
    *mut c_void,
    i32,
    i32,
    *const c_char,
    i32,
    *const c_char,
    i32,
    *const c_char,
    *mut VisuSolverOutput,
) -> i32;

/// `(user_data)`: free the buffers of the last `produce`.
pub type VisuReleaseFn = unsafe extern "C" fn(*mut c_void);

/// `(comm_data) -> status`.
pub type VisuBarrierFn = unsafe extern "C" fn(*mut c_void) -> i32;

/// `(comm_data, local, global_out) -> status`: logical AND over all ranks.
pub type VisuAllOkFn = unsafe extern "C" fn(*mut c_void, i32, *mut i32) -> i32;

/// `(time_data, path, time_out) -> found`: 1 if the file has a time.
pub type VisuReadTimeFn = unsafe extern "C" fn(*mut c_void, *const c_char, *mut f64) -> i32;

/// Everything `visu_reader_create` needs from the embedding code.
///
/// All function pointers and user-data pointers must stay valid until the
/// reader is destroyed. Communicator callbacks may be null for a serial run
/// (`size == 1`); the time callback may be null (every file at t = 0).
#[repr(C)]
pub struct VisuReaderDef {
    /// Variable query (required).
    pub request_information: Option<VisuRequestInformationFn>,
    /// Data production (required).
    pub produce: Option<VisuProduceFn>,
    /// Buffer release (required).
    pub release: Option<VisuReleaseFn>,
    /// Passed to the solver callbacks.
    pub solver_data: *mut c_void,
    /// Collective barrier.
    pub barrier: Option<VisuBarrierFn>,
    /// Collective logical AND.
    pub all_ok: Option<VisuAllOkFn>,
    /// Passed to the communicator callbacks.
    pub comm_data: *mut c_void,
    /// Rank of this process.
    pub rank: i32,
    /// Number of processes.
    pub size: i32,
    /// Communicator handle forwarded to the solver.
    pub comm_handle: i32,
    /// Timestamp reader.
    pub read_time: Option<VisuReadTimeFn>,
    /// Passed to the time callback.
    pub time_data: *mut c_void,
    /// NUL-terminated scratch directory, or null for the system temp dir.
    pub scratch_dir: *const c_char,
}

// ── Solver ─────────────────────────────────────────────────────────

pub(crate) struct CallbackSolver {
    request_information: VisuRequestInformationFn,
    produce: VisuProduceFn,
    release: VisuReleaseFn,
    user_data: *mut c_void,
    output: VisuSolverOutput,
}

// SAFETY: the C contract requires solver_data to be usable from the thread
// that drives the reader. Each reader sits behind its own Mutex, so calls
// never overlap.
#[allow(unsafe_code)]
unsafe impl Send for CallbackSolver {}

impl CallbackSolver {
    pub(crate) fn new(
        request_information: VisuRequestInformationFn,
        produce: VisuProduceFn,
        release: VisuReleaseFn,
        user_data: *mut c_void,
    ) -> Self {
        Self {
            request_information,
            produce,
            release,
            user_data,
            output: VisuSolverOutput::default(),
        }
    }
}

/// Path bytes and length for the solver.
fn path_arg(operation: &'static str, path: &[u8]) -> Result<(i32, *const c_char), SolverError> {
    let len = i32::try_from(path.len()).map_err(|_| SolverError::Failed {
        operation,
        reason: format!("path of {} bytes is too long", path.len()),
    })?;
    Ok((len, path.as_ptr().cast::<c_char>()))
}

fn status(operation: &'static str, code: i32) -> Result<(), SolverError> {
    if code == 0 {
        Ok(())
    } else {
        Err(SolverError::Status { operation, code })
    }
}

impl Solver for CallbackSolver {
    #[allow(unsafe_code)]
    fn request_information(
        &mut self,
        comm: i32,
        state_file: &Path,
    ) -> Result<Vec<u8>, SolverError> {
        let bytes = state_file.as_os_str().as_encoded_bytes();
        let (len, ptr) = path_arg("request_information", bytes)?;
        let mut names = VisuCharArray::default();
        // SAFETY: callback valid per VisuReaderDef contract; `bytes` and
        // `names` outlive the call.
        let rc = unsafe { (self.request_information)(self.user_data, comm, len, ptr, &mut names) };
        status("request_information", rc)?;
        // SAFETY: the callback returned `names.len` valid bytes; copied
        // before control returns to C.
        Ok(unsafe { names.as_bytes() }.to_vec())
    }

    #[allow(unsafe_code)]
    fn produce(&mut self, comm: i32, request: &ProduceRequest<'_>) -> Result<(), SolverError> {
        let prm = request
            .parameter_override
            .map(|p| p.as_os_str().as_encoded_bytes())
            .unwrap_or_default();
        let settings = request.settings_file.as_os_str().as_encoded_bytes();
        let state = request.state_file.as_os_str().as_encoded_bytes();
        let (prm_len, prm_ptr) = path_arg("produce", prm)?;
        let (settings_len, settings_ptr) = path_arg("produce", settings)?;
        let (state_len, state_ptr) = path_arg("produce", state)?;

        let mut out = VisuSolverOutput::default();
        // SAFETY: callback valid per VisuReaderDef contract; all path
        // buffers and `out` outlive the call.
        let rc = unsafe {
            (self.produce)(
                self.user_data,
                comm,
                prm_len,
                prm_ptr,
                settings_len,
                settings_ptr,
                state_len,
                state_ptr,
                &mut out,
            )
        };
        // Whatever was filled in is released later, even on failure.
        self.output = out;
        status("produce", rc)
    }

    #[allow(unsafe_code)]
    fn output(&self) -> SolverOutput<'_> {
        let out = &self.output;
        // SAFETY: buffers stay valid until `release`, which needs `&mut self`
        // and so cannot run while the returned views are alive.
        unsafe {
            SolverOutput {
                dg: BlockBuffers {
                    coords: FlatBuffer::new(out.coords_dg.as_slice()),
                    values: FlatBuffer::new(out.values_dg.as_slice()),
                    nodeids: FlatBuffer::new(out.nodeids_dg.as_slice()),
                },
                fv: BlockBuffers {
                    coords: FlatBuffer::new(out.coords_fv.as_slice()),
                    values: FlatBuffer::new(out.values_fv.as_slice()),
                    nodeids: FlatBuffer::new(out.nodeids_fv.as_slice()),
                },
                varnames: FlatBuffer::new(out.varnames.as_bytes()),
                components: FlatBuffer::new(out.components.as_slice()),
            }
        }
    }

    #[allow(unsafe_code)]
    fn release(&mut self) {
        self.output = VisuSolverOutput::default();
        // SAFETY: callback valid per VisuReaderDef contract.
        unsafe { (self.release)(self.user_data) };
    }
}

// ── Communicator ───────────────────────────────────────────────────

pub(crate) struct CallbackCommunicator {
    rank: usize,
    size: usize,
    handle: i32,
    barrier: Option<VisuBarrierFn>,
    all_ok: Option<VisuAllOkFn>,
    user_data: *mut c_void,
}

// SAFETY: as for CallbackSolver.
#[allow(unsafe_code)]
unsafe impl Send for CallbackCommunicator {}

impl CallbackCommunicator {
    /// `None` when the topology is inconsistent or a multi-process group
    /// lacks its collectives.
    pub(crate) fn new(def: &VisuReaderDef) -> Option<Self> {
        let size = usize::try_from(def.size).ok().filter(|&s| s >= 1)?;
        let rank = usize::try_from(def.rank).ok().filter(|&r| r < size)?;
        if size > 1 && (def.barrier.is_none() || def.all_ok.is_none()) {
            return None;
        }
        Some(Self {
            rank,
            size,
            handle: def.comm_handle,
            barrier: def.barrier,
            all_ok: def.all_ok,
            user_data: def.comm_data,
        })
    }
}

impl Communicator for CallbackCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn handle(&self) -> i32 {
        self.handle
    }

    #[allow(unsafe_code)]
    fn barrier(&self) {
        if let Some(barrier) = self.barrier {
            // SAFETY: callback valid per VisuReaderDef contract.
            let rc = unsafe { barrier(self.user_data) };
            if rc != 0 {
                log::error!("[rank {}] barrier returned {rc}", self.rank);
            }
        }
    }

    #[allow(unsafe_code)]
    fn all_ok(&self, local: bool) -> bool {
        let Some(all_ok) = self.all_ok else {
            return local;
        };
        let mut global = 0;
        // SAFETY: callback valid per VisuReaderDef contract; `global`
        // outlives the call.
        let rc = unsafe { all_ok(self.user_data, i32::from(local), &mut global) };
        if rc != 0 {
            log::error!("[rank {}] all_ok returned {rc}", self.rank);
            return false;
        }
        global != 0
    }
}

// ── Time attribute ─────────────────────────────────────────────────

pub(crate) struct CallbackTimeAttribute {
    read_time: Option<VisuReadTimeFn>,
    user_data: *mut c_void,
}

// SAFETY: as for CallbackSolver.
#[allow(unsafe_code)]
unsafe impl Send for CallbackTimeAttribute {}

impl CallbackTimeAttribute {
    pub(crate) fn new(read_time: Option<VisuReadTimeFn>, user_data: *mut c_void) -> Self {
        Self {
            read_time,
            user_data,
        }
    }
}

impl TimeAttribute for CallbackTimeAttribute {
    #[allow(unsafe_code)]
    fn read_time(&self, path: &Path) -> Option<f64> {
        let read_time = self.read_time?;
        let path = CString::new(path.as_os_str().as_encoded_bytes()).ok()?;
        let mut time = 0.0;
        // SAFETY: callback valid per VisuReaderDef contract; `path` and
        // `time` outlive the call.
        let found = unsafe { read_time(self.user_data, path.as_ptr(), &mut time) };
        (found == 1).then_some(time)
    }
}
