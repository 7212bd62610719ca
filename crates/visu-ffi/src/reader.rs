//! Reader lifecycle, file set, configuration, catalog and phase FFI.
//!
//! Each reader lives in its own `Arc<Mutex<_>>`, so the global `READERS`
//! table lock is only held for handle lookup and a long data phase on one
//! reader never blocks another.

use std::ffi::{c_char, CStr};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use visu_core::MeshDimension;
use visu_params::NodeType;
use visu_reader::{DataObject, ExecutionRequest, OutputInformation, Reader, ReaderConfig};

use crate::callbacks::{CallbackCommunicator, CallbackSolver, CallbackTimeAttribute, VisuReaderDef};
use crate::handle::HandleTable;
use crate::output::{copy_out, write_c_string};
use crate::status::VisuStatus;

type FfiReader = Reader<CallbackSolver, CallbackCommunicator, CallbackTimeAttribute>;

/// A reader plus the output object the host would own.
pub(crate) struct ReaderState {
    pub(crate) reader: FfiReader,
    pub(crate) output: DataObject,
}

type ReaderArc = Arc<Mutex<ReaderState>>;

static READERS: Mutex<HandleTable<ReaderArc>> = Mutex::new(HandleTable::new());

/// Clone the Arc for a reader handle, briefly locking the global table.
pub(crate) fn get_reader(handle: u64) -> Option<ReaderArc> {
    READERS.lock().ok()?.get(handle).cloned()
}

/// Borrow a NUL-terminated UTF-8 string.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string valid for `'a`.
#[allow(unsafe_code)]
unsafe fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null and NUL-terminated per caller contract.
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Null or empty means "unset".
///
/// # Safety
///
/// As for [`c_str`].
#[allow(unsafe_code)]
unsafe fn optional_path(ptr: *const c_char) -> Result<Option<PathBuf>, VisuStatus> {
    if ptr.is_null() {
        return Ok(None);
    }
    // SAFETY: forwarded.
    match unsafe { c_str(ptr) } {
        Some("") => Ok(None),
        Some(s) => Ok(Some(PathBuf::from(s))),
        None => Err(VisuStatus::InvalidArgument),
    }
}

fn update_time(has_time: i32, time: f64) -> Option<f64> {
    (has_time != 0).then_some(time)
}

// ── Lifecycle ──────────────────────────────────────────────────────

/// Create a reader from callback definitions.
///
/// On success, writes the reader handle to `reader_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_create(def: *const VisuReaderDef, reader_out: *mut u64) -> i32 {
    ffi_guard!({
        if def.is_null() || reader_out.is_null() {
            return VisuStatus::InvalidArgument as i32;
        }
        // SAFETY: def is valid per caller contract.
        let def = unsafe { &*def };

        let (Some(request_information), Some(produce), Some(release)) =
            (def.request_information, def.produce, def.release)
        else {
            return VisuStatus::InvalidArgument as i32;
        };
        let Some(comm) = CallbackCommunicator::new(def) else {
            return VisuStatus::InvalidArgument as i32;
        };
        let mut config = ReaderConfig::default();
        if !def.scratch_dir.is_null() {
            // SAFETY: non-null scratch_dir is NUL-terminated per contract.
            match unsafe { c_str(def.scratch_dir) } {
                Some(dir) => config.scratch_dir = PathBuf::from(dir),
                None => return VisuStatus::InvalidArgument as i32,
            }
        }
        if let Err(e) = config.validate() {
            return VisuStatus::from(&e) as i32;
        }

        let solver = CallbackSolver::new(request_information, produce, release, def.solver_data);
        let time = CallbackTimeAttribute::new(def.read_time, def.time_data);
        let state = ReaderState {
            reader: Reader::new(config, solver, comm, time),
            output: DataObject::multi_block(),
        };
        let handle = ffi_lock!(READERS).insert(Arc::new(Mutex::new(state)));
        // SAFETY: reader_out is valid per caller contract.
        unsafe { *reader_out = handle };
        VisuStatus::Ok as i32
    })
}

/// Destroy a reader and its output.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_destroy(reader: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(READERS).remove(reader) {
            Some(_) => VisuStatus::Ok as i32,
            None => VisuStatus::InvalidHandle as i32,
        }
    })
}

// ── File set ───────────────────────────────────────────────────────

/// Register a state file (NUL-terminated path).
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_add_file(reader: u64, path: *const c_char) -> i32 {
    ffi_guard!({
        // SAFETY: path is null or NUL-terminated per caller contract.
        let Some(path) = (unsafe { c_str(path) }).filter(|p| !p.is_empty()) else {
            return VisuStatus::InvalidArgument as i32;
        };
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        let mut state = ffi_lock!(arc);
        match state.reader.add_file(path) {
            Ok(_) => VisuStatus::Ok as i32,
            Err(e) => {
                log::warn!("cannot register {path}: {e}");
                VisuStatus::InvalidArgument as i32
            }
        }
    })
}

/// Forget every registered file.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_remove_all_files(reader: u64) -> i32 {
    ffi_guard!({
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        ffi_lock!(arc).reader.remove_all_files();
        VisuStatus::Ok as i32
    })
}

// ── Configuration ──────────────────────────────────────────────────

/// Set the interpolation degree. Values below 1 are rejected at the next
/// data phase; negative values immediately.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_set_resolution(reader: u64, resolution: i32) -> i32 {
    ffi_guard!({
        let Ok(resolution) = u32::try_from(resolution) else {
            return VisuStatus::InvalidArgument as i32;
        };
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        ffi_lock!(arc).reader.set_resolution(resolution);
        VisuStatus::Ok as i32
    })
}

/// Set the node type by solver name (`VISU`, `GAUSS`, `GAUSS-LOBATTO`,
/// `VISU_INNER`).
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_set_node_type(reader: u64, node_type: *const c_char) -> i32 {
    ffi_guard!({
        // SAFETY: node_type is null or NUL-terminated per caller contract.
        let Some(Ok(node_type)) = (unsafe { c_str(node_type) }).map(str::parse::<NodeType>) else {
            return VisuStatus::InvalidArgument as i32;
        };
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        ffi_lock!(arc).reader.set_node_type(node_type);
        VisuStatus::Ok as i32
    })
}

/// Non-zero selects 2D output.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_set_mode_2d(reader: u64, mode_2d: i32) -> i32 {
    ffi_guard!({
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        ffi_lock!(arc)
            .reader
            .set_dimension(MeshDimension::from_mode_2d(mode_2d != 0));
        VisuStatus::Ok as i32
    })
}

/// Non-zero skips the FV block.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_set_dg_only(reader: u64, dg_only: i32) -> i32 {
    ffi_guard!({
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        ffi_lock!(arc).reader.set_dg_only(dg_only != 0);
        VisuStatus::Ok as i32
    })
}

/// Mesh file override. Null or empty clears it.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_set_mesh_file(reader: u64, path: *const c_char) -> i32 {
    ffi_guard!({
        // SAFETY: path is null or NUL-terminated per caller contract.
        let path = match unsafe { optional_path(path) } {
            Ok(path) => path,
            Err(status) => return status as i32,
        };
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        ffi_lock!(arc).reader.set_mesh_override(path);
        VisuStatus::Ok as i32
    })
}

/// Solver parameter file passed alongside the settings. Null or empty
/// clears it.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_set_parameter_file(reader: u64, path: *const c_char) -> i32 {
    ffi_guard!({
        // SAFETY: path is null or NUL-terminated per caller contract.
        let path = match unsafe { optional_path(path) } {
            Ok(path) => path,
            Err(status) => return status as i32,
        };
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        ffi_lock!(arc).reader.set_parameter_override(path);
        VisuStatus::Ok as i32
    })
}

// ── Catalog ────────────────────────────────────────────────────────

/// Number of known variables.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_var_count(reader: u64, count_out: *mut u64) -> i32 {
    ffi_guard!({
        if count_out.is_null() {
            return VisuStatus::InvalidArgument as i32;
        }
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        let count = ffi_lock!(arc).reader.catalog().count() as u64;
        // SAFETY: count_out is valid per caller contract.
        unsafe { *count_out = count };
        VisuStatus::Ok as i32
    })
}

/// Copy the name of variable `index` into `buf` (NUL-terminated).
///
/// `len_out` (nullable) receives the name length without the NUL.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_var_name(
    reader: u64,
    index: u64,
    buf: *mut c_char,
    cap: usize,
    len_out: *mut usize,
) -> i32 {
    ffi_guard!({
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        let state = ffi_lock!(arc);
        let Ok(index) = usize::try_from(index) else {
            return VisuStatus::InvalidArgument as i32;
        };
        match state.reader.catalog().name_at(index) {
            // SAFETY: buf/len_out valid for cap bytes per caller contract.
            Ok(name) => unsafe { write_c_string(name, buf, cap, len_out) as i32 },
            Err(_) => VisuStatus::InvalidArgument as i32,
        }
    })
}

/// Status of a variable: 1 enabled, 0 disabled or unknown.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_var_status_get(
    reader: u64,
    name: *const c_char,
    enabled_out: *mut i32,
) -> i32 {
    ffi_guard!({
        if enabled_out.is_null() {
            return VisuStatus::InvalidArgument as i32;
        }
        // SAFETY: name is null or NUL-terminated per caller contract.
        let Some(name) = (unsafe { c_str(name) }) else {
            return VisuStatus::InvalidArgument as i32;
        };
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        let enabled = ffi_lock!(arc).reader.catalog().is_enabled(name);
        // SAFETY: enabled_out is valid per caller contract.
        unsafe { *enabled_out = i32::from(enabled) };
        VisuStatus::Ok as i32
    })
}

/// Enable (non-zero) or disable a variable, adding it if unknown.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_var_status_set(reader: u64, name: *const c_char, enabled: i32) -> i32 {
    ffi_guard!({
        // SAFETY: name is null or NUL-terminated per caller contract.
        let Some(name) = (unsafe { c_str(name) }).filter(|n| !n.is_empty()) else {
            return VisuStatus::InvalidArgument as i32;
        };
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        ffi_lock!(arc)
            .reader
            .catalog_mut()
            .set_enabled(name, enabled != 0);
        VisuStatus::Ok as i32
    })
}

/// Enable every variable.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_enable_all_vars(reader: u64) -> i32 {
    ffi_guard!({
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        ffi_lock!(arc).reader.catalog_mut().enable_all();
        VisuStatus::Ok as i32
    })
}

/// Disable every variable.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_disable_all_vars(reader: u64) -> i32 {
    ffi_guard!({
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        ffi_lock!(arc).reader.catalog_mut().disable_all();
        VisuStatus::Ok as i32
    })
}

// ── Phases ─────────────────────────────────────────────────────────

/// Discovery phase.
///
/// Timestamps are copied to `steps_out` (capacity `steps_cap`, may be null
/// when 0); `n_steps_out` (nullable) receives the count. `range_out`
/// (nullable) receives `[min, max]`. Time information is written even when
/// discovery fails; a short `steps_out` yields `BUFFER_TOO_SMALL` after a
/// successful discovery.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_request_information(
    reader: u64,
    steps_out: *mut f64,
    steps_cap: usize,
    n_steps_out: *mut usize,
    range_out: *mut f64,
) -> i32 {
    ffi_guard!({
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        let mut state = ffi_lock!(arc);
        let mut info = OutputInformation::default();
        let phase = state.reader.request_information(&mut info);

        // SAFETY: output pointers valid per caller contract.
        let copied = unsafe { copy_out(&info.time_steps, steps_out, steps_cap, n_steps_out) };
        if let (false, Some((lo, hi))) = (range_out.is_null(), info.time_range) {
            // SAFETY: range_out points to two doubles per caller contract.
            unsafe {
                *range_out = lo;
                *range_out.add(1) = hi;
            }
        }
        match phase {
            Err(e) => VisuStatus::from(&e) as i32,
            Ok(_) => copied as i32,
        }
    })
}

/// Execution phase for the timestep nearest to `time` (or the first one
/// when `has_time` is 0). Results are read with `visu_reader_block_*`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_request_data(reader: u64, has_time: i32, time: f64) -> i32 {
    ffi_guard!({
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        let mut state = ffi_lock!(arc);
        let request = ExecutionRequest {
            update_time: update_time(has_time, time),
        };
        let ReaderState { reader, output } = &mut *state;
        match reader.request_data(&request, output) {
            Ok(_) => VisuStatus::Ok as i32,
            Err(e) => VisuStatus::from(&e) as i32,
        }
    })
}

/// Writes 1 to `needed_out` if a data phase is required for `time`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_needs_execution(
    reader: u64,
    has_time: i32,
    time: f64,
    needed_out: *mut i32,
) -> i32 {
    ffi_guard!({
        if needed_out.is_null() {
            return VisuStatus::InvalidArgument as i32;
        }
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        let needed = ffi_lock!(arc)
            .reader
            .needs_execution(update_time(has_time, time));
        // SAFETY: needed_out is valid per caller contract.
        unsafe { *needed_out = i32::from(needed) };
        VisuStatus::Ok as i32
    })
}
