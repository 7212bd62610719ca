//! Read access to the blocks of the last data phase.
//!
//! Block indices follow the multi-block layout: 0 is DG, 1 is FV. Array
//! getters follow one convention: `n_out` (nullable) always receives the
//! element count, and `BUFFER_TOO_SMALL` is returned without copying when
//! `cap` is short, so a call with `cap == 0` is a size query.

use std::ffi::c_char;

use visu_mesh::{FieldArray, MeshBlock};
use visu_reader::BlockKind;

use crate::reader::{get_reader, ReaderState};
use crate::status::VisuStatus;

/// Copy `src` to `out` if it fits.
///
/// # Safety
///
/// `n_out` must be null or writable; `out` must be null or valid for `cap`
/// writes.
#[allow(unsafe_code)]
pub(crate) unsafe fn copy_out<T: Copy>(
    src: &[T],
    out: *mut T,
    cap: usize,
    n_out: *mut usize,
) -> VisuStatus {
    if !n_out.is_null() {
        // SAFETY: writable per caller contract.
        unsafe { *n_out = src.len() };
    }
    if src.is_empty() {
        return VisuStatus::Ok;
    }
    if cap < src.len() {
        return VisuStatus::BufferTooSmall;
    }
    if out.is_null() {
        return VisuStatus::InvalidArgument;
    }
    // SAFETY: `out` holds at least `src.len()` elements and cannot overlap
    // a Rust-owned slice.
    unsafe { std::ptr::copy_nonoverlapping(src.as_ptr(), out, src.len()) };
    VisuStatus::Ok
}

/// Copy `s` plus a terminating NUL to `buf`.
///
/// # Safety
///
/// As for [`copy_out`], with `cap` counting the NUL.
#[allow(unsafe_code)]
pub(crate) unsafe fn write_c_string(
    s: &str,
    buf: *mut c_char,
    cap: usize,
    len_out: *mut usize,
) -> VisuStatus {
    if !len_out.is_null() {
        // SAFETY: writable per caller contract.
        unsafe { *len_out = s.len() };
    }
    if cap <= s.len() {
        return VisuStatus::BufferTooSmall;
    }
    if buf.is_null() {
        return VisuStatus::InvalidArgument;
    }
    // SAFETY: `buf` holds at least `s.len() + 1` bytes.
    unsafe {
        std::ptr::copy_nonoverlapping(s.as_ptr().cast::<c_char>(), buf, s.len());
        *buf.add(s.len()) = 0;
    }
    VisuStatus::Ok
}

fn block(state: &ReaderState, block: i32) -> Result<&MeshBlock, VisuStatus> {
    let kind = usize::try_from(block)
        .ok()
        .and_then(BlockKind::from_index)
        .ok_or(VisuStatus::InvalidArgument)?;
    state
        .output
        .as_multi_block()
        .and_then(|mb| mb.get(kind))
        .ok_or(VisuStatus::NotAvailable)
}

fn field(state: &ReaderState, block_index: i32, index: u64) -> Result<&FieldArray, VisuStatus> {
    let mesh = block(state, block_index)?;
    usize::try_from(index)
        .ok()
        .and_then(|i| mesh.field_at(i))
        .ok_or(VisuStatus::InvalidArgument)
}

/// Point, cell and field counts of a block, plus the vertices per cell.
///
/// Every output pointer is nullable. Returns `NOT_AVAILABLE` when the block
/// was not produced.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_block_info(
    reader: u64,
    block_index: i32,
    n_points_out: *mut u64,
    n_cells_out: *mut u64,
    cell_arity_out: *mut i32,
    n_fields_out: *mut u64,
) -> i32 {
    ffi_guard!({
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        let state = ffi_lock!(arc);
        let mesh = match block(&state, block_index) {
            Ok(mesh) => mesh,
            Err(status) => return status as i32,
        };
        // SAFETY: each pointer is null or writable per caller contract.
        unsafe {
            if !n_points_out.is_null() {
                *n_points_out = mesh.n_points() as u64;
            }
            if !n_cells_out.is_null() {
                *n_cells_out = mesh.n_cells() as u64;
            }
            if !cell_arity_out.is_null() {
                *cell_arity_out = mesh.kind().arity() as i32;
            }
            if !n_fields_out.is_null() {
                *n_fields_out = mesh.n_fields() as u64;
            }
        }
        VisuStatus::Ok as i32
    })
}

/// Point coordinates as `x, y, z` triples (`3 * n_points` doubles).
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_block_points(
    reader: u64,
    block_index: i32,
    out: *mut f64,
    cap: usize,
    n_out: *mut usize,
) -> i32 {
    ffi_guard!({
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        let state = ffi_lock!(arc);
        match block(&state, block_index) {
            // SAFETY: output pointers valid per caller contract.
            Ok(mesh) => unsafe { copy_out(mesh.points().as_flattened(), out, cap, n_out) as i32 },
            Err(status) => status as i32,
        }
    })
}

/// Zero-based cell connectivity, `arity` entries per cell.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_block_connectivity(
    reader: u64,
    block_index: i32,
    out: *mut u32,
    cap: usize,
    n_out: *mut usize,
) -> i32 {
    ffi_guard!({
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        let state = ffi_lock!(arc);
        match block(&state, block_index) {
            // SAFETY: output pointers valid per caller contract.
            Ok(mesh) => unsafe { copy_out(mesh.connectivity(), out, cap, n_out) as i32 },
            Err(status) => status as i32,
        }
    })
}

/// Name, component count and tuple count of field `index`.
///
/// The name is written NUL-terminated; `name_len_out`, `components_out`
/// and `tuples_out` are nullable. The counts are written even when
/// `name_cap` is too small.
#[no_mangle]
#[allow(unsafe_code)]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn visu_reader_field_info(
    reader: u64,
    block_index: i32,
    index: u64,
    name_buf: *mut c_char,
    name_cap: usize,
    name_len_out: *mut usize,
    components_out: *mut i32,
    tuples_out: *mut u64,
) -> i32 {
    ffi_guard!({
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        let state = ffi_lock!(arc);
        let field = match field(&state, block_index, index) {
            Ok(field) => field,
            Err(status) => return status as i32,
        };
        // SAFETY: each pointer is null or writable per caller contract.
        unsafe {
            if !components_out.is_null() {
                *components_out = field.components() as i32;
            }
            if !tuples_out.is_null() {
                *tuples_out = field.tuple_count() as u64;
            }
            write_c_string(field.name(), name_buf, name_cap, name_len_out) as i32
        }
    })
}

/// Field values, `components` doubles per tuple.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn visu_reader_field_values(
    reader: u64,
    block_index: i32,
    index: u64,
    out: *mut f64,
    cap: usize,
    n_out: *mut usize,
) -> i32 {
    ffi_guard!({
        let Some(arc) = get_reader(reader) else {
            return VisuStatus::InvalidHandle as i32;
        };
        let state = ffi_lock!(arc);
        match field(&state, block_index, index) {
            // SAFETY: output pointers valid per caller contract.
            Ok(field) => unsafe { copy_out(field.values(), out, cap, n_out) as i32 },
            Err(status) => status as i32,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(unsafe_code)]
    fn copy_out_reports_length_before_capacity_check() {
        let src = [1.0, 2.0, 3.0];
        let mut n = 0usize;
        // SAFETY: null `out` with zero capacity is never written.
        let status = unsafe { copy_out(&src, std::ptr::null_mut(), 0, &mut n) };
        assert_eq!(status, VisuStatus::BufferTooSmall);
        assert_eq!(n, 3);

        let mut buf = [0.0; 4];
        // SAFETY: `buf` has room for 4 doubles.
        let status = unsafe { copy_out(&src, buf.as_mut_ptr(), buf.len(), &mut n) };
        assert_eq!(status, VisuStatus::Ok);
        assert_eq!(&buf[..3], &src);
    }

    #[test]
    #[allow(unsafe_code)]
    fn c_string_needs_room_for_nul() {
        let mut buf = [0x7f as c_char; 8];
        let mut len = 0usize;
        // SAFETY: `buf` has room for 8 bytes.
        let status = unsafe { write_c_string("Density", buf.as_mut_ptr(), 7, &mut len) };
        assert_eq!(status, VisuStatus::BufferTooSmall);
        assert_eq!(len, 7);
        // SAFETY: as above.
        let status = unsafe { write_c_string("Density", buf.as_mut_ptr(), 8, &mut len) };
        assert_eq!(status, VisuStatus::Ok);
        assert_eq!(buf[7], 0);
        assert_eq!(buf[0] as u8, b'D');
    }
}
