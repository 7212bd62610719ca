//! `repr(C)` buffer descriptors exchanged with the solver callbacks.
//!
//! Lengths are `i32` element counts, matching the solver's Fortran-side
//! integer kind. A null `data` pointer or a non-positive `len` reads as
//! empty.

use std::ffi::c_char;

/// Solver-owned array of doubles.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct VisuDoubleArray {
    /// Element count.
    pub len: i32,
    /// First element.
    pub data: *const f64,
}

/// Solver-owned array of 32-bit integers.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct VisuIntArray {
    /// Element count.
    pub len: i32,
    /// First element.
    pub data: *const i32,
}

/// Solver-owned array of characters (not NUL terminated).
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct VisuCharArray {
    /// Byte count.
    pub len: i32,
    /// First byte.
    pub data: *const c_char,
}

macro_rules! empty_array {
    ($($ty:ty),*) => {$(
        impl Default for $ty {
            fn default() -> Self {
                Self {
                    len: 0,
                    data: std::ptr::null(),
                }
            }
        }
    )*};
}

empty_array!(VisuDoubleArray, VisuIntArray, VisuCharArray);

/// Everything one `produce` callback hands back.
///
/// The callback fills this struct; the arrays must stay valid until the
/// matching `release` callback.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct VisuSolverOutput {
    /// DG point coordinates.
    pub coords_dg: VisuDoubleArray,
    /// DG variable values.
    pub values_dg: VisuDoubleArray,
    /// DG connectivity.
    pub nodeids_dg: VisuIntArray,
    /// FV point coordinates.
    pub coords_fv: VisuDoubleArray,
    /// FV variable values.
    pub values_fv: VisuDoubleArray,
    /// FV connectivity.
    pub nodeids_fv: VisuIntArray,
    /// Packed 255-byte variable names.
    pub varnames: VisuCharArray,
    /// Components per variable.
    pub components: VisuIntArray,
}

/// View `len` elements at `data`.
///
/// # Safety
///
/// Unless `data` is null or `len <= 0`, `data` must point to `len`
/// initialized elements that stay valid and unmodified for `'a`.
#[allow(unsafe_code)]
pub(crate) unsafe fn raw_slice<'a, T>(data: *const T, len: i32) -> &'a [T] {
    match usize::try_from(len) {
        Ok(n) if n > 0 && !data.is_null() => {
            // SAFETY: non-null and `n` elements valid per caller contract.
            unsafe { std::slice::from_raw_parts(data, n) }
        }
        _ => &[],
    }
}

impl VisuDoubleArray {
    /// # Safety
    ///
    /// See [`raw_slice`].
    #[allow(unsafe_code)]
    pub(crate) unsafe fn as_slice<'a>(self) -> &'a [f64] {
        // SAFETY: forwarded.
        unsafe { raw_slice(self.data, self.len) }
    }
}

impl VisuIntArray {
    /// # Safety
    ///
    /// See [`raw_slice`].
    #[allow(unsafe_code)]
    pub(crate) unsafe fn as_slice<'a>(self) -> &'a [i32] {
        // SAFETY: forwarded.
        unsafe { raw_slice(self.data, self.len) }
    }
}

impl VisuCharArray {
    /// # Safety
    ///
    /// See [`raw_slice`].
    #[allow(unsafe_code)]
    pub(crate) unsafe fn as_bytes<'a>(self) -> &'a [u8] {
        // SAFETY: forwarded; c_char and u8 share size and alignment.
        unsafe { raw_slice(self.data.cast::<u8>(), self.len) }
    }
}
