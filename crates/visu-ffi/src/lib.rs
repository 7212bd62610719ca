//! C ABI for the visu solver-output reader.
//!
//! A host written in C or C++ registers its solver, communicator and time
//! source as callbacks in a [`VisuReaderDef`], receives an opaque `u64`
//! handle, and drives the two reader phases through `visu_reader_*`
//! functions. Every entry point returns a [`VisuStatus`] code and catches
//! panics before they reach the caller.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run `$body` (which evaluates to an `i32` status), mapping a panic to
/// `VisuStatus::Panicked`.
macro_rules! ffi_guard {
    ($body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| -> i32 { $body })) {
            Ok(code) => code,
            Err(_) => {
                log::error!("panic caught at the C boundary");
                $crate::status::VisuStatus::Panicked as i32
            }
        }
    };
}

/// Lock a mutex or return `VisuStatus::InternalError` from the enclosing
/// closure if it is poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::VisuStatus::InternalError as i32,
        }
    };
}

pub mod callbacks;
mod handle;
pub mod logging;
pub mod output;
pub mod reader;
pub mod status;
pub mod types;

pub use callbacks::VisuReaderDef;
pub use status::VisuStatus;
pub use types::{VisuCharArray, VisuDoubleArray, VisuIntArray, VisuSolverOutput};
