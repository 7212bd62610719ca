//! C-compatible status codes.
//!
//! [`VisuStatus`] is a `repr(i32)` enum; `Ok` is 0 and every error is
//! negative. Conversions from the reader's error types are provided.

use visu_params::ParamsError;
use visu_reader::{ConfigError, PhaseError};

/// C-compatible status code returned by all FFI functions.
///
/// Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisuStatus {
    /// Success.
    Ok = 0,
    /// Handle is invalid or was already destroyed.
    InvalidHandle = -1,
    /// An argument is null, out of range, or otherwise invalid.
    InvalidArgument = -2,
    /// Caller-provided buffer is too small; the required size was written.
    BufferTooSmall = -3,
    /// Configuration validation error.
    ConfigError = -4,
    /// Local setup failed (working directory, scratch file).
    SetupFailed = -5,
    /// The solver returned inconsistent buffers.
    ValidationFailed = -6,
    /// The solver reported a failure.
    SolverFailed = -7,
    /// The output object is not a multi-block container.
    OutputType = -8,
    /// No state file is registered.
    NoFiles = -9,
    /// A peer process failed its setup.
    PeerFailed = -10,
    /// The requested block or array holds no data.
    NotAvailable = -11,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -20,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&ConfigError> for VisuStatus {
    fn from(_e: &ConfigError) -> Self {
        VisuStatus::ConfigError
    }
}

impl From<&ParamsError> for VisuStatus {
    fn from(e: &ParamsError) -> Self {
        match e {
            ParamsError::Io { .. } | ParamsError::NamesExhausted { .. } => VisuStatus::SetupFailed,
            ParamsError::InvalidResolution { .. }
            | ParamsError::UnknownNodeType { .. }
            | ParamsError::InvalidValue { .. } => VisuStatus::ConfigError,
        }
    }
}

impl From<&PhaseError> for VisuStatus {
    fn from(e: &PhaseError) -> Self {
        match e {
            PhaseError::NoFiles => VisuStatus::NoFiles,
            PhaseError::Config(e) => VisuStatus::from(e),
            PhaseError::ChangeDirectory { .. } => VisuStatus::SetupFailed,
            PhaseError::Params(e) => VisuStatus::from(e),
            PhaseError::PeerFailed => VisuStatus::PeerFailed,
            PhaseError::Solver(_) => VisuStatus::SolverFailed,
            PhaseError::Names(_) | PhaseError::Validation { .. } => VisuStatus::ValidationFailed,
            PhaseError::OutputType { .. } => VisuStatus::OutputType,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visu_core::MarshalError;
    use visu_reader::{BlockKind, SolverError};

    #[test]
    fn status_code_values_are_stable() {
        assert_eq!(VisuStatus::Ok as i32, 0);
        assert_eq!(VisuStatus::InvalidHandle as i32, -1);
        assert_eq!(VisuStatus::InvalidArgument as i32, -2);
        assert_eq!(VisuStatus::BufferTooSmall as i32, -3);
        assert_eq!(VisuStatus::ConfigError as i32, -4);
        assert_eq!(VisuStatus::SetupFailed as i32, -5);
        assert_eq!(VisuStatus::ValidationFailed as i32, -6);
        assert_eq!(VisuStatus::SolverFailed as i32, -7);
        assert_eq!(VisuStatus::OutputType as i32, -8);
        assert_eq!(VisuStatus::NoFiles as i32, -9);
        assert_eq!(VisuStatus::PeerFailed as i32, -10);
        assert_eq!(VisuStatus::NotAvailable as i32, -11);
        assert_eq!(VisuStatus::InternalError as i32, -20);
        assert_eq!(VisuStatus::Panicked as i32, -128);
    }

    #[test]
    fn phase_error_to_status() {
        assert_eq!(VisuStatus::from(&PhaseError::NoFiles), VisuStatus::NoFiles);
        assert_eq!(
            VisuStatus::from(&PhaseError::Config(ConfigError::EmptyScratchDir)),
            VisuStatus::ConfigError
        );
        assert_eq!(
            VisuStatus::from(&PhaseError::Params(ParamsError::InvalidResolution { value: 0 })),
            VisuStatus::ConfigError
        );
        assert_eq!(
            VisuStatus::from(&PhaseError::Solver(SolverError::Status {
                operation: "produce",
                code: 2
            })),
            VisuStatus::SolverFailed
        );
        assert_eq!(
            VisuStatus::from(&PhaseError::Validation {
                block: BlockKind::Dg,
                source: MarshalError::CoordsNotTriples { len: 2 },
            }),
            VisuStatus::ValidationFailed
        );
        assert_eq!(
            VisuStatus::from(&PhaseError::OutputType { found: "None" }),
            VisuStatus::OutputType
        );
        assert_eq!(VisuStatus::from(&PhaseError::PeerFailed), VisuStatus::PeerFailed);
    }
}
