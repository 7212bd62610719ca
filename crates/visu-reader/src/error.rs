//! Errors of the two reader phases.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use visu_core::MarshalError;
use visu_params::ParamsError;

use crate::config::ConfigError;
use crate::output::BlockKind;
use crate::solver::SolverError;

/// Why a discovery or execution phase failed.
///
/// Setup errors happen before the solver is called, validation errors after
/// it returned inconsistent buffers.
#[derive(Debug)]
pub enum PhaseError {
    /// No state file is registered.
    NoFiles,
    /// The reader configuration is invalid.
    Config(ConfigError),
    /// Could not change into the state file's directory.
    ChangeDirectory {
        /// Target directory.
        dir: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The settings file could not be written.
    Params(ParamsError),
    /// Another process failed its local setup; the collective step was
    /// skipped everywhere.
    PeerFailed,
    /// The solver reported a failure.
    Solver(SolverError),
    /// The solver's variable list is malformed.
    Names(MarshalError),
    /// The host's output object is not a multi-block container.
    OutputType {
        /// What the host provided.
        found: &'static str,
    },
    /// A block's buffers were inconsistent; that block was cleared.
    Validation {
        /// The failed block.
        block: BlockKind,
        /// What was wrong.
        source: MarshalError,
    },
}

impl PhaseError {
    /// Failed before the solver was invoked.
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            Self::NoFiles | Self::Config(_) | Self::ChangeDirectory { .. } | Self::Params(_)
        )
    }

    /// The solver's output was rejected.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Names(_) | Self::Validation { .. })
    }
}

impl fmt::Display for PhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFiles => write!(f, "no state file registered"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::ChangeDirectory { dir, source } => {
                write!(f, "cannot change directory to {}: {source}", dir.display())
            }
            Self::Params(e) => write!(f, "settings: {e}"),
            Self::PeerFailed => write!(f, "a peer process failed its setup"),
            Self::Solver(e) => write!(f, "{e}"),
            Self::Names(e) => write!(f, "variable list: {e}"),
            Self::OutputType { found } => {
                write!(f, "output is {found}, expected MultiBlockDataSet")
            }
            Self::Validation { block, source } => write!(f, "{block} block: {source}"),
        }
    }
}

impl Error for PhaseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::ChangeDirectory { source, .. } => Some(source),
            Self::Params(e) => Some(e),
            Self::Solver(e) => Some(e),
            Self::Names(e) => Some(e),
            Self::Validation { source, .. } => Some(source),
            Self::NoFiles | Self::PeerFailed | Self::OutputType { .. } => None,
        }
    }
}

impl From<ConfigError> for PhaseError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ParamsError> for PhaseError {
    fn from(e: ParamsError) -> Self {
        Self::Params(e)
    }
}

impl From<SolverError> for PhaseError {
    fn from(e: SolverError) -> Self {
        Self::Solver(e)
    }
}
