//! Settings validation and scratch-file errors.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors from building or writing solver settings.
#[derive(Debug)]
pub enum ParamsError {
    /// `NVisu` must be at least 1.
    InvalidResolution {
        /// The rejected value.
        value: u32,
    },
    /// The node-type string is not one the solver understands.
    UnknownNodeType {
        /// The rejected value.
        value: String,
    },
    /// A value would break the line-oriented format (empty, or contains a
    /// line break).
    InvalidValue {
        /// Settings key the value belongs to.
        key: &'static str,
        /// The rejected value.
        value: String,
    },
    /// The scratch file could not be created or written.
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Every candidate file name was already taken.
    NamesExhausted {
        /// Scratch directory.
        dir: PathBuf,
        /// Number of names tried.
        attempts: u32,
    },
}

impl fmt::Display for ParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidResolution { value } => {
                write!(f, "NVisu must be at least 1, got {value}")
            }
            Self::UnknownNodeType { value } => write!(f, "unknown node type '{value}'"),
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value for {key}: {value:?}")
            }
            Self::Io { path, source } => {
                write!(f, "settings file {}: {source}", path.display())
            }
            Self::NamesExhausted { dir, attempts } => write!(
                f,
                "no free settings file name in {} after {attempts} attempts",
                dir.display()
            ),
        }
    }
}

impl Error for ParamsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
