//! Reader configuration and validation.

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

use visu_core::MeshDimension;
use visu_params::{NodeType, VisuParameters};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`ReaderConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `resolution` must be at least 1.
    InvalidResolution {
        /// The rejected value.
        value: u32,
    },
    /// The scratch directory path is empty.
    EmptyScratchDir,
    /// An override path was set but empty.
    EmptyOverride {
        /// Which override.
        setting: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidResolution { value } => {
                write!(f, "resolution must be at least 1, got {value}")
            }
            Self::EmptyScratchDir => write!(f, "scratch directory is empty"),
            Self::EmptyOverride { setting } => write!(f, "{setting} is set but empty"),
        }
    }
}

impl Error for ConfigError {}

// ── ReaderConfig ───────────────────────────────────────────────────

/// User-facing reader settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ReaderConfig {
    /// Interpolation degree. Must be at least 1.
    pub resolution: u32,
    /// Node set to interpolate onto.
    pub node_type: NodeType,
    /// 2D or 3D output.
    pub dimension: MeshDimension,
    /// Skip the FV sub-cell block.
    pub dg_only: bool,
    /// Mesh file to use instead of the one the state file references.
    /// An empty path counts as unset.
    pub mesh_override: Option<PathBuf>,
    /// Solver parameter file passed alongside the generated settings.
    pub parameter_override: Option<PathBuf>,
    /// Directory for the transient settings files.
    pub scratch_dir: PathBuf,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            resolution: 1,
            node_type: NodeType::default(),
            dimension: MeshDimension::default(),
            dg_only: false,
            mesh_override: None,
            parameter_override: None,
            scratch_dir: std::env::temp_dir(),
        }
    }
}

impl ReaderConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution < 1 {
            return Err(ConfigError::InvalidResolution {
                value: self.resolution,
            });
        }
        if self.scratch_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyScratchDir);
        }
        if self
            .parameter_override
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(ConfigError::EmptyOverride {
                setting: "parameter_override",
            });
        }
        Ok(())
    }

    /// Parameter file to hand the solver, if set.
    pub fn parameter_override(&self) -> Option<&Path> {
        self.parameter_override.as_deref()
    }

    /// Settings for one execution producing `variables`.
    pub fn to_parameters<I, S>(&self, variables: I) -> VisuParameters
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        VisuParameters {
            resolution: self.resolution,
            node_type: self.node_type,
            dimension: self.dimension,
            dg_only: self.dg_only,
            mesh_override: self.mesh_override.clone(),
            variables: variables.into_iter().map(Into::into).collect(),
        }
    }
}
