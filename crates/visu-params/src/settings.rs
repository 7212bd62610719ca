//! The settings handed to the solver for one data-production call.

use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

use visu_core::MeshDimension;

use crate::error::ParamsError;
use crate::node_type::NodeType;

/// Visualization settings for one execution.
#[derive(Clone, Debug, PartialEq)]
pub struct VisuParameters {
    /// Interpolation degree `NVisu`. Must be at least 1.
    pub resolution: u32,
    /// Node set to interpolate onto.
    pub node_type: NodeType,
    /// 2D or 3D output.
    pub dimension: MeshDimension,
    /// Skip the FV sub-cell representation.
    pub dg_only: bool,
    /// Mesh file to use instead of the one referenced by the state file.
    pub mesh_override: Option<PathBuf>,
    /// Variables to produce, in catalog order.
    pub variables: Vec<String>,
}

impl Default for VisuParameters {
    fn default() -> Self {
        Self {
            resolution: 1,
            node_type: NodeType::default(),
            dimension: MeshDimension::default(),
            dg_only: false,
            mesh_override: None,
            variables: Vec::new(),
        }
    }
}

impl VisuParameters {
    /// Check every value can be written as one `key = value` line.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.resolution < 1 {
            return Err(ParamsError::InvalidResolution {
                value: self.resolution,
            });
        }
        if let Some(mesh) = self.mesh_override() {
            check_line("MeshFile", &mesh)?;
        }
        for name in &self.variables {
            if name.trim().is_empty() {
                return Err(ParamsError::InvalidValue {
                    key: "VarName",
                    value: name.clone(),
                });
            }
            check_line("VarName", name)?;
        }
        Ok(())
    }

    /// The mesh override as written, or `None` when unset or empty.
    fn mesh_override(&self) -> Option<String> {
        self.mesh_override
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
    }

    /// Write the settings lines.
    ///
    /// Does not validate; [`ParameterFile`](crate::ParameterFile) validates
    /// before creating anything on disk.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write!(w, "{self}")
    }

    /// The settings as a string, exactly as they would be written to disk.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for VisuParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NVisu = {}", self.resolution)?;
        writeln!(f, "NodeTypeVisu = {}", self.node_type)?;
        writeln!(f, "VisuDimension = {}", self.dimension.as_setting())?;
        writeln!(f, "DGonly = {}", if self.dg_only { "T" } else { "F" })?;
        if let Some(mesh) = self.mesh_override() {
            writeln!(f, "MeshFile = {mesh}")?;
        }
        for name in &self.variables {
            writeln!(f, "VarName = {name}")?;
        }
        Ok(())
    }
}

fn check_line(key: &'static str, value: &str) -> Result<(), ParamsError> {
    if value.contains(['\n', '\r']) {
        return Err(ParamsError::InvalidValue {
            key,
            value: value.to_owned(),
        });
    }
    Ok(())
}
