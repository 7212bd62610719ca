//! 2D/3D visualization mode.

/// Dimensionality of the visualized mesh.
///
/// Selects both the `VisuDimension` setting handed to the solver and the
/// cell topology used to rebuild connectivity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MeshDimension {
    /// Quadrilateral cells, 4 vertices each.
    Two,
    /// Hexahedral cells, 8 vertices each.
    #[default]
    Three,
}

impl MeshDimension {
    /// Map the host's "2D mode" checkbox onto a dimension.
    pub fn from_mode_2d(mode_2d: bool) -> Self {
        if mode_2d {
            Self::Two
        } else {
            Self::Three
        }
    }

    /// Value written for the `VisuDimension` key.
    pub fn as_setting(self) -> &'static str {
        match self {
            Self::Two => "2",
            Self::Three => "3",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkbox_selects_dimension() {
        assert_eq!(MeshDimension::from_mode_2d(true), MeshDimension::Two);
        assert_eq!(MeshDimension::from_mode_2d(false), MeshDimension::Three);
    }

    #[test]
    fn setting_strings() {
        assert_eq!(MeshDimension::Two.as_setting(), "2");
        assert_eq!(MeshDimension::Three.as_setting(), "3");
        assert_eq!(MeshDimension::default().as_setting(), "3");
    }
}
