//! Interpolation node sets offered for visualization.

use std::fmt;
use std::str::FromStr;

use crate::error::ParamsError;

/// Node distribution the solver interpolates onto before output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Equidistant visualization nodes including the element boundary.
    #[default]
    Visu,
    /// Gauss nodes.
    Gauss,
    /// Gauss-Lobatto nodes.
    GaussLobatto,
    /// Equidistant nodes strictly inside the element.
    VisuInner,
}

impl NodeType {
    /// Every node type, in the order the host lists them.
    pub const ALL: [NodeType; 4] = [
        NodeType::Visu,
        NodeType::Gauss,
        NodeType::GaussLobatto,
        NodeType::VisuInner,
    ];

    /// Solver-facing name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visu => "VISU",
            Self::Gauss => "GAUSS",
            Self::GaussLobatto => "GAUSS-LOBATTO",
            Self::VisuInner => "VISU_INNER",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| ParamsError::UnknownNodeType {
                value: s.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for t in NodeType::ALL {
            assert_eq!(t.as_str().parse::<NodeType>().unwrap(), t);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "LEGENDRE".parse::<NodeType>().unwrap_err();
        assert!(matches!(err, ParamsError::UnknownNodeType { .. }));
    }
}
