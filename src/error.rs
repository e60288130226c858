use crate::GridCoord;
use thiserror::Error;

/// Errors raised by map mutations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// Coordinate lies outside the current grid
    #[error("coordinate {coord} is outside the {width}x{height} map")]
    OutOfBounds {
        coord: GridCoord,
        width: u32,
        height: u32,
    },

    /// Another agent already uses this name
    #[error("agent name '{0}' is already in use")]
    DuplicateName(String),

    /// Agents need a non-blank name
    #[error("agent name must not be empty")]
    EmptyName,

    /// Maps need at least one row and one column
    #[error("invalid map dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Failure to reach (or understand) an external collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("{0}")]
    Network(String),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
