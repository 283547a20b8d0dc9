//! Error types for generation, grid access, configuration, and sessions.

use std::io;

use thiserror::Error;

use crate::types::ZoneId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("zone {zone:?} room graph stayed disconnected after {attempts} forced doorways")]
    ConnectivityUnresolved { zone: ZoneId, attempts: u32 },
    #[error("no valid {what} location in zone {zone:?}")]
    PlacementImpossible { what: &'static str, zone: ZoneId },
    #[error("seed {seed} could not produce a valid level in {attempts} attempts")]
    RegenerationExhausted { seed: u64, attempts: u32 },
}

impl GenerationError {
    /// Whether a fresh seed may fix the failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ConnectivityUnresolved { .. } | Self::PlacementImpossible { .. })
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("tile ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds { x: i32, y: i32, width: usize, height: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}
