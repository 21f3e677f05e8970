use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::budget::CodecLimits;
use crate::select::tactical::{DEFAULT_DEPTH, DEFAULT_THRESHOLD};
use crate::select::Strategy;

fn default_depth() -> u32 {
    DEFAULT_DEPTH
}

fn default_threshold() -> i32 {
    DEFAULT_THRESHOLD
}

/// Oracle-backed filtering: which engine to run and how strict the window is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticalConfig {
    /// Path to a UCI engine executable.
    pub engine: PathBuf,
    #[serde(default = "default_depth")]
    pub depth: u32,
    /// Centipawns.
    #[serde(default = "default_threshold")]
    pub threshold: i32,
}

impl TacticalConfig {
    pub fn new(engine: impl Into<PathBuf>) -> Self {
        Self {
            engine: engine.into(),
            depth: DEFAULT_DEPTH,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Everything both directions must agree on, plus the encode budget.
///
/// Encode and decode only round-trip when `strategy`, `tactical` (engine, depth, threshold) and
/// the starting position match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub strategy: Strategy,
    /// Encode: starting position. Decode: position from which extraction starts.
    pub fen: Option<String>,
    pub tactical: Option<TacticalConfig>,
    pub limits: CodecLimits,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl CodecConfig {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_fen(mut self, fen: impl Into<String>) -> Self {
        self.fen = Some(fen.into());
        self
    }

    pub fn with_tactical(mut self, tactical: TacticalConfig) -> Self {
        self.tactical = Some(tactical);
        self
    }

    pub fn with_limits(mut self, limits: CodecLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}
