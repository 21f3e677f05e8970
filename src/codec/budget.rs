//! Ply budget for the encode loop.
//!
//! Every step with `base >= 2` strictly shrinks the remaining value, but a forced move
//! (`base == 1`) consumes nothing. The budget turns an unbounded run of forced moves into a
//! [`CodecError::LimitExceeded`] instead of a hang.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecLimits {
    /// Maximum number of plies a single encode may play.
    pub max_plies: u64,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self { max_plies: 100_000 }
    }
}

#[derive(Debug, Clone)]
pub struct PlyTracker {
    limits: CodecLimits,
    plies: u64,
}

impl PlyTracker {
    #[inline]
    pub fn new(limits: CodecLimits) -> Self {
        Self { limits, plies: 0 }
    }

    #[inline]
    pub fn plies(&self) -> u64 {
        self.plies
    }

    pub fn bump(&mut self) -> Result<(), CodecError> {
        self.plies = self.plies.saturating_add(1);
        if self.plies > self.limits.max_plies {
            return Err(CodecError::LimitExceeded {
                metric: "plies",
                limit: self.limits.max_plies,
                observed: self.plies,
            });
        }
        Ok(())
    }
}
