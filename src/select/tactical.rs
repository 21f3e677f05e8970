//! Oracle-backed move filter: only moves that a search at `depth` rates close to the best one.

use shakmaty::Move;
use tracing::debug;

use crate::chess::board::Board;
use crate::error::CodecError;
use crate::oracle::{Oracle, RankedMove, Score};
use crate::select::MoveFilter;

/// Default search depth handed to the oracle.
pub const DEFAULT_DEPTH: u32 = 6;
/// Default window, in centipawns, around the best evaluation.
pub const DEFAULT_THRESHOLD: i32 = 50;

#[derive(Debug)]
pub struct TacticalFilter<O> {
    oracle: O,
    threshold: i32,
    depth: u32,
}

impl<O: Oracle> TacticalFilter<O> {
    pub fn new(oracle: O, threshold: i32, depth: u32) -> Self {
        Self {
            oracle,
            threshold,
            depth,
        }
    }

    #[inline]
    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }
}

impl<O: Oracle> MoveFilter for TacticalFilter<O> {
    fn admissible(&mut self, board: &Board) -> Result<Vec<Move>, CodecError> {
        // No legal move is a dead end, not a threshold problem; let the caller report it.
        if board.legal_move_count() == 0 {
            return Ok(Vec::new());
        }
        let ranked = self.oracle.evaluate(board, self.depth)?;
        let kept = within_window(&ranked, self.threshold);
        debug!(
            ply = board.ply_count(),
            ranked = ranked.len(),
            kept = kept.len(),
            "tactical filter"
        );
        if kept.is_empty() {
            return Err(CodecError::NoMoveUnderThreshold {
                threshold: self.threshold,
                fen: board.fen(),
            });
        }
        Ok(kept)
    }
}

/// Moves of `ranked` (best first) that stay within `threshold` of the best evaluation.
///
/// - Numeric best: keep numeric scores with `|best - score| < threshold`; mate scores are
///   dropped.
/// - Mate best: keep only mate scores of the same sign, regardless of `threshold`.
pub fn within_window(ranked: &[RankedMove], threshold: i32) -> Vec<Move> {
    let Some(best) = ranked.first() else {
        return Vec::new();
    };

    ranked
        .iter()
        .filter(|r| match (best.score, r.score) {
            (Score::Cp(b), Score::Cp(s)) => (i64::from(b) - i64::from(s)).abs() < i64::from(threshold),
            (Score::Mate(b), Score::Mate(s)) => b.signum() == s.signum(),
            _ => false,
        })
        .map(|r| r.mv.clone())
        .collect()
}
