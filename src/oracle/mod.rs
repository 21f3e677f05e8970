//! Move-quality oracles.
//!
//! An oracle ranks every legal move of a position at a fixed search depth. The tactical filter
//! only compares scores against the best one, so the point of view a score is expressed in does
//! not matter as long as it is the same for all moves of one call.

pub mod uci;

use shakmaty::Move;

use crate::chess::board::Board;
use crate::error::CodecError;

/// Evaluation of one move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Centipawns.
    Cp(i32),
    /// Forced mate in this many moves; negative when the mover gets mated.
    Mate(i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedMove {
    pub mv: Move,
    pub score: Score,
}

/// A blocking evaluator, acquired once per operation and released on drop.
pub trait Oracle {
    /// Rank the legal moves of the current position, best first.
    fn evaluate(&mut self, board: &Board, depth: u32) -> Result<Vec<RankedMove>, CodecError>;
}

impl<O: Oracle + ?Sized> Oracle for &mut O {
    fn evaluate(&mut self, board: &Board, depth: u32) -> Result<Vec<RankedMove>, CodecError> {
        (**self).evaluate(board, depth)
    }
}
