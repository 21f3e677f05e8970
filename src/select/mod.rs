//! Candidate-list computation: which moves act as digits at a position, and in which order.
//!
//! A [`Selector`] bundles
//! - a [`MoveFilter`] deciding which legal moves are admissible at all ([`AllLegal`] or the
//!   oracle-backed [`tactical::TacticalFilter`]), and
//! - a [`Strategy`] turning the admissible moves into one canonical, possibly pruned, sequence.
//!
//! The resulting list must be exactly reproducible from the position and the selector's
//! parameters alone: encode and decode both recompute it at every ply and never cache it.

pub mod order;
pub mod tactical;

use serde::{Deserialize, Serialize};
use shakmaty::Move;
use tracing::trace;

use crate::chess::board::Board;
use crate::error::CodecError;

/// How admissible moves become digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Every admissible move that does not end the game.
    #[default]
    Exhaustive,
    /// Admissible moves whose branching factor is not far below average.
    EntropyCompressed,
}

impl Strategy {
    /// Order (and prune) `moves` at the current position of `board`.
    pub fn order(self, board: &mut Board, moves: Vec<Move>) -> Vec<Move> {
        match self {
            Strategy::Exhaustive => order::exhaustive(board, moves),
            Strategy::EntropyCompressed => order::entropy_compressed(board, moves),
        }
    }
}

/// Pre-ordering restriction of the legal moves.
pub trait MoveFilter {
    /// Admissible moves at the current position, in no particular order.
    fn admissible(&mut self, board: &Board) -> Result<Vec<Move>, CodecError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AllLegal;

impl MoveFilter for AllLegal {
    #[inline]
    fn admissible(&mut self, board: &Board) -> Result<Vec<Move>, CodecError> {
        Ok(board.legal_moves())
    }
}

#[derive(Debug, Clone)]
pub struct Selector<F> {
    strategy: Strategy,
    filter: F,
}

impl<F: MoveFilter> Selector<F> {
    pub fn new(strategy: Strategy, filter: F) -> Self {
        Self { strategy, filter }
    }

    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// The ordered candidate list at the board's current position; its length is the radix.
    pub fn candidates(&mut self, board: &mut Board) -> Result<Vec<Move>, CodecError> {
        let admissible = self.filter.admissible(board)?;
        let n_admissible = admissible.len();
        let ordered = self.strategy.order(board, admissible);
        trace!(
            ply = board.ply_count(),
            admissible = n_admissible,
            base = ordered.len(),
            "candidates"
        );
        Ok(ordered)
    }
}
