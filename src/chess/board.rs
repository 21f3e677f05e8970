//! The live position an operation walks.
//!
//! [`Board`] wraps a `shakmaty::Chess` together with the configuration it started from and the
//! stack of moves played since. The codec holds exactly one `Board` per operation and mutates it
//! through `&mut` only:
//!
//! - [`Board::push`] applies a move permanently (encode/decode traversal),
//! - [`Board::try_move`] applies a move speculatively; the returned guard undoes it on drop, so
//!   lookahead (terminal checks, branching factors) cannot leak a move on any exit path.

use std::ops::Deref;

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position};

use crate::error::CodecError;

/// FEN of the standard initial position, as rendered by [`Board::fen`].
pub const STANDARD_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone)]
struct Played {
    before: Chess,
    mv: Move,
}

#[derive(Debug, Clone)]
pub struct Board {
    start: Chess,
    current: Chess,
    history: Vec<Played>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(Chess::default())
    }
}

impl Board {
    pub fn new(start: Chess) -> Self {
        Self {
            current: start.clone(),
            start,
            history: Vec::new(),
        }
    }

    /// Parse a FEN into a fresh board. Castling rights use standard (non-960) notation.
    pub fn from_fen(fen: &str) -> Result<Self, CodecError> {
        Ok(Self::new(parse_fen(fen)?))
    }

    /// `from_fen` when a FEN is given, the standard initial position otherwise.
    pub fn from_optional_fen(fen: Option<&str>) -> Result<Self, CodecError> {
        match fen {
            Some(f) => Self::from_fen(f),
            None => Ok(Self::default()),
        }
    }

    #[inline]
    pub fn position(&self) -> &Chess {
        &self.current
    }

    #[inline]
    pub fn start(&self) -> &Chess {
        &self.start
    }

    pub fn fen(&self) -> String {
        render_fen(&self.current)
    }

    pub fn start_fen(&self) -> String {
        render_fen(&self.start)
    }

    /// Moves played since the start, oldest first.
    pub fn moves(&self) -> impl Iterator<Item = &Move> + '_ {
        self.history.iter().map(|p| &p.mv)
    }

    #[inline]
    pub fn ply_count(&self) -> usize {
        self.history.len()
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.current.legal_moves().into_iter().collect()
    }

    #[inline]
    pub fn legal_move_count(&self) -> usize {
        self.current.legal_moves().len()
    }

    #[inline]
    pub fn is_checkmate(&self) -> bool {
        self.current.is_checkmate()
    }

    /// Checkmate, stalemate, or any other position without a legal reply.
    #[inline]
    pub fn is_dead_end(&self) -> bool {
        self.current.is_checkmate() || self.legal_move_count() == 0
    }

    /// SAN of `m` at the current position, including the `+`/`#` suffix.
    ///
    /// This is the canonical label used to order candidate moves.
    pub fn san(&self, m: &Move) -> String {
        let mut scratch = self.current.clone();
        SanPlus::from_move_and_play_unchecked(&mut scratch, m).to_string()
    }

    /// Apply a legal move permanently.
    pub fn push(&mut self, m: Move) {
        let before = self.current.clone();
        self.current.play_unchecked(&m);
        self.history.push(Played { before, mv: m });
    }

    /// Undo the most recent move.
    pub fn pop(&mut self) -> Option<Move> {
        let played = self.history.pop()?;
        self.current = played.before;
        Some(played.mv)
    }

    /// Apply `m` for the lifetime of the returned guard.
    pub fn try_move(&mut self, m: &Move) -> Tried<'_> {
        self.push(m.clone());
        Tried { board: self }
    }
}

/// A move applied speculatively; dropping the guard takes it back.
pub struct Tried<'a> {
    board: &'a mut Board,
}

impl Deref for Tried<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl Drop for Tried<'_> {
    fn drop(&mut self) {
        self.board.pop();
    }
}

pub fn parse_fen(fen: &str) -> Result<Chess, CodecError> {
    let parsed: Fen = fen.trim().parse().map_err(|e| CodecError::InvalidFen {
        fen: fen.to_string(),
        reason: format!("{e}"),
    })?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| CodecError::InvalidFen {
            fen: fen.to_string(),
            reason: format!("{e}"),
        })
}

/// Canonical FEN: the en passant square is only shown when a legal capture exists.
pub fn render_fen(pos: &Chess) -> String {
    Fen::from_position(pos.clone(), EnPassantMode::Legal).to_string()
}

/// Parse then re-render, so caller-supplied FENs compare equal to [`Board::fen`] output.
pub fn normalize_fen(fen: &str) -> Result<String, CodecError> {
    parse_fen(fen).map(|pos| render_fen(&pos))
}
