//! Standard chess through `shakmaty`: the live board and its PGN transcript.

pub mod board;
pub mod pgn;
