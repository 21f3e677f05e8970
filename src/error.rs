//! Error taxonomy shared by every stage of an encode/decode operation.
//!
//! All variants are fatal to the operation that raised them: there are no partial results and
//! nothing is retried. Variants that stop at a concrete position carry its FEN so the caller can
//! pick a different start or a looser threshold.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    /// No candidate move exists at a position while payload digits remain.
    #[error(
        "impossible to encode the payload from this starting position, no candidate move left \
         (FEN of last position: {fen})"
    )]
    DeadEnd { fen: String },

    /// The tactical window excluded every legal move.
    #[error(
        "no move within {threshold} centipawns of the best move, try a higher threshold \
         (FEN of last position: {fen})"
    )]
    NoMoveUnderThreshold { threshold: i32, fen: String },

    #[error("the transcript contains no moves")]
    EmptyTranscript,

    #[error("starting position {fen} was not found in the transcript")]
    StartNotFound { fen: String },

    /// A played move is absent from the recomputed candidate list (strategy or filter mismatch).
    #[error("move {san} at ply {ply} is not a candidate in {fen}")]
    MoveNotCandidate { ply: usize, san: String, fen: String },

    #[error("decoded value does not carry the 0x01 sentinel byte")]
    MissingSentinel,

    #[error("invalid FEN {fen:?}: {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("invalid PGN: {reason}")]
    Pgn { reason: String },

    #[error("failed to start engine {}: {source}", path.display())]
    OracleSpawn { path: PathBuf, source: io::Error },

    #[error("engine I/O failed: {0}")]
    OracleIo(#[source] io::Error),

    #[error("engine protocol error: {0}")]
    OracleProtocol(String),

    /// The encode ply budget ran out.
    #[error("{metric} limit exceeded: observed {observed} > limit {limit}")]
    LimitExceeded {
        metric: &'static str,
        limit: u64,
        observed: u64,
    },
}
