//! The numeral codec: payload bytes to a move sequence and back.
//!
//! Encoding reads the payload as one big integer (see [`crate::core::numeral`]) and, at every
//! ply, uses the candidate list of the live position as a radix: `digit = value mod base` picks
//! the move, `value = value div base` carries on. Decoding replays a transcript, recovers each
//! played move's index in the recomputed candidate list, and folds the `(digit, base)` pairs
//! back in reverse.
//!
//! Both directions are only inverse to each other when the [`Selector`] (strategy, filter and
//! filter parameters) and the starting position are identical.

pub mod budget;

use num_bigint::BigUint;
use shakmaty::Move;
use tracing::{debug, info};

use crate::chess::board::{normalize_fen, Board};
use crate::chess::pgn::{self, Transcript};
use crate::config::CodecConfig;
use crate::core::numeral::Numeral;
use crate::error::CodecError;
use crate::oracle::uci::UciEngine;
use crate::select::tactical::TacticalFilter;
use crate::select::{AllLegal, MoveFilter, Selector, Strategy};

use self::budget::{CodecLimits, PlyTracker};

/// One encoded digit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub digit: usize,
    pub base: usize,
    pub san: String,
}

/// Stepwise encoder over a borrowed board and selector.
pub struct Encoder<'a, F> {
    board: &'a mut Board,
    selector: &'a mut Selector<F>,
    value: Numeral,
    tracker: PlyTracker,
}

impl<'a, F: MoveFilter> Encoder<'a, F> {
    pub fn new(
        board: &'a mut Board,
        selector: &'a mut Selector<F>,
        payload: &[u8],
        limits: CodecLimits,
    ) -> Self {
        Self {
            board,
            selector,
            value: Numeral::from_payload(payload),
            tracker: PlyTracker::new(limits),
        }
    }

    /// Value still to be encoded.
    #[inline]
    pub fn remaining(&self) -> &BigUint {
        self.value.value()
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.value.is_zero()
    }

    #[inline]
    pub fn board(&self) -> &Board {
        self.board
    }

    /// Play the next digit; `Ok(None)` once the whole value has been consumed.
    pub fn step(&mut self) -> Result<Option<Step>, CodecError> {
        if self.value.is_zero() {
            return Ok(None);
        }

        let mut candidates = self.selector.candidates(self.board)?;
        let base = candidates.len();
        if base == 0 {
            return Err(CodecError::DeadEnd {
                fen: self.board.fen(),
            });
        }
        self.tracker.bump()?;

        let digit = self.value.take_digit(base);
        let mv = candidates.swap_remove(digit);
        let san = self.board.san(&mv);
        debug!(
            ply = self.board.ply_count() + 1,
            base,
            digit,
            san = %san,
            remaining_bits = self.value.bits(),
            "encode step"
        );
        self.board.push(mv);

        Ok(Some(Step { digit, base, san }))
    }

    /// Step until the value is consumed; returns the number of plies played.
    pub fn run(mut self) -> Result<usize, CodecError> {
        let mut plies = 0;
        while self.step()?.is_some() {
            plies += 1;
        }
        Ok(plies)
    }
}

/// Replay `moves` on `board` and recover the payload.
///
/// With `from_fen`, moves are skipped until the board reaches that position; digits are only
/// read from there on.
pub fn decode_moves<F: MoveFilter>(
    board: &mut Board,
    moves: &[Move],
    from_fen: Option<&str>,
    selector: &mut Selector<F>,
) -> Result<Vec<u8>, CodecError> {
    if moves.is_empty() {
        return Err(CodecError::EmptyTranscript);
    }

    let target = from_fen.map(normalize_fen).transpose()?;
    let mut started = target.is_none();
    let mut pairs: Vec<(usize, usize)> = Vec::with_capacity(moves.len());

    for (i, mv) in moves.iter().enumerate() {
        if !started && target.as_deref() == Some(board.fen().as_str()) {
            debug!(ply = i, "decode start reached");
            started = true;
        }
        if started {
            let candidates = selector.candidates(board)?;
            let digit = candidates
                .iter()
                .position(|c| c == mv)
                .ok_or_else(|| CodecError::MoveNotCandidate {
                    ply: i + 1,
                    san: board.san(mv),
                    fen: board.fen(),
                })?;
            debug!(ply = i + 1, base = candidates.len(), digit, "decode step");
            pairs.push((digit, candidates.len()));
        }
        board.push(mv.clone());
    }

    if pairs.is_empty() {
        return Err(CodecError::StartNotFound {
            fen: target.unwrap_or_default(),
        });
    }

    Numeral::from_digits(&pairs).into_payload()
}

/// Encode `payload` from `start` with a caller-provided filter.
///
/// The selector (and with it the filter and any oracle it owns) lives for this call only and is
/// dropped before the result, error or not, reaches the caller.
pub fn encode_with<F: MoveFilter>(
    payload: &[u8],
    mut start: Board,
    strategy: Strategy,
    filter: F,
    limits: CodecLimits,
) -> Result<Board, CodecError> {
    let mut selector = Selector::new(strategy, filter);
    let plies = Encoder::new(&mut start, &mut selector, payload, limits).run()?;
    info!(
        payload_bytes = payload.len(),
        plies,
        strategy = ?strategy,
        "encoded"
    );
    Ok(start)
}

/// Decode a parsed transcript with a caller-provided filter; see [`encode_with`] for ownership.
pub fn decode_with<F: MoveFilter>(
    transcript: &Transcript,
    from_fen: Option<&str>,
    strategy: Strategy,
    filter: F,
) -> Result<Vec<u8>, CodecError> {
    let mut selector = Selector::new(strategy, filter);
    let mut board = transcript.board();
    let payload = decode_moves(&mut board, &transcript.moves, from_fen, &mut selector)?;
    info!(
        plies = transcript.moves.len(),
        payload_bytes = payload.len(),
        strategy = ?strategy,
        "decoded"
    );
    Ok(payload)
}

/// Encode `payload` as configured; returns the final board (start position plus moves).
///
/// When tactical filtering is configured the engine is started here and stopped before
/// returning.
pub fn encode_payload(payload: &[u8], config: &CodecConfig) -> Result<Board, CodecError> {
    let start = Board::from_optional_fen(config.fen.as_deref())?;
    match &config.tactical {
        None => encode_with(payload, start, config.strategy, AllLegal, config.limits),
        Some(t) => {
            let engine = UciEngine::spawn(&t.engine)?;
            let filter = TacticalFilter::new(engine, t.threshold, t.depth);
            encode_with(payload, start, config.strategy, filter, config.limits)
        }
    }
}

/// [`encode_payload`] rendered as PGN.
pub fn encode_game(payload: &[u8], config: &CodecConfig) -> Result<String, CodecError> {
    encode_payload(payload, config).map(|board| pgn::write(&board))
}

/// Decode a parsed transcript as configured.
pub fn decode_transcript(
    transcript: &Transcript,
    config: &CodecConfig,
) -> Result<Vec<u8>, CodecError> {
    if transcript.moves.is_empty() {
        return Err(CodecError::EmptyTranscript);
    }
    let from_fen = config.fen.as_deref();
    match &config.tactical {
        None => decode_with(transcript, from_fen, config.strategy, AllLegal),
        Some(t) => {
            let engine = UciEngine::spawn(&t.engine)?;
            let filter = TacticalFilter::new(engine, t.threshold, t.depth);
            decode_with(transcript, from_fen, config.strategy, filter)
        }
    }
}

/// Parse PGN text and decode it as configured.
pub fn decode_game(pgn_text: &str, config: &CodecConfig) -> Result<Vec<u8>, CodecError> {
    let transcript = pgn::read(pgn_text)?;
    decode_transcript(&transcript, config)
}
