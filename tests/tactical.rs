use std::cell::Cell;
use std::rc::Rc;

use chess_stego::chess::board::{Board, STANDARD_FEN};
use chess_stego::chess::pgn;
use chess_stego::codec::budget::CodecLimits;
use chess_stego::codec::{decode_with, encode_with};
use chess_stego::error::CodecError;
use chess_stego::oracle::{Oracle, RankedMove, Score};
use chess_stego::select::tactical::{within_window, TacticalFilter};
use chess_stego::select::{MoveFilter, Strategy};

/// Deterministic stand-in for an engine: scores each move from its SAN bytes.
struct ScriptedOracle {
    calls: usize,
    released: Rc<Cell<bool>>,
}

impl ScriptedOracle {
    fn new() -> (Self, Rc<Cell<bool>>) {
        let released = Rc::new(Cell::new(false));
        let oracle = Self {
            calls: 0,
            released: Rc::clone(&released),
        };
        (oracle, released)
    }
}

fn pseudo_score(san: &str) -> i32 {
    san.bytes().fold(0i32, |acc, b| (acc * 31 + i32::from(b)) % 211) - 105
}

impl Oracle for ScriptedOracle {
    fn evaluate(&mut self, board: &Board, _depth: u32) -> Result<Vec<RankedMove>, CodecError> {
        self.calls += 1;
        let mut ranked: Vec<RankedMove> = board
            .legal_moves()
            .into_iter()
            .map(|mv| {
                let score = Score::Cp(pseudo_score(&board.san(&mv)));
                RankedMove { mv, score }
            })
            .collect();
        ranked.sort_by_key(|r| match r.score {
            Score::Cp(cp) => -cp,
            Score::Mate(_) => i32::MIN,
        });
        Ok(ranked)
    }
}

impl Drop for ScriptedOracle {
    fn drop(&mut self) {
        self.released.set(true);
    }
}

/// Oracle returning one fixed score list for the initial position.
struct FixedOracle(Vec<Score>);

impl Oracle for FixedOracle {
    fn evaluate(&mut self, board: &Board, _depth: u32) -> Result<Vec<RankedMove>, CodecError> {
        Ok(board
            .legal_moves()
            .into_iter()
            .zip(self.0.iter().copied())
            .map(|(mv, score)| RankedMove { mv, score })
            .collect())
    }
}

fn ranked(scores: &[Score]) -> Vec<RankedMove> {
    Board::default()
        .legal_moves()
        .into_iter()
        .zip(scores.iter().copied())
        .map(|(mv, score)| RankedMove { mv, score })
        .collect()
}

#[test]
fn window_is_strict() {
    let r = ranked(&[
        Score::Cp(30),
        Score::Cp(0),
        Score::Cp(-19),
        Score::Cp(-20),
        Score::Cp(-21),
    ]);
    let kept = within_window(&r, 50);
    let expected: Vec<_> = r[..3].iter().map(|x| x.mv.clone()).collect();
    assert_eq!(kept, expected);
}

#[test]
fn numeric_best_drops_mate_scores() {
    let r = ranked(&[Score::Cp(10), Score::Mate(-3), Score::Cp(5)]);
    assert_eq!(within_window(&r, 50), vec![r[0].mv.clone(), r[2].mv.clone()]);
}

#[test]
fn mate_best_keeps_only_mates_of_the_same_sign() {
    let r = ranked(&[
        Score::Mate(2),
        Score::Mate(5),
        Score::Cp(900),
        Score::Mate(-1),
    ]);
    assert_eq!(within_window(&r, 0), vec![r[0].mv.clone(), r[1].mv.clone()]);

    let losing = ranked(&[Score::Mate(-4), Score::Mate(-2), Score::Cp(-900)]);
    assert_eq!(
        within_window(&losing, 50),
        vec![losing[0].mv.clone(), losing[1].mv.clone()]
    );
}

#[test]
fn zero_score_is_a_valid_best() {
    let r = ranked(&[Score::Cp(0), Score::Cp(-10), Score::Cp(-80)]);
    assert_eq!(within_window(&r, 50).len(), 2);
}

#[test]
fn zero_threshold_admits_nothing() {
    let mut filter = TacticalFilter::new(FixedOracle(vec![Score::Cp(0); 20]), 0, 4);
    match filter.admissible(&Board::default()) {
        Err(CodecError::NoMoveUnderThreshold { threshold, fen }) => {
            assert_eq!(threshold, 0);
            assert_eq!(fen, STANDARD_FEN);
        }
        other => panic!("expected NoMoveUnderThreshold, got {other:?}"),
    }
}

#[test]
fn oracle_is_released_when_encoding_fails() {
    let (oracle, released) = ScriptedOracle::new();
    let filter = TacticalFilter::new(oracle, 0, 6);
    let result = encode_with(
        b"abc",
        Board::default(),
        Strategy::Exhaustive,
        filter,
        CodecLimits::default(),
    );
    assert!(matches!(result, Err(CodecError::NoMoveUnderThreshold { .. })));
    assert!(released.get());
}

#[test]
fn filtered_games_round_trip() {
    let payload = b"only sensible moves";
    for strategy in [Strategy::Exhaustive, Strategy::EntropyCompressed] {
        let (oracle, released) = ScriptedOracle::new();
        let board = encode_with(
            payload,
            Board::default(),
            strategy,
            TacticalFilter::new(oracle, 50, 6),
            CodecLimits::default(),
        )
        .unwrap();
        assert!(released.get());

        let transcript = pgn::read(&pgn::write(&board)).unwrap();
        let (oracle, _) = ScriptedOracle::new();
        let back = decode_with(
            &transcript,
            None,
            strategy,
            TacticalFilter::new(oracle, 50, 6),
        )
        .unwrap();
        assert_eq!(back, payload, "{strategy:?}");
    }
}

#[test]
fn filter_consults_the_oracle_once_per_ply() {
    let (mut oracle, _) = ScriptedOracle::new();
    let board = encode_with(
        b"count",
        Board::default(),
        Strategy::Exhaustive,
        TacticalFilter::new(&mut oracle, 50, 6),
        CodecLimits::default(),
    )
    .unwrap();
    assert_eq!(oracle.calls, board.ply_count());
}

#[test]
fn stalemated_start_is_a_dead_end_not_a_threshold_miss() {
    let start = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1";
    let (mut oracle, _) = ScriptedOracle::new();
    let result = encode_with(
        b"x",
        Board::from_fen(start).unwrap(),
        Strategy::Exhaustive,
        TacticalFilter::new(&mut oracle, 50, 6),
        CodecLimits::default(),
    );
    match result {
        Err(CodecError::DeadEnd { fen }) => assert_eq!(fen, start),
        other => panic!("expected DeadEnd, got {other:?}"),
    }
    assert_eq!(oracle.calls, 0);
}

#[test]
fn forced_mate_under_the_filter_then_dead_end() {
    // Rxa3# is the only move; EntropyCompressed keeps it, then Black has no reply.
    let (oracle, _) = ScriptedOracle::new();
    let result = encode_with(
        b"x",
        Board::from_fen("kr6/1p6/8/8/8/r2n4/R2n4/K7 w - - 0 1").unwrap(),
        Strategy::EntropyCompressed,
        TacticalFilter::new(oracle, 50, 6),
        CodecLimits::default(),
    );
    assert!(
        matches!(result, Err(CodecError::DeadEnd { .. })),
        "{result:?}"
    );
}
