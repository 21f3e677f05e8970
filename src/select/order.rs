//! Canonical ordering and the two digit strategies.
//!
//! The canonical order is byte-wise lexicographic order of each move's SAN (with `+`/`#`) at the
//! current position. SAN is unique among the legal moves of a position, so this is a total order,
//! and it can be recomputed from a transcript alone.

use shakmaty::Move;

use crate::chess::board::Board;

/// Sort `moves` by SAN at the current position.
pub fn canonical(board: &Board, moves: Vec<Move>) -> Vec<Move> {
    let mut keyed: Vec<(String, Move)> = moves.into_iter().map(|m| (board.san(&m), m)).collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, m)| m).collect()
}

/// True if playing `m` leaves the opponent without a legal reply (checkmate or stalemate).
pub fn leads_to_dead_end(board: &mut Board, m: &Move) -> bool {
    board.try_move(m).is_dead_end()
}

/// Number of legal replies after `m`.
pub fn branching_factor(board: &mut Board, m: &Move) -> usize {
    board.try_move(m).legal_move_count()
}

/// Canonical order, without moves that end the game.
pub fn exhaustive(board: &mut Board, moves: Vec<Move>) -> Vec<Move> {
    canonical(board, moves)
        .into_iter()
        .filter(|m| !leads_to_dead_end(board, m))
        .collect()
}

/// Canonical order, keeping only moves whose share of the total branching is at least 90% of the
/// average share.
///
/// With `w = bf / total` and `mean(w) = 1 / n`, the drop condition `w < 0.9 * mean(w)` is
/// evaluated exactly as `10 * bf * n < 9 * total`. Moves into terminal positions have `bf = 0`
/// and fall below the cutoff whenever anything else has replies; if nothing does, the whole list
/// is kept.
pub fn entropy_compressed(board: &mut Board, moves: Vec<Move>) -> Vec<Move> {
    let weighted: Vec<(Move, usize)> = canonical(board, moves)
        .into_iter()
        .map(|m| {
            let bf = branching_factor(board, &m);
            (m, bf)
        })
        .collect();

    let total: usize = weighted.iter().map(|(_, bf)| bf).sum();
    if total == 0 {
        return weighted.into_iter().map(|(m, _)| m).collect();
    }

    let n = weighted.len();
    weighted
        .into_iter()
        .filter(|&(_, bf)| 10 * bf * n >= 9 * total)
        .map(|(m, _)| m)
        .collect()
}
