//! Transcript serialization in portable game notation.
//!
//! The writer emits the seven-tag roster, `SetUp`/`FEN` tags for non-standard starts, and
//! numbered movetext wrapped at 80 columns. The reader accepts the first game of its input and
//! skips comments, NAGs, variations and annotation glyphs.

use shakmaty::san::SanPlus;
use shakmaty::{Chess, Color, Move, Position};

use crate::chess::board::{parse_fen, render_fen, Board, STANDARD_FEN};
use crate::error::CodecError;

const LINE_WIDTH: usize = 80;

/// A parsed game: its start position and the mainline moves, already resolved to legal moves.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub headers: Vec<(String, String)>,
    pub start: Chess,
    pub moves: Vec<Move>,
}

impl Transcript {
    /// A board at the transcript's start, with no moves played.
    pub fn board(&self) -> Board {
        Board::new(self.start.clone())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Render the game played on `board` (start position plus every pushed move).
pub fn write(board: &Board) -> String {
    let result = board
        .position()
        .outcome()
        .map_or_else(|| "*".to_string(), |o| o.to_string());

    let mut out = String::new();
    for (name, value) in [
        ("Event", "?"),
        ("Site", "?"),
        ("Date", "????.??.??"),
        ("Round", "?"),
        ("White", "?"),
        ("Black", "?"),
        ("Result", result.as_str()),
    ] {
        push_tag(&mut out, name, value);
    }
    let start_fen = board.start_fen();
    if start_fen != STANDARD_FEN {
        push_tag(&mut out, "SetUp", "1");
        push_tag(&mut out, "FEN", &start_fen);
    }
    out.push('\n');

    let mut tokens: Vec<String> = Vec::with_capacity(board.ply_count() * 3 / 2 + 1);
    let mut scratch = board.start().clone();
    let mut first = true;
    for m in board.moves() {
        let number = scratch.fullmoves().get();
        match scratch.turn() {
            Color::White => tokens.push(format!("{number}.")),
            Color::Black if first => tokens.push(format!("{number}...")),
            Color::Black => {}
        }
        first = false;
        tokens.push(SanPlus::from_move_and_play_unchecked(&mut scratch, m).to_string());
    }
    tokens.push(result);

    let mut line_len = 0;
    for tok in tokens {
        if line_len > 0 && line_len + 1 + tok.len() > LINE_WIDTH {
            out.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            out.push(' ');
            line_len += 1;
        }
        out.push_str(&tok);
        line_len += tok.len();
    }
    out.push('\n');
    out
}

fn push_tag(out: &mut String, name: &str, value: &str) {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    out.push_str(&format!("[{name} \"{escaped}\"]\n"));
}

/// Parse the first game of `text`.
pub fn read(text: &str) -> Result<Transcript, CodecError> {
    let mut headers: Vec<(String, String)> = Vec::new();
    let mut sans: Vec<String> = Vec::new();

    let mut chars = text.chars().peekable();
    let mut in_movetext = false;
    let mut depth = 0usize;

    while let Some(&c) = chars.peek() {
        match c {
            '[' if depth == 0 => {
                if in_movetext {
                    // next game's tag section
                    break;
                }
                chars.next();
                let mut raw = String::new();
                let mut escaped = false;
                let mut in_quotes = false;
                for ch in chars.by_ref() {
                    if escaped {
                        raw.push(ch);
                        escaped = false;
                        continue;
                    }
                    match ch {
                        '\\' if in_quotes => {
                            raw.push(ch);
                            escaped = true;
                        }
                        '"' => {
                            in_quotes = !in_quotes;
                            raw.push(ch);
                        }
                        ']' if !in_quotes => break,
                        _ => raw.push(ch),
                    }
                }
                headers.push(parse_tag(&raw)?);
            }
            '{' => {
                for ch in chars.by_ref() {
                    if ch == '}' {
                        break;
                    }
                }
            }
            ';' => {
                for ch in chars.by_ref() {
                    if ch == '\n' {
                        break;
                    }
                }
            }
            '(' => {
                chars.next();
                depth += 1;
            }
            ')' => {
                chars.next();
                depth = depth.checked_sub(1).ok_or_else(|| CodecError::Pgn {
                    reason: "unbalanced ')' in movetext".to_string(),
                })?;
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            _ => {
                let mut tok = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_whitespace() || matches!(ch, '{' | '}' | '(' | ')' | ';' | '[') {
                        break;
                    }
                    tok.push(ch);
                    chars.next();
                }
                if tok.is_empty() {
                    // stray '}' or ']'
                    chars.next();
                    continue;
                }
                in_movetext = true;
                if depth > 0 {
                    continue;
                }
                if is_result(&tok) {
                    break;
                }
                if let Some(san) = movetext_san(&tok) {
                    sans.push(castling_with_letters(san));
                }
            }
        }
    }

    let start = match headers.iter().find(|(k, _)| k == "FEN") {
        Some((_, fen)) => parse_fen(fen)?,
        None => Chess::default(),
    };

    let mut pos = start.clone();
    let mut moves = Vec::with_capacity(sans.len());
    for (i, token) in sans.iter().enumerate() {
        let san: SanPlus = token.parse().map_err(|_| CodecError::Pgn {
            reason: format!("unreadable move {token:?} at ply {}", i + 1),
        })?;
        let m = san.san.to_move(&pos).map_err(|_| CodecError::Pgn {
            reason: format!(
                "illegal move {token:?} at ply {} in {}",
                i + 1,
                render_fen(&pos)
            ),
        })?;
        pos.play_unchecked(&m);
        moves.push(m);
    }

    Ok(Transcript {
        headers,
        start,
        moves,
    })
}

fn parse_tag(raw: &str) -> Result<(String, String), CodecError> {
    let raw = raw.trim();
    let (name, rest) = raw.split_once(char::is_whitespace).ok_or_else(|| CodecError::Pgn {
        reason: format!("malformed tag [{raw}]"),
    })?;
    let rest = rest.trim();
    let inner = rest
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .ok_or_else(|| CodecError::Pgn {
            reason: format!("tag {name} has an unquoted value"),
        })?;

    let mut value = String::with_capacity(inner.len());
    let mut escaped = false;
    for ch in inner.chars() {
        if escaped {
            value.push(ch);
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else {
            value.push(ch);
        }
    }
    Ok((name.to_string(), value))
}

fn is_result(tok: &str) -> bool {
    matches!(tok, "1-0" | "0-1" | "1/2-1/2" | "*")
}

/// Strip move numbers and annotation glyphs; `None` for tokens that carry no move.
fn movetext_san(tok: &str) -> Option<&str> {
    if tok.starts_with('$') {
        return None;
    }
    // "12." / "12..." / "12.e4"
    let tok = if tok.starts_with(|c: char| c.is_ascii_digit()) {
        match tok.rfind('.') {
            Some(i) => &tok[i + 1..],
            None => tok,
        }
    } else {
        tok
    };
    let tok = tok.trim_end_matches(['!', '?']);
    if tok.is_empty() {
        None
    } else {
        Some(tok)
    }
}

/// Rewrite `0-0`/`0-0-0` (digit zero, common in exported games) to the letter spelling.
fn castling_with_letters(san: &str) -> String {
    for (digits, letters) in [("0-0-0", "O-O-O"), ("0-0", "O-O")] {
        if let Some(suffix) = san.strip_prefix(digits) {
            if suffix.is_empty() || suffix == "+" || suffix == "#" {
                return format!("{letters}{suffix}");
            }
        }
    }
    san.to_string()
}
