//! Synchronous UCI client over a child process.
//!
//! One [`UciEngine`] lives for exactly one encode/decode operation. Dropping it sends `quit` and
//! reaps the child; if the pipe is already broken the child is killed instead.

use std::collections::{BTreeMap, HashMap};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use shakmaty::{CastlingMode, Move};
use tracing::{debug, trace, warn};

use crate::chess::board::Board;
use crate::error::CodecError;
use crate::oracle::{Oracle, RankedMove, Score};

pub struct UciEngine {
    path: PathBuf,
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    name: Option<String>,
    multipv: usize,
}

impl UciEngine {
    /// Start the engine and complete the `uci`/`isready` handshake.
    pub fn spawn(path: &Path) -> Result<Self, CodecError> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| CodecError::OracleSpawn {
                path: path.to_path_buf(),
                source,
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(CodecError::OracleProtocol(
                "engine pipes unavailable".to_string(),
            ));
        };

        // From here on Drop owns the child.
        let mut engine = Self {
            path: path.to_path_buf(),
            child,
            stdin,
            stdout: BufReader::new(stdout),
            name: None,
            multipv: 1,
        };

        engine.send("uci")?;
        loop {
            let line = engine.read_line()?;
            if let Some(name) = line.strip_prefix("id name ") {
                engine.name = Some(name.trim().to_string());
            }
            if line.trim() == "uciok" {
                break;
            }
        }
        engine.sync()?;

        debug!(
            path = %engine.path.display(),
            name = engine.name.as_deref().unwrap_or("?"),
            pid = engine.child.id(),
            "engine ready"
        );
        Ok(engine)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn send(&mut self, line: &str) -> Result<(), CodecError> {
        trace!(">> {line}");
        writeln!(self.stdin, "{line}").map_err(CodecError::OracleIo)?;
        self.stdin.flush().map_err(CodecError::OracleIo)
    }

    fn read_line(&mut self) -> Result<String, CodecError> {
        let mut line = String::new();
        let n = self
            .stdout
            .read_line(&mut line)
            .map_err(CodecError::OracleIo)?;
        if n == 0 {
            return Err(CodecError::OracleProtocol(format!(
                "{} closed its output",
                self.path.display()
            )));
        }
        let line = line.trim_end().to_string();
        trace!("<< {line}");
        Ok(line)
    }

    fn sync(&mut self) -> Result<(), CodecError> {
        self.send("isready")?;
        while self.read_line()?.trim() != "readyok" {}
        Ok(())
    }

    fn set_multipv(&mut self, n: usize) -> Result<(), CodecError> {
        if n != self.multipv {
            self.send(&format!("setoption name MultiPV value {n}"))?;
            self.multipv = n;
        }
        Ok(())
    }
}

impl Oracle for UciEngine {
    fn evaluate(&mut self, board: &Board, depth: u32) -> Result<Vec<RankedMove>, CodecError> {
        let legal = board.legal_moves();
        if legal.is_empty() {
            return Ok(Vec::new());
        }
        let by_uci: HashMap<String, Move> = legal
            .into_iter()
            .map(|m| (m.to_uci(CastlingMode::Standard).to_string(), m))
            .collect();

        // Fresh hash per search: the ranking must depend on the position only.
        self.set_multipv(by_uci.len())?;
        self.send("ucinewgame")?;
        self.sync()?;
        self.send(&format!("position fen {}", board.fen()))?;
        self.send(&format!("go depth {depth}"))?;

        // Later lines for the same multipv slot come from deeper iterations and replace earlier
        // ones.
        let mut slots: BTreeMap<usize, (Score, String)> = BTreeMap::new();
        loop {
            let line = self.read_line()?;
            if line.starts_with("bestmove") {
                break;
            }
            if let Some(info) = parse_info(&line) {
                slots.insert(info.multipv, (info.score, info.first_move));
            }
        }

        let mut ranked = Vec::with_capacity(slots.len());
        for (_, (score, uci)) in slots {
            match by_uci.get(&uci) {
                Some(m) => ranked.push(RankedMove {
                    mv: m.clone(),
                    score,
                }),
                None => warn!(uci = %uci, fen = %board.fen(), "engine ranked a move that is not legal"),
            }
        }
        Ok(ranked)
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        let quit = writeln!(self.stdin, "quit").and_then(|()| self.stdin.flush());
        if quit.is_err() {
            let _ = self.child.kill();
        }
        match self.child.wait() {
            Ok(status) => debug!(path = %self.path.display(), %status, "engine released"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to reap engine"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InfoLine {
    multipv: usize,
    score: Score,
    first_move: String,
}

/// Extract `(multipv, score, first pv move)` from an `info` line.
///
/// Bound-only scores (`lowerbound`/`upperbound`) and lines without a pv are skipped.
fn parse_info(line: &str) -> Option<InfoLine> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "info" {
        return None;
    }

    let mut multipv = 1usize;
    let mut score = None;
    let mut first_move = None;
    while let Some(tok) = tokens.next() {
        match tok {
            "string" => return None,
            "multipv" => multipv = tokens.next()?.parse().ok()?,
            "score" => {
                let kind = tokens.next()?;
                let value: i32 = tokens.next()?.parse().ok()?;
                score = Some(match kind {
                    "cp" => Score::Cp(value),
                    "mate" => Score::Mate(value),
                    _ => return None,
                });
            }
            "lowerbound" | "upperbound" => return None,
            "pv" => {
                first_move = tokens.next().map(str::to_string);
                break;
            }
            _ => {}
        }
    }

    Some(InfoLine {
        multipv,
        score: score?,
        first_move: first_move?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_centipawn_and_mate_lines() {
        let cp = parse_info(
            "info depth 6 seldepth 8 multipv 3 score cp -41 nodes 1234 nps 1 pv g1f3 d7d5 c2c4",
        )
        .unwrap();
        assert_eq!(cp.multipv, 3);
        assert_eq!(cp.score, Score::Cp(-41));
        assert_eq!(cp.first_move, "g1f3");

        let mate = parse_info("info depth 4 score mate 2 pv d1h5 g7g6").unwrap();
        assert_eq!(mate.multipv, 1);
        assert_eq!(mate.score, Score::Mate(2));
    }

    #[test]
    fn skips_bounds_strings_and_pvless_lines() {
        assert!(parse_info("info depth 6 multipv 1 score cp 20 lowerbound pv e2e4").is_none());
        assert!(parse_info("info string NNUE evaluation enabled").is_none());
        assert!(parse_info("info depth 6 currmove e2e4 currmovenumber 1").is_none());
        assert!(parse_info("bestmove e2e4 ponder e7e5").is_none());
    }
}
