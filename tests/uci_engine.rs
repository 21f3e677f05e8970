#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chess_stego::chess::board::Board;
use chess_stego::error::CodecError;
use chess_stego::oracle::uci::UciEngine;
use chess_stego::oracle::{Oracle, Score};

/// Logs every command to `engine.log` next to itself; answers a search with two iterations.
const ITERATING_ENGINE: &str = r#"#!/bin/sh
log="$(dirname "$0")/engine.log"
while IFS= read -r line; do
  echo "$line" >> "$log"
  case "$line" in
    uci) echo "id name Scripted Engine"; echo "uciok" ;;
    isready) echo "readyok" ;;
    go*)
      echo "info string warming up"
      echo "info depth 1 multipv 1 score cp 10 pv e2e4 e7e5"
      echo "info depth 1 multipv 2 score cp 5 pv d2d4"
      echo "info depth 2 multipv 1 score cp 30 pv g1f3 d7d5"
      echo "info depth 2 multipv 2 score cp 20 pv d2d4 d7d5"
      echo "info depth 2 multipv 3 score cp 0 pv e2e5"
      echo "bestmove g1f3"
      ;;
    quit) exit 0 ;;
  esac
done
"#;

/// Completes the handshake, then dies as soon as it is asked to search.
const CRASHING_ENGINE: &str = r#"#!/bin/sh
while IFS= read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) exit 3 ;;
  esac
done
"#;

fn write_engine(dir: &Path, name: &str, script: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Spawn, retrying while another test's fork still holds the fresh script open for writing.
fn spawn(path: &Path) -> Result<UciEngine, CodecError> {
    for _ in 0..20 {
        match UciEngine::spawn(path) {
            Err(CodecError::OracleSpawn { source, .. }) if source.raw_os_error() == Some(26) => {
                thread::sleep(Duration::from_millis(50));
            }
            other => return other,
        }
    }
    UciEngine::spawn(path)
}

fn logged(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("engine.log"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn handshake_records_the_engine_name() {
    let dir = tempfile::tempdir().unwrap();
    let engine = spawn(&write_engine(dir.path(), "engine.sh", ITERATING_ENGINE)).unwrap();
    assert_eq!(engine.name(), Some("Scripted Engine"));
    drop(engine);

    assert_eq!(logged(dir.path()), ["uci", "isready", "quit"]);
}

#[test]
fn evaluate_keeps_the_deepest_line_per_slot() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = spawn(&write_engine(dir.path(), "engine.sh", ITERATING_ENGINE)).unwrap();
    let board = Board::default();

    let ranked = engine.evaluate(&board, 7).unwrap();
    let summary: Vec<(String, Score)> = ranked
        .iter()
        .map(|r| (board.san(&r.mv), r.score))
        .collect();
    // e2e5 is not legal and is dropped; slot 1 is the depth-2 Nf3, not the depth-1 e4.
    assert_eq!(
        summary,
        [
            ("Nf3".to_string(), Score::Cp(30)),
            ("d4".to_string(), Score::Cp(20)),
        ]
    );
    drop(engine);

    let log = logged(dir.path());
    let search = &log[2..];
    assert_eq!(
        search,
        [
            "setoption name MultiPV value 20",
            "ucinewgame",
            "isready",
            "position fen rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "go depth 7",
            "quit",
        ]
    );
}

#[test]
fn positions_without_moves_skip_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = spawn(&write_engine(dir.path(), "engine.sh", ITERATING_ENGINE)).unwrap();
    let stalemate = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();

    assert!(engine.evaluate(&stalemate, 4).unwrap().is_empty());
    drop(engine);
    assert!(!logged(dir.path()).iter().any(|l| l.starts_with("go")));
}

#[test]
fn engine_dying_mid_search_is_a_protocol_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = spawn(&write_engine(dir.path(), "crash.sh", CRASHING_ENGINE)).unwrap();

    let err = engine.evaluate(&Board::default(), 4).unwrap_err();
    assert!(matches!(err, CodecError::OracleProtocol(_)), "{err:?}");
    // Drop must still reap the dead child without hanging.
    drop(engine);
}

#[test]
fn missing_executable_fails_to_spawn() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-such-engine");
    match UciEngine::spawn(&missing) {
        Err(CodecError::OracleSpawn { path, .. }) => assert_eq!(path, missing),
        Err(other) => panic!("expected OracleSpawn, got {other:?}"),
        Ok(_) => panic!("spawned a missing executable"),
    }
}
