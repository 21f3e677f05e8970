//! stegachess: encode a file into a chess game, or decode it back.
//!
//! Options may also come from a JSON config (`--config`); flags given on the command line win.
//! Logs go to stderr (`-v` for info, `-vv` for debug, `-vvv` for trace, or `RUST_LOG`).

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chess_stego::codec::{decode_game, encode_game};
use chess_stego::config::{CodecConfig, TacticalConfig};
use chess_stego::select::Strategy;
use clap::{ArgGroup, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stegachess")]
#[command(version, about = "Encode or decode data into a chess game.", long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["encode", "decode"])))]
struct Args {
    /// Path of the input file (binary payload to encode, PGN to decode)
    #[arg(short, long)]
    input: PathBuf,

    /// Hide the input file in a chess game
    #[arg(short, long)]
    encode: bool,

    /// Recover the data hidden in a PGN game
    #[arg(short, long)]
    decode: bool,

    /// Prefer moves with many replies to shorten the game
    #[arg(short, long)]
    compress: bool,

    /// Output path; standard output when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Starting position (encode) or position where the data starts (decode)
    #[arg(short, long)]
    fen: Option<String>,

    /// UCI engine used to keep only tactically sound moves
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Engine search depth [default: 6]
    #[arg(long)]
    depth: Option<u32>,

    /// Accepted centipawn loss against the best move [default: 50]
    #[arg(long)]
    threshold: Option<i32>,

    /// JSON codec config; command-line flags override its values
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn resolve_config(&self) -> Result<CodecConfig> {
        let mut cfg = match &self.config {
            Some(path) => CodecConfig::from_json_file(path)?,
            None => CodecConfig::default(),
        };

        if self.compress {
            cfg.strategy = Strategy::EntropyCompressed;
        }
        if let Some(fen) = &self.fen {
            cfg.fen = Some(fen.clone());
        }
        if let Some(engine) = &self.engine {
            let base = cfg
                .tactical
                .take()
                .unwrap_or_else(|| TacticalConfig::new(engine.clone()));
            cfg.tactical = Some(TacticalConfig {
                engine: engine.clone(),
                ..base
            });
        }
        if let Some(t) = cfg.tactical.as_mut() {
            if let Some(depth) = self.depth {
                t.depth = depth;
            }
            if let Some(threshold) = self.threshold {
                t.threshold = threshold;
            }
        }
        Ok(cfg)
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn write_output(path: Option<&PathBuf>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(p) => fs::write(p, bytes).with_context(|| format!("failed to write {}", p.display())),
        None => {
            let mut out = io::stdout().lock();
            out.write_all(bytes)?;
            out.flush()?;
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let cfg = args.resolve_config()?;
    info!(
        strategy = ?cfg.strategy,
        fen = cfg.fen.as_deref().unwrap_or("startpos"),
        engine = %cfg.tactical.as_ref().map(|t| t.engine.display().to_string()).unwrap_or_default(),
        "configuration"
    );

    let output = if args.encode {
        let payload = fs::read(&args.input)
            .with_context(|| format!("failed to read {}", args.input.display()))?;
        encode_game(&payload, &cfg)
            .context("encoding failed")?
            .into_bytes()
    } else {
        let text = fs::read_to_string(&args.input)
            .with_context(|| format!("failed to read {}", args.input.display()))?;
        decode_game(&text, &cfg).context("decoding failed")?
    };

    write_output(args.output.as_ref(), &output)
}
