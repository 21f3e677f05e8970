//! Hide arbitrary bytes in the move order of a chess game.
//!
//! At every position the candidate moves form the digits of a variable-radix numeral; the
//! payload, read as one big integer, is written out digit by digit as moves. The resulting game
//! is an ordinary PGN transcript, and replaying it with the same parameters recovers the payload
//! bit for bit.
//!
//! - [`core`]: the payload numeral.
//! - [`chess`]: the live board and PGN transcripts.
//! - [`select`]: candidate lists (ordering strategies, tactical filter).
//! - [`oracle`]: move-quality oracles (UCI engines).
//! - [`codec`]: encode/decode.

pub mod core;
pub mod chess;
pub mod select;
pub mod oracle;
pub mod codec;
pub mod config;
pub mod error;

pub use codec::{decode_game, encode_game};
pub use config::{CodecConfig, TacticalConfig};
pub use error::CodecError;
pub use select::Strategy;
