//! Low-level, position-independent primitives.
//!
//! - [`numeral`]: the payload as an arbitrary-precision integer with a sentinel unit, and the
//!   digit take/push operations that drive encoding and decoding.

pub mod numeral;
