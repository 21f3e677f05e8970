//! The payload as a variable-radix numeral.
//!
//! Byte order contract: the payload is read **big-endian** after prepending the sentinel byte
//! `0x01`, so the sentinel is the most significant byte of the integer. `to_bytes_be` of any
//! non-zero value starts with its most significant non-zero byte, which therefore is always the
//! sentinel; every payload byte after it (zeros at either end included) comes back unchanged.
//!
//! Digits are taken least-significant first: encoding repeatedly splits `value mod base` off
//! the value, decoding folds `(digit, base)` pairs back in reverse with Horner's rule.

use num_bigint::BigUint;
use num_integer::Integer;

use crate::error::CodecError;

/// Value of the single leading unit prepended to every payload.
pub const SENTINEL: u8 = 0x01;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Numeral {
    value: BigUint,
}

impl Numeral {
    pub fn from_payload(payload: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(payload.len() + 1);
        bytes.push(SENTINEL);
        bytes.extend_from_slice(payload);
        Self {
            value: BigUint::from_bytes_be(&bytes),
        }
    }

    /// Rebuild a numeral from `(digit, base)` pairs recorded in application order.
    pub fn from_digits(pairs: &[(usize, usize)]) -> Self {
        let mut n = Self {
            value: BigUint::default(),
        };
        for &(digit, base) in pairs.iter().rev() {
            n.push_digit(digit, base);
        }
        n
    }

    #[inline]
    pub fn value(&self) -> &BigUint {
        &self.value
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.value.bits() == 0
    }

    #[inline]
    pub fn bits(&self) -> u64 {
        self.value.bits()
    }

    /// Split off the least significant digit in radix `base`.
    ///
    /// `value` becomes `value div base`; the returned digit is `value mod base`.
    pub fn take_digit(&mut self, base: usize) -> usize {
        assert!(base >= 1, "numeral base must be at least 1");
        let (quot, rem) = self.value.div_rem(&BigUint::from(base));
        self.value = quot;
        // rem < base <= usize::MAX, so it fits in one u64 limb (zero has no limbs).
        rem.iter_u64_digits().next().unwrap_or(0) as usize
    }

    /// Inverse of [`Numeral::take_digit`]: `value = value * base + digit`.
    pub fn push_digit(&mut self, digit: usize, base: usize) {
        debug_assert!(digit < base);
        self.value *= BigUint::from(base);
        self.value += BigUint::from(digit);
    }

    /// Strip the sentinel and return the payload bytes.
    pub fn into_payload(self) -> Result<Vec<u8>, CodecError> {
        let bytes = self.value.to_bytes_be();
        match bytes.split_first() {
            Some((&SENTINEL, rest)) => Ok(rest.to_vec()),
            _ => Err(CodecError::MissingSentinel),
        }
    }
}
