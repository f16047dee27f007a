//! Fixed-width bit vectors.
//!
//! Bus signals carry values of an arbitrary declared width (a 512-bit `tdata`
//! is as common as a 1-bit `tvalid`). This module provides:
//! 1. **Storage:** Little-endian 64-bit words holding exactly `width` bits.
//! 2. **Construction:** From integers, booleans, and binary or hex literals.
//! 3. **Inspection:** Per-bit access, zero tests, and narrowing to `u64`.
//! 4. **Serialization:** Literal strings (`"10101010"`, `"0xff"`) or `{ value, width }` objects.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::BitsError;

/// Number of bits held by one storage word.
const WORD_BITS: usize = 64;

/// Returns the number of storage words needed for `width` bits.
const fn word_count(width: usize) -> usize {
    width.div_ceil(WORD_BITS)
}

/// A bit vector with a fixed width.
///
/// The width is part of the value: two vectors holding the same integer but
/// declared with different widths compare unequal. Bits above the width are
/// always zero.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BitsRepr", into = "BitsRepr")]
pub struct Bits {
    width: usize,
    words: Vec<u64>,
}

impl Bits {
    /// Creates an all-zero vector of the given width.
    pub fn zero(width: usize) -> Self {
        Self {
            width,
            words: vec![0; word_count(width)],
        }
    }

    /// Creates a single-bit vector.
    pub fn from_bool(bit: bool) -> Self {
        Self {
            width: 1,
            words: vec![u64::from(bit)],
        }
    }

    /// Creates a vector of `width` bits holding `value`.
    ///
    /// # Errors
    ///
    /// Returns [`BitsError::ZeroWidth`] for a zero width and
    /// [`BitsError::Overflow`] if `value` has bits set at or above `width`.
    pub fn from_u64(value: u64, width: usize) -> Result<Self, BitsError> {
        if width == 0 {
            return Err(BitsError::ZeroWidth);
        }
        if width < WORD_BITS && value >> width != 0 {
            return Err(BitsError::Overflow { value, width });
        }
        let mut bits = Self::zero(width);
        bits.words[0] = value;
        Ok(bits)
    }

    /// Parses a binary (`"1010"`, `"0b1010"`) or hex (`"0xa"`) literal into a
    /// vector of `width` bits, zero-extending shorter literals.
    ///
    /// Underscores are accepted as digit separators.
    ///
    /// # Errors
    ///
    /// Returns [`BitsError::InvalidDigit`] for characters outside the radix and
    /// [`BitsError::TooWide`] if a set bit lands at or above `width`.
    pub fn parse(text: &str, width: usize) -> Result<Self, BitsError> {
        if width == 0 {
            return Err(BitsError::ZeroWidth);
        }
        let (digit_bits, digits) = split_radix(text);
        let mut bits = Self::zero(width);
        let mut highest = None;
        let mut index = 0;

        for ch in digits.chars().rev().filter(|&c| c != '_') {
            let value = ch
                .to_digit(1 << digit_bits)
                .ok_or(BitsError::InvalidDigit { digit: ch })?;
            for offset in 0..digit_bits as usize {
                if (value >> offset) & 1 == 1 {
                    let bit = index + offset;
                    highest = Some(bit);
                    if bit < width {
                        bits.set(bit, true);
                    }
                }
            }
            index += digit_bits as usize;
        }

        match highest {
            Some(bit) if bit >= width => Err(BitsError::TooWide {
                digits: bit + 1,
                width,
            }),
            _ => Ok(bits),
        }
    }

    /// Parses a literal whose width is implied by its digit count: one bit per
    /// binary digit, four per hex digit.
    ///
    /// # Errors
    ///
    /// Returns [`BitsError::ZeroWidth`] for an empty literal and
    /// [`BitsError::InvalidDigit`] for characters outside the radix.
    pub fn from_literal(text: &str) -> Result<Self, BitsError> {
        let (digit_bits, digits) = split_radix(text);
        let count = digits.chars().filter(|&c| c != '_').count();
        Self::parse(text, count * digit_bits as usize)
    }

    /// Returns the declared width in bits.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns `true` if no bit is set.
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Returns bit `index`, or `false` past the width.
    pub fn get(&self, index: usize) -> bool {
        index < self.width && (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    /// Returns the least significant bit, the level of a single-bit signal.
    pub fn as_bool(&self) -> bool {
        self.get(0)
    }

    /// Returns the value as a `u64` if no bit above the lowest 64 is set.
    pub fn to_u64(&self) -> Option<u64> {
        match self.words.split_first() {
            None => Some(0),
            Some((&low, rest)) if rest.iter().all(|&w| w == 0) => Some(low),
            Some(_) => None,
        }
    }

    /// Sets bit `index`; callers guarantee `index < width`.
    fn set(&mut self, index: usize, bit: bool) {
        let mask = 1u64 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        if bit {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }
}

/// Splits an optional `0x`/`0b` prefix off a literal, returning the number of
/// bits per digit and the remaining digits.
fn split_radix(text: &str) -> (u32, &str) {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        (4, hex)
    } else {
        (1, text.strip_prefix("0b").unwrap_or(text))
    }
}

impl From<bool> for Bits {
    fn from(bit: bool) -> Self {
        Self::from_bool(bit)
    }
}

impl fmt::Display for Bits {
    /// Formats the vector as exactly `width` binary digits, most significant first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in (0..self.width).rev() {
            f.write_str(if self.get(index) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'b{}", self.width, self)
    }
}

/// Wire representation of [`Bits`] in configuration files.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum BitsRepr {
    /// A literal whose width is implied by its digits.
    Literal(String),
    /// An explicit value and width.
    Sized { value: BitsValue, width: usize },
}

/// Value part of an explicitly sized [`BitsRepr`].
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum BitsValue {
    Int(u64),
    Text(String),
}

impl TryFrom<BitsRepr> for Bits {
    type Error = BitsError;

    fn try_from(repr: BitsRepr) -> Result<Self, Self::Error> {
        match repr {
            BitsRepr::Literal(text) => Self::from_literal(&text),
            BitsRepr::Sized {
                value: BitsValue::Int(value),
                width,
            } => Self::from_u64(value, width),
            BitsRepr::Sized {
                value: BitsValue::Text(text),
                width,
            } => Self::parse(&text, width),
        }
    }
}

impl From<Bits> for BitsRepr {
    fn from(bits: Bits) -> Self {
        Self::Literal(bits.to_string())
    }
}
