//! # Bit Vector Tests
//!
//! Parsing, width checking, and formatting of fixed-width values.

use axis_transfer::common::{Bits, BitsError};
use proptest::prelude::*;
use rstest::rstest;

#[test]
fn test_zero_has_requested_width() {
    let bits = Bits::zero(64);
    assert_eq!(bits.width(), 64);
    assert!(bits.is_zero());
    assert_eq!(bits.to_string(), "0".repeat(64));
}

#[rstest]
#[case("1010", 8, 0b1010)]
#[case("0b1010", 4, 0b1010)]
#[case("0xa5", 8, 0xa5)]
#[case("0xA5", 12, 0xa5)]
#[case("1010_1010", 8, 0xaa)]
#[case("0", 1, 0)]
fn test_parse_zero_extends(#[case] text: &str, #[case] width: usize, #[case] expected: u64) {
    let bits = Bits::parse(text, width).unwrap();
    assert_eq!(bits.width(), width);
    assert_eq!(bits.to_u64(), Some(expected));
}

#[test]
fn test_parse_rejects_bits_past_width() {
    assert_eq!(
        Bits::parse("0x1ff", 8),
        Err(BitsError::TooWide { digits: 9, width: 8 })
    );
}

#[test]
fn test_parse_accepts_leading_zeros_past_width() {
    let bits = Bits::parse("0000_0001", 1).unwrap();
    assert!(bits.as_bool());
}

#[test]
fn test_parse_rejects_invalid_digit() {
    assert_eq!(
        Bits::parse("10201", 8),
        Err(BitsError::InvalidDigit { digit: '2' })
    );
    assert_eq!(Bits::parse("0xfg", 8), Err(BitsError::InvalidDigit { digit: 'g' }));
}

#[test]
fn test_zero_width_is_rejected() {
    assert_eq!(Bits::parse("1", 0), Err(BitsError::ZeroWidth));
    assert_eq!(Bits::from_u64(0, 0), Err(BitsError::ZeroWidth));
    assert_eq!(Bits::from_literal(""), Err(BitsError::ZeroWidth));
}

#[test]
fn test_from_u64_overflow() {
    assert_eq!(
        Bits::from_u64(0x100, 8),
        Err(BitsError::Overflow {
            value: 0x100,
            width: 8
        })
    );
    assert_eq!(Bits::from_u64(u64::MAX, 64).unwrap().to_u64(), Some(u64::MAX));
}

#[test]
fn test_literal_width_follows_digits() {
    assert_eq!(Bits::from_literal("10101010").unwrap().width(), 8);
    assert_eq!(Bits::from_literal("0x00ff").unwrap().width(), 16);
    assert_eq!(Bits::from_literal("0b1").unwrap().width(), 1);
}

#[test]
fn test_wide_vectors_span_words() {
    let bits = Bits::parse(&format!("1{}", "0".repeat(99)), 128).unwrap();
    assert!(bits.get(99));
    assert!(!bits.get(98));
    assert_eq!(bits.to_u64(), None);
}

#[test]
fn test_formatting() {
    let bits = Bits::from_u64(5, 4).unwrap();
    assert_eq!(format!("{bits}"), "0101");
    assert_eq!(format!("{bits:?}"), "4'b0101");
}

#[test]
fn test_single_bit_conversions() {
    assert!(Bits::from(true).as_bool());
    assert!(!Bits::from_bool(false).as_bool());
    assert_eq!(Bits::from(true).width(), 1);
}

proptest! {
    #[test]
    fn prop_display_parses_back(value in any::<u64>(), width in 1usize..=64) {
        let masked = if width == 64 { value } else { value & ((1u64 << width) - 1) };
        let bits = Bits::from_u64(masked, width).unwrap();
        let text = bits.to_string();
        prop_assert_eq!(text.len(), width);
        prop_assert_eq!(Bits::parse(&text, width).unwrap(), bits);
    }
}
