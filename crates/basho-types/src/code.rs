//! Municipality check digits and code normalization.
//!
//! A municipality code is six ASCII digits: a two-digit prefecture code,
//! three digits identifying the municipality, and a trailing check digit
//! computed with weights `[6, 5, 4, 3, 2]` over the first five digits,
//! modulo 11.

use std::ops::RangeInclusive;

use crate::error::TypeError;

/// Position (0-based) of the check digit inside a municipality code.
pub const CHECK_DIGIT_INDEX: usize = 5;

/// Modulus of the check digit computation.
const CHECK_BASE: u32 = 11;

/// Valid prefecture codes.
pub const PREFECTURE_CODES: RangeInclusive<u8> = 1..=47;

/// Length of a municipality code.
pub const MUNICIPALITY_CODE_LEN: usize = 6;

/// Length of a normalized postal code.
pub const POSTAL_CODE_LEN: usize = 7;

/// Length of the postal code shard prefix.
pub const POSTAL_PREFIX_LEN: usize = 3;

/// Validate the format, prefecture range, and check digit of a municipality
/// code.
///
/// ```
/// use basho_types::code;
///
/// assert!(code::is_valid("131016"));
/// assert!(!code::is_valid("131019"));
/// ```
pub fn is_valid(code: &str) -> bool {
    check(code).is_ok()
}

/// Like [`is_valid`], but reports why a code is rejected.
pub fn check(code: &str) -> Result<(), TypeError> {
    if code.len() != MUNICIPALITY_CODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TypeError::MalformedMunicipalityCode(code.to_string()));
    }

    let bytes = code.as_bytes();
    let prefecture = digit_value(bytes[0]) * 10 + digit_value(bytes[1]);
    if !(u32::from(*PREFECTURE_CODES.start())..=u32::from(*PREFECTURE_CODES.end()))
        .contains(&prefecture)
    {
        return Err(TypeError::PrefectureOutOfRange(prefecture));
    }

    let expected = compute_check_digit(code);
    let actual = digit_value(bytes[CHECK_DIGIT_INDEX]) as u8;
    if expected != actual {
        return Err(TypeError::CheckDigitMismatch {
            code: code.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Compute the check digit for a municipality code.
///
/// Only the first five characters are read; a non-digit character counts as
/// zero. For codes whose weighted sum is below 11 the result is
/// `11 - subtotal`, which is at most 6 for any code with a valid prefecture.
pub fn compute_check_digit(code: &str) -> u8 {
    let subtotal: u32 = code
        .bytes()
        .take(CHECK_DIGIT_INDEX)
        .enumerate()
        .map(|(i, b)| digit_value(b) * (CHECK_DIGIT_INDEX - i + 1) as u32)
        .sum();

    if subtotal >= CHECK_BASE {
        ((CHECK_BASE - subtotal % CHECK_BASE) % 10) as u8
    } else {
        (CHECK_BASE - subtotal) as u8
    }
}

/// Append the check digit to a five-digit municipality prefix.
///
/// Returns `None` unless `prefix` is exactly five ASCII digits.
pub fn with_check_digit(prefix: &str) -> Option<String> {
    if prefix.len() != CHECK_DIGIT_INDEX || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{prefix}{}", compute_check_digit(prefix)))
}

/// Strip hyphens from a postal code and accept it only if exactly seven ASCII
/// digits remain.
pub fn normalize_postal_code(raw: &str) -> Option<String> {
    let normalized: String = raw.chars().filter(|&c| c != '-').collect();
    if normalized.len() == POSTAL_CODE_LEN && normalized.bytes().all(|b| b.is_ascii_digit()) {
        Some(normalized)
    } else {
        None
    }
}

/// Parse a prefecture code written as one or two digits without a leading
/// zero (`"1"`, `"13"`), as accepted in URL path parameters.
pub fn parse_prefecture_code(raw: &str) -> Option<u8> {
    let bytes = raw.as_bytes();
    let well_formed = matches!(bytes.len(), 1 | 2)
        && (b'1'..=b'9').contains(&bytes[0])
        && bytes.iter().all(u8::is_ascii_digit);
    if !well_formed {
        return None;
    }
    raw.parse::<u8>().ok().filter(|c| PREFECTURE_CODES.contains(c))
}

/// Two-digit zero-padded form of a prefecture code (`13` → `"13"`, `1` → `"01"`).
pub fn prefecture_code_str(code: u8) -> String {
    format!("{code:02}")
}

fn digit_value(b: u8) -> u32 {
    if b.is_ascii_digit() {
        u32::from(b - b'0')
    } else {
        0
    }
}
