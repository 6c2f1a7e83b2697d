use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("municipality code must be 6 ASCII digits: {0:?}")]
    MalformedMunicipalityCode(String),

    #[error("prefecture code out of range 1..=47: {0}")]
    PrefectureOutOfRange(u32),

    #[error("check digit mismatch for {code}: expected {expected}, found {actual}")]
    CheckDigitMismatch { code: String, expected: u8, actual: u8 },

    #[error("unknown prefecture type: {0:?}")]
    UnknownPrefectureType(String),
}
