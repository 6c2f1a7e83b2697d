use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::code;

/// A municipality: city, special ward, town, or village.
///
/// Active municipalities have no `deprecated_at`. Deprecated ones were merged
/// away and may name the municipality that absorbed them in
/// `successor_code`; following those links is the job of the merger resolver
/// in `basho-index`, since it needs a lookup.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct City {
    /// Six-digit municipality code including the check digit (e.g. "131016").
    pub code: String,
    /// Owning prefecture code (1..=47).
    pub prefecture_code: u8,
    /// Name (e.g. "千代田区").
    pub name: String,
    /// Katakana reading (e.g. "チヨダク").
    pub name_kana: String,
    /// County name, set only for towns and villages inside a county
    /// (e.g. "島尻郡").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    /// Whether this municipality is the prefectural capital.
    #[serde(default)]
    pub capital: bool,
    /// Date the municipality ceased to exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated_at: Option<NaiveDate>,
    /// Code of the municipality that absorbed this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successor_code: Option<String>,
}

impl City {
    /// Returns `true` if this municipality is the prefectural capital.
    pub fn is_capital(&self) -> bool {
        self.capital
    }

    /// Returns `true` if a deprecation date is present.
    pub fn is_deprecated(&self) -> bool {
        self.deprecated_at.is_some()
    }

    /// Returns `true` if no deprecation date is present.
    pub fn is_active(&self) -> bool {
        self.deprecated_at.is_none()
    }

    /// Name prefixed with the county name when there is one
    /// (e.g. "島尻郡八重瀬町").
    pub fn full_name(&self) -> String {
        match &self.district {
            Some(district) => format!("{district}{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Two-digit zero-padded prefecture code (e.g. "01").
    pub fn prefecture_code_str(&self) -> String {
        code::prefecture_code_str(self.prefecture_code)
    }
}
