//! The [`GeoIndex`] trait shared by both lookup backends.

use basho_store::DataStore;
use basho_types::code::{self, MUNICIPALITY_CODE_LEN, POSTAL_PREFIX_LEN};
use basho_types::{City, PostalCode, Prefecture};

/// Read-only lookups over prefectures, municipalities, and postal codes.
///
/// Implementations must be thread-safe (`Send + Sync`). Malformed input is
/// never an error: it yields `None` or an empty list. Every list of
/// prefectures or municipalities is in ascending code order.
pub trait GeoIndex: Send + Sync {
    /// All prefectures.
    fn prefectures(&self) -> Vec<Prefecture>;

    /// A prefecture by numeric code.
    fn prefecture(&self, code: u8) -> Option<Prefecture>;

    /// A prefecture by Japanese name (e.g. "東京都").
    fn prefecture_by_name(&self, name: &str) -> Option<Prefecture>;

    /// A prefecture by English name (e.g. "Tokyo").
    fn prefecture_by_english_name(&self, name: &str) -> Option<Prefecture>;

    /// Prefectures whose region name equals `region`, or all of them.
    fn prefectures_in(&self, region: Option<&str>) -> Vec<Prefecture>;

    /// A municipality by six-character code, active or deprecated.
    ///
    /// An active municipality shadows a deprecated one with the same code.
    fn city(&self, code: &str) -> Option<City>;

    /// Active municipalities of one prefecture.
    fn cities(&self, prefecture_code: u8) -> Vec<City>;

    /// Postal code entries exactly matching `code`.
    fn postal_codes(&self, code: &str) -> Vec<PostalCode>;

    /// Returns `true` if `code` is a well-formed municipality code.
    fn valid_code(&self, code: &str) -> bool {
        code::is_valid(code)
    }

    /// The first postal code entry matching `code`.
    fn postal_code(&self, code: &str) -> Option<PostalCode> {
        self.postal_codes(code).into_iter().next()
    }

    /// Drop anything this index has cached.
    fn reset(&self) {}
}

/// Postal lookup over the bundled shards.
///
/// Hyphens are stripped; anything else that is not exactly seven digits
/// yields nothing. Entries come from the three-digit prefix shard, filtered
/// to exact matches.
pub(crate) fn lookup_postal(data: &DataStore, raw: &str) -> Vec<PostalCode> {
    let Some(normalized) = code::normalize_postal_code(raw) else {
        return Vec::new();
    };
    data.postal_codes(&normalized[..POSTAL_PREFIX_LEN])
        .iter()
        .filter(|entry| entry.code == normalized)
        .cloned()
        .collect()
}

/// The prefecture code a municipality lookup should search, if `code` has the
/// right length at all.
///
/// `Some(None)` means the length is right but the leading two characters are
/// not a number, so only the deprecated list can match.
pub(crate) fn city_lookup_key(code: &str) -> Option<Option<u8>> {
    if code.chars().count() != MUNICIPALITY_CODE_LEN {
        return None;
    }
    Some(code.get(..2).and_then(|prefix| prefix.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postal_lookup_normalizes_hyphen() {
        let data = DataStore::bundled();
        let plain = lookup_postal(&data, "1540011");
        let hyphenated = lookup_postal(&data, "154-0011");
        assert_eq!(plain.len(), 1);
        assert_eq!(plain, hyphenated);
        assert_eq!(plain[0].town, "上馬");
    }

    #[test]
    fn postal_lookup_rejects_malformed() {
        let data = DataStore::bundled();
        assert!(lookup_postal(&data, "").is_empty());
        assert!(lookup_postal(&data, "154001").is_empty());
        assert!(lookup_postal(&data, "15400111").is_empty());
        assert!(lookup_postal(&data, "abc-defg").is_empty());
        assert_eq!(data.cached_shards(), 0);
    }

    #[test]
    fn postal_lookup_unknown_prefix_is_empty() {
        let data = DataStore::bundled();
        assert!(lookup_postal(&data, "0000000").is_empty());
    }

    #[test]
    fn city_key_requires_six_chars() {
        assert_eq!(city_lookup_key("131016"), Some(Some(13)));
        assert_eq!(city_lookup_key("01100"), None);
        assert_eq!(city_lookup_key("1310160"), None);
        assert_eq!(city_lookup_key("ab1016"), Some(None));
    }
}
