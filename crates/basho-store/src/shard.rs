use std::fmt;

/// A dataset shard: the unit of loading and memoization.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Shard {
    /// All prefectures.
    Prefectures,
    /// Active municipalities of one prefecture.
    Cities(u8),
    /// Merged-away municipalities.
    DeprecatedCities,
    /// Postal codes sharing a three-digit prefix.
    PostalCodes(String),
}

impl Shard {
    /// Path of the shard file relative to the dataset root.
    pub fn relative_path(&self) -> String {
        match self {
            Self::Prefectures => "prefectures.json".to_string(),
            Self::Cities(code) => format!("cities/{code:02}.json"),
            Self::DeprecatedCities => "deprecated_cities.json".to_string(),
            Self::PostalCodes(prefix) => format!("postal_codes/{prefix}.json"),
        }
    }
}

impl fmt::Display for Shard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.relative_path())
    }
}
