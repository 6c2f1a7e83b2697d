//! The [`TableStore`] trait defining the persisted storage interface.

use crate::error::DbResult;
use crate::rows::{CityRow, PrefectureRow};

/// Name of the prefecture table.
pub const PREFECTURES_TABLE: &str = "basho_prefectures";

/// Name of the municipality table.
pub const CITIES_TABLE: &str = "basho_cities";

/// Column used to look up a single prefecture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefectureKey<'a> {
    Code(u8),
    Name(&'a str),
    EnglishName(&'a str),
}

impl PrefectureKey<'_> {
    /// Returns `true` if `row` matches this key.
    pub fn matches(&self, row: &PrefectureRow) -> bool {
        match *self {
            Self::Code(code) => row.code == code,
            Self::Name(name) => row.name == name,
            Self::EnglishName(name) => row.name_en == name,
        }
    }
}

/// Storage backend for the prefecture and municipality tables.
///
/// Implementations must be thread-safe (`Send + Sync`). Every query that
/// returns several rows returns them in ascending code order. Queries against
/// a table that has not been created fail with
/// [`DbError::MissingTable`](crate::DbError::MissingTable).
pub trait TableStore: Send + Sync {
    /// Check whether a table exists.
    fn has_table(&self, name: &str) -> DbResult<bool>;

    /// All prefecture rows.
    fn all_prefectures(&self) -> DbResult<Vec<PrefectureRow>>;

    /// A municipality row by code, active or deprecated.
    fn find_city(&self, code: &str) -> DbResult<Option<CityRow>>;

    /// Active municipality rows of one prefecture.
    fn cities_in_prefecture(&self, prefecture_code: u8) -> DbResult<Vec<CityRow>>;

    /// Create both tables if needed and replace their contents in one write.
    fn replace_all(&self, prefectures: Vec<PrefectureRow>, cities: Vec<CityRow>) -> DbResult<()>;

    /// A single prefecture row.
    ///
    /// Default implementation scans [`all_prefectures`](Self::all_prefectures).
    fn find_prefecture(&self, key: PrefectureKey<'_>) -> DbResult<Option<PrefectureRow>> {
        Ok(self.all_prefectures()?.into_iter().find(|row| key.matches(row)))
    }

    /// Prefecture rows belonging to a region.
    ///
    /// Default implementation filters [`all_prefectures`](Self::all_prefectures).
    fn prefectures_in_region(&self, region_name: &str) -> DbResult<Vec<PrefectureRow>> {
        Ok(self
            .all_prefectures()?
            .into_iter()
            .filter(|row| row.region_name == region_name)
            .collect())
    }

    /// Returns `true` if both basho tables exist.
    fn has_schema(&self) -> DbResult<bool> {
        Ok(self.has_table(PREFECTURES_TABLE)? && self.has_table(CITIES_TABLE)?)
    }
}
