//! Row types stored in the persisted tables.
//!
//! Rows carry every field of their entity with no optional-field elision, so
//! they encode with non-self-describing formats such as bincode.

use std::collections::BTreeMap;

use basho_types::{City, Prefecture, PrefectureType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A row of `basho_prefectures`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefectureRow {
    pub code: u8,
    pub name: String,
    pub name_en: String,
    pub name_kana: String,
    pub name_hiragana: String,
    pub region_name: String,
    pub prefecture_type: PrefectureType,
    pub capital_code: String,
}

impl From<Prefecture> for PrefectureRow {
    fn from(p: Prefecture) -> Self {
        Self {
            code: p.code,
            name: p.name,
            name_en: p.name_en,
            name_kana: p.name_kana,
            name_hiragana: p.name_hiragana,
            region_name: p.region_name,
            prefecture_type: p.prefecture_type,
            capital_code: p.capital_code,
        }
    }
}

impl From<PrefectureRow> for Prefecture {
    fn from(row: PrefectureRow) -> Self {
        Self {
            code: row.code,
            name: row.name,
            name_en: row.name_en,
            name_kana: row.name_kana,
            name_hiragana: row.name_hiragana,
            region_name: row.region_name,
            prefecture_type: row.prefecture_type,
            capital_code: row.capital_code,
        }
    }
}

/// A row of `basho_cities`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRow {
    pub code: String,
    pub prefecture_code: u8,
    pub name: String,
    pub name_kana: String,
    pub district: Option<String>,
    pub capital: bool,
    pub deprecated_at: Option<NaiveDate>,
    pub successor_code: Option<String>,
}

impl CityRow {
    pub fn is_active(&self) -> bool {
        self.deprecated_at.is_none()
    }
}

impl From<City> for CityRow {
    fn from(c: City) -> Self {
        Self {
            code: c.code,
            prefecture_code: c.prefecture_code,
            name: c.name,
            name_kana: c.name_kana,
            district: c.district,
            capital: c.capital,
            deprecated_at: c.deprecated_at,
            successor_code: c.successor_code,
        }
    }
}

impl From<CityRow> for City {
    fn from(row: CityRow) -> Self {
        Self {
            code: row.code,
            prefecture_code: row.prefecture_code,
            name: row.name,
            name_kana: row.name_kana,
            district: row.district,
            capital: row.capital,
            deprecated_at: row.deprecated_at,
            successor_code: row.successor_code,
        }
    }
}

/// The full contents of a table store.
///
/// `BTreeMap` keys keep query results in ascending code order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tables {
    pub prefectures: BTreeMap<u8, PrefectureRow>,
    pub cities: BTreeMap<String, CityRow>,
}

impl Tables {
    /// Build tables from rows, keyed by code. The first row for a code wins,
    /// so active municipalities written ahead of deprecated ones shadow them.
    pub fn from_rows(prefectures: Vec<PrefectureRow>, cities: Vec<CityRow>) -> Self {
        let mut tables = Self::default();
        for row in prefectures {
            tables.prefectures.entry(row.code).or_insert(row);
        }
        for row in cities {
            tables.cities.entry(row.code.clone()).or_insert(row);
        }
        tables
    }

    /// Active rows of one prefecture, ascending by code.
    pub fn active_cities_in(&self, prefecture_code: u8) -> Vec<CityRow> {
        self.cities
            .values()
            .filter(|c| c.prefecture_code == prefecture_code && c.is_active())
            .cloned()
            .collect()
    }
}
