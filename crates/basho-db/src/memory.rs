//! In-memory table store for testing and ephemeral use.

use std::fmt;
use std::sync::RwLock;

use crate::error::{DbError, DbResult};
use crate::rows::{CityRow, PrefectureRow, Tables};
use crate::traits::{PrefectureKey, TableStore, CITIES_TABLE, PREFECTURES_TABLE};

/// An in-memory implementation of [`TableStore`].
///
/// Tables live in `BTreeMap`s behind a `RwLock`. A store created with
/// [`without_schema`](Self::without_schema) has no tables until the first
/// [`replace_all`](TableStore::replace_all).
pub struct InMemoryTableStore {
    tables: RwLock<Option<Tables>>,
}

impl InMemoryTableStore {
    /// Create a store with both tables present and empty.
    pub fn new() -> Self {
        Self::from_tables(Tables::default())
    }

    /// Create a store with no tables at all.
    pub fn without_schema() -> Self {
        Self {
            tables: RwLock::new(None),
        }
    }

    /// Create a store holding `tables`.
    pub fn from_tables(tables: Tables) -> Self {
        Self {
            tables: RwLock::new(Some(tables)),
        }
    }

    fn with_tables<T>(&self, table: &str, f: impl FnOnce(&Tables) -> T) -> DbResult<T> {
        let guard = self.tables.read().expect("lock poisoned");
        let tables = guard
            .as_ref()
            .ok_or_else(|| DbError::MissingTable(table.to_string()))?;
        Ok(f(tables))
    }
}

impl Default for InMemoryTableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TableStore for InMemoryTableStore {
    fn has_table(&self, name: &str) -> DbResult<bool> {
        let present = self.tables.read().expect("lock poisoned").is_some();
        Ok(present && (name == PREFECTURES_TABLE || name == CITIES_TABLE))
    }

    fn all_prefectures(&self) -> DbResult<Vec<PrefectureRow>> {
        self.with_tables(PREFECTURES_TABLE, |t| t.prefectures.values().cloned().collect())
    }

    fn find_prefecture(&self, key: PrefectureKey<'_>) -> DbResult<Option<PrefectureRow>> {
        self.with_tables(PREFECTURES_TABLE, |t| match key {
            PrefectureKey::Code(code) => t.prefectures.get(&code).cloned(),
            _ => t.prefectures.values().find(|row| key.matches(row)).cloned(),
        })
    }

    fn find_city(&self, code: &str) -> DbResult<Option<CityRow>> {
        self.with_tables(CITIES_TABLE, |t| t.cities.get(code).cloned())
    }

    fn cities_in_prefecture(&self, prefecture_code: u8) -> DbResult<Vec<CityRow>> {
        self.with_tables(CITIES_TABLE, |t| t.active_cities_in(prefecture_code))
    }

    fn replace_all(&self, prefectures: Vec<PrefectureRow>, cities: Vec<CityRow>) -> DbResult<()> {
        let mut guard = self.tables.write().expect("lock poisoned");
        *guard = Some(Tables::from_rows(prefectures, cities));
        Ok(())
    }
}

impl fmt::Debug for InMemoryTableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.tables.read().expect("lock poisoned");
        let mut s = f.debug_struct("InMemoryTableStore");
        match guard.as_ref() {
            Some(t) => s
                .field("prefectures", &t.prefectures.len())
                .field("cities", &t.cities.len()),
            None => s.field("schema", &"missing"),
        };
        s.finish()
    }
}
