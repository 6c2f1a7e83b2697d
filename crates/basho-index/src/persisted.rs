//! [`GeoIndex`] over a persisted [`TableStore`].

use std::fmt;
use std::sync::Arc;

use basho_db::{DbResult, PrefectureKey, TableStore};
use basho_store::DataStore;
use basho_types::{City, PostalCode, Prefecture};
use tracing::warn;

use crate::error::IndexResult;
use crate::index::{city_lookup_key, lookup_postal, GeoIndex};

/// Lookups served from a table store, one query per call.
///
/// Postal codes are not persisted and always come from the [`DataStore`].
/// A failing query is logged and treated as not found.
pub struct PersistedIndex {
    store: Arc<dyn TableStore>,
    data: Arc<DataStore>,
}

impl PersistedIndex {
    pub fn new(store: Arc<dyn TableStore>, data: Arc<DataStore>) -> Self {
        Self { store, data }
    }

    /// The table store this index queries.
    pub fn store(&self) -> &Arc<dyn TableStore> {
        &self.store
    }

    fn query<T: Default>(
        &self,
        operation: &'static str,
        run: impl FnOnce(&dyn TableStore) -> DbResult<T>,
    ) -> T {
        let result: IndexResult<T> = run(self.store.as_ref()).map_err(Into::into);
        match result {
            Ok(value) => value,
            Err(e) => {
                warn!(operation, error = %e, "table store query failed");
                T::default()
            }
        }
    }

    fn prefecture_by(&self, key: PrefectureKey<'_>) -> Option<Prefecture> {
        self.query("find_prefecture", |s| s.find_prefecture(key))
            .map(Prefecture::from)
    }
}

impl GeoIndex for PersistedIndex {
    fn prefectures(&self) -> Vec<Prefecture> {
        self.query("all_prefectures", |s| s.all_prefectures())
            .into_iter()
            .map(Prefecture::from)
            .collect()
    }

    fn prefecture(&self, code: u8) -> Option<Prefecture> {
        self.prefecture_by(PrefectureKey::Code(code))
    }

    fn prefecture_by_name(&self, name: &str) -> Option<Prefecture> {
        self.prefecture_by(PrefectureKey::Name(name))
    }

    fn prefecture_by_english_name(&self, name: &str) -> Option<Prefecture> {
        self.prefecture_by(PrefectureKey::EnglishName(name))
    }

    fn prefectures_in(&self, region: Option<&str>) -> Vec<Prefecture> {
        let rows = match region {
            None => self.query("all_prefectures", |s| s.all_prefectures()),
            Some(region) => {
                self.query("prefectures_in_region", |s| s.prefectures_in_region(region))
            }
        };
        rows.into_iter().map(Prefecture::from).collect()
    }

    fn city(&self, code: &str) -> Option<City> {
        city_lookup_key(code)?;
        self.query("find_city", |s| s.find_city(code)).map(City::from)
    }

    fn cities(&self, prefecture_code: u8) -> Vec<City> {
        self.query("cities_in_prefecture", |s| s.cities_in_prefecture(prefecture_code))
            .into_iter()
            .map(City::from)
            .collect()
    }

    fn postal_codes(&self, code: &str) -> Vec<PostalCode> {
        lookup_postal(&self.data, code)
    }
}

impl fmt::Debug for PersistedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedIndex").finish_non_exhaustive()
    }
}
