//! [`GeoIndex`] over the bundled datasets.

use std::fmt;
use std::sync::{Arc, RwLock};

use basho_store::DataStore;
use basho_types::{City, PostalCode, Prefecture};
use tracing::debug;

use crate::index::{city_lookup_key, lookup_postal, GeoIndex};

/// Lookups served straight from a [`DataStore`].
///
/// The prefecture list is sorted by code once and cached until
/// [`reset`](GeoIndex::reset).
pub struct InMemoryIndex {
    data: Arc<DataStore>,
    sorted_prefectures: RwLock<Option<Arc<Vec<Prefecture>>>>,
}

impl InMemoryIndex {
    pub fn new(data: Arc<DataStore>) -> Self {
        Self {
            data,
            sorted_prefectures: RwLock::new(None),
        }
    }

    /// The data store this index reads from.
    pub fn data(&self) -> &Arc<DataStore> {
        &self.data
    }

    fn sorted(&self) -> Arc<Vec<Prefecture>> {
        if let Some(cached) = self.sorted_prefectures.read().expect("lock poisoned").as_ref() {
            return Arc::clone(cached);
        }
        let mut slot = self.sorted_prefectures.write().expect("lock poisoned");
        if let Some(cached) = slot.as_ref() {
            return Arc::clone(cached);
        }
        let mut prefectures = self.data.prefectures().as_ref().clone();
        prefectures.sort_by_key(|p| p.code);
        let sorted = Arc::new(prefectures);
        *slot = Some(Arc::clone(&sorted));
        sorted
    }

    fn find_prefecture(&self, pred: impl Fn(&Prefecture) -> bool) -> Option<Prefecture> {
        self.sorted().iter().find(|p| pred(p)).cloned()
    }
}

impl GeoIndex for InMemoryIndex {
    fn prefectures(&self) -> Vec<Prefecture> {
        self.sorted().as_ref().clone()
    }

    fn prefecture(&self, code: u8) -> Option<Prefecture> {
        self.find_prefecture(|p| p.code == code)
    }

    fn prefecture_by_name(&self, name: &str) -> Option<Prefecture> {
        self.find_prefecture(|p| p.name == name)
    }

    fn prefecture_by_english_name(&self, name: &str) -> Option<Prefecture> {
        self.find_prefecture(|p| p.name_en == name)
    }

    fn prefectures_in(&self, region: Option<&str>) -> Vec<Prefecture> {
        let sorted = self.sorted();
        match region {
            None => sorted.as_ref().clone(),
            Some(region) => sorted
                .iter()
                .filter(|p| p.region_name == region)
                .cloned()
                .collect(),
        }
    }

    fn city(&self, code: &str) -> Option<City> {
        let prefecture_code = city_lookup_key(code)?;
        let active = prefecture_code.and_then(|pc| {
            self.data
                .cities(pc)
                .iter()
                .find(|city| city.code == code)
                .cloned()
        });
        active.or_else(|| self.data.deprecated_city(code))
    }

    fn cities(&self, prefecture_code: u8) -> Vec<City> {
        let mut cities: Vec<City> = self
            .data
            .cities(prefecture_code)
            .iter()
            .filter(|city| city.is_active())
            .cloned()
            .collect();
        cities.sort_by(|a, b| a.code.cmp(&b.code));
        cities
    }

    fn postal_codes(&self, code: &str) -> Vec<PostalCode> {
        lookup_postal(&self.data, code)
    }

    fn reset(&self) {
        *self.sorted_prefectures.write().expect("lock poisoned") = None;
        debug!("in-memory index reset");
    }
}

impl fmt::Debug for InMemoryIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryIndex")
            .field("data", &self.data)
            .field(
                "prefectures_cached",
                &self.sorted_prefectures.read().expect("lock poisoned").is_some(),
            )
            .finish()
    }
}
