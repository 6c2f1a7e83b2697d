//! The [`Basho`] facade: every lookup, relationship hop, and merger walk
//! behind one handle.

use std::fmt;
use std::sync::Arc;

use basho_store::DataStore;
use basho_types::code::PREFECTURE_CODES;
use basho_types::{City, PostalCode, Prefecture, Region};
use serde::Serialize;
use tracing::debug;

use crate::backend::{Backend, BackendKind, BackendProbe, BackendSelector, NoPersistedStore};
use crate::error::{IndexError, IndexResult};
use crate::merger::{self, MergeState};

/// A prefecture whose declared capital disagrees with the municipality
/// flagged as capital in its city shard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CapitalMismatch {
    pub prefecture_code: u8,
    pub prefecture_name: String,
    /// `capital_code` from the prefecture record.
    pub declared: String,
    /// The municipality carrying the capital flag.
    pub flagged: City,
}

/// Entry point for all lookups.
///
/// Lookups go through whichever backend the [`BackendSelector`] picks on
/// first use. Postal lookups always read the [`DataStore`].
pub struct Basho {
    data: Arc<DataStore>,
    selector: BackendSelector,
}

impl Basho {
    /// Create a facade over `data`, probing `probe` for a persisted store.
    pub fn new(data: Arc<DataStore>, probe: impl BackendProbe + 'static) -> Self {
        let selector = BackendSelector::new(Arc::clone(&data), probe);
        Self { data, selector }
    }

    /// Create a facade that always serves lookups from `data`.
    pub fn in_memory(data: Arc<DataStore>) -> Self {
        Self::new(data, NoPersistedStore)
    }

    /// Create a facade over the bundled datasets.
    pub fn bundled() -> Self {
        Self::in_memory(Arc::new(DataStore::bundled()))
    }

    pub fn data(&self) -> &Arc<DataStore> {
        &self.data
    }

    pub fn backend(&self) -> Arc<Backend> {
        self.selector.backend()
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.selector.kind()
    }

    pub fn force_backend(&self, backend: Backend) {
        self.selector.force(backend);
    }

    // Lookups.

    pub fn prefectures(&self) -> Vec<Prefecture> {
        self.backend().index().prefectures()
    }

    pub fn prefecture(&self, code: u8) -> Option<Prefecture> {
        self.backend().index().prefecture(code)
    }

    pub fn prefecture_by_name(&self, name: &str) -> Option<Prefecture> {
        self.backend().index().prefecture_by_name(name)
    }

    pub fn prefecture_by_english_name(&self, name: &str) -> Option<Prefecture> {
        self.backend().index().prefecture_by_english_name(name)
    }

    pub fn prefectures_in(&self, region: Option<&str>) -> Vec<Prefecture> {
        self.backend().index().prefectures_in(region)
    }

    pub fn city(&self, code: &str) -> Option<City> {
        self.backend().index().city(code)
    }

    pub fn cities(&self, prefecture_code: u8) -> Vec<City> {
        self.backend().index().cities(prefecture_code)
    }

    pub fn valid_code(&self, code: &str) -> bool {
        self.backend().index().valid_code(code)
    }

    pub fn postal_codes(&self, code: &str) -> Vec<PostalCode> {
        self.backend().index().postal_codes(code)
    }

    pub fn postal_code(&self, code: &str) -> Option<PostalCode> {
        self.backend().index().postal_code(code)
    }

    /// Resolve a prefecture from a numeric code, a Japanese name, or an
    /// English name.
    pub fn resolve_prefecture(&self, raw: &str) -> IndexResult<Prefecture> {
        let raw = raw.trim();
        let by_code = raw
            .parse::<u8>()
            .ok()
            .filter(|code| PREFECTURE_CODES.contains(code))
            .and_then(|code| self.prefecture(code));
        by_code
            .or_else(|| self.prefecture_by_name(raw))
            .or_else(|| self.prefecture_by_english_name(raw))
            .ok_or_else(|| IndexError::UnknownPrefecture(raw.to_string()))
    }

    /// A municipality by code, or [`IndexError::UnknownCity`].
    pub fn require_city(&self, code: &str) -> IndexResult<City> {
        self.city(code)
            .ok_or_else(|| IndexError::UnknownCity(code.to_string()))
    }

    // Regions and relationships.

    pub fn regions(&self) -> &'static [Region] {
        Region::all()
    }

    pub fn region(&self, name: &str) -> Option<Region> {
        Region::find(name).copied()
    }

    pub fn region_of(&self, prefecture: &Prefecture) -> Option<Region> {
        self.region(&prefecture.region_name)
    }

    /// Member prefectures of `region`, in the region's code order.
    pub fn prefectures_of(&self, region: &Region) -> Vec<Prefecture> {
        region
            .prefecture_codes
            .iter()
            .filter_map(|&code| self.prefecture(code))
            .collect()
    }

    pub fn capital_of(&self, prefecture: &Prefecture) -> Option<City> {
        self.city(&prefecture.capital_code)
    }

    pub fn cities_of(&self, prefecture: &Prefecture) -> Vec<City> {
        self.cities(prefecture.code)
    }

    pub fn prefecture_of(&self, city: &City) -> Option<Prefecture> {
        self.prefecture(city.prefecture_code)
    }

    pub fn prefecture_of_postal(&self, postal: &PostalCode) -> Option<Prefecture> {
        self.prefecture(postal.prefecture_code)
    }

    /// Code of the active municipality whose full name (county included)
    /// equals the postal entry's city name, within the same prefecture.
    pub fn city_code_for_postal(&self, postal: &PostalCode) -> Option<String> {
        self.cities(postal.prefecture_code)
            .into_iter()
            .find(|city| city.full_name() == postal.city_name)
            .map(|city| city.code)
    }

    // Mergers.

    pub fn successor(&self, city: &City) -> Option<City> {
        merger::successor(self.backend().index(), city)
    }

    pub fn current(&self, city: &City) -> City {
        merger::current(self.backend().index(), city)
    }

    pub fn chain(&self, city: &City) -> Vec<City> {
        merger::chain(self.backend().index(), city)
    }

    pub fn merge_state(&self, city: &City) -> MergeState {
        merger::merge_state(self.backend().index(), city)
    }

    /// Check every prefecture's declared capital against the capital flag in
    /// its city shard. Prefectures with no flagged municipality are skipped.
    pub fn verify_capitals(&self) -> Vec<CapitalMismatch> {
        let mismatches: Vec<CapitalMismatch> = self
            .data
            .prefectures()
            .iter()
            .filter_map(|prefecture| {
                let cities = self.data.cities(prefecture.code);
                let flagged = cities.iter().find(|city| city.is_capital())?;
                (flagged.code != prefecture.capital_code).then(|| CapitalMismatch {
                    prefecture_code: prefecture.code,
                    prefecture_name: prefecture.name.clone(),
                    declared: prefecture.capital_code.clone(),
                    flagged: flagged.clone(),
                })
            })
            .collect();
        debug!(mismatches = mismatches.len(), "verified capitals");
        mismatches
    }

    /// Drop every cache and the backend decision.
    pub fn reset(&self) {
        self.selector.reset();
        self.data.reset();
    }
}

impl Default for Basho {
    fn default() -> Self {
        Self::bundled()
    }
}

impl fmt::Debug for Basho {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Basho")
            .field("data", &self.data)
            .field("selector", &self.selector)
            .finish()
    }
}
