use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use basho_types::{City, PostalCode, Prefecture};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::shard::Shard;
use crate::source::{DirectorySource, ShardSource};

/// Directory holding the datasets bundled with this crate.
pub fn bundled_data_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data"))
}

type Slot<T> = RwLock<Option<Arc<T>>>;
type KeyedSlots<K, T> = RwLock<HashMap<K, Arc<T>>>;

/// Lazy, memoized access to dataset shards.
///
/// Each shard is decoded on first access and shared as an `Arc` afterwards.
/// Concurrent first accesses load a shard once: population happens under the
/// slot's write lock with a re-check, while later reads only take the read
/// lock. [`reset`](Self::reset) drops every memoized shard.
pub struct DataStore {
    source: Box<dyn ShardSource>,
    prefectures: Slot<Vec<Prefecture>>,
    cities: KeyedSlots<u8, Vec<City>>,
    deprecated: Slot<Vec<City>>,
    deprecated_by_code: Slot<HashMap<String, City>>,
    postal_codes: KeyedSlots<String, Vec<PostalCode>>,
}

impl DataStore {
    /// Create a store reading from `source`.
    pub fn new(source: impl ShardSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            prefectures: RwLock::new(None),
            cities: RwLock::new(HashMap::new()),
            deprecated: RwLock::new(None),
            deprecated_by_code: RwLock::new(None),
            postal_codes: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store reading shard files under `root`.
    pub fn open(root: impl AsRef<Path>) -> Self {
        Self::new(DirectorySource::new(root.as_ref()))
    }

    /// Create a store over the bundled datasets.
    pub fn bundled() -> Self {
        Self::open(bundled_data_dir())
    }

    /// All prefectures, in dataset order.
    pub fn prefectures(&self) -> Arc<Vec<Prefecture>> {
        memoize(&self.prefectures, || self.load(&Shard::Prefectures))
    }

    /// Active municipalities of one prefecture. Unknown codes yield an empty
    /// list.
    pub fn cities(&self, prefecture_code: u8) -> Arc<Vec<City>> {
        memoize_keyed(&self.cities, &prefecture_code, || {
            self.load(&Shard::Cities(prefecture_code))
        })
    }

    /// All merged-away municipalities.
    pub fn deprecated_cities(&self) -> Arc<Vec<City>> {
        memoize(&self.deprecated, || self.load(&Shard::DeprecatedCities))
    }

    /// Look up one deprecated municipality by code.
    ///
    /// The first call indexes the deprecated list by code; later calls are a
    /// hash lookup.
    pub fn deprecated_city(&self, code: &str) -> Option<City> {
        let index = memoize(&self.deprecated_by_code, || {
            let index: HashMap<String, City> = self
                .deprecated_cities()
                .iter()
                .map(|city| (city.code.clone(), city.clone()))
                .collect();
            debug!(entries = index.len(), "indexed deprecated municipalities");
            index
        });
        index.get(code).cloned()
    }

    /// Postal codes sharing a three-digit prefix. Unknown prefixes yield an
    /// empty list.
    pub fn postal_codes(&self, prefix: &str) -> Arc<Vec<PostalCode>> {
        memoize_keyed(&self.postal_codes, &prefix.to_string(), || {
            self.load(&Shard::PostalCodes(prefix.to_string()))
        })
    }

    /// Drop every memoized shard so the next access re-reads the source.
    pub fn reset(&self) {
        *self.prefectures.write().expect("lock poisoned") = None;
        self.cities.write().expect("lock poisoned").clear();
        *self.deprecated.write().expect("lock poisoned") = None;
        *self.deprecated_by_code.write().expect("lock poisoned") = None;
        self.postal_codes.write().expect("lock poisoned").clear();
        debug!("data store reset");
    }

    /// Number of shards currently memoized.
    pub fn cached_shards(&self) -> usize {
        let singletons = [
            self.prefectures.read().expect("lock poisoned").is_some(),
            self.deprecated.read().expect("lock poisoned").is_some(),
        ]
        .into_iter()
        .filter(|loaded| *loaded)
        .count();
        singletons
            + self.cities.read().expect("lock poisoned").len()
            + self.postal_codes.read().expect("lock poisoned").len()
    }

    fn load<T: DeserializeOwned>(&self, shard: &Shard) -> Vec<T> {
        let path = shard.relative_path();
        match self.source.read(&path) {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(records) => {
                    debug!(shard = %path, "loaded shard");
                    records
                }
                Err(e) => {
                    warn!(shard = %path, error = %e, "malformed shard; treating as empty");
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!(shard = %path, "shard not found; treating as empty");
                Vec::new()
            }
            Err(e) => {
                warn!(shard = %path, error = %e, "failed to read shard; treating as empty");
                Vec::new()
            }
        }
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::bundled()
    }
}

impl fmt::Debug for DataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStore")
            .field("cached_shards", &self.cached_shards())
            .finish()
    }
}

fn memoize<T>(slot: &Slot<T>, load: impl FnOnce() -> T) -> Arc<T> {
    if let Some(value) = slot.read().expect("lock poisoned").as_ref() {
        return Arc::clone(value);
    }
    let mut guard = slot.write().expect("lock poisoned");
    if let Some(value) = guard.as_ref() {
        return Arc::clone(value);
    }
    let value = Arc::new(load());
    *guard = Some(Arc::clone(&value));
    value
}

fn memoize_keyed<K, T>(slots: &KeyedSlots<K, T>, key: &K, load: impl FnOnce() -> T) -> Arc<T>
where
    K: Eq + Hash + Clone,
{
    if let Some(value) = slots.read().expect("lock poisoned").get(key) {
        return Arc::clone(value);
    }
    let mut guard = slots.write().expect("lock poisoned");
    Arc::clone(guard.entry(key.clone()).or_insert_with(|| Arc::new(load())))
}
