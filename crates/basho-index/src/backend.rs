//! Choosing between the in-memory and persisted lookup backends.
//!
//! The decision is made once, on first use, by probing for a persisted table
//! store that has both basho tables. Anything short of that falls back to the
//! bundled datasets; probe failures are logged, never returned.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use basho_db::{DbError, DbResult, SnapshotTableStore, TableStore};
use basho_store::DataStore;
use serde::Serialize;
use tracing::{debug, info};

use crate::index::GeoIndex;
use crate::memory::InMemoryIndex;
use crate::persisted::PersistedIndex;

/// Something that may yield a persisted table store.
pub trait BackendProbe: Send + Sync {
    fn probe(&self) -> DbResult<Arc<dyn TableStore>>;
}

/// No persisted store is configured; always selects the in-memory backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPersistedStore;

impl BackendProbe for NoPersistedStore {
    fn probe(&self) -> DbResult<Arc<dyn TableStore>> {
        Err(DbError::Unavailable("no persisted store configured".into()))
    }
}

/// Opens a snapshot file written by [`basho_db::seed`].
#[derive(Clone, Debug)]
pub struct SnapshotProbe {
    path: PathBuf,
}

impl SnapshotProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BackendProbe for SnapshotProbe {
    fn probe(&self) -> DbResult<Arc<dyn TableStore>> {
        Ok(Arc::new(SnapshotTableStore::open(&self.path)?))
    }
}

/// Hands out a store that already exists.
pub struct StaticProbe(pub Arc<dyn TableStore>);

impl BackendProbe for StaticProbe {
    fn probe(&self) -> DbResult<Arc<dyn TableStore>> {
        Ok(Arc::clone(&self.0))
    }
}

/// Which backend is serving lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    InMemory,
    Persisted,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InMemory => "in-memory",
            Self::Persisted => "persisted",
        })
    }
}

/// A selected lookup backend.
#[derive(Debug)]
pub enum Backend {
    InMemory(InMemoryIndex),
    Persisted(PersistedIndex),
}

impl Backend {
    pub fn index(&self) -> &dyn GeoIndex {
        match self {
            Self::InMemory(index) => index,
            Self::Persisted(index) => index,
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::InMemory(_) => BackendKind::InMemory,
            Self::Persisted(_) => BackendKind::Persisted,
        }
    }
}

/// Makes the backend decision once and remembers it until [`reset`](Self::reset).
///
/// Concurrent first calls probe exactly once: the probe runs under a mutex
/// and the slot is re-checked after acquiring it.
pub struct BackendSelector {
    data: Arc<DataStore>,
    probe: Box<dyn BackendProbe>,
    decision: RwLock<Option<Arc<Backend>>>,
    probing: Mutex<()>,
}

impl BackendSelector {
    pub fn new(data: Arc<DataStore>, probe: impl BackendProbe + 'static) -> Self {
        Self {
            data,
            probe: Box::new(probe),
            decision: RwLock::new(None),
            probing: Mutex::new(()),
        }
    }

    /// The selected backend, deciding now if no decision is remembered.
    pub fn backend(&self) -> Arc<Backend> {
        if let Some(backend) = self.decision.read().expect("lock poisoned").as_ref() {
            return Arc::clone(backend);
        }
        let _probing = self.probing.lock().expect("lock poisoned");
        if let Some(backend) = self.decision.read().expect("lock poisoned").as_ref() {
            return Arc::clone(backend);
        }
        let backend = Arc::new(self.select());
        *self.decision.write().expect("lock poisoned") = Some(Arc::clone(&backend));
        backend
    }

    /// Kind of the selected backend.
    pub fn kind(&self) -> BackendKind {
        self.backend().kind()
    }

    /// Replace the decision with `backend`.
    pub fn force(&self, backend: Backend) {
        let kind = backend.kind();
        *self.decision.write().expect("lock poisoned") = Some(Arc::new(backend));
        debug!(%kind, "backend forced");
    }

    /// Forget the decision so the next call probes again.
    pub fn reset(&self) {
        let previous = self.decision.write().expect("lock poisoned").take();
        if let Some(backend) = previous {
            backend.index().reset();
        }
        debug!("backend decision reset");
    }

    fn select(&self) -> Backend {
        match self.probe.probe().and_then(|store| Ok((store.has_schema()?, store))) {
            Ok((true, store)) => {
                info!("using persisted backend");
                Backend::Persisted(PersistedIndex::new(store, Arc::clone(&self.data)))
            }
            Ok((false, _)) => {
                info!("persisted store has no basho tables; using bundled data");
                self.in_memory()
            }
            Err(e) => {
                info!(reason = %e, "persisted store unavailable; using bundled data");
                self.in_memory()
            }
        }
    }

    fn in_memory(&self) -> Backend {
        Backend::InMemory(InMemoryIndex::new(Arc::clone(&self.data)))
    }
}

impl fmt::Debug for BackendSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decided = self
            .decision
            .read()
            .expect("lock poisoned")
            .as_ref()
            .map(|b| b.kind());
        f.debug_struct("BackendSelector")
            .field("decision", &decided)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basho_db::{seed, InMemoryTableStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    struct CountingProbe {
        inner: Box<dyn BackendProbe>,
        calls: Arc<AtomicUsize>,
    }

    impl BackendProbe for CountingProbe {
        fn probe(&self) -> DbResult<Arc<dyn TableStore>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.probe()
        }
    }

    fn data() -> Arc<DataStore> {
        Arc::new(DataStore::bundled())
    }

    fn seeded_store(data: &DataStore) -> Arc<dyn TableStore> {
        let store = InMemoryTableStore::new();
        seed(&store, data).unwrap();
        Arc::new(store)
    }

    #[test]
    fn no_store_selects_in_memory() {
        let selector = BackendSelector::new(data(), NoPersistedStore);
        assert_eq!(selector.kind(), BackendKind::InMemory);
        assert_eq!(selector.backend().index().prefectures().len(), 47);
    }

    #[test]
    fn seeded_store_selects_persisted() {
        let data = data();
        let store = seeded_store(&data);
        let selector = BackendSelector::new(data, StaticProbe(store));
        assert_eq!(selector.kind(), BackendKind::Persisted);
        assert_eq!(selector.backend().index().city("131016").unwrap().name, "千代田区");
    }

    #[test]
    fn missing_schema_selects_in_memory() {
        let store: Arc<dyn TableStore> = Arc::new(InMemoryTableStore::without_schema());
        let selector = BackendSelector::new(data(), StaticProbe(store));
        assert_eq!(selector.kind(), BackendKind::InMemory);
    }

    #[test]
    fn missing_snapshot_selects_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let selector = BackendSelector::new(data(), SnapshotProbe::new(dir.path().join("none.db")));
        assert_eq!(selector.kind(), BackendKind::InMemory);
    }

    #[test]
    fn seeded_snapshot_selects_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basho.db");
        let data = data();
        let store = SnapshotTableStore::create(&path).unwrap();
        seed(&store, &data).unwrap();
        drop(store);

        let selector = BackendSelector::new(data, SnapshotProbe::new(&path));
        assert_eq!(selector.kind(), BackendKind::Persisted);
        assert_eq!(selector.backend().index().prefectures().len(), 47);
    }

    #[test]
    fn decision_is_remembered_until_reset() {
        let calls = Arc::new(AtomicUsize::new(0));
        let probe = CountingProbe {
            inner: Box::new(NoPersistedStore),
            calls: Arc::clone(&calls),
        };
        let selector = BackendSelector::new(data(), probe);
        let first = selector.backend();
        let second = selector.backend();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        selector.reset();
        selector.backend();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn concurrent_first_calls_probe_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let probe = CountingProbe {
            inner: Box::new(NoPersistedStore),
            calls: Arc::clone(&calls),
        };
        let selector = Arc::new(BackendSelector::new(data(), probe));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let selector = Arc::clone(&selector);
                thread::spawn(move || selector.kind())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), BackendKind::InMemory);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn force_overrides_probe() {
        let data = data();
        let store = seeded_store(&data);
        let selector = BackendSelector::new(Arc::clone(&data), NoPersistedStore);
        selector.force(Backend::Persisted(PersistedIndex::new(store, data)));
        assert_eq!(selector.kind(), BackendKind::Persisted);
    }

    #[test]
    fn kind_display() {
        assert_eq!(BackendKind::InMemory.to_string(), "in-memory");
        assert_eq!(BackendKind::Persisted.to_string(), "persisted");
    }
}
