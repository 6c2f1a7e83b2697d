//! Shard sources: where dataset bytes come from.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// A read-only source of shard bytes, addressed by relative path.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait ShardSource: Send + Sync {
    /// Read the shard at `relative_path`.
    ///
    /// Returns `Ok(None)` if the shard does not exist or lies outside the
    /// source. Returns `Err` only on I/O failure of an existing shard.
    fn read(&self, relative_path: &str) -> StoreResult<Option<Vec<u8>>>;
}

/// Shards stored as files under a root directory.
///
/// Every resolved path must stay inside the root: relative paths with `..`,
/// absolute paths, and symlinks leading outside the root are all treated as
/// missing.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The dataset root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative_path: &str) -> Option<PathBuf> {
        let relative = Path::new(relative_path);
        if relative_path.is_empty()
            || !relative.components().all(|c| matches!(c, Component::Normal(_)))
        {
            debug!(path = relative_path, "rejected shard path outside dataset root");
            return None;
        }

        let root = self.root.canonicalize().ok()?;
        let resolved = root.join(relative).canonicalize().ok()?;
        if resolved.starts_with(&root) && resolved.is_file() {
            Some(resolved)
        } else {
            debug!(path = relative_path, "shard path resolves outside dataset root");
            None
        }
    }
}

impl ShardSource for DirectorySource {
    fn read(&self, relative_path: &str) -> StoreResult<Option<Vec<u8>>> {
        let Some(path) = self.resolve(relative_path) else {
            return Ok(None);
        };
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

/// Shards held in memory, keyed by relative path.
#[derive(Clone, Default)]
pub struct InMemorySource {
    shards: HashMap<String, Vec<u8>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes at `relative_path`.
    pub fn insert(&mut self, relative_path: impl Into<String>, bytes: Vec<u8>) {
        self.shards.insert(relative_path.into(), bytes);
    }

    /// Serialize `records` as JSON and store them at `relative_path`.
    pub fn insert_json<T: Serialize + ?Sized>(
        &mut self,
        relative_path: impl Into<String>,
        records: &T,
    ) -> StoreResult<()> {
        let path = relative_path.into();
        let bytes = serde_json::to_vec(records).map_err(|e| StoreError::Serialization {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        self.shards.insert(path, bytes);
        Ok(())
    }

    /// Builder form of [`insert_json`](Self::insert_json).
    pub fn with_json<T: Serialize + ?Sized>(
        mut self,
        relative_path: impl Into<String>,
        records: &T,
    ) -> StoreResult<Self> {
        self.insert_json(relative_path, records)?;
        Ok(self)
    }

    /// Number of shards held.
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    /// Returns `true` if no shards are held.
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }
}

impl ShardSource for InMemorySource {
    fn read(&self, relative_path: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.shards.get(relative_path).cloned())
    }
}

impl fmt::Debug for InMemorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemorySource")
            .field("shard_count", &self.shards.len())
            .finish()
    }
}

/// An in-memory layer shadowing another source shard by shard.
///
/// Useful for replacing one dataset (say, the deprecated municipalities)
/// while keeping the rest of the bundled data.
pub struct OverlaySource {
    overlay: InMemorySource,
    base: Box<dyn ShardSource>,
}

impl OverlaySource {
    pub fn new(overlay: InMemorySource, base: impl ShardSource + 'static) -> Self {
        Self {
            overlay,
            base: Box::new(base),
        }
    }
}

impl ShardSource for OverlaySource {
    fn read(&self, relative_path: &str) -> StoreResult<Option<Vec<u8>>> {
        match self.overlay.read(relative_path)? {
            Some(bytes) => Ok(Some(bytes)),
            None => self.base.read(relative_path),
        }
    }
}

impl fmt::Debug for OverlaySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlaySource")
            .field("overlay", &self.overlay)
            .finish_non_exhaustive()
    }
}
