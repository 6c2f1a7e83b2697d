use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use basho_index::{Basho, NoPersistedStore, SnapshotProbe};
use basho_store::DataStore;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Default `Cache-Control` max-age for list responses: 24 hours.
pub const DEFAULT_CACHE_MAX_AGE: u64 = 86_400;

/// Server settings, loadable from TOML. Every field is optional in the file.
///
/// ```toml
/// bind_addr = "0.0.0.0:8080"
/// data_dir = "/srv/basho/data"
/// snapshot_path = "/srv/basho/basho.db"
/// cache_max_age = 3600
/// cors = false
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Dataset root; the bundled datasets when unset.
    pub data_dir: Option<PathBuf>,
    /// Seeded snapshot to serve from; the datasets alone when unset.
    pub snapshot_path: Option<PathBuf>,
    /// Seconds list responses may be cached publicly.
    pub cache_max_age: u64,
    /// Allow cross-origin requests from any origin.
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 3000)),
            data_dir: None,
            snapshot_path: None,
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
            cors: true,
        }
    }
}

impl ServerConfig {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| ServerError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// The `Cache-Control` value for cacheable responses.
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.cache_max_age)
    }

    /// Build the lookup facade these settings describe.
    pub fn open_basho(&self) -> Basho {
        let data = Arc::new(match &self.data_dir {
            Some(dir) => DataStore::open(dir),
            None => DataStore::bundled(),
        });
        match &self.snapshot_path {
            Some(path) => Basho::new(data, SnapshotProbe::new(path)),
            None => Basho::new(data, NoPersistedStore),
        }
    }
}
