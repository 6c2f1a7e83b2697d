//! Lazy, memoized access to the basho datasets.
//!
//! The datasets are plain JSON files, one per shard:
//!
//! - `prefectures.json` -- all 47 prefectures
//! - `cities/NN.json` -- active municipalities of prefecture `NN` (zero-padded)
//! - `deprecated_cities.json` -- municipalities that were merged away
//! - `postal_codes/NNN.json` -- postal codes sharing the prefix `NNN`
//!
//! # Sources
//!
//! All shard reads go through the [`ShardSource`] trait:
//!
//! - [`DirectorySource`] -- files under a root directory, confined to it
//! - [`InMemorySource`] -- a path → bytes map for tests and embedding
//! - [`OverlaySource`] -- an in-memory layer over another source
//!
//! # Rules
//!
//! 1. A shard is read at most once until [`DataStore::reset`].
//! 2. Missing, unreadable, or malformed shards are empty, never errors.
//! 3. Paths escaping the source root behave as missing.

pub mod error;
pub mod shard;
pub mod source;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use shard::Shard;
pub use source::{DirectorySource, InMemorySource, OverlaySource, ShardSource};
pub use store::{bundled_data_dir, DataStore};
