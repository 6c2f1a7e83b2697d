//! Persisted table store for basho.
//!
//! A table store holds two tables with the same query shapes as the bundled
//! datasets:
//!
//! - `basho_prefectures` -- one row per prefecture, keyed by code
//! - `basho_cities` -- one row per municipality (active and deprecated),
//!   keyed by municipality code
//!
//! Postal codes are not persisted; they are always served from the bundled
//! shards.
//!
//! # Modules
//!
//! - [`error`] -- Error types for table operations
//! - [`rows`] -- Row types: [`PrefectureRow`], [`CityRow`]
//! - [`traits`] -- The [`TableStore`] trait
//! - [`memory`] -- [`InMemoryTableStore`] for tests and embedding
//! - [`snapshot`] -- [`SnapshotTableStore`], tables persisted to one file
//! - [`seed`] -- copy the bundled datasets into a store

pub mod error;
pub mod memory;
pub mod rows;
pub mod seed;
pub mod snapshot;
pub mod traits;

pub use error::{DbError, DbResult};
pub use memory::InMemoryTableStore;
pub use rows::{CityRow, PrefectureRow, Tables};
pub use seed::{seed, SeedReport};
pub use snapshot::SnapshotTableStore;
pub use traits::{PrefectureKey, TableStore, CITIES_TABLE, PREFECTURES_TABLE};
