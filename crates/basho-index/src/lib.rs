//! Lookups over Japanese administrative geography.
//!
//! Every query goes through the [`GeoIndex`] trait, which has two
//! implementations with identical observable results:
//!
//! - [`InMemoryIndex`] -- reads the bundled datasets through a
//!   [`DataStore`](basho_store::DataStore)
//! - [`PersistedIndex`] -- queries a seeded [`TableStore`](basho_db::TableStore)
//!
//! The [`BackendSelector`] picks one on first use and remembers the choice.
//! [`Basho`] wraps the selector with relationship hops (region, capital,
//! prefecture of a postal code) and merger walks from [`merger`].
//!
//! # Usage
//!
//! ```no_run
//! use basho_index::Basho;
//!
//! let basho = Basho::bundled();
//! let tokyo = basho.prefecture(13).unwrap();
//! let capital = basho.capital_of(&tokyo).unwrap();
//! assert_eq!(capital.name, "新宿区");
//! ```

pub mod backend;
pub mod basho;
pub mod error;
pub mod index;
pub mod memory;
pub mod merger;
pub mod persisted;

pub use backend::{
    Backend, BackendKind, BackendProbe, BackendSelector, NoPersistedStore, SnapshotProbe,
    StaticProbe,
};
pub use basho::{Basho, CapitalMismatch};
pub use error::{IndexError, IndexResult};
pub use index::GeoIndex;
pub use memory::InMemoryIndex;
pub use merger::MergeState;
pub use persisted::PersistedIndex;
