//! Address columns on host records.
//!
//! A host (an ORM model, a form struct, a table row) implements
//! [`AddressRecord`] for its records and [`HostModel`] for its schema. Two
//! mappings are provided on top:
//!
//! - [`CityBinding`] -- a column holding a municipality code, resolved to its
//!   municipality, prefecture, and full address
//! - [`PostalMapping`] -- a column holding a postal code whose derived values
//!   are copied into other columns by a [`PostalAutoResolve`] hook
//!
//! Misconfiguration is reported once, when the hook is installed, never while
//! records are written.

pub mod binding;
pub mod error;
pub mod postal;
pub mod record;

pub use binding::CityBinding;
pub use error::{RecordError, RecordResult};
pub use postal::{BeforeWrite, MappingKey, PostalAutoResolve, PostalMapping};
pub use record::{AddressRecord, ColumnValue, HostModel};
