//! Foundation types for basho.
//!
//! This crate provides the immutable records that make up Japanese
//! administrative geography, plus the pure code arithmetic every other basho
//! crate relies on. Every other basho crate depends on `basho-types`.
//!
//! # Key Types
//!
//! - [`Region`] -- one of the nine fixed geographic groupings of prefectures
//! - [`Prefecture`] -- one of the 47 first-level divisions
//! - [`City`] -- a municipality (city, ward, town, or village), possibly deprecated
//! - [`PostalCode`] -- a 7-digit postal code entry for a single town
//! - [`code`] -- municipality check digits and code normalization

pub mod city;
pub mod code;
pub mod error;
pub mod postal;
pub mod prefecture;
pub mod region;

pub use city::City;
pub use error::TypeError;
pub use postal::PostalCode;
pub use prefecture::{Prefecture, PrefectureType};
pub use region::Region;
