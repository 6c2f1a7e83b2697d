//! Host-side traits: column values, records, and model descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A value read from or written to a host record column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Text(String),
    Integer(i64),
    #[default]
    Null,
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The value as text, if it is not null. Integers are formatted in decimal.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Integer(n) => Some(n.to_string()),
            Self::Null => None,
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Null => f.write_str("NULL"),
        }
    }
}

impl From<&str> for ColumnValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ColumnValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<u8> for ColumnValue {
    fn from(n: u8) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl<T: Into<ColumnValue>> From<Option<T>> for ColumnValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A single host record with named columns.
pub trait AddressRecord {
    /// Current value of `column`; [`ColumnValue::Null`] if unset or unknown.
    fn get(&self, column: &str) -> ColumnValue;

    /// Assign `column`.
    fn set(&mut self, column: &str, value: ColumnValue);

    /// Returns `true` if `column` has a pending change that the next write
    /// will persist.
    fn will_save_change(&self, column: &str) -> bool;
}

/// Describes a host record type.
pub trait HostModel {
    fn model_name(&self) -> &str;

    /// Returns `true` if the host runs [`BeforeWrite`](crate::BeforeWrite)
    /// hooks before persisting a record.
    fn supports_before_write(&self) -> bool;

    fn has_column(&self, name: &str) -> bool;
}
