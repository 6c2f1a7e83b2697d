use serde::{Deserialize, Serialize};

use crate::code::POSTAL_PREFIX_LEN;

/// A postal code entry for a single town.
///
/// Several entries may share one `code`. `city_name` is free text matched
/// against [`City::full_name`](crate::City::full_name), not a foreign key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostalCode {
    /// Seven digits without a hyphen (e.g. "1540011").
    pub code: String,
    pub prefecture_code: u8,
    /// Municipality name, including the county for towns (e.g. "世田谷区").
    pub city_name: String,
    /// Town name (e.g. "上馬").
    pub town: String,
}

impl PostalCode {
    /// The code with a hyphen after the third digit (e.g. "154-0011").
    pub fn formatted_code(&self) -> String {
        match (self.code.get(..POSTAL_PREFIX_LEN), self.code.get(POSTAL_PREFIX_LEN..)) {
            (Some(head), Some(tail)) => format!("{head}-{tail}"),
            _ => self.code.clone(),
        }
    }

    /// The shard prefix this entry is stored under (e.g. "154").
    pub fn prefix(&self) -> &str {
        self.code.get(..POSTAL_PREFIX_LEN).unwrap_or(&self.code)
    }
}
