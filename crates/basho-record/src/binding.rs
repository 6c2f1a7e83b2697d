//! Resolving a municipality-code column on a host record.

use basho_index::Basho;
use basho_types::{City, Prefecture};

use crate::record::AddressRecord;

/// Binds a host column holding a municipality code to its [`City`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CityBinding {
    column: String,
}

impl CityBinding {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// The municipality named by the column, if it is set and resolves.
    pub fn city(&self, basho: &Basho, record: &dyn AddressRecord) -> Option<City> {
        let code = record.get(&self.column).as_text()?;
        basho.city(&code)
    }

    pub fn prefecture(&self, basho: &Basho, record: &dyn AddressRecord) -> Option<Prefecture> {
        let city = self.city(basho, record)?;
        basho.prefecture_of(&city)
    }

    /// Prefecture name followed by municipality name (e.g. "東京都千代田区").
    pub fn full_address(&self, basho: &Basho, record: &dyn AddressRecord) -> Option<String> {
        let city = self.city(basho, record)?;
        let prefecture = basho.prefecture_of(&city)?;
        Some(format!("{}{}", prefecture.name, city.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ColumnValue;
    use crate::tests::MemoryRecord;

    #[test]
    fn resolves_city_and_prefecture() {
        let basho = Basho::bundled();
        let binding = CityBinding::new("city_code");
        let record = MemoryRecord::with(&[("city_code", ColumnValue::from("131016"))]);

        assert_eq!(binding.city(&basho, &record).unwrap().name, "千代田区");
        assert_eq!(binding.prefecture(&basho, &record).unwrap().name, "東京都");
        assert_eq!(
            binding.full_address(&basho, &record).as_deref(),
            Some("東京都千代田区")
        );
    }

    #[test]
    fn unset_or_unknown_code_is_none() {
        let basho = Basho::bundled();
        let binding = CityBinding::new("city_code");

        let empty = MemoryRecord::default();
        assert!(binding.city(&basho, &empty).is_none());
        assert!(binding.full_address(&basho, &empty).is_none());

        let unknown = MemoryRecord::with(&[("city_code", ColumnValue::from("999999"))]);
        assert!(binding.prefecture(&basho, &unknown).is_none());
    }
}
