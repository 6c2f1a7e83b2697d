//! Filling address columns from a postal-code column.

use std::collections::BTreeMap;
use std::fmt;

use basho_index::Basho;
use basho_types::PostalCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RecordError, RecordResult};
use crate::record::{AddressRecord, ColumnValue, HostModel};

/// A value derivable from a postal code entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingKey {
    /// Prefecture name (e.g. "東京都").
    Prefecture,
    /// Municipality name as written in the postal data (e.g. "世田谷区").
    City,
    /// Town name (e.g. "上馬").
    Town,
    /// Numeric prefecture code.
    PrefectureCode,
    /// Municipality code, found by matching the municipality's full name.
    CityCode,
}

impl MappingKey {
    pub const ALL: [MappingKey; 5] = [
        Self::Prefecture,
        Self::City,
        Self::Town,
        Self::PrefectureCode,
        Self::CityCode,
    ];

    /// The value of this key for `postal`, or `Null` when it cannot be
    /// derived.
    pub fn resolve(self, basho: &Basho, postal: &PostalCode) -> ColumnValue {
        match self {
            Self::Prefecture => basho.prefecture_of_postal(postal).map(|p| p.name).into(),
            Self::City => postal.city_name.clone().into(),
            Self::Town => postal.town.clone().into(),
            Self::PrefectureCode => postal.prefecture_code.into(),
            Self::CityCode => basho.city_code_for_postal(postal).into(),
        }
    }
}

impl fmt::Display for MappingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Prefecture => "prefecture",
            Self::City => "city",
            Self::Town => "town",
            Self::PrefectureCode => "prefecture_code",
            Self::CityCode => "city_code",
        })
    }
}

/// Which host columns to fill from a postal-code column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalMapping {
    /// Column holding the postal code.
    pub column: String,
    /// Target column per derived value.
    #[serde(default)]
    pub targets: BTreeMap<MappingKey, String>,
}

impl PostalMapping {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            targets: BTreeMap::new(),
        }
    }

    /// Fill `target` with the value of `key`.
    pub fn map(mut self, key: MappingKey, target: impl Into<String>) -> Self {
        self.targets.insert(key, target.into());
        self
    }

    /// The postal entry named by the source column.
    pub fn postal_code(&self, basho: &Basho, record: &dyn AddressRecord) -> Option<PostalCode> {
        let code = record.get(&self.column).as_text()?;
        basho.postal_code(&code)
    }

    /// Prefecture name, municipality name, and town joined
    /// (e.g. "東京都世田谷区上馬"). An entry whose prefecture is unknown
    /// still yields an address, without the prefecture part.
    pub fn postal_address(&self, basho: &Basho, record: &dyn AddressRecord) -> Option<String> {
        let postal = self.postal_code(basho, record)?;
        let prefecture = basho
            .prefecture_of_postal(&postal)
            .map(|p| p.name)
            .unwrap_or_default();
        Some(format!("{prefecture}{}{}", postal.city_name, postal.town))
    }
}

/// A hook run on a record before the host persists it.
pub trait BeforeWrite: Send + Sync {
    fn before_write(&self, basho: &Basho, record: &mut dyn AddressRecord);
}

/// A [`PostalMapping`] validated against a host model.
///
/// Only [`install`](Self::install) constructs one, so a resolver never refers
/// to a column its model lacks.
#[derive(Clone, Debug)]
pub struct PostalAutoResolve {
    mapping: PostalMapping,
}

impl PostalAutoResolve {
    /// Validate `mapping` against `model`.
    ///
    /// # Errors
    ///
    /// - [`RecordError::NoBeforeWriteHook`] if the model runs no hooks
    /// - [`RecordError::EmptyMapping`] if no target column is named
    /// - [`RecordError::UnknownColumn`] for the first column the model lacks
    pub fn install(model: &dyn HostModel, mapping: PostalMapping) -> RecordResult<Self> {
        let model_name = model.model_name().to_string();
        if !model.supports_before_write() {
            return Err(RecordError::NoBeforeWriteHook { model: model_name });
        }
        if mapping.targets.is_empty() {
            return Err(RecordError::EmptyMapping { model: model_name });
        }
        let mut columns = std::iter::once(&mapping.column).chain(mapping.targets.values());
        if let Some(missing) = columns.find(|c| !model.has_column(c)) {
            return Err(RecordError::UnknownColumn {
                model: model_name,
                column: missing.clone(),
            });
        }
        debug!(
            model = %model_name,
            column = %mapping.column,
            targets = mapping.targets.len(),
            "installed postal auto-resolve"
        );
        Ok(Self { mapping })
    }

    pub fn mapping(&self) -> &PostalMapping {
        &self.mapping
    }
}

impl BeforeWrite for PostalAutoResolve {
    /// Fill every mapped column when the postal column is about to change.
    /// A missing or unknown postal code clears them.
    fn before_write(&self, basho: &Basho, record: &mut dyn AddressRecord) {
        if !record.will_save_change(&self.mapping.column) {
            return;
        }
        let postal = self.mapping.postal_code(basho, record);
        for (&key, target) in &self.mapping.targets {
            let value = match &postal {
                Some(postal) => key.resolve(basho, postal),
                None => ColumnValue::Null,
            };
            record.set(target, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tests::{MemoryRecord, Model};
    use basho_store::{bundled_data_dir, DataStore, DirectorySource, InMemorySource, OverlaySource};

    const COLUMNS: &[&str] = &[
        "postal_code",
        "pref_name",
        "city_name",
        "town_name",
        "pref_code",
        "cty_code",
    ];

    fn model() -> Model {
        Model::new("Address", true, COLUMNS)
    }

    fn names_mapping() -> PostalMapping {
        PostalMapping::new("postal_code")
            .map(MappingKey::Prefecture, "pref_name")
            .map(MappingKey::City, "city_name")
            .map(MappingKey::Town, "town_name")
    }

    fn changed(postal: ColumnValue) -> MemoryRecord {
        let mut record = MemoryRecord::with(&[("postal_code", postal)]);
        record.mark_changed("postal_code");
        record
    }

    #[test]
    fn fills_names_from_a_valid_code() {
        let basho = Basho::bundled();
        let resolver = PostalAutoResolve::install(&model(), names_mapping()).unwrap();
        let mut record = changed("1540011".into());
        resolver.before_write(&basho, &mut record);

        assert_eq!(record.get("pref_name"), ColumnValue::from("東京都"));
        assert_eq!(record.get("city_name"), ColumnValue::from("世田谷区"));
        assert_eq!(record.get("town_name"), ColumnValue::from("上馬"));
    }

    #[test]
    fn hyphenated_code_resolves() {
        let basho = Basho::bundled();
        let resolver = PostalAutoResolve::install(&model(), names_mapping()).unwrap();
        let mut record = changed("154-0011".into());
        resolver.before_write(&basho, &mut record);
        assert_eq!(record.get("town_name"), ColumnValue::from("上馬"));
    }

    #[test]
    fn unchanged_postal_column_leaves_targets_alone() {
        let basho = Basho::bundled();
        let resolver = PostalAutoResolve::install(&model(), names_mapping()).unwrap();
        let mut record = MemoryRecord::with(&[
            ("postal_code", "1540011".into()),
            ("pref_name", "既存値".into()),
        ]);
        resolver.before_write(&basho, &mut record);
        assert_eq!(record.get("pref_name"), ColumnValue::from("既存値"));
    }

    #[test]
    fn null_code_clears_targets() {
        let basho = Basho::bundled();
        let resolver = PostalAutoResolve::install(&model(), names_mapping()).unwrap();
        let mut record = changed(ColumnValue::Null);
        record.set("pref_name", "既存値".into());
        resolver.before_write(&basho, &mut record);

        for column in ["pref_name", "city_name", "town_name"] {
            assert!(record.get(column).is_null(), "{column} should be null");
        }
    }

    #[test]
    fn unknown_code_clears_targets() {
        let basho = Basho::bundled();
        let resolver = PostalAutoResolve::install(&model(), names_mapping()).unwrap();
        for code in ["0000000", "123", "abcdefg"] {
            let mut record = changed(code.into());
            resolver.before_write(&basho, &mut record);
            assert!(record.get("pref_name").is_null());
            assert!(record.get("town_name").is_null());
        }
    }

    #[test]
    fn partial_mapping_touches_only_its_target() {
        let basho = Basho::bundled();
        let mapping = PostalMapping::new("postal_code").map(MappingKey::Prefecture, "pref_name");
        let resolver = PostalAutoResolve::install(&model(), mapping).unwrap();
        let mut record = changed("1540011".into());
        resolver.before_write(&basho, &mut record);

        assert_eq!(record.get("pref_name"), ColumnValue::from("東京都"));
        assert!(record.get("city_name").is_null());
        assert!(!record.was_set("city_name"));
    }

    #[test]
    fn code_mapping_writes_codes() {
        let basho = Basho::bundled();
        let mapping = PostalMapping::new("postal_code")
            .map(MappingKey::PrefectureCode, "pref_code")
            .map(MappingKey::CityCode, "cty_code");
        let resolver = PostalAutoResolve::install(&model(), mapping).unwrap();
        let mut record = changed("1540011".into());
        resolver.before_write(&basho, &mut record);

        assert_eq!(record.get("pref_code"), ColumnValue::Integer(13));
        let city_code = record.get("cty_code").as_text().unwrap();
        assert!(city_code.starts_with("13"));
        assert_eq!(basho.city(&city_code).unwrap().name, "世田谷区");
    }

    #[test]
    fn county_town_city_code_matches_full_name() {
        let basho = Basho::bundled();
        let mapping = PostalMapping::new("postal_code").map(MappingKey::CityCode, "cty_code");
        let resolver = PostalAutoResolve::install(&model(), mapping).unwrap();
        let mut record = changed("901-0401".into());
        resolver.before_write(&basho, &mut record);
        assert_eq!(record.get("cty_code"), ColumnValue::from("473626"));
    }

    #[test]
    fn install_requires_before_write_support() {
        let model = Model::new("PlainStruct", false, COLUMNS);
        let err = PostalAutoResolve::install(&model, names_mapping()).unwrap_err();
        assert!(matches!(
            err,
            RecordError::NoBeforeWriteHook { ref model } if model == "PlainStruct"
        ));
        assert_eq!(err.to_string(), "PlainStruct does not support before-write hooks");
    }

    #[test]
    fn install_rejects_empty_mapping() {
        let err =
            PostalAutoResolve::install(&model(), PostalMapping::new("postal_code")).unwrap_err();
        assert!(matches!(err, RecordError::EmptyMapping { .. }));
    }

    #[test]
    fn install_rejects_missing_columns() {
        let mapping = PostalMapping::new("zip").map(MappingKey::Town, "town_name");
        let err = PostalAutoResolve::install(&model(), mapping).unwrap_err();
        assert!(matches!(
            err,
            RecordError::UnknownColumn { ref column, .. } if column == "zip"
        ));

        let mapping = PostalMapping::new("postal_code").map(MappingKey::Town, "street");
        let err = PostalAutoResolve::install(&model(), mapping).unwrap_err();
        assert!(matches!(
            err,
            RecordError::UnknownColumn { ref column, .. } if column == "street"
        ));
    }

    #[test]
    fn postal_address_joins_parts() {
        let basho = Basho::bundled();
        let record = MemoryRecord::with(&[("postal_code", "1540011".into())]);
        assert_eq!(
            names_mapping().postal_address(&basho, &record).as_deref(),
            Some("東京都世田谷区上馬")
        );
        assert!(names_mapping()
            .postal_address(&basho, &MemoryRecord::default())
            .is_none());
    }

    #[test]
    fn postal_address_without_known_prefecture() {
        let overlay = InMemorySource::new()
            .with_json(
                "postal_codes/999.json",
                &serde_json::json!([
                    {"code": "9990001", "prefecture_code": 0, "city_name": "無名市", "town": "本町"}
                ]),
            )
            .unwrap();
        let data = DataStore::new(OverlaySource::new(
            overlay,
            DirectorySource::new(bundled_data_dir()),
        ));
        let basho = Basho::in_memory(Arc::new(data));
        let record = MemoryRecord::with(&[("postal_code", "999-0001".into())]);
        assert_eq!(
            names_mapping().postal_address(&basho, &record).as_deref(),
            Some("無名市本町")
        );
    }

    #[test]
    fn mapping_deserializes_from_config() {
        let mapping: PostalMapping = serde_json::from_str(
            r#"{"column":"postal_code","targets":{"prefecture":"pref_name","city_code":"cty_code"}}"#,
        )
        .unwrap();
        assert_eq!(mapping.targets[&MappingKey::Prefecture], "pref_name");
        assert_eq!(mapping.targets[&MappingKey::CityCode], "cty_code");
        assert_eq!(MappingKey::ALL.len(), 5);
        assert_eq!(MappingKey::CityCode.to_string(), "city_code");
    }
}
