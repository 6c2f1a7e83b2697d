//! Copy the bundled datasets into a [`TableStore`].

use basho_store::DataStore;
use basho_types::code::PREFECTURE_CODES;
use serde::Serialize;
use tracing::info;

use crate::error::DbResult;
use crate::rows::{CityRow, PrefectureRow};
use crate::traits::TableStore;

/// Row counts written by [`seed`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub prefectures: usize,
    /// Active and deprecated municipalities together.
    pub cities: usize,
}

/// Replace the contents of `store` with every prefecture and municipality in
/// `data`.
///
/// Deprecated municipalities are written alongside active ones so successor
/// lookups behave the same against the persisted tables. Rows are replaced in
/// one [`replace_all`](TableStore::replace_all) call; a failure leaves the
/// previous contents in place.
pub fn seed(store: &dyn TableStore, data: &DataStore) -> DbResult<SeedReport> {
    let prefectures: Vec<PrefectureRow> = data
        .prefectures()
        .iter()
        .cloned()
        .map(PrefectureRow::from)
        .collect();

    let mut cities: Vec<CityRow> = Vec::new();
    for code in PREFECTURE_CODES {
        cities.extend(data.cities(code).iter().cloned().map(CityRow::from));
    }
    let active = cities.len();
    cities.extend(data.deprecated_cities().iter().cloned().map(CityRow::from));

    let report = SeedReport {
        prefectures: prefectures.len(),
        cities: cities.len(),
    };
    store.replace_all(prefectures, cities)?;

    info!(
        prefectures = report.prefectures,
        active,
        deprecated = report.cities - active,
        "seeded table store"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryTableStore;
    use crate::snapshot::SnapshotTableStore;
    use crate::traits::PrefectureKey;
    use basho_store::{bundled_data_dir, DirectorySource, InMemorySource, OverlaySource};
    use serde_json::json;

    #[test]
    fn seeds_bundled_data() {
        let store = InMemoryTableStore::without_schema();
        let data = DataStore::bundled();
        let report = seed(&store, &data).unwrap();

        assert_eq!(report.prefectures, 47);
        assert!(report.cities >= 47);
        assert!(store.has_schema().unwrap());

        let tokyo = store.find_prefecture(PrefectureKey::Code(13)).unwrap().unwrap();
        assert_eq!(tokyo.capital_code, "131041");
        let chiyoda = store.find_city("131016").unwrap().unwrap();
        assert_eq!(chiyoda.name, "千代田区");
        assert_eq!(
            store.cities_in_prefecture(13).unwrap().len(),
            data.cities(13).len()
        );
    }

    #[test]
    fn seeding_twice_replaces_rows() {
        let store = InMemoryTableStore::new();
        let data = DataStore::bundled();
        let first = seed(&store, &data).unwrap();
        let second = seed(&store, &data).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.all_prefectures().unwrap().len(), 47);
    }

    #[test]
    fn deprecated_rows_are_persisted_but_not_listed() {
        let overlay = InMemorySource::new()
            .with_json(
                "deprecated_cities.json",
                &json!([{
                    "code": "130001",
                    "prefecture_code": 13,
                    "name": "旧区",
                    "name_kana": "キュウク",
                    "deprecated_at": "2005-04-01",
                    "successor_code": "131016"
                }]),
            )
            .unwrap();
        let data = DataStore::new(OverlaySource::new(
            overlay,
            DirectorySource::new(bundled_data_dir()),
        ));
        let store = InMemoryTableStore::new();
        let report = seed(&store, &data).unwrap();

        let row = store.find_city("130001").unwrap().unwrap();
        assert_eq!(row.successor_code.as_deref(), Some("131016"));
        assert!(!row.is_active());
        assert!(store
            .cities_in_prefecture(13)
            .unwrap()
            .iter()
            .all(|c| c.code != "130001"));
        let active: usize = PREFECTURE_CODES
            .map(|code| store.cities_in_prefecture(code).unwrap().len())
            .sum();
        assert_eq!(report.cities, active + 1);
    }

    #[test]
    fn seeds_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basho.db");
        let store = SnapshotTableStore::create(&path).unwrap();
        seed(&store, &DataStore::bundled()).unwrap();
        drop(store);

        let reopened = SnapshotTableStore::open(&path).unwrap();
        assert_eq!(reopened.all_prefectures().unwrap().len(), 47);
        assert!(reopened.find_city("011002").unwrap().unwrap().capital);
    }
}
