//! Municipality merger chains.
//!
//! A deprecated municipality may name a successor, which may itself have been
//! merged away. Successor links come from external data and can loop, so every
//! walk keeps a set of codes already followed and stops at the first repeat.

use std::collections::HashSet;

use basho_types::City;
use serde::Serialize;

use crate::index::GeoIndex;

/// How a municipality stands with respect to mergers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", content = "successor_code", rename_all = "snake_case")]
pub enum MergeState {
    Active,
    /// Merged into the municipality with this code, which resolves.
    DeprecatedWithSuccessor(String),
    /// Merged away with no successor, or one that does not resolve.
    DeprecatedWithoutSuccessor,
}

/// One hop along the chain. `None` if there is no successor code or it does
/// not resolve.
pub fn successor(index: &dyn GeoIndex, city: &City) -> Option<City> {
    city.successor_code.as_deref().and_then(|code| index.city(code))
}

/// Every municipality visited walking the chain from `city`, starting with
/// `city` itself.
///
/// The walk follows a successor code only if it has not been followed before
/// and stops when a code fails to resolve.
pub fn chain(index: &dyn GeoIndex, city: &City) -> Vec<City> {
    let mut visited = vec![city.clone()];
    let mut seen = HashSet::new();
    loop {
        let Some(next_code) = visited.last().and_then(|c| c.successor_code.clone()) else {
            break;
        };
        if !seen.insert(next_code.clone()) {
            break;
        }
        match index.city(&next_code) {
            Some(next) => visited.push(next),
            None => break,
        }
    }
    visited
}

/// The municipality at the end of the chain.
///
/// A city without a successor code is returned as is. On an unresolvable
/// link the last resolved city is returned; on a loop, the city reached when
/// the repeat was detected.
pub fn current(index: &dyn GeoIndex, city: &City) -> City {
    if city.successor_code.is_none() {
        return city.clone();
    }
    chain(index, city).pop().unwrap_or_else(|| city.clone())
}

/// Classify `city`.
pub fn merge_state(index: &dyn GeoIndex, city: &City) -> MergeState {
    if city.is_active() {
        return MergeState::Active;
    }
    match successor(index, city) {
        Some(next) => MergeState::DeprecatedWithSuccessor(next.code),
        None => MergeState::DeprecatedWithoutSuccessor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryIndex;
    use basho_store::{bundled_data_dir, DataStore, DirectorySource, InMemorySource, OverlaySource};
    use serde_json::json;
    use std::sync::Arc;

    fn deprecated(code: &str, successor: Option<&str>) -> serde_json::Value {
        json!({
            "code": code,
            "prefecture_code": code[..2].parse::<u8>().unwrap(),
            "name": format!("旧{code}"),
            "name_kana": "キュウ",
            "deprecated_at": "2006-03-20",
            "successor_code": successor,
        })
    }

    fn index_with(deprecated_cities: Vec<serde_json::Value>) -> InMemoryIndex {
        let overlay = InMemorySource::new()
            .with_json("deprecated_cities.json", &deprecated_cities)
            .unwrap();
        let source = OverlaySource::new(overlay, DirectorySource::new(bundled_data_dir()));
        InMemoryIndex::new(Arc::new(DataStore::new(source)))
    }

    fn codes(cities: &[City]) -> Vec<&str> {
        cities.iter().map(|c| c.code.as_str()).collect()
    }

    #[test]
    fn active_city_is_its_own_current() {
        let index = index_with(vec![]);
        let chiyoda = index.city("131016").unwrap();
        assert_eq!(current(&index, &chiyoda), chiyoda);
        assert_eq!(codes(&chain(&index, &chiyoda)), vec!["131016"]);
        assert!(successor(&index, &chiyoda).is_none());
        assert_eq!(merge_state(&index, &chiyoda), MergeState::Active);
    }

    #[test]
    fn two_hop_chain_reaches_active_city() {
        let index = index_with(vec![
            deprecated("130001", Some("130002")),
            deprecated("130002", Some("131016")),
        ]);
        let start = index.city("130001").unwrap();
        assert!(start.is_deprecated());
        assert_eq!(successor(&index, &start).unwrap().code, "130002");
        assert_eq!(current(&index, &start).code, "131016");
        let middle = index.city("130002").unwrap();
        assert_eq!(current(&index, &middle).code, "131016");
        assert_eq!(codes(&chain(&index, &start)), vec!["130001", "130002", "131016"]);
        assert_eq!(
            merge_state(&index, &start),
            MergeState::DeprecatedWithSuccessor("130002".into())
        );
    }

    #[test]
    fn two_cycle_terminates() {
        let index = index_with(vec![
            deprecated("130001", Some("130002")),
            deprecated("130002", Some("130001")),
        ]);
        let start = index.city("130001").unwrap();
        assert_eq!(current(&index, &start).code, "130001");
        assert_eq!(codes(&chain(&index, &start)), vec!["130001", "130002", "130001"]);
    }

    #[test]
    fn self_loop_terminates() {
        let index = index_with(vec![deprecated("130001", Some("130001"))]);
        let start = index.city("130001").unwrap();
        assert_eq!(current(&index, &start).code, "130001");
    }

    #[test]
    fn unresolvable_successor_stops_at_last_resolved() {
        let index = index_with(vec![
            deprecated("130001", Some("130002")),
            deprecated("130002", Some("999999")),
        ]);
        let start = index.city("130001").unwrap();
        assert_eq!(current(&index, &start).code, "130002");

        let dangling = index.city("130002").unwrap();
        assert!(successor(&index, &dangling).is_none());
        assert_eq!(
            merge_state(&index, &dangling),
            MergeState::DeprecatedWithoutSuccessor
        );
    }

    #[test]
    fn deprecated_without_successor_code() {
        let index = index_with(vec![deprecated("130001", None)]);
        let start = index.city("130001").unwrap();
        assert_eq!(current(&index, &start), start);
        assert_eq!(merge_state(&index, &start), MergeState::DeprecatedWithoutSuccessor);
    }

    #[test]
    fn merge_state_serializes_tagged() {
        let value =
            serde_json::to_value(MergeState::DeprecatedWithSuccessor("131016".into())).unwrap();
        assert_eq!(
            value,
            json!({"state": "deprecated_with_successor", "successor_code": "131016"})
        );
        assert_eq!(
            serde_json::to_value(MergeState::Active).unwrap(),
            json!({"state": "active"})
        );
    }
}
