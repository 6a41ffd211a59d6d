use proptest::prelude::*;
use std::collections::BTreeMap;
use worldex_core::{
    CanonicalStore, CountryCode, MergePolicy, Observed, SourceFieldMap, merge, select_latest,
};

const CODES: [&str; 5] = ["FRA", "DEU", "USA", "CZE", "KEN"];
const FIELDS: [&str; 4] = ["gdpGrowth", "population", "inflation", "milexPctGDP"];

fn arb_map() -> impl Strategy<Value = SourceFieldMap> {
    proptest::collection::vec(
        (0..CODES.len(), 0..FIELDS.len(), -1000i32..1000i32, 1990i32..2026i32),
        0..30,
    )
    .prop_map(|entries| {
        let mut m = SourceFieldMap::new();
        for (c, f, v, y) in entries {
            let code = CountryCode::parse(CODES[c]).unwrap();
            m.insert(code, FIELDS[f], Observed::new(f64::from(v) / 10.0, y.to_string()));
        }
        m
    })
}

proptest! {
    #[test]
    fn fill_only_replay_adds_nothing(map in arb_map()) {
        let mut store = CanonicalStore::new();
        let first = merge(&mut store, &map, MergePolicy::FillOnly);
        prop_assert_eq!(first.added, map.field_count());
        let snapshot = store.clone();
        let second = merge(&mut store, &map, MergePolicy::FillOnly);
        prop_assert_eq!(second.added, 0);
        prop_assert_eq!(store, snapshot);
    }

    #[test]
    fn fill_only_never_changes_present_values(maps in proptest::collection::vec(arb_map(), 1..5)) {
        let mut store = CanonicalStore::new();
        let mut first_seen: BTreeMap<(String, String), Observed> = BTreeMap::new();
        for m in &maps {
            for (code, fields) in m.iter() {
                for (f, obs) in fields {
                    first_seen
                        .entry((code.to_string(), f.clone()))
                        .or_insert_with(|| obs.clone());
                }
            }
            merge(&mut store, m, MergePolicy::FillOnly);
        }
        for ((code, field), obs) in &first_seen {
            prop_assert_eq!(store.field(code, field), Some(obs));
        }
        prop_assert_eq!(store.field_count(), first_seen.len());
    }

    #[test]
    fn overwrite_leaves_store_equal_to_last_writer(a in arb_map(), b in arb_map()) {
        let mut store = CanonicalStore::new();
        merge(&mut store, &a, MergePolicy::Overwrite);
        merge(&mut store, &b, MergePolicy::Overwrite);
        for (code, fields) in b.iter() {
            for (f, obs) in fields {
                prop_assert_eq!(store.field(code.as_str(), f), Some(obs));
            }
        }
        prop_assert_eq!(merge(&mut store, &b, MergePolicy::Overwrite).added, 0);
    }

    #[test]
    fn selector_never_returns_a_year_past_cutoff(
        obs in proptest::collection::vec((1990i32..2040i32, proptest::option::of(-100i32..100i32)), 0..20),
        cutoff in 1995i32..2035i32,
    ) {
        let pairs: Vec<(String, Option<f64>)> = obs
            .iter()
            .map(|(y, v)| (y.to_string(), v.map(f64::from)))
            .collect();
        let best_year = obs
            .iter()
            .filter(|(y, v)| *y <= cutoff && v.is_some())
            .map(|(y, _)| *y)
            .max();
        let picked = select_latest(pairs, cutoff);
        prop_assert_eq!(picked.map(|o| o.year), best_year.map(|y| y.to_string()));
    }
}
