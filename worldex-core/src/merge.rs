//! Folding a source's field map into the canonical store.

use crate::types::{CanonicalStore, MergePolicy, SourceFieldMap};

/// Counts from one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Fields written that were absent before, or (overwrite) whose value or year changed.
    pub added: usize,
    /// Of `added`, fields that replaced an existing observation.
    pub changed: usize,
    /// Countries with at least one write.
    pub countries_touched: usize,
}

/// Merge `source` into `store` under `policy`.
///
/// - `FillOnly` writes a field only when the record lacks it; a stored zero is present.
/// - `Overwrite` writes every field and counts those that were absent or differed.
///
/// Countries missing from the store are created. Replaying a map under `FillOnly`
/// returns `added == 0`.
pub fn merge(store: &mut CanonicalStore, source: &SourceFieldMap, policy: MergePolicy) -> MergeOutcome {
    let mut out = MergeOutcome::default();
    for (code, fields) in source.iter() {
        let record = store.record_mut(code.clone());
        let mut touched = false;
        for (name, obs) in fields {
            match policy {
                MergePolicy::FillOnly => {
                    if record.contains(name) {
                        continue;
                    }
                    record.insert(name.clone(), obs.clone());
                    out.added += 1;
                    touched = true;
                }
                MergePolicy::Overwrite => {
                    if record.get(name) == Some(obs) {
                        continue;
                    }
                    let existed = record.contains(name);
                    record.insert(name.clone(), obs.clone());
                    out.added += 1;
                    if existed {
                        out.changed += 1;
                    }
                    touched = true;
                }
            }
        }
        if touched {
            out.countries_touched += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CountryCode, Observed};

    fn code(s: &str) -> CountryCode {
        CountryCode::parse(s).unwrap()
    }

    #[test]
    fn fill_only_keeps_zero_and_creates_entities() {
        let mut store = CanonicalStore::new();
        let mut first = SourceFieldMap::new();
        first.insert(code("FRA"), "gdpGrowth", Observed::new(0.0, "2023"));
        assert_eq!(merge(&mut store, &first, MergePolicy::FillOnly).added, 1);

        let mut second = SourceFieldMap::new();
        second.insert(code("FRA"), "gdpGrowth", Observed::new(1.1, "2024"));
        second.insert(code("DEU"), "gdpGrowth", Observed::new(0.3, "2024"));
        let out = merge(&mut store, &second, MergePolicy::FillOnly);
        assert_eq!(out.added, 1);
        assert_eq!(out.countries_touched, 1);
        assert_eq!(store.field("FRA", "gdpGrowth").unwrap().value, 0.0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn overwrite_counts_only_changes() {
        let mut store = CanonicalStore::new();
        let mut map = SourceFieldMap::new();
        map.insert(code("USA"), "population", Observed::new(3.0, "2023"));
        merge(&mut store, &map, MergePolicy::Overwrite);
        assert_eq!(merge(&mut store, &map, MergePolicy::Overwrite), MergeOutcome::default());

        let mut newer = SourceFieldMap::new();
        newer.insert(code("USA"), "population", Observed::new(3.0, "2024"));
        let out = merge(&mut store, &newer, MergePolicy::Overwrite);
        assert_eq!((out.added, out.changed), (1, 1));
        assert_eq!(store.field("USA", "population").unwrap().year, "2024");
    }
}
