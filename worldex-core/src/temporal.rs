//! Temporal selection: pick the most recent valid observation not later than a cutoff.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::normalize::RawValue;
use crate::types::Observed;

/// Parse a year from the leading four digits of a token.
///
/// Accepts `"2021"`, `"2021.0"` and `"2021-Q3"`; rejects `"21"` and `"20210"`.
#[must_use]
pub fn parse_year(token: &str) -> Option<i32> {
    let t = token.trim();
    let bytes = t.as_bytes();
    if bytes.len() < 4 || !bytes[..4].iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.get(4).is_some_and(u8::is_ascii_digit) {
        return None;
    }
    t[..4].parse().ok()
}

/// True if `token` is exactly a four-digit year.
#[must_use]
pub fn is_year_token(token: &str) -> bool {
    let t = token.trim();
    t.len() == 4 && t.bytes().all(|b| b.is_ascii_digit())
}

/// Default cutoff: next calendar year.
#[must_use]
pub fn default_cutoff_year() -> i32 {
    chrono::Utc::now().year() + 1
}

/// Default label for undated observations: the current calendar year.
#[must_use]
pub fn default_undated_year() -> String {
    chrono::Utc::now().year().to_string()
}

/// Select the latest valid observation from `(year, value)` pairs.
///
/// Candidates are ordered by numeric year descending; equal years keep input order.
/// The first candidate whose year is at most `cutoff_year` and whose value normalizes
/// wins. Unparseable year tokens are ignored.
pub fn select_latest<Y, V, I>(observations: I, cutoff_year: i32) -> Option<Observed>
where
    Y: AsRef<str>,
    V: RawValue,
    I: IntoIterator<Item = (Y, V)>,
{
    let mut candidates: Vec<(i32, V)> = observations
        .into_iter()
        .filter_map(|(y, v)| parse_year(y.as_ref()).map(|year| (year, v)))
        .filter(|(year, _)| *year <= cutoff_year)
        .collect();
    candidates.sort_by(|a, b| b.0.cmp(&a.0));
    candidates
        .into_iter()
        .find_map(|(year, v)| v.normalized().map(|value| Observed::new(value, year.to_string())))
}

/// Tracks the latest valid observation per key across rows of a long table.
///
/// Rows with a year beyond the cutoff or an invalid value are ignored. On equal years
/// the first row offered is kept.
#[derive(Debug, Clone)]
pub struct LatestTracker<K: Ord> {
    cutoff_year: i32,
    best: BTreeMap<K, (i32, f64)>,
}

impl<K: Ord> LatestTracker<K> {
    /// New tracker with the given cutoff.
    #[must_use]
    pub const fn new(cutoff_year: i32) -> Self {
        Self {
            cutoff_year,
            best: BTreeMap::new(),
        }
    }

    /// Offer one row. Returns true if it became the current best for `key`.
    pub fn offer(&mut self, key: K, year_token: &str, value: impl RawValue) -> bool {
        let Some(year) = parse_year(year_token) else {
            return false;
        };
        if year > self.cutoff_year {
            return false;
        }
        let Some(v) = value.normalized() else {
            return false;
        };
        match self.best.get(&key) {
            Some((best_year, _)) if *best_year >= year => false,
            _ => {
                self.best.insert(key, (year, v));
                true
            }
        }
    }

    /// Number of keys with a selected observation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.best.len()
    }

    /// True if nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    /// Consume the tracker, yielding the selected observation per key.
    pub fn into_observations(self) -> impl Iterator<Item = (K, Observed)> {
        self.best
            .into_iter()
            .map(|(k, (year, value))| (k, Observed::new(value, year.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn placeholder_year_is_skipped_for_older_valid_one() {
        let obs = [("2019", json!(5)), ("2021", json!("...")), ("2020", json!(7))];
        assert_eq!(select_latest(obs, 2025), Some(Observed::new(7.0, "2020")));
    }

    #[test]
    fn years_past_cutoff_are_ignored() {
        let obs = [("2030", json!(1)), ("2024", json!(2))];
        assert_eq!(select_latest(obs, 2025), Some(Observed::new(2.0, "2024")));
        assert_eq!(select_latest([("2030", json!(1))], 2025), None);
    }

    #[test]
    fn equal_years_keep_input_order() {
        let obs = [("2020", 1.0), ("2020.0", 2.0)];
        assert_eq!(select_latest(obs, 2025), Some(Observed::new(1.0, "2020")));
    }

    #[test]
    fn parse_year_reads_leading_digits() {
        assert_eq!(parse_year("2021-Q3"), Some(2021));
        assert_eq!(parse_year(" 2021.0 "), Some(2021));
        assert_eq!(parse_year("20210"), None);
        assert_eq!(parse_year("21"), None);
        assert!(is_year_token("1999"));
        assert!(!is_year_token("1999.0"));
    }

    #[test]
    fn tracker_keeps_highest_year_first_on_ties() {
        let mut t = LatestTracker::new(2025);
        assert!(t.offer("FRA", "2019", 1.0));
        assert!(t.offer("FRA", "2021", 2.0));
        assert!(!t.offer("FRA", "2021", 3.0));
        assert!(!t.offer("FRA", "2020", 4.0));
        assert!(!t.offer("FRA", "2026", 5.0));
        assert!(!t.offer("FRA", "2024", "xxx"));
        let out: Vec<_> = t.into_observations().collect();
        assert_eq!(out, vec![("FRA", Observed::new(2.0, "2021"))]);
    }
}
