//! Canonical data model: country codes, raw cells, observations, records, and the store.
//!
//! A `CountryRecord` persists each observation as two JSON entries, `field` and
//! `field_year`. Entries that are not observation pairs are kept verbatim in
//! `extras` so that a load/save cycle is lossless.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use worldex_types::{
    ColumnTieBreak, DEFAULT_SCAN_LIMIT, FetchMode, MergePolicy, RunReport, SourceKey,
    SourceReport, SourceStatus, WorldexConfig, WorldexError,
};

/// Suffix of the JSON entry that carries an observation's year label.
pub const YEAR_SUFFIX: &str = "_year";

/// Three uppercase ASCII letters (ISO 3166-1 alpha-3 convention).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Parse a code after trimming and uppercasing; `None` unless exactly three ASCII letters.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let t = raw.trim();
        if t.len() == 3 && t.bytes().all(|b| b.is_ascii_alphabetic()) {
            Some(Self(t.to_ascii_uppercase()))
        } else {
            None
        }
    }

    /// The code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CountryCode {
    type Err = WorldexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| WorldexError::InvalidArg(format!("not a three-letter country code: {s:?}")))
    }
}

impl TryFrom<String> for CountryCode {
    type Error = WorldexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CountryCode> for String {
    fn from(c: CountryCode) -> Self {
        c.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One cell of a decoded tabular payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Missing or blank.
    #[default]
    Empty,
    /// Boolean cell.
    Bool(bool),
    /// Numeric cell.
    Number(f64),
    /// Text cell, untrimmed.
    Text(String),
}

impl Cell {
    /// True for `Empty` and for text that is blank after trimming.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed textual form used for header matching and identifiers.
    ///
    /// Integral numbers render without a fractional part so that a spreadsheet year
    /// stored as `2020.0` reads as `"2020"`.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.trim().to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s)
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Cell {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

/// Render a number the way header cells and year labels expect.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

/// A selected observation: a finite value and the year label it was observed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observed {
    /// Normalized numeric value.
    pub value: f64,
    /// Year label, normally four digits.
    pub year: String,
}

impl Observed {
    /// Construct an observation.
    pub fn new(value: f64, year: impl Into<String>) -> Self {
        Self {
            value,
            year: year.into(),
        }
    }
}

/// All fields known for one country.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CountryRecord {
    fields: BTreeMap<String, Observed>,
    extras: BTreeMap<String, Value>,
}

impl CountryRecord {
    /// Empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The observation stored under `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Observed> {
        self.fields.get(field)
    }

    /// True if `field` holds a value, either as an observation pair or as a
    /// passthrough entry from a loaded snapshot.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field) || self.extras.contains_key(field)
    }

    /// Store `obs` under `field`, replacing any observation or passthrough entry with
    /// that name. Returns the previous observation.
    pub fn insert(&mut self, field: impl Into<String>, obs: Observed) -> Option<Observed> {
        let field = field.into();
        self.extras.remove(&field);
        self.extras.remove(&format!("{field}{YEAR_SUFFIX}"));
        self.fields.insert(field, obs)
    }

    /// Observations in field-name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Observed)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries carried through untouched from a loaded snapshot.
    #[must_use]
    pub const fn extras(&self) -> &BTreeMap<String, Value> {
        &self.extras
    }

    /// Number of observation pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the record holds neither observations nor passthrough entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.extras.is_empty()
    }

    /// Split a flat JSON object into observation pairs and passthrough entries.
    ///
    /// `null` entries are dropped. A number becomes an observation only when its
    /// `_year` companion is a string or a number.
    fn from_flat(mut flat: BTreeMap<String, Value>) -> Self {
        flat.retain(|_, v| !v.is_null());
        let mut fields = BTreeMap::new();
        let mut consumed = BTreeSet::new();
        for (key, value) in &flat {
            if consumed.contains(key) {
                continue;
            }
            let Some(n) = value.as_f64().filter(|n| n.is_finite()) else {
                continue;
            };
            let year_key = format!("{key}{YEAR_SUFFIX}");
            let year = match flat.get(&year_key) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(y)) => y.as_f64().map(format_number).unwrap_or_default(),
                _ => continue,
            };
            fields.insert(key.clone(), Observed::new(n, year));
            consumed.insert(key.clone());
            consumed.insert(year_key);
        }
        flat.retain(|k, _| !consumed.contains(k));
        Self {
            fields,
            extras: flat,
        }
    }
}

impl Serialize for CountryRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut flat: BTreeMap<String, Value> = self.extras.clone();
        for (name, obs) in &self.fields {
            let value = serde_json::Number::from_f64(obs.value).map_or(Value::Null, Value::Number);
            flat.insert(name.clone(), value);
            flat.insert(format!("{name}{YEAR_SUFFIX}"), Value::String(obs.year.clone()));
        }
        let mut map = serializer.serialize_map(Some(flat.len()))?;
        for (k, v) in &flat {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CountryRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = CountryRecord;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object of country fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut flat = BTreeMap::new();
                while let Some((k, v)) = access.next_entry::<String, Value>()? {
                    flat.insert(k, v);
                }
                Ok(CountryRecord::from_flat(flat))
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// The persistent canonical store: one record per country code.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalStore {
    records: BTreeMap<CountryCode, CountryRecord>,
}

impl CanonicalStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of countries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no country is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record for `code`, if present.
    #[must_use]
    pub fn get(&self, code: &CountryCode) -> Option<&CountryRecord> {
        self.records.get(code)
    }

    /// Observation for `(code, field)`, if present.
    #[must_use]
    pub fn field(&self, code: &str, field: &str) -> Option<&Observed> {
        let code = CountryCode::parse(code)?;
        self.records.get(&code)?.get(field)
    }

    /// Record for `code`, created empty when absent.
    pub fn record_mut(&mut self, code: CountryCode) -> &mut CountryRecord {
        self.records.entry(code).or_default()
    }

    /// Records in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&CountryCode, &CountryRecord)> {
        self.records.iter()
    }

    /// Total observation pairs across all countries.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.records.values().map(CountryRecord::len).sum()
    }
}

/// Output of extracting one source: country code to a partial field map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceFieldMap {
    entries: BTreeMap<CountryCode, BTreeMap<String, Observed>>,
}

impl SourceFieldMap {
    /// Empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` for `code`, replacing an earlier value from the same source.
    pub fn insert(&mut self, code: CountryCode, field: impl Into<String>, obs: Observed) {
        self.entries.entry(code).or_default().insert(field.into(), obs);
    }

    /// Fold `other` into `self`; on collisions `other` wins.
    pub fn extend(&mut self, other: Self) {
        for (code, fields) in other.entries {
            self.entries.entry(code).or_default().extend(fields);
        }
    }

    /// Value for `(code, field)`.
    #[must_use]
    pub fn get(&self, code: &str, field: &str) -> Option<&Observed> {
        let code = CountryCode::parse(code)?;
        self.entries.get(&code)?.get(field)
    }

    /// Number of countries.
    #[must_use]
    pub fn entities(&self) -> usize {
        self.entries.len()
    }

    /// Number of field observations across all countries.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    /// True if nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&CountryCode, &BTreeMap<String, Observed>)> {
        self.entries.iter()
    }
}

/// An identifier from `source` that no resolution strategy mapped to a country code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResolutionFailure {
    /// Source that supplied the identifier.
    pub source: String,
    /// The raw identifier, trimmed.
    pub identifier: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_code_parse_trims_and_uppercases() {
        assert_eq!(CountryCode::parse(" fra ").unwrap().as_str(), "FRA");
        assert!(CountryCode::parse("FRAN").is_none());
        assert!(CountryCode::parse("F1A").is_none());
        assert!("".parse::<CountryCode>().is_err());
    }

    #[test]
    fn cell_text_drops_integral_fraction() {
        assert_eq!(Cell::Number(2020.0).text(), "2020");
        assert_eq!(Cell::Number(2.5).text(), "2.5");
        assert_eq!(Cell::from("  ISO3 ").text(), "ISO3");
        assert!(Cell::from("   ").is_blank());
    }

    #[test]
    fn record_roundtrip_keeps_unknown_entries() {
        let json = r#"{
            "gdpGrowth": 1.5, "gdpGrowth_year": "2023",
            "population": 5, "population_year": 2022,
            "name": "France", "meta": {"x": 1}, "orphan_year": "2001",
            "dropped": null, "noYear": 4
        }"#;
        let rec: CountryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.get("gdpGrowth"), Some(&Observed::new(1.5, "2023")));
        assert_eq!(rec.get("population"), Some(&Observed::new(5.0, "2022")));
        assert!(rec.extras().contains_key("name"));
        assert!(rec.extras().contains_key("meta"));
        assert!(rec.extras().contains_key("orphan_year"));
        assert!(rec.extras().contains_key("noYear"));
        assert!(!rec.contains("dropped"));
        assert!(rec.contains("noYear"));

        let out = serde_json::to_value(&rec).unwrap();
        assert_eq!(out["name"], "France");
        assert_eq!(out["meta"]["x"], 1);
        assert_eq!(out["population_year"], "2022");
        assert_eq!(out["noYear"], 4);
    }

    #[test]
    fn insert_replaces_passthrough_entry() {
        let mut rec: CountryRecord = serde_json::from_str(r#"{"gdp": 3}"#).unwrap();
        rec.insert("gdp", Observed::new(4.0, "2024"));
        let out = serde_json::to_value(&rec).unwrap();
        assert_eq!(out["gdp"], 4.0);
        assert_eq!(out["gdp_year"], "2024");
    }
}
