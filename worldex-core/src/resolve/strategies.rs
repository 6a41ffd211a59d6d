use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::ResolutionStrategy;
use super::countries::COUNTRIES;
use crate::types::{CountryCode, WorldexError};

/// Accepts identifiers that already are three-letter codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlreadyCode;

impl ResolutionStrategy for AlreadyCode {
    fn name(&self) -> &'static str {
        "code"
    }

    fn resolve(&self, identifier: &str) -> Option<CountryCode> {
        CountryCode::parse(identifier)
    }
}

/// Manual name-to-code table, matched on the exact trimmed identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideTable {
    entries: BTreeMap<String, CountryCode>,
}

const BUILTIN_OVERRIDES: &[(&str, &str)] = &[
    ("United States", "USA"),
    ("United Kingdom", "GBR"),
    ("Russia", "RUS"),
    ("South Korea", "KOR"),
    ("North Korea", "PRK"),
    ("Iran", "IRN"),
    ("Syria", "SYR"),
    ("Venezuela", "VEN"),
    ("Bolivia", "BOL"),
    ("Tanzania", "TZA"),
    ("Congo, Dem. Rep.", "COD"),
    ("Congo, Rep.", "COG"),
    ("Congo, DR", "COD"),
    ("Congo, Republic", "COG"),
    ("Côte d'Ivoire", "CIV"),
    ("Gambia, The", "GMB"),
    ("Korea, South", "KOR"),
    ("Korea, North", "PRK"),
    ("Lao PDR", "LAO"),
    ("Laos", "LAO"),
    ("Libya", "LBY"),
    ("Moldova", "MDA"),
    ("Slovakia", "SVK"),
    ("Czechia", "CZE"),
    ("Czech Republic", "CZE"),
    ("Kyrgyzstan", "KGZ"),
    ("Kyrgyz Republic", "KGZ"),
    ("Timor-Leste", "TLS"),
    ("Eswatini", "SWZ"),
    ("Swaziland", "SWZ"),
    ("Macedonia", "MKD"),
    ("North Macedonia", "MKD"),
    ("Micronesia", "FSM"),
    ("São Tomé and Príncipe", "STP"),
    ("Brunei", "BRN"),
    ("Cape Verde", "CPV"),
    ("Cabo Verde", "CPV"),
    ("Palestine", "PSE"),
    ("West Bank and Gaza", "PSE"),
    ("Taiwan", "TWN"),
    ("Kosovo", "XKX"),
    ("Vietnam", "VNM"),
    ("Viet Nam", "VNM"),
    ("Myanmar", "MMR"),
    ("Burma", "MMR"),
    ("Egypt", "EGY"),
    ("Turkey", "TUR"),
    ("Türkiye", "TUR"),
];

impl OverrideTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The table shipped for the military-expenditure workbook's country names.
    #[must_use]
    pub fn builtin() -> Self {
        let mut t = Self::new();
        for (name, code) in BUILTIN_OVERRIDES {
            if let Some(code) = CountryCode::parse(code) {
                t.entries.insert((*name).to_string(), code);
            }
        }
        t
    }

    /// Add or replace one mapping.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `code` is not a three-letter code.
    pub fn insert(&mut self, name: impl Into<String>, code: &str) -> Result<(), WorldexError> {
        let code: CountryCode = code.parse()?;
        self.entries.insert(name.into().trim().to_string(), code);
        Ok(())
    }

    /// Add every mapping from `pairs`, replacing existing names.
    ///
    /// # Errors
    /// Returns `InvalidArg` on the first invalid code.
    pub fn extend<I, K, V>(&mut self, pairs: I) -> Result<(), WorldexError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        for (k, v) in pairs {
            self.insert(k, v.as_ref())?;
        }
        Ok(())
    }

    /// Layer `other` over this table; `other` wins on shared names.
    pub fn absorb(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    /// Number of mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResolutionStrategy for OverrideTable {
    fn name(&self) -> &'static str {
        "override"
    }

    fn resolve(&self, identifier: &str) -> Option<CountryCode> {
        self.entries.get(identifier.trim()).cloned()
    }
}

/// Case-insensitive exact match on reference short, official, and common names.
#[derive(Debug, Clone)]
pub struct ReferenceExact {
    index: HashMap<String, &'static str>,
}

impl Default for ReferenceExact {
    fn default() -> Self {
        let mut index = HashMap::new();
        for entry in COUNTRIES {
            for name in std::iter::once(&entry.name).chain(entry.aliases) {
                index.entry(name.to_lowercase()).or_insert(entry.alpha3);
            }
        }
        Self { index }
    }
}

impl ResolutionStrategy for ReferenceExact {
    fn name(&self) -> &'static str {
        "reference-exact"
    }

    fn resolve(&self, identifier: &str) -> Option<CountryCode> {
        let key = identifier.trim().to_lowercase();
        self.index.get(&key).and_then(|c| CountryCode::parse(c))
    }
}

/// Default Jaro-Winkler similarity a fuzzy candidate must exceed.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.9;

/// Fuzzy search over reference names.
///
/// Normalized containment is tried first (shortest containing name wins); otherwise the
/// best Jaro-Winkler score above the threshold wins. Ties go to table order.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceFuzzy {
    threshold: f64,
}

impl ReferenceFuzzy {
    /// Fuzzy matcher with a custom similarity threshold.
    #[must_use]
    pub const fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for ReferenceFuzzy {
    fn default() -> Self {
        Self::with_threshold(DEFAULT_FUZZY_THRESHOLD)
    }
}

impl ResolutionStrategy for ReferenceFuzzy {
    fn name(&self) -> &'static str {
        "reference-fuzzy"
    }

    fn resolve(&self, identifier: &str) -> Option<CountryCode> {
        let query = fold(identifier);
        if query.len() < 3 {
            return None;
        }

        let mut contained: Option<(usize, &'static str)> = None;
        let mut scored: Option<(f64, &'static str)> = None;
        for entry in COUNTRIES {
            for name in std::iter::once(&entry.name).chain(entry.aliases) {
                let candidate = fold(name);
                if candidate.contains(&query) && contained.is_none_or(|(len, _)| candidate.len() < len) {
                    contained = Some((candidate.len(), entry.alpha3));
                }
                let score = strsim::jaro_winkler(&query, &candidate);
                if score > self.threshold && scored.is_none_or(|(best, _)| score > best) {
                    scored = Some((score, entry.alpha3));
                }
            }
        }
        contained
            .map(|(_, code)| code)
            .or_else(|| scored.map(|(_, code)| code))
            .and_then(CountryCode::parse)
    }
}

/// Lowercase, fold common Latin accents, and collapse punctuation into single spaces.
fn fold(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars().flat_map(char::to_lowercase) {
        let ch = match ch {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'ç' => 'c',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'ñ' => 'n',
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'ý' | 'ÿ' => 'y',
            c if c.is_alphanumeric() => c,
            _ => ' ',
        };
        if ch == ' ' && (out.is_empty() || out.ends_with(' ')) {
            continue;
        }
        out.push(ch);
    }
    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_normalizes_accents_and_punctuation() {
        assert_eq!(fold("  Côte d'Ivoire "), "cote d ivoire");
        assert_eq!(fold("Türkiye"), "turkiye");
    }

    #[test]
    fn exact_matches_aliases_case_insensitively() {
        let s = ReferenceExact::default();
        assert_eq!(s.resolve("french republic").unwrap().as_str(), "FRA");
        assert_eq!(s.resolve("Russia").unwrap().as_str(), "RUS");
        assert!(s.resolve("Atlantis").is_none());
    }

    #[test]
    fn fuzzy_prefers_containment_then_similarity() {
        let s = ReferenceFuzzy::default();
        assert_eq!(s.resolve("Korea, Democratic").unwrap().as_str(), "PRK");
        assert_eq!(s.resolve("Sao Tome & Principe").unwrap().as_str(), "STP");
        assert!(s.resolve("Nonexistent Country").is_none());
    }

    #[test]
    fn builtin_overrides_are_all_valid_codes() {
        assert_eq!(OverrideTable::builtin().len(), BUILTIN_OVERRIDES.len());
    }
}
