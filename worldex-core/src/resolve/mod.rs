//! Entity resolution: raw identifiers to canonical country codes.
//!
//! Resolution runs an ordered chain of [`ResolutionStrategy`] values; the first one that
//! returns a code wins. Identifiers no strategy accepts are reported as unresolved.

use std::fmt;
use std::sync::Arc;

use crate::types::CountryCode;

mod countries;
mod strategies;

pub use countries::{COUNTRIES, CountryEntry};
pub use strategies::{
    AlreadyCode, DEFAULT_FUZZY_THRESHOLD, OverrideTable, ReferenceExact, ReferenceFuzzy,
};

/// One step of the resolution chain.
pub trait ResolutionStrategy: Send + Sync {
    /// Short name recorded with successful resolutions.
    fn name(&self) -> &'static str;

    /// A code for `identifier`, or `None` to try the next strategy.
    fn resolve(&self, identifier: &str) -> Option<CountryCode>;
}

/// Result of resolving one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Mapped to `code` by the named strategy.
    Resolved {
        /// Canonical code.
        code: CountryCode,
        /// Strategy that matched.
        strategy: &'static str,
    },
    /// Not a country: blank cells, aggregates, and filtered labels.
    Skipped,
    /// A country-like identifier that no strategy could map.
    Unresolved,
}

impl Resolution {
    /// The code, if resolved.
    #[must_use]
    pub fn code(&self) -> Option<&CountryCode> {
        match self {
            Self::Resolved { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// How identifiers from a source are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierMode {
    /// Identifiers are codes; anything else (e.g. `OWID_WRL`, blanks) is skipped rather
    /// than looked up by name.
    CodesOnly,
    /// Identifiers are free-text names resolved through the strategy chain.
    #[default]
    Names,
}

/// Regional subtotal rows in mixed-case spreadsheets. Without these the fuzzy pass would
/// map e.g. "Africa" onto South Africa.
const REGION_LABELS: [&str; 24] = [
    "africa",
    "north africa",
    "sub-saharan africa",
    "americas",
    "north america",
    "central america",
    "central america and the caribbean",
    "caribbean",
    "south america",
    "asia",
    "asia & oceania",
    "asia and oceania",
    "oceania",
    "central asia",
    "east asia",
    "south asia",
    "south east asia",
    "south-east asia",
    "europe",
    "western europe",
    "central europe",
    "eastern europe",
    "central and western europe",
    "middle east",
];

/// Labels skipped before name resolution: header echoes, notes, and regional subtotals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFilter {
    skip_labels: Vec<String>,
    skip_all_caps_longer_than: Option<usize>,
}

impl Default for NameFilter {
    fn default() -> Self {
        Self {
            skip_labels: ["country", "nan", "notes", "region", "world"]
                .into_iter()
                .chain(REGION_LABELS)
                .map(String::from)
                .collect(),
            skip_all_caps_longer_than: Some(3),
        }
    }
}

impl NameFilter {
    /// A filter that skips nothing.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            skip_labels: Vec::new(),
            skip_all_caps_longer_than: None,
        }
    }

    /// Also skip `label` (compared case-insensitively).
    #[must_use]
    pub fn skip_label(mut self, label: impl Into<String>) -> Self {
        self.skip_labels.push(label.into().to_lowercase());
        self
    }

    /// True if `name` (already trimmed) should not be resolved.
    #[must_use]
    pub fn skips(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        if self.skip_labels.iter().any(|l| *l == lower) {
            return true;
        }
        self.skip_all_caps_longer_than
            .is_some_and(|n| name.chars().count() > n && is_all_caps(name))
    }
}

/// Every cased character is uppercase and at least one cased character exists.
fn is_all_caps(s: &str) -> bool {
    let mut cased = false;
    for ch in s.chars() {
        if ch.is_lowercase() {
            return false;
        }
        if ch.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Ordered chain of resolution strategies plus the identifier mode.
#[derive(Clone)]
pub struct EntityResolver {
    mode: IdentifierMode,
    strategies: Vec<Arc<dyn ResolutionStrategy>>,
    filter: NameFilter,
}

impl fmt::Debug for EntityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityResolver")
            .field("mode", &self.mode)
            .field(
                "strategies",
                &self.strategies.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("filter", &self.filter)
            .finish()
    }
}

impl Default for EntityResolver {
    fn default() -> Self {
        Self::names(OverrideTable::builtin())
    }
}

impl EntityResolver {
    /// Resolver for sources keyed by codes.
    #[must_use]
    pub fn codes_only() -> Self {
        Self {
            mode: IdentifierMode::CodesOnly,
            strategies: vec![Arc::new(AlreadyCode)],
            filter: NameFilter::none(),
        }
    }

    /// Resolver for name-keyed sources: code, overrides, reference exact, reference fuzzy.
    #[must_use]
    pub fn names(overrides: OverrideTable) -> Self {
        Self {
            mode: IdentifierMode::Names,
            strategies: vec![
                Arc::new(AlreadyCode),
                Arc::new(overrides),
                Arc::new(ReferenceExact::default()),
                Arc::new(ReferenceFuzzy::default()),
            ],
            filter: NameFilter::default(),
        }
    }

    /// Resolver with an explicit chain and no filter.
    #[must_use]
    pub fn with_strategies(strategies: Vec<Arc<dyn ResolutionStrategy>>) -> Self {
        Self {
            mode: IdentifierMode::Names,
            strategies,
            filter: NameFilter::none(),
        }
    }

    /// Replace the pre-resolution filter.
    #[must_use]
    pub fn with_filter(mut self, filter: NameFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Identifier mode.
    #[must_use]
    pub const fn mode(&self) -> IdentifierMode {
        self.mode
    }

    /// Resolve one raw identifier.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> Resolution {
        let id = raw.trim();
        if id.is_empty() {
            return Resolution::Skipped;
        }
        match self.mode {
            IdentifierMode::CodesOnly => CountryCode::parse(id).map_or(Resolution::Skipped, |code| {
                Resolution::Resolved {
                    code,
                    strategy: "code",
                }
            }),
            IdentifierMode::Names => {
                if self.filter.skips(id) {
                    return Resolution::Skipped;
                }
                self.strategies
                    .iter()
                    .find_map(|s| {
                        s.resolve(id).map(|code| Resolution::Resolved {
                            code,
                            strategy: s.name(),
                        })
                    })
                    .unwrap_or(Resolution::Unresolved)
            }
        }
    }
}
