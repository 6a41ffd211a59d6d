//! TOML run configuration. Every key is optional; command-line flags win over the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use worldex::{ColumnTieBreak, FetchMode, MergePolicy, OverrideTable, WorldexConfig, WorldexError};

/// Store path used when neither the flag nor the file names one.
pub const DEFAULT_STORE: &str = "data/countries.json";

/// Contents of a `worldex.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub store: Option<PathBuf>,
    /// Source names in precedence order.
    pub sources: Option<Vec<String>>,
    /// Directory holding the UN population workbooks.
    pub un_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub cache_max_age_secs: Option<u64>,
    /// Politeness delay after each source fetch.
    pub throttle_ms: Option<u64>,
    /// Per-request HTTP timeout.
    pub http_timeout_secs: Option<u64>,
    /// Upper bound on one source's whole fetch.
    pub source_timeout_secs: Option<u64>,
    pub merge_policy: Option<MergePolicy>,
    pub fetch_mode: Option<FetchMode>,
    pub cutoff_year: Option<i32>,
    pub undated_year: Option<String>,
    pub scan_limit: Option<usize>,
    pub tie_break: Option<ColumnTieBreak>,
    pub unesco_api_key: Option<String>,
    /// Extra name-to-code overrides for name-keyed sources.
    pub overrides: BTreeMap<String, String>,
}

impl FileConfig {
    /// Read and parse a config file.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the file cannot be read or is not valid configuration.
    pub fn load(path: &Path) -> Result<Self, WorldexError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| WorldexError::InvalidArg(format!("config {}: {e}", path.display())))?;
        Self::parse(&text)
            .map_err(|e| WorldexError::InvalidArg(format!("config {}: {e}", path.display())))
    }

    /// Parse config text.
    ///
    /// # Errors
    /// Returns the TOML error for malformed input or unknown keys.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Orchestrator settings from this file, on top of the library defaults.
    #[must_use]
    pub fn run_config(&self) -> WorldexConfig {
        let mut cfg = WorldexConfig::default();
        if let Some(p) = self.merge_policy {
            cfg.merge_policy = p;
        }
        if let Some(m) = self.fetch_mode {
            cfg.fetch_mode = m;
        }
        if let Some(t) = self.tie_break {
            cfg.tie_break = t;
        }
        if let Some(n) = self.scan_limit {
            cfg.scan_limit = n;
        }
        if let Some(secs) = self.source_timeout_secs {
            cfg.source_timeout = Duration::from_secs(secs);
        }
        cfg.cutoff_year = self.cutoff_year;
        cfg.undated_year.clone_from(&self.undated_year);
        cfg
    }

    /// The `[overrides]` table as a validated override table.
    ///
    /// # Errors
    /// Returns `InvalidArg` naming the first entry whose code is not three letters.
    pub fn override_table(&self) -> Result<OverrideTable, WorldexError> {
        let mut table = OverrideTable::new();
        table
            .extend(self.overrides.iter().map(|(k, v)| (k.clone(), v.as_str())))
            .map_err(|e| WorldexError::InvalidArg(format!("[overrides]: {e}")))?;
        Ok(table)
    }
}
