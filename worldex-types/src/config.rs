//! Configuration types shared across the orchestrator, the core pipeline, and source adapters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Number of leading rows scanned for a header row when none is configured.
pub const DEFAULT_SCAN_LIMIT: usize = 25;

/// Conflict policy applied when folding a source's field map into the canonical store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// Keep existing values; only add fields absent from the store.
    /// Earlier sources therefore take precedence over later ones.
    #[default]
    FillOnly,
    /// Last writer wins: every incoming field replaces the stored one.
    Overwrite,
}

/// How the orchestrator schedules source fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchMode {
    /// Fetch, extract, and merge one source at a time in registration order.
    #[default]
    Sequential,
    /// Fetch every source concurrently; extraction and merging still run one source at
    /// a time in registration order.
    Concurrent,
}

/// Which header column wins when several columns match keywords for the same field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnTieBreak {
    /// The left-most matching column claims the field.
    #[default]
    HeaderOrder,
    /// The column matched by the earliest keyword in the column specs claims the field,
    /// wherever it sits in the header.
    KeywordOrder,
}

/// Global configuration for a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldexConfig {
    /// Conflict policy for sources that do not declare their own.
    pub merge_policy: MergePolicy,
    /// Latest acceptable observation year. `None` means next calendar year at run start.
    pub cutoff_year: Option<i32>,
    /// Year label recorded for observations from tables without any year information.
    /// `None` means the current calendar year at run start.
    pub undated_year: Option<String>,
    /// How many leading rows the schema locator scans for a header.
    pub scan_limit: usize,
    /// Column tie-break used by the schema locator.
    pub tie_break: ColumnTieBreak,
    /// Upper bound on a single source's fetch.
    pub source_timeout: Duration,
    /// Fetch scheduling.
    pub fetch_mode: FetchMode,
}

impl Default for WorldexConfig {
    fn default() -> Self {
        Self {
            merge_policy: MergePolicy::FillOnly,
            cutoff_year: None,
            undated_year: None,
            scan_limit: DEFAULT_SCAN_LIMIT,
            tie_break: ColumnTieBreak::HeaderOrder,
            source_timeout: Duration::from_secs(300),
            fetch_mode: FetchMode::Sequential,
        }
    }
}
