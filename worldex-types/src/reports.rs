//! Report envelopes produced by the orchestrator.

use serde::{Deserialize, Serialize};

use crate::WorldexError;
use crate::config::MergePolicy;

/// Outcome of processing one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum SourceStatus {
    /// The source's field map was folded into the store.
    Merged,
    /// The source contributed nothing; `reason` says why.
    Skipped {
        /// Failure that caused the skip.
        reason: WorldexError,
    },
}

/// Per-source contribution summary.
///
/// A completed run carries one of these per registered source, in processing order, so
/// partial failures are always visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    /// Source name.
    pub source: String,
    /// Merged or skipped.
    #[serde(flatten)]
    pub status: SourceStatus,
    /// Policy the merge ran under.
    pub policy: MergePolicy,
    /// Countries present in the source's field map.
    pub entities: usize,
    /// Field observations extracted from the payload.
    pub fields_extracted: usize,
    /// Fields newly written (fill-only) or changed (overwrite) in the store.
    pub fields_added: usize,
    /// Identifiers that no resolution strategy could map to a country code.
    pub unresolved: Vec<String>,
    /// Identifiers skipped without resolution (aggregates, blank cells, region headings).
    pub skipped_identifiers: usize,
    /// Non-fatal issues, e.g. one indicator request out of many failing.
    pub warnings: Vec<String>,
}

impl SourceReport {
    /// Build an empty report for `source` that merged nothing yet.
    pub fn new(source: impl Into<String>, policy: MergePolicy) -> Self {
        Self {
            source: source.into(),
            status: SourceStatus::Merged,
            policy,
            entities: 0,
            fields_extracted: 0,
            fields_added: 0,
            unresolved: Vec::new(),
            skipped_identifiers: 0,
            warnings: Vec::new(),
        }
    }

    /// Build a report for a source that was skipped with zero contribution.
    pub fn skipped(source: impl Into<String>, policy: MergePolicy, reason: WorldexError) -> Self {
        Self {
            status: SourceStatus::Skipped { reason },
            ..Self::new(source, policy)
        }
    }

    /// True if the source was skipped.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self.status, SourceStatus::Skipped { .. })
    }
}

/// Summary of a whole reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunReport {
    /// One entry per source, in processing order.
    pub sources: Vec<SourceReport>,
    /// Countries in the store before the run.
    pub countries_before: usize,
    /// Countries in the store after the run.
    pub countries_after: usize,
}

impl RunReport {
    /// Total fields added across all sources.
    #[must_use]
    pub fn fields_added(&self) -> usize {
        self.sources.iter().map(|s| s.fields_added).sum()
    }

    /// Total unresolved identifiers across all sources.
    #[must_use]
    pub fn unresolved(&self) -> usize {
        self.sources.iter().map(|s| s.unresolved.len()).sum()
    }

    /// Sources that were skipped.
    pub fn skipped(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources.iter().filter(|s| s.is_skipped())
    }
}
