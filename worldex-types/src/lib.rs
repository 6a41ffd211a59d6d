//! Worldex-specific error, configuration, and report types shared by every crate in the workspace.
#![warn(missing_docs)]

mod config;
mod reports;
mod source_key;

pub use config::{ColumnTieBreak, DEFAULT_SCAN_LIMIT, FetchMode, MergePolicy, WorldexConfig};
pub use reports::{RunReport, SourceReport, SourceStatus};
use serde::{Deserialize, Serialize};
pub use source_key::SourceKey;
use thiserror::Error;

/// Unified error type for the worldex workspace.
///
/// Source-scoped variants are recoverable at the source boundary: the orchestrator turns
/// them into a skipped source and moves on. Store variants are fatal for a run.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WorldexError {
    /// Fetching or decoding a source's payload failed (network error, HTTP status, bad archive).
    #[error("{source_name} unavailable: {msg}")]
    SourceUnavailable {
        /// Source that failed.
        source_name: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A source's fetch exceeded the configured per-source timeout.
    #[error("{source_name} timed out")]
    SourceTimeout {
        /// Source that timed out.
        source_name: String,
    },

    /// No header row (or a required column) could be located in a tabular payload.
    #[error("{source_name}: schema not found: {what}")]
    SchemaNotFound {
        /// Source whose payload was scanned.
        source_name: String,
        /// What was missing, e.g. "header row containing 'ISO3'".
        what: String,
    },

    /// The payload did not have the shape the source adapter expects.
    #[error("{source_name}: malformed payload: {msg}")]
    Decode {
        /// Source whose payload was malformed.
        source_name: String,
        /// Human-readable description of the problem.
        msg: String,
    },

    /// Invalid input argument or configuration.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The canonical store could not be written. Fatal for a run.
    #[error("store at {path} is not writable: {msg}")]
    StoreUnwritable {
        /// Location of the store.
        path: String,
        /// Underlying failure.
        msg: String,
    },

    /// The canonical store exists but could not be parsed.
    #[error("store at {path} is corrupt: {msg}")]
    StoreCorrupt {
        /// Location of the store.
        path: String,
        /// Underlying failure.
        msg: String,
    },

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl WorldexError {
    /// Helper: build a `SourceUnavailable` error.
    pub fn source_unavailable(source_name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `SourceTimeout` error.
    pub fn source_timeout(source_name: impl Into<String>) -> Self {
        Self::SourceTimeout {
            source_name: source_name.into(),
        }
    }

    /// Helper: build a `SchemaNotFound` error.
    pub fn schema_not_found(source_name: impl Into<String>, what: impl Into<String>) -> Self {
        Self::SchemaNotFound {
            source_name: source_name.into(),
            what: what.into(),
        }
    }

    /// Helper: build a `Decode` error.
    pub fn decode(source_name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Decode {
            source_name: source_name.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `StoreUnwritable` error.
    pub fn store_unwritable(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::StoreUnwritable {
            path: path.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `StoreCorrupt` error.
    pub fn store_corrupt(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::StoreCorrupt {
            path: path.into(),
            msg: msg.into(),
        }
    }

    /// Name of the source this error is attributed to, if any.
    #[must_use]
    pub fn source_name(&self) -> Option<&str> {
        match self {
            Self::SourceUnavailable { source_name, .. }
            | Self::SourceTimeout { source_name }
            | Self::SchemaNotFound { source_name, .. }
            | Self::Decode { source_name, .. } => Some(source_name),
            _ => None,
        }
    }

    /// Returns true if this error aborts a whole run rather than a single source.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::StoreUnwritable { .. } | Self::StoreCorrupt { .. }
        )
    }

    /// Returns true if this error should be surfaced to operators as actionable.
    ///
    /// A missing header is usually a layout change upstream and worth a look; a timeout
    /// is transient and is not.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        !matches!(self, Self::SourceTimeout { .. })
    }
}
