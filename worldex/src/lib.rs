//! Worldex reconciles country-level indicators from many independent sources into one
//! canonical per-country store keyed by three-letter country codes.
//!
//! Overview
//! - Sources implement `worldex_core::IndicatorSource`: an async `fetch` that does all I/O
//!   and a pure `extract` that locates headers, resolves entities, and selects the latest
//!   valid observation per field.
//! - The `Reconciler` runs sources in registration order and merges each source's field
//!   map into the store under fill-only (default) or overwrite.
//! - A failing or timed-out source is skipped and reported; it never aborts the run.
//! - `run` loads and saves through a `RecordStore`; a failed save is the only fatal
//!   outcome, and file stores write atomically.
//!
//! Key behaviors and trade-offs
//! - Fill-only makes registration order a precedence order: the first source to supply a
//!   field for a country keeps it.
//! - Concurrent fetching overlaps network time only; merges stay sequential so the
//!   fill-only precedence is unchanged.
//!
//! Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use worldex::{JsonFileStore, MergePolicy, Reconciler};
//!
//! let reconciler = Reconciler::builder()
//!     .with_source(Arc::new(world_bank))
//!     .with_source(Arc::new(imf))
//!     .merge_policy(MergePolicy::FillOnly)
//!     .build()?;
//! let report = reconciler.run(&JsonFileStore::new("data/countries.json")).await?;
//! for s in &report.sources {
//!     println!("{}: +{} fields, {} unresolved", s.source, s.fields_added, s.unresolved.len());
//! }
//! ```
#![warn(missing_docs)]

mod core;
mod reconcile;

pub use crate::core::{Reconciler, ReconcilerBuilder, tag_err};
pub use worldex_core::{
    CanonicalStore, ColumnTieBreak, CountryCode, EntityResolver, FetchMode, IndicatorSource,
    JsonFileStore, MemoryStore, MergePolicy, Observed, OverrideTable, RecordStore, RunReport,
    SourceReport, SourceStatus, WorldexConfig, WorldexError,
};
