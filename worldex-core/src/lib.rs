//! worldex-core
//!
//! Core types, traits, and reconciliation primitives shared across the worldex workspace.
//!
//! - `types`: country codes, cells, observations, records, and the canonical store.
//! - `normalize`: raw values to finite numbers or absence.
//! - `resolve`: the entity resolution strategy chain.
//! - `schema`: header location and column assignment.
//! - `temporal`: latest-observation selection.
//! - `merge`: fill-only and overwrite merging.
//! - `extract`: table extraction over the above.
//! - `source`: the `IndicatorSource` trait and payload types.
//! - `store`: `RecordStore` implementations.
//!
//! Everything here is synchronous and free of I/O except `store` and the async
//! `IndicatorSource::fetch` contract, which adapters implement elsewhere.
#![warn(missing_docs)]

/// Table extraction in long, wide, and indicator layouts.
pub mod extract;
/// Merge engine.
pub mod merge;
/// Middleware trait implemented by source wrappers.
pub mod middleware;
/// Value normalizer.
pub mod normalize;
/// Entity resolver.
pub mod resolve;
/// Schema locator.
pub mod schema;
/// The `IndicatorSource` contract.
pub mod source;
/// Canonical store persistence.
pub mod store;
/// Temporal selector.
pub mod temporal;
pub mod types;

pub use extract::{
    ExtractContext, Extraction, extract_indicators, extract_long, extract_wide, locate_table,
};
pub use merge::{MergeOutcome, merge};
pub use middleware::Middleware;
pub use normalize::{RawValue, normalize_cell, normalize_json, normalize_str};
pub use resolve::{
    EntityResolver, IdentifierMode, NameFilter, OverrideTable, Resolution, ResolutionStrategy,
};
pub use schema::{ColumnSpec, ColumnTarget, HeaderMapping, LocateOptions, locate};
pub use source::{IndicatorSource, Payload, PayloadBody, PayloadPart, extract_parts};
pub use store::{JsonFileStore, MemoryStore, RecordStore};
pub use temporal::{LatestTracker, parse_year, select_latest};
pub use types::*;
