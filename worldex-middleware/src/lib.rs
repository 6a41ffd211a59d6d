//! worldex-middleware
//!
//! Wrappers that sit between the orchestrator and a raw source: a fixed politeness delay
//! after each fetch and an on-disk payload cache so re-runs skip the download.

mod builder;
mod cache;
mod throttle;

pub use crate::builder::SourceBuilder;
pub use crate::cache::CachedSource;
pub use crate::throttle::ThrottledSource;
