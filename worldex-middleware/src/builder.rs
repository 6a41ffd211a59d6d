//! Builder for composing a source with middleware layers.
//!
//! Layers form an onion around the raw source. `layers` is stored outermost-first (last
//! added is outermost) and applied in reverse during `build()`:
//!
//! ```text
//! builder.with_throttle(..).with_cache(..)
//!
//! Storage: [Cache, Throttle]
//! Result:  Cache(Throttle(Raw))
//! ```
//!
//! With that order a cache hit skips both the download and the politeness delay.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use worldex_core::{IndicatorSource, Middleware};

use crate::cache::CacheMiddleware;
use crate::throttle::ThrottleMiddleware;

/// Middleware builder for composing a source with layered wrappers.
pub struct SourceBuilder {
    raw: Arc<dyn IndicatorSource>,
    layers: Vec<Box<dyn Middleware>>,
}

impl SourceBuilder {
    /// Create a new builder from a raw, unwrapped source.
    #[must_use]
    pub fn new(raw: Arc<dyn IndicatorSource>) -> Self {
        Self {
            raw,
            layers: Vec::new(),
        }
    }

    /// Add or replace the post-fetch politeness delay, as the outermost layer.
    #[must_use]
    pub fn with_throttle(mut self, delay: Duration) -> Self {
        self.layers.retain(|m| m.name() != "ThrottledSource");
        self.layers.insert(0, Box::new(ThrottleMiddleware::new(delay)));
        self
    }

    /// Add or replace the on-disk payload cache, as the outermost layer.
    #[must_use]
    pub fn with_cache(mut self, dir: impl Into<PathBuf>, max_age: Option<Duration>) -> Self {
        self.layers.retain(|m| m.name() != "CachedSource");
        self.layers
            .insert(0, Box::new(CacheMiddleware::new(dir.into(), max_age)));
        self
    }

    /// Add an arbitrary middleware layer at the outermost position.
    #[must_use]
    pub fn layer(mut self, layer: Box<dyn Middleware>) -> Self {
        self.layers.insert(0, layer);
        self
    }

    /// Layer names and configs, outermost first, ending with the raw source.
    #[must_use]
    pub fn describe(&self) -> Vec<(String, serde_json::Value)> {
        self.layers
            .iter()
            .map(|l| (l.name().to_string(), l.config_json()))
            .chain(std::iter::once((
                "RawSource".to_string(),
                json!({ "name": self.raw.name() }),
            )))
            .collect()
    }

    /// Build the wrapped source, applying layers innermost first.
    #[must_use]
    pub fn build(self) -> Arc<dyn IndicatorSource> {
        let mut acc = Arc::clone(&self.raw);
        for m in self.layers.into_iter().rev() {
            acc = m.apply(acc);
        }
        acc
    }
}
