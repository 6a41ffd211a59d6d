//! Layers that wrap a source without changing what it extracts.
//!
//! `worldex-middleware` ships two: a politeness delay before each download and an on-disk
//! payload cache. Both only touch `fetch`; `extract` is always forwarded, so a wrapped
//! source yields the same field map as the bare one for the same payload.

use std::sync::Arc;

use crate::source::IndicatorSource;

/// One wrapping layer, consumed when it is applied.
///
/// Wrappers must forward `name` and `merge_policy` so reports and precedence are the
/// same with or without the layer.
pub trait Middleware: Send + Sync {
    /// Wrap `inner`.
    fn apply(self: Box<Self>, inner: Arc<dyn IndicatorSource>) -> Arc<dyn IndicatorSource>;

    /// Layer name shown by `SourceBuilder::describe`; also used to replace a layer of the
    /// same kind.
    fn name(&self) -> &'static str;

    /// Layer settings, e.g. `{"delay_ms": 400}` or `{"dir": ".cache"}`.
    fn config_json(&self) -> serde_json::Value;
}
