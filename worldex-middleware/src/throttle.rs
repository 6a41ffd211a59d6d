//! Fixed-delay politeness wrapper.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use worldex_core::{
    ExtractContext, Extraction, IndicatorSource, MergePolicy, Middleware, Payload, SourceKey,
    WorldexError,
};

/// Asks the orchestrator to wait a fixed delay after every fetch of the inner source,
/// successful or not.
///
/// The wait happens outside the fetch itself, so it never counts against the source
/// timeout.
pub struct ThrottledSource {
    inner: Arc<dyn IndicatorSource>,
    delay: Duration,
}

impl ThrottledSource {
    /// Wrap `inner` with a post-fetch pause.
    pub fn new(inner: Arc<dyn IndicatorSource>, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Access the inner source.
    pub fn inner(&self) -> &Arc<dyn IndicatorSource> {
        &self.inner
    }

    /// Configured delay.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl IndicatorSource for ThrottledSource {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn key(&self) -> SourceKey {
        self.inner.key()
    }

    fn vendor(&self) -> &'static str {
        self.inner.vendor()
    }

    fn merge_policy(&self) -> Option<MergePolicy> {
        self.inner.merge_policy()
    }

    fn pause_after_fetch(&self) -> Duration {
        self.delay.max(self.inner.pause_after_fetch())
    }

    async fn fetch(&self) -> Result<Payload, WorldexError> {
        self.inner.fetch().await
    }

    fn extract(&self, payload: Payload, ctx: &ExtractContext) -> Result<Extraction, WorldexError> {
        self.inner.extract(payload, ctx)
    }
}

pub(crate) struct ThrottleMiddleware {
    delay: Duration,
}

impl ThrottleMiddleware {
    pub(crate) const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Middleware for ThrottleMiddleware {
    fn apply(self: Box<Self>, inner: Arc<dyn IndicatorSource>) -> Arc<dyn IndicatorSource> {
        Arc::new(ThrottledSource::new(inner, self.delay))
    }

    fn name(&self) -> &'static str {
        "ThrottledSource"
    }

    fn config_json(&self) -> serde_json::Value {
        serde_json::json!({
            "delay_ms": u64::try_from(self.delay.as_millis()).unwrap_or(u64::MAX),
        })
    }
}
