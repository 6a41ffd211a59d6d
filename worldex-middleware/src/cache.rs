//! On-disk payload cache.
//!
//! Each source's last good payload is stored as `{dir}/{name}.json`. A fresh entry is
//! served without calling the inner source. Cache I/O problems never fail a fetch: an
//! unreadable entry is a miss and an unwritable one is skipped.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use worldex_core::{
    ExtractContext, Extraction, IndicatorSource, MergePolicy, Middleware, Payload, SourceKey,
    WorldexError,
};

/// Wrapper that persists the inner source's payload and replays it on later fetches.
///
/// Payloads carrying part warnings are not cached, so the next run retries the failed
/// parts.
pub struct CachedSource {
    inner: Arc<dyn IndicatorSource>,
    dir: PathBuf,
    max_age: Option<Duration>,
    served_from_cache: AtomicBool,
}

impl CachedSource {
    /// Cache `inner` under `dir`. Entries older than `max_age` are refetched; `None`
    /// keeps entries forever.
    pub fn new(inner: Arc<dyn IndicatorSource>, dir: impl Into<PathBuf>, max_age: Option<Duration>) -> Self {
        Self {
            inner,
            dir: dir.into(),
            max_age,
            served_from_cache: AtomicBool::new(false),
        }
    }

    /// Access the inner source.
    pub fn inner(&self) -> &Arc<dyn IndicatorSource> {
        &self.inner
    }

    /// Cache file for this source.
    #[must_use]
    pub fn entry_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.inner.name()))
    }

    fn is_fresh(&self, path: &Path) -> bool {
        let Some(max_age) = self.max_age else {
            return true;
        };
        std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| SystemTime::now().duration_since(t).ok())
            .is_some_and(|age| age <= max_age)
    }

    fn read(&self) -> Option<Payload> {
        let path = self.entry_path();
        if !path.exists() || !self.is_fresh(&path) {
            return None;
        }
        let text = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&text) {
            Ok(p) => Some(p),
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(path = %path.display(), error = %_e, "ignoring unreadable cache entry");
                None
            }
        }
    }

    fn write(&self, payload: &Payload) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_vec(payload)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&json)?;
        tmp.persist(self.entry_path()).map_err(|e| e.error)?;
        Ok(())
    }
}

#[async_trait]
impl IndicatorSource for CachedSource {
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

    /// A cache hit downloaded nothing, so there is nothing to be polite about.
    fn pause_after_fetch(&self) -> Duration {
        if self.served_from_cache.load(Ordering::Relaxed) {
            Duration::ZERO
        } else {
            self.inner.pause_after_fetch()
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "worldex_middleware::cache::fetch",
            skip(self),
            fields(source = self.inner.name()),
        )
    )]
    async fn fetch(&self) -> Result<Payload, WorldexError> {
        if let Some(p) = self.read() {
            #[cfg(feature = "tracing")]
            tracing::info!(parts = p.parts.len(), "served from cache");
            self.served_from_cache.store(true, Ordering::Relaxed);
            return Ok(p);
        }
        self.served_from_cache.store(false, Ordering::Relaxed);
        let payload = self.inner.fetch().await?;
        if payload.warnings.is_empty()
            && !payload.is_empty()
            && let Err(_e) = self.write(&payload)
        {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_e, "cache write failed");
        }
        Ok(payload)
    }

    fn extract(&self, payload: Payload, ctx: &ExtractContext) -> Result<Extraction, WorldexError> {
        self.inner.extract(payload, ctx)
    }
}

pub(crate) struct CacheMiddleware {
    dir: PathBuf,
    max_age: Option<Duration>,
}

impl CacheMiddleware {
    pub(crate) const fn new(dir: PathBuf, max_age: Option<Duration>) -> Self {
        Self { dir, max_age }
    }
}

impl Middleware for CacheMiddleware {
    fn apply(self: Box<Self>, inner: Arc<dyn IndicatorSource>) -> Arc<dyn IndicatorSource> {
        Arc::new(CachedSource::new(inner, self.dir, self.max_age))
    }

    fn name(&self) -> &'static str {
        "CachedSource"
    }

    fn config_json(&self) -> serde_json::Value {
        serde_json::json!({
            "dir": self.dir.display().to_string(),
            "max_age_secs": self.max_age.map(|d| d.as_secs()),
        })
    }
}
