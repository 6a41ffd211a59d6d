use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use worldex_core::{
    ColumnTieBreak, EntityResolver, FetchMode, IndicatorSource, MergePolicy, OverrideTable,
    WorldexConfig, WorldexError,
};

/// Orchestrator that runs registered sources in order and merges their output.
pub struct Reconciler {
    pub(crate) sources: Vec<Arc<dyn IndicatorSource>>,
    pub(crate) cfg: WorldexConfig,
    pub(crate) resolver: EntityResolver,
}

/// Builder for constructing a `Reconciler` with custom configuration.
pub struct ReconcilerBuilder {
    sources: Vec<Arc<dyn IndicatorSource>>,
    cfg: WorldexConfig,
    overrides: OverrideTable,
    resolver: Option<EntityResolver>,
}

impl Default for ReconcilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconcilerBuilder {
    /// Create a new builder with defaults: fill-only, sequential fetches, clock-derived
    /// cutoff, and the built-in name override table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sources: vec![],
            cfg: WorldexConfig::default(),
            overrides: OverrideTable::builtin(),
            resolver: None,
        }
    }

    /// Register a source. Registration order is processing order, and under fill-only
    /// the earlier source wins every conflict.
    #[must_use]
    pub fn with_source(mut self, s: Arc<dyn IndicatorSource>) -> Self {
        self.sources.push(s);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: WorldexConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Policy for sources that do not declare their own.
    #[must_use]
    pub const fn merge_policy(mut self, policy: MergePolicy) -> Self {
        self.cfg.merge_policy = policy;
        self
    }

    /// Latest acceptable observation year.
    #[must_use]
    pub const fn cutoff_year(mut self, year: i32) -> Self {
        self.cfg.cutoff_year = Some(year);
        self
    }

    /// Year label for undated tables.
    #[must_use]
    pub fn undated_year(mut self, label: impl Into<String>) -> Self {
        self.cfg.undated_year = Some(label.into());
        self
    }

    /// Rows scanned for a header.
    #[must_use]
    pub const fn scan_limit(mut self, rows: usize) -> Self {
        self.cfg.scan_limit = rows;
        self
    }

    /// Column tie-break for header matching.
    #[must_use]
    pub const fn tie_break(mut self, tie_break: ColumnTieBreak) -> Self {
        self.cfg.tie_break = tie_break;
        self
    }

    /// Upper bound on each source's fetch. A timed-out source is skipped.
    #[must_use]
    pub const fn source_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.source_timeout = timeout;
        self
    }

    /// Sequential or concurrent fetching. Merging is always sequential.
    #[must_use]
    pub const fn fetch_mode(mut self, mode: FetchMode) -> Self {
        self.cfg.fetch_mode = mode;
        self
    }

    /// Extra name-to-code overrides, layered over the built-in table.
    #[must_use]
    pub fn overrides(mut self, extra: OverrideTable) -> Self {
        self.overrides.absorb(extra);
        self
    }

    /// Use `resolver` for name-keyed sources instead of the default chain.
    #[must_use]
    pub fn resolver(mut self, resolver: EntityResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Build the `Reconciler`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no source was registered, if two sources share a name, or
    /// if the scan limit is zero.
    pub fn build(self) -> Result<Reconciler, WorldexError> {
        if self.sources.is_empty() {
            return Err(WorldexError::InvalidArg(
                "no sources registered; add at least one via with_source(...)".to_string(),
            ));
        }
        let mut seen: HashSet<&'static str> = HashSet::new();
        for s in &self.sources {
            if !seen.insert(s.name()) {
                return Err(WorldexError::InvalidArg(format!(
                    "source '{}' registered twice",
                    s.name()
                )));
            }
        }
        if self.cfg.scan_limit == 0 {
            return Err(WorldexError::InvalidArg("scan_limit must be positive".to_string()));
        }

        let resolver = self
            .resolver
            .unwrap_or_else(|| EntityResolver::names(self.overrides));
        Ok(Reconciler {
            sources: self.sources,
            cfg: self.cfg,
            resolver,
        })
    }
}

/// Attribute an error to `source` unless it already names one.
pub fn tag_err(source: &str, e: WorldexError) -> WorldexError {
    match e {
        e @ (WorldexError::SourceUnavailable { .. }
        | WorldexError::SourceTimeout { .. }
        | WorldexError::SchemaNotFound { .. }
        | WorldexError::Decode { .. }) => e,
        other => WorldexError::source_unavailable(source, other.to_string()),
    }
}

impl Reconciler {
    /// Wrap a source fetch with a timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "worldex::core::call_with_timeout",
            skip(fut),
            fields(
                source = source_name,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn call_with_timeout<T, Fut>(
        source_name: &'static str,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, WorldexError>
    where
        Fut: std::future::Future<Output = Result<T, WorldexError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(WorldexError::source_timeout(source_name)))
    }

    /// Start building a new `Reconciler`.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use worldex::{Reconciler, MergePolicy};
    ///
    /// let reconciler = Reconciler::builder()
    ///     .with_source(Arc::new(world_bank))
    ///     .with_source(Arc::new(imf))
    ///     .merge_policy(MergePolicy::FillOnly)
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> ReconcilerBuilder {
        ReconcilerBuilder::new()
    }

    /// Registered source names in processing order.
    #[must_use]
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &WorldexConfig {
        &self.cfg
    }
}
