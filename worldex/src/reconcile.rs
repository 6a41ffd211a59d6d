use std::sync::Arc;

use worldex_core::{
    CanonicalStore, ExtractContext, FetchMode, IndicatorSource, MergePolicy, Payload, RecordStore,
    RunReport, SourceReport, WorldexError, merge,
};

use crate::core::{Reconciler, tag_err};

impl Reconciler {
    /// Run every source once and fold its output into `store`.
    ///
    /// Behavior:
    /// - Sources are processed in registration order. Each gets a fetch bounded by the
    ///   source timeout, then `extract`, then a merge under its own policy or the run
    ///   policy.
    /// - Any failure (fetch, timeout, decode, missing header) skips that source with a
    ///   reason in the report; later sources still run.
    /// - In `FetchMode::Concurrent` all fetches are issued together, but extraction and
    ///   merging still happen one source at a time in registration order.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "worldex::reconcile",
            skip(self, store),
            fields(sources = self.sources.len(), countries = store.len()),
        )
    )]
    pub async fn reconcile(&self, store: &mut CanonicalStore) -> RunReport {
        let ctx = ExtractContext::from_config(&self.cfg, self.resolver.clone());
        let mut report = RunReport {
            sources: Vec::with_capacity(self.sources.len()),
            countries_before: store.len(),
            countries_after: 0,
        };

        match self.cfg.fetch_mode {
            FetchMode::Sequential => {
                for src in &self.sources {
                    let fetched = self.fetch_one(src).await;
                    report.sources.push(Self::absorb(
                        src,
                        fetched,
                        &ctx,
                        self.cfg.merge_policy,
                        store,
                    ));
                }
            }
            FetchMode::Concurrent => {
                let fetched =
                    futures::future::join_all(self.sources.iter().map(|s| self.fetch_one(s)))
                        .await;
                for (src, result) in self.sources.iter().zip(fetched) {
                    report.sources.push(Self::absorb(
                        src,
                        result,
                        &ctx,
                        self.cfg.merge_policy,
                        store,
                    ));
                }
            }
        }

        report.countries_after = store.len();
        report
    }

    /// Load from `records`, reconcile, and save.
    ///
    /// # Errors
    /// Returns `StoreCorrupt` if the existing snapshot cannot be read, and
    /// `StoreUnwritable` if the result cannot be saved. Source failures never fail the run.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "worldex::run", skip(self, records), fields(store = %records.describe()))
    )]
    pub async fn run(&self, records: &dyn RecordStore) -> Result<RunReport, WorldexError> {
        let mut store = records.load()?;
        let report = self.reconcile(&mut store).await;
        records.save(&store)?;
        #[cfg(feature = "tracing")]
        tracing::info!(
            countries = report.countries_after,
            fields_added = report.fields_added(),
            skipped = report.skipped().count(),
            "store saved"
        );
        Ok(report)
    }

    async fn fetch_one(&self, src: &Arc<dyn IndicatorSource>) -> Result<Payload, WorldexError> {
        let name = src.name();
        let res = Self::call_with_timeout(name, self.cfg.source_timeout, src.fetch())
            .await
            .map_err(|e| tag_err(name, e));
        let pause = src.pause_after_fetch();
        if !pause.is_zero() {
            #[cfg(feature = "tracing")]
            tracing::debug!(source = name, delay = ?pause, "pausing after fetch");
            tokio::time::sleep(pause).await;
        }
        res
    }

    fn absorb(
        src: &Arc<dyn IndicatorSource>,
        fetched: Result<Payload, WorldexError>,
        ctx: &ExtractContext,
        run_policy: MergePolicy,
        store: &mut CanonicalStore,
    ) -> SourceReport {
        let name = src.name();
        let policy = src.merge_policy().unwrap_or(run_policy);
        let extracted = fetched.and_then(|p| src.extract(p, ctx).map_err(|e| tag_err(name, e)));
        let extraction = match extracted {
            Ok(x) => x,
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(source = name, error = %e, "source skipped");
                return SourceReport::skipped(name, policy, e);
            }
        };

        let outcome = merge(store, &extraction.fields, policy);
        let mut rep = SourceReport::new(name, policy);
        rep.entities = extraction.fields.entities();
        rep.fields_extracted = extraction.field_count();
        rep.fields_added = outcome.added;
        rep.skipped_identifiers = extraction.skipped.len();
        rep.unresolved = extraction.unresolved.into_iter().collect();
        rep.warnings = extraction.warnings;

        #[cfg(feature = "tracing")]
        {
            tracing::info!(
                source = name,
                entities = rep.entities,
                extracted = rep.fields_extracted,
                added = rep.fields_added,
                changed = outcome.changed,
                "source merged"
            );
            if !rep.unresolved.is_empty() {
                tracing::warn!(source = name, unresolved = ?rep.unresolved, "unresolved identifiers");
            }
            for w in &rep.warnings {
                tracing::warn!(source = name, warning = %w, "partial source failure");
            }
        }
        rep
    }
}
