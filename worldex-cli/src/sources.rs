//! Source catalog: names accepted on the command line and how each is wired.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use worldex::{IndicatorSource, WorldexError};
use worldex_middleware::SourceBuilder;
use worldex_sources::{
    HttpFetch, ImfSource, OecdSource, OwidSource, SipriSource, UnPopulationSource,
    UnescoApiSource, UnescoBulkSource, WorldBankSource,
};

/// Every known source, in the default precedence order.
pub const KNOWN: &[(&str, &str)] = &[
    ("worldbank", "World Bank WDI indicator API"),
    ("imf", "IMF DataMapper API (projections excluded)"),
    ("oecd", "OECD SDMX datasets, member states only"),
    ("un-population", "UN World Population Prospects workbooks (needs --un-dir)"),
    ("sipri", "SIPRI military expenditure workbook"),
    ("unesco-sdg", "UNESCO UIS SDG bulk release"),
    ("unesco-opri", "UNESCO UIS OPRI bulk release (fills gaps only)"),
    ("unesco-api", "UNESCO UIS data API (needs an API key)"),
    ("owid", "Our World in Data energy dataset and grapher charts"),
];

/// Settings that decide how sources are constructed and wrapped.
#[derive(Debug, Clone, Default)]
pub struct SourceSettings {
    pub un_dir: Option<PathBuf>,
    pub unesco_api_key: Option<String>,
    pub cache_dir: Option<PathBuf>,
    pub cache_max_age: Option<Duration>,
    pub throttle: Duration,
}

impl SourceSettings {
    /// Known sources that can run with these settings, in precedence order.
    #[must_use]
    pub fn default_selection(&self) -> Vec<String> {
        KNOWN
            .iter()
            .map(|(name, _)| *name)
            .filter(|name| match *name {
                "un-population" => self.un_dir.is_some(),
                "unesco-api" => self.api_key().is_some(),
                _ => true,
            })
            .map(str::to_string)
            .collect()
    }

    fn api_key(&self) -> Option<&str> {
        self.unesco_api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    fn raw(
        &self,
        name: &str,
        http: &Arc<dyn HttpFetch>,
    ) -> Result<Arc<dyn IndicatorSource>, WorldexError> {
        let http = Arc::clone(http);
        let source: Arc<dyn IndicatorSource> = match name {
            "worldbank" => Arc::new(WorldBankSource::new(http)),
            "imf" => Arc::new(ImfSource::new(http)),
            "oecd" => Arc::new(OecdSource::new(http)),
            "un-population" => {
                let dir = self.un_dir.clone().ok_or_else(|| {
                    WorldexError::InvalidArg("un-population needs --un-dir".to_string())
                })?;
                Arc::new(UnPopulationSource::new(dir))
            }
            "sipri" => Arc::new(SipriSource::new(http)),
            "unesco-sdg" => Arc::new(UnescoBulkSource::sdg(http)),
            "unesco-opri" => Arc::new(UnescoBulkSource::opri(http)),
            "unesco-api" => {
                let key = self.api_key().ok_or_else(|| {
                    WorldexError::InvalidArg("unesco-api needs --unesco-api-key".to_string())
                })?;
                Arc::new(UnescoApiSource::new(http, key))
            }
            "owid" => Arc::new(OwidSource::new(http)),
            other => {
                let names: Vec<&str> = KNOWN.iter().map(|(n, _)| *n).collect();
                return Err(WorldexError::InvalidArg(format!(
                    "unknown source '{other}'; expected one of: {}",
                    names.join(", ")
                )));
            }
        };
        Ok(source)
    }

    /// Build `name` wrapped in the configured throttle and cache layers.
    ///
    /// Local workbooks are never cached.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an unknown name or a missing required setting.
    pub fn build(
        &self,
        name: &str,
        http: &Arc<dyn HttpFetch>,
    ) -> Result<Arc<dyn IndicatorSource>, WorldexError> {
        let mut builder = SourceBuilder::new(self.raw(name, http)?);
        if !self.throttle.is_zero() && name != "un-population" {
            builder = builder.with_throttle(self.throttle);
        }
        if let Some(dir) = &self.cache_dir
            && name != "un-population"
        {
            builder = builder.with_cache(dir.clone(), self.cache_max_age);
        }
        Ok(builder.build())
    }

    /// Build every named source, failing on the first bad name.
    ///
    /// # Errors
    /// See [`Self::build`].
    pub fn build_all(
        &self,
        names: &[String],
        http: &Arc<dyn HttpFetch>,
    ) -> Result<Vec<Arc<dyn IndicatorSource>>, WorldexError> {
        names.iter().map(|n| self.build(n.trim(), http)).collect()
    }
}
