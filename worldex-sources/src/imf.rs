use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use worldex_core::{
    EntityResolver, ExtractContext, Extraction, IndicatorSource, Payload, WorldexError,
    extract_parts, select_latest,
};

use crate::http::{HttpFetch, Requester, finish};

const NAME: &str = "imf";

/// IMF DataMapper indicator codes and the fields they feed.
pub const INDICATORS: &[(&str, &str)] = &[
    ("NGDP_RPCH", "gdpGrowth"),
    ("NGDPD", "gdpUSD"),
    ("NGDPDPC", "gdpPerCapUSD"),
    ("PPPGDP", "gdpPPP"),
    ("PPPPC", "gdpPerCapPPP"),
    ("PPPSH", "gdpShareWorld"),
    ("PCPIPCH", "inflation"),
    ("PCPIEPCH", "inflationCore"),
    ("LUR", "unemployment"),
    ("LE", "employment"),
    ("GGXCNL_NGDP", "fiscalBalance"),
    ("GGXWDG_NGDP", "govtDebt"),
    ("GGR_NGDP", "govtRevenue"),
    ("GGX_NGDP", "govtExpenditure"),
    ("BCA_NGDPD", "currentAccount"),
    ("TX_RPCH", "exportGrowth"),
    ("TM_RPCH", "importGrowth"),
    ("NID_NGDP", "investment"),
    ("NGSD_NGDP", "savings"),
];

/// IMF World Economic Outlook figures via the DataMapper API.
///
/// Responses mix estimates with projections; the cutoff year drops the projections.
pub struct ImfSource {
    req: Requester,
    base_url: String,
    indicators: Vec<(String, String)>,
}

impl ImfSource {
    /// Public API root.
    pub const BASE_URL: &'static str = "https://www.imf.org/external/datamapper/api/v1";

    /// Source over the default indicator list.
    #[must_use]
    pub fn new(http: Arc<dyn HttpFetch>) -> Self {
        Self {
            req: Requester::new(http, NAME, Duration::from_millis(500)),
            base_url: Self::BASE_URL.to_string(),
            indicators: INDICATORS
                .iter()
                .map(|(c, f)| ((*c).to_string(), (*f).to_string()))
                .collect(),
        }
    }

    /// Point at another API root.
    #[must_use]
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Pause between indicator requests.
    #[must_use]
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.req.set_delay(delay);
        self
    }

    /// Replace the indicator list with `(code, field)` pairs.
    #[must_use]
    pub fn with_indicators<I, C, F>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, F)>,
        C: Into<String>,
        F: Into<String>,
    {
        self.indicators = pairs.into_iter().map(|(c, f)| (c.into(), f.into())).collect();
        self
    }
}

/// `{"values": {CODE: {COUNTRY: {YEAR: value}}}}` into observations of `field`.
fn extract_values(
    body: &Value,
    code: &str,
    field: &str,
    cutoff_year: i32,
) -> Result<Extraction, WorldexError> {
    let countries = body
        .get("values")
        .and_then(|v| v.get(code))
        .and_then(Value::as_object)
        .ok_or_else(|| WorldexError::decode(NAME, format!("no values for {code}")))?;

    let resolver = EntityResolver::codes_only();
    let mut out = Extraction::new();
    for (country, years) in countries {
        let Some(years) = years.as_object() else {
            continue;
        };
        let Some(iso) = out.resolve(&resolver, country) else {
            continue;
        };
        if let Some(obs) = select_latest(years.iter().map(|(y, v)| (y.as_str(), v)), cutoff_year) {
            out.fields.insert(iso, field, obs);
        }
    }
    Ok(out)
}

#[async_trait]
impl IndicatorSource for ImfSource {
    fn name(&self) -> &'static str {
        NAME
    }

    fn vendor(&self) -> &'static str {
        "International Monetary Fund"
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "worldex_sources::imf::fetch",
            skip(self),
            fields(indicators = self.indicators.len()),
        )
    )]
    async fn fetch(&self) -> Result<Payload, WorldexError> {
        let mut payload = Payload::new();
        let mut last_err = None;
        for (i, (code, _)) in self.indicators.iter().enumerate() {
            if i > 0 {
                self.req.pause().await;
            }
            match self.req.json(&format!("{}/{code}", self.base_url)).await {
                Ok(body) => payload.push_json(code.as_str(), body),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(indicator = %code, error = %e, "indicator fetch failed");
                    payload.warn(format!("{code}: {e}"));
                    last_err = Some(e);
                }
            }
        }
        finish(NAME, payload, last_err)
    }

    fn extract(&self, payload: Payload, ctx: &ExtractContext) -> Result<Extraction, WorldexError> {
        extract_parts(NAME, payload, |part| {
            let (code, field) = self
                .indicators
                .iter()
                .find(|(c, _)| *c == part.label)
                .ok_or_else(|| {
                    WorldexError::decode(NAME, format!("unexpected indicator {}", part.label))
                })?;
            extract_values(part.json(NAME)?, code, field, ctx.cutoff_year)
        })
    }
}
