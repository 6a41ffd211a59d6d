use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use worldex_core::{
    EntityResolver, ExtractContext, Extraction, IndicatorSource, LatestTracker, MergePolicy,
    Payload, WorldexError, extract_parts,
};

use crate::http::{HttpFetch, Requester, finish};

const NAME: &str = "worldbank";

/// World Bank indicator codes and the fields they feed.
pub const INDICATORS: &[(&str, &str)] = &[
    ("NY.GDP.MKTP.CD", "gdp"),
    ("NY.GDP.PCAP.CD", "gdpPerCap"),
    ("NY.GDP.PCAP.PP.CD", "gdpPerCapPPP"),
    ("NY.GNP.PCAP.CD", "gniPerCap"),
    ("NY.GDP.MKTP.KD.ZG", "gdpGrowth"),
    ("FP.CPI.TOTL.ZG", "inflation"),
    ("SL.UEM.TOTL.ZS", "unemployment"),
    ("NE.TRD.GNFS.ZS", "tradeGDP"),
    ("BX.KLT.DINV.CD.WD", "fdi"),
    ("SI.POV.GINI", "gini"),
    ("SP.POP.TOTL", "population"),
    ("SP.POP.GROW", "popGrowth"),
    ("EN.POP.DNST", "popDensity"),
    ("SP.URB.TOTL.IN.ZS", "urbanPct"),
    ("SP.DYN.TFRT.IN", "fertilityRate"),
    ("SP.DYN.LE00.IN", "lifeExp"),
    ("SP.DYN.LE00.FE.IN", "lifeExpFemale"),
    ("SP.DYN.LE00.MA.IN", "lifeExpMale"),
    ("SP.DYN.IMRT.IN", "infantMortality"),
    ("SH.STA.MMRT", "maternalMortality"),
    ("SH.XPD.CHEX.GD.ZS", "healthSpendGDP"),
    ("SH.MED.PHYS.ZS", "physicians"),
    ("SN.ITK.DEFC.ZS", "undernourishment"),
    ("SE.ADT.LITR.ZS", "literacyRate"),
    ("SE.PRM.NENR", "primaryEnrollment"),
    ("SE.SEC.NENR", "secondaryEnrollment"),
    ("SE.TER.ENRR", "tertiaryEnrollment"),
    ("SE.XPD.TOTL.GD.ZS", "educationSpendGDP"),
    ("AG.LND.FRST.ZS", "forestArea"),
    ("EG.FEC.RNEW.ZS", "renewableEnergy"),
    ("EG.ELC.ACCS.ZS", "accessElectricity"),
    ("ER.H2O.INTR.PC", "freshwaterPerCap"),
    ("IT.NET.USER.ZS", "internetUsers"),
    ("IT.CEL.SETS.P2", "mobileSubscriptions"),
    ("SI.POV.DDAY", "povertyRate"),
    ("SI.POV.LMIC", "povertyRatio550"),
];

/// World Bank Indicators API (v2), one request per indicator.
///
/// Merges under overwrite: it is the primary source for the fields it carries.
pub struct WorldBankSource {
    req: Requester,
    base_url: String,
    indicators: Vec<(String, String)>,
}

impl WorldBankSource {
    /// Public API root.
    pub const BASE_URL: &'static str = "https://api.worldbank.org/v2";

    /// Source over the default indicator list.
    #[must_use]
    pub fn new(http: Arc<dyn HttpFetch>) -> Self {
        Self {
            req: Requester::new(http, NAME, Duration::from_millis(400)),
            base_url: Self::BASE_URL.to_string(),
            indicators: INDICATORS
                .iter()
                .map(|(c, f)| ((*c).to_string(), (*f).to_string()))
                .collect(),
        }
    }

    /// Point at another API root (mirrors, tests).
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

    fn url(&self, code: &str) -> String {
        format!(
            "{}/country/all/indicator/{code}?format=json&per_page=1000&mrv=1",
            self.base_url
        )
    }

    fn field_for(&self, code: &str) -> Option<&str> {
        self.indicators
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, f)| f.as_str())
    }
}

/// Parse one `[meta, rows]` response into observations of `field`.
fn extract_series(body: &Value, field: &str, cutoff_year: i32) -> Result<Extraction, WorldexError> {
    let rows = body
        .get(1)
        .and_then(Value::as_array)
        .ok_or_else(|| WorldexError::decode(NAME, "expected [metadata, rows]"))?;

    let resolver = EntityResolver::codes_only();
    let mut out = Extraction::new();
    let mut tracker = LatestTracker::new(cutoff_year);
    for row in rows {
        let id = row.get("countryiso3code").and_then(Value::as_str).unwrap_or("");
        let Some(code) = out.resolve(&resolver, id) else {
            continue;
        };
        let year = row.get("date").and_then(Value::as_str).unwrap_or("");
        tracker.offer(code, year, row.get("value"));
    }
    for (code, obs) in tracker.into_observations() {
        out.fields.insert(code, field, obs);
    }
    Ok(out)
}

#[async_trait]
impl IndicatorSource for WorldBankSource {
    fn name(&self) -> &'static str {
        NAME
    }

    fn vendor(&self) -> &'static str {
        "World Bank"
    }

    fn merge_policy(&self) -> Option<MergePolicy> {
        Some(MergePolicy::Overwrite)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "worldex_sources::worldbank::fetch",
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
            match self.req.json(&self.url(code)).await {
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
            let field = self.field_for(&part.label).ok_or_else(|| {
                WorldexError::decode(NAME, format!("unexpected indicator {}", part.label))
            })?;
            extract_series(part.json(NAME)?, field, ctx.cutoff_year)
        })
    }
}
