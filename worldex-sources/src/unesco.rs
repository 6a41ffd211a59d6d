use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use worldex_core::{
    ColumnSpec, EntityResolver, ExtractContext, Extraction, IndicatorSource, LatestTracker,
    MergePolicy, Payload, WorldexError, extract_indicators, extract_parts, locate_table,
};

use crate::decode::{csv_rows, is_zip, off_thread, zip_csv_member};
use crate::http::{HttpFetch, Requester, finish};

/// Bulk data releases, newest first. The first one that downloads is used.
pub const RELEASES: &[&str] = &["202509", "202504", "202409", "202404"];

const BULK_ROOT: &str = "https://download.uis.unesco.org/bdds";

/// UNESCO Institute for Statistics bulk download (BDDS): a ZIP per theme holding a
/// national-data CSV in long indicator layout.
pub struct UnescoBulkSource {
    name: &'static str,
    policy: MergePolicy,
    req: Requester,
    root: String,
    archive: &'static str,
    member: &'static str,
    releases: Vec<String>,
    indicators: Vec<(String, String)>,
}

fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(c, f)| ((*c).to_string(), (*f).to_string()))
        .collect()
}

impl UnescoBulkSource {
    fn new(
        http: Arc<dyn HttpFetch>,
        name: &'static str,
        policy: MergePolicy,
        archive: &'static str,
        member: &'static str,
        indicators: &[(&str, &str)],
    ) -> Self {
        Self {
            name,
            policy,
            req: Requester::new(http, name, Duration::ZERO),
            root: BULK_ROOT.to_string(),
            archive,
            member,
            releases: RELEASES.iter().map(|s| (*s).to_string()).collect(),
            indicators: owned(indicators),
        }
    }

    /// SDG 4 education indicators. Authoritative for literacy and completion, so it
    /// overwrites.
    #[must_use]
    pub fn sdg(http: Arc<dyn HttpFetch>) -> Self {
        Self::new(
            http,
            "unesco-sdg",
            MergePolicy::Overwrite,
            "SDG",
            "SDG_DATA_NATIONAL",
            &[
                ("LR.AG15T99", "literacyAdult"),
                ("LR.AG15T24", "literacyYouth"),
                ("LR.AG15T99.F", "literacyAdultF"),
                ("CR.1", "primaryCompletion"),
                ("CR.2", "lowerSecCompletion"),
                ("CR.3", "upperSecCompletion"),
                ("XGDP.FSGOV.FFNTR", "govtEduSpendGDP"),
            ],
        )
    }

    /// Other policy-relevant indicators (research and innovation). Fills gaps only.
    #[must_use]
    pub fn opri(http: Arc<dyn HttpFetch>) -> Self {
        Self::new(
            http,
            "unesco-opri",
            MergePolicy::FillOnly,
            "OPRI",
            "OPRI_DATA_NATIONAL",
            &[
                ("GERD.HERD.GDP", "rdSpendGDP"),
                ("GERD.GOVERD.GDP", "govRdGDP"),
                ("FTE.TOTAL.SC", "researchersPerMillion"),
                ("FTE.TOTAL.F.SC", "researchersFemale"),
                ("PAT.RESD.P6", "patentApplications"),
            ],
        )
    }

    /// Download root other than the public BDDS host.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into().trim_end_matches('/').to_string();
        self
    }

    /// Release identifiers to try, newest first.
    #[must_use]
    pub fn with_releases<I, S>(mut self, releases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.releases = releases.into_iter().map(Into::into).collect();
        self
    }

    fn archive_url(&self, release: &str) -> String {
        format!("{}/{release}/{}.zip", self.root, self.archive)
    }

    /// Download the first release that serves a real archive.
    async fn download(&self) -> Result<(String, Vec<u8>), WorldexError> {
        let mut tried = Vec::new();
        for release in &self.releases {
            let url = self.archive_url(release);
            match self.req.response(&url).await {
                Ok(resp) if resp.is_success() && is_zip(&resp.body) => {
                    return Ok((release.clone(), resp.body));
                }
                Ok(resp) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        source = self.name,
                        release = %release,
                        status = resp.status,
                        "release unavailable"
                    );
                    tried.push(format!("{release} (HTTP {})", resp.status));
                }
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        source = self.name,
                        release = %release,
                        error = %e,
                        "release unavailable"
                    );
                    tried.push(format!("{release} ({e})"));
                }
            }
        }
        Err(WorldexError::source_unavailable(
            self.name,
            format!("no {} release found; tried {}", self.archive, tried.join(", ")),
        ))
    }
}

#[async_trait]
impl IndicatorSource for UnescoBulkSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "UNESCO Institute for Statistics"
    }

    fn merge_policy(&self) -> Option<MergePolicy> {
        Some(self.policy)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "worldex_sources::unesco::bulk_fetch",
            skip(self),
            fields(source = self.name),
        )
    )]
    async fn fetch(&self) -> Result<Payload, WorldexError> {
        let (release, archive) = self.download().await?;
        let name = self.name;
        let member = self.member;
        let rows = off_thread(name, move || {
            let csv = zip_csv_member(name, archive, member)?;
            csv_rows(name, &csv)
        })
        .await?;
        #[cfg(feature = "tracing")]
        tracing::info!(release = %release, rows = rows.len(), "bulk release decoded");
        Ok(Payload::new().with_table(release, rows))
    }

    fn extract(&self, payload: Payload, ctx: &ExtractContext) -> Result<Extraction, WorldexError> {
        let specs = [
            ColumnSpec::entity("country_id"),
            ColumnSpec::year("year"),
            ColumnSpec::indicator("indicator_id"),
            ColumnSpec::value("value"),
        ];
        let indicators: Vec<(&str, &str)> = self
            .indicators
            .iter()
            .map(|(c, f)| (c.as_str(), f.as_str()))
            .collect();
        let resolver = EntityResolver::codes_only();
        extract_parts(self.name, payload, |part| {
            let rows = part.table(self.name)?;
            let mapping = locate_table(self.name, rows, &ctx.locate_options(), &specs)?;
            extract_indicators(self.name, rows, &mapping, &indicators, &resolver, ctx)
        })
    }
}

const API_NAME: &str = "unesco-api";

/// UIS REST API, used for PISA scores. Requires an API key.
pub struct UnescoApiSource {
    req: Requester,
    base_url: String,
    api_key: String,
    indicators: Vec<(String, String)>,
}

impl UnescoApiSource {
    /// Public indicator endpoint root.
    pub const BASE_URL: &'static str = "https://api.uis.unesco.org/api/public/v1/data/indicators";

    /// Source authenticated with `api_key`.
    #[must_use]
    pub fn new(http: Arc<dyn HttpFetch>, api_key: impl Into<String>) -> Self {
        Self {
            req: Requester::new(http, API_NAME, Duration::from_millis(300)),
            base_url: Self::BASE_URL.to_string(),
            api_key: api_key.into(),
            indicators: owned(&[
                ("LO.PISA.MAT", "pisaMath"),
                ("LO.PISA.REA", "pisaRead"),
                ("LO.PISA.SCI", "pisaScience"),
            ]),
        }
    }

    /// Point at another endpoint root.
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

    fn url(&self, code: &str) -> Result<String, WorldexError> {
        let url = url::Url::parse_with_params(
            &format!("{}/{code}", self.base_url),
            &[("apiKey", self.api_key.as_str()), ("format", "json")],
        )
        .map_err(|e| WorldexError::InvalidArg(format!("{API_NAME} url: {e}")))?;
        Ok(url.into())
    }
}

fn year_label(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => n
            .as_i64()
            .map(|y| y.to_string())
            .or_else(|| n.as_f64().map(|y| format!("{y:.0}"))),
        _ => None,
    }
}

/// `{"data": [{"geoUnit": {"id"}, "observations": [{"year", "value"}]}]}` into `field`.
fn extract_api(body: &Value, field: &str, cutoff_year: i32) -> Result<Extraction, WorldexError> {
    let entries = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| WorldexError::decode(API_NAME, "missing data array"))?;

    let resolver = EntityResolver::codes_only();
    let mut out = Extraction::new();
    let mut tracker = LatestTracker::new(cutoff_year);
    for entry in entries {
        let id = entry
            .get("geoUnit")
            .and_then(|g| g.get("id"))
            .and_then(Value::as_str)
            .unwrap_or("");
        let Some(code) = out.resolve(&resolver, id) else {
            continue;
        };
        let observations = entry.get("observations").and_then(Value::as_array);
        for obs in observations.into_iter().flatten() {
            if let Some(year) = obs.get("year").and_then(year_label) {
                tracker.offer(code.clone(), &year, obs.get("value"));
            }
        }
    }
    for (code, obs) in tracker.into_observations() {
        out.fields.insert(code, field, obs);
    }
    Ok(out)
}

#[async_trait]
impl IndicatorSource for UnescoApiSource {
    fn name(&self) -> &'static str {
        API_NAME
    }

    fn vendor(&self) -> &'static str {
        "UNESCO Institute for Statistics"
    }

    fn merge_policy(&self) -> Option<MergePolicy> {
        Some(MergePolicy::FillOnly)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "worldex_sources::unesco::api_fetch", skip(self))
    )]
    async fn fetch(&self) -> Result<Payload, WorldexError> {
        if self.api_key.trim().is_empty() {
            return Err(WorldexError::source_unavailable(API_NAME, "no API key configured"));
        }
        let mut payload = Payload::new();
        let mut last_err = None;
        for (i, (code, _)) in self.indicators.iter().enumerate() {
            if i > 0 {
                self.req.pause().await;
            }
            let body = match self.url(code) {
                Ok(url) => self.req.json(&url).await,
                Err(e) => Err(e),
            };
            match body {
                Ok(body) => payload.push_json(code.as_str(), body),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(indicator = %code, error = %e, "indicator fetch failed");
                    payload.warn(format!("{code}: {e}"));
                    last_err = Some(e);
                }
            }
        }
        finish(API_NAME, payload, last_err)
    }

    fn extract(&self, payload: Payload, ctx: &ExtractContext) -> Result<Extraction, WorldexError> {
        extract_parts(API_NAME, payload, |part| {
            let field = self
                .indicators
                .iter()
                .find(|(c, _)| *c == part.label)
                .map(|(_, f)| f.as_str())
                .ok_or_else(|| {
                    WorldexError::decode(API_NAME, format!("unexpected indicator {}", part.label))
                })?;
            extract_api(part.json(API_NAME)?, field, ctx.cutoff_year)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_picks_latest_observation_per_unit() {
        let body = json!({"data": [
            {"geoUnit": {"id": "FIN"}, "observations": [
                {"year": 2018, "value": 507.3},
                {"year": 2022, "value": 484.2}
            ]},
            {"geoUnit": {"id": "40510"}, "observations": [{"year": 2022, "value": 1.0}]},
            {"geoUnit": {"id": "EST"}, "observations": []}
        ]});
        let out = extract_api(&body, "pisaMath", 2025).unwrap();
        let fin = out.fields.get("FIN", "pisaMath").unwrap();
        assert_eq!((fin.value, fin.year.as_str()), (484.2, "2022"));
        assert_eq!(out.fields.entities(), 1);
    }

    #[test]
    fn api_key_is_query_encoded() {
        let src = UnescoApiSource::new(<dyn HttpFetch>::from_fn(|_| unreachable!()), "a b&c");
        let url = src.url("LO.PISA.MAT").unwrap();
        assert!(url.ends_with("/LO.PISA.MAT?apiKey=a+b%26c&format=json"));
    }

    #[test]
    fn year_labels_accept_numbers_and_strings() {
        assert_eq!(year_label(&json!(2022)).as_deref(), Some("2022"));
        assert_eq!(year_label(&json!("2021")).as_deref(), Some("2021"));
        assert_eq!(year_label(&json!(null)), None);
    }
}
