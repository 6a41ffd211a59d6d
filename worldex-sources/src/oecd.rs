use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use worldex_core::{
    Cell, ColumnSpec, EntityResolver, ExtractContext, Extraction, HeaderMapping, IndicatorSource,
    LatestTracker, Payload, WorldexError, extract_parts, locate_table,
};

use crate::decode::{csv_rows, off_thread};
use crate::http::{HttpFetch, Requester, finish};

const NAME: &str = "oecd";

/// The 38 OECD member states. Rows for other areas are ignored.
pub const MEMBERS: &[&str] = &[
    "AUS", "AUT", "BEL", "CAN", "CHL", "COL", "CRI", "CZE", "DNK", "EST", "FIN", "FRA", "DEU",
    "GRC", "HUN", "ISL", "IRL", "ISR", "ITA", "JPN", "KOR", "LVA", "LTU", "LUX", "MEX", "NLD",
    "NZL", "NOR", "POL", "PRT", "SVK", "SVN", "ESP", "SWE", "CHE", "TUR", "GBR", "USA",
];

/// One field drawn from an OECD dataset, optionally restricted to rows whose named
/// columns hold given values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OecdIndicator {
    /// Dataset identifier.
    pub dataset: String,
    /// `(column, value)` pairs a row must match, compared case-insensitively.
    pub filters: Vec<(String, String)>,
    /// Canonical field name.
    pub field: String,
}

impl OecdIndicator {
    /// Indicator over every row of `dataset`.
    pub fn new(dataset: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            filters: Vec::new(),
            field: field.into(),
        }
    }

    /// Require `column == value` on contributing rows.
    #[must_use]
    pub fn filter(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    fn matches(&self, headers: &[String], row: &[Cell]) -> Result<bool, String> {
        for (column, want) in &self.filters {
            let col = headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(column))
                .ok_or_else(|| format!("{}: no {column} column for {}", self.dataset, self.field))?;
            let got = row.get(col).map(Cell::text).unwrap_or_default();
            if !got.trim().eq_ignore_ascii_case(want) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// The default indicator set.
#[must_use]
pub fn default_indicators() -> Vec<OecdIndicator> {
    let with = |dataset: &str, column: &str, value: &str, field: &str| {
        OecdIndicator::new(dataset, field).filter(column, value)
    };
    vec![
        OecdIndicator::new("ANHRS", "hoursWorked"),
        OecdIndicator::new("TUD", "unionDensity"),
        with("MSTI", "SUBJECT", "GERD_GBARD", "rdSpending"),
        with("PDB_LV", "SUBJECT", "T_GDPHRS_V", "gdpPerHour"),
        with("SOCX_AGG", "TYPROG", "TOT", "socialSpending"),
        with("SOCX_AGG", "TYPROG", "OLD", "pensionSpend"),
        with("SOCX_AGG", "TYPROG", "FAM", "familySpend"),
        with("SOCX_AGG", "TYPROG", "UNEMP", "unempBenefits"),
        with("HEALTH_REAC", "VARIABLE", "RTOTHOSP", "hospitalBeds"),
        with("HEALTH_REAC", "VARIABLE", "RTOTNURSE", "nurses"),
        with("HEALTH_REAC", "VARIABLE", "RTOTDOC", "doctors"),
        with("PISA", "SUBJECT", "MATH", "pisaMath"),
        with("PISA", "SUBJECT", "READ", "pisaRead"),
        with("PISA", "SUBJECT", "SCIE", "pisaScience"),
        with("IDD", "MEASURE", "GINI", "gini"),
        with("IDD", "MEASURE", "PVTXTOT", "povertyRate"),
        with("IDD", "MEASURE", "MEDIAN_INC", "medianIncome"),
        with("AIR_GHG", "POLLUTANT", "GHG", "ghgEmissions"),
        OecdIndicator::new("MUNW", "municipalWaste"),
        with("REVGDP", "TAX", "TOTALTAX", "taxRevenue"),
    ]
}

/// OECD SDMX REST API. Each dataset is downloaded once as CSV and shared by every
/// indicator drawn from it.
pub struct OecdSource {
    req: Requester,
    base_url: String,
    indicators: Vec<OecdIndicator>,
}

impl OecdSource {
    /// Public SDMX data root.
    pub const BASE_URL: &'static str = "https://sdmx.oecd.org/public/rest/data";

    /// Source over [`default_indicators`].
    #[must_use]
    pub fn new(http: Arc<dyn HttpFetch>) -> Self {
        Self {
            req: Requester::new(http, NAME, Duration::from_millis(300)),
            base_url: Self::BASE_URL.to_string(),
            indicators: default_indicators(),
        }
    }

    /// Point at another data root.
    #[must_use]
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Pause between dataset downloads.
    #[must_use]
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.req.set_delay(delay);
        self
    }

    /// Replace the indicator set.
    #[must_use]
    pub fn with_indicators(mut self, indicators: Vec<OecdIndicator>) -> Self {
        self.indicators = indicators;
        self
    }

    /// Distinct datasets in first-use order.
    fn datasets(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for ind in &self.indicators {
            if !out.contains(&ind.dataset.as_str()) {
                out.push(&ind.dataset);
            }
        }
        out
    }

    fn extract_dataset(
        &self,
        dataset: &str,
        rows: &[Vec<Cell>],
        ctx: &ExtractContext,
    ) -> Result<Extraction, WorldexError> {
        let specs = [
            ColumnSpec::entity("ref_area"),
            ColumnSpec::entity("location"),
            ColumnSpec::year("time_period"),
            ColumnSpec::value("obs_value"),
        ];
        let mapping = locate_table(NAME, rows, &ctx.locate_options(), &specs)?;
        let HeaderMapping {
            header_row,
            entity_col: Some(entity_col),
            year_col: Some(year_col),
            value_col: Some(value_col),
            ..
        } = mapping
        else {
            return Err(WorldexError::schema_not_found(
                NAME,
                format!("{dataset}: REF_AREA/TIME_PERIOD/OBS_VALUE columns"),
            ));
        };
        let headers: Vec<String> = rows[header_row]
            .iter()
            .map(|c| c.text().trim().to_string())
            .collect();

        let resolver = EntityResolver::codes_only();
        let mut out = Extraction::new();
        let mut tracker = LatestTracker::new(ctx.cutoff_year);
        for ind in self.indicators.iter().filter(|i| i.dataset == dataset) {
            for row in rows.iter().skip(header_row + 1) {
                match ind.matches(&headers, row) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(msg) => {
                        out.warn(msg);
                        break;
                    }
                }
                let area = row.get(entity_col).map(Cell::text).unwrap_or_default();
                if !MEMBERS.contains(&area.trim().to_uppercase().as_str()) {
                    continue;
                }
                let Some(code) = out.resolve(&resolver, &area) else {
                    continue;
                };
                let year = row.get(year_col).map(Cell::text).unwrap_or_default();
                tracker.offer((code, ind.field.clone()), &year, row.get(value_col));
            }
        }
        for ((code, field), obs) in tracker.into_observations() {
            out.fields.insert(code, field, obs);
        }
        Ok(out)
    }
}

#[async_trait]
impl IndicatorSource for OecdSource {
    fn name(&self) -> &'static str {
        NAME
    }

    fn vendor(&self) -> &'static str {
        "OECD"
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "worldex_sources::oecd::fetch", skip(self))
    )]
    async fn fetch(&self) -> Result<Payload, WorldexError> {
        let mut payload = Payload::new();
        let mut last_err = None;
        for (i, dataset) in self.datasets().into_iter().enumerate() {
            if i > 0 {
                self.req.pause().await;
            }
            let url = format!("{}/{dataset}/all?format=csv", self.base_url);
            let rows = match self.req.bytes(&url).await {
                Ok(body) => off_thread(NAME, move || csv_rows(NAME, &body)).await,
                Err(e) => Err(e),
            };
            match rows {
                Ok(rows) => payload.push_table(dataset, rows),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(dataset, error = %e, "dataset fetch failed");
                    payload.warn(format!("{dataset}: {e}"));
                    last_err = Some(e);
                }
            }
        }
        finish(NAME, payload, last_err)
    }

    fn extract(&self, payload: Payload, ctx: &ExtractContext) -> Result<Extraction, WorldexError> {
        extract_parts(NAME, payload, |part| {
            self.extract_dataset(&part.label, part.table(NAME)?, ctx)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(csv: &str) -> Vec<Vec<Cell>> {
        csv_rows(NAME, csv.as_bytes()).unwrap()
    }

    fn ctx() -> ExtractContext {
        ExtractContext::default().with_cutoff_year(2025)
    }

    #[test]
    fn filters_select_rows_and_non_members_are_dropped() {
        let table = rows(
            "DATAFLOW,REF_AREA,TYPROG,TIME_PERIOD,OBS_VALUE\n\
             SOCX,FRA,TOT,2019,31.0\n\
             SOCX,FRA,TOT,2021,31.6\n\
             SOCX,FRA,OLD,2021,14.1\n\
             SOCX,BRA,TOT,2021,17.0\n\
             SOCX,OECD,TOT,2021,21.0\n",
        );
        let src = OecdSource::new(<dyn HttpFetch>::from_fn(|_| unreachable!()));
        let out = src.extract_dataset("SOCX_AGG", &table, &ctx()).unwrap();
        let fra = out.fields.get("FRA", "socialSpending").unwrap();
        assert_eq!((fra.value, fra.year.as_str()), (31.6, "2021"));
        assert_eq!(out.fields.get("FRA", "pensionSpend").unwrap().value, 14.1);
        assert!(out.fields.get("BRA", "socialSpending").is_none());
        assert!(out.unresolved.is_empty());
    }

    #[test]
    fn missing_filter_column_is_a_warning() {
        let table = rows("REF_AREA,TIME_PERIOD,OBS_VALUE\nFRA,2021,1.0\n");
        let src = OecdSource::new(<dyn HttpFetch>::from_fn(|_| unreachable!()))
            .with_indicators(vec![
                OecdIndicator::new("PISA", "pisaMath").filter("SUBJECT", "MATH"),
            ]);
        let out = src.extract_dataset("PISA", &table, &ctx()).unwrap();
        assert_eq!(out.field_count(), 0);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn datasets_are_fetched_once() {
        let src = OecdSource::new(<dyn HttpFetch>::from_fn(|_| unreachable!()));
        let ds = src.datasets();
        assert_eq!(ds.iter().filter(|d| **d == "SOCX_AGG").count(), 1);
        assert_eq!(ds.len(), 11);
    }
}
