use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use worldex_core::{
    Cell, ColumnSpec, EntityResolver, ExtractContext, Extraction, HeaderMapping, IndicatorSource,
    MergePolicy, Payload, WorldexError, extract_long, extract_parts, locate_table,
};

use crate::decode::{csv_rows, off_thread};
use crate::http::{HttpFetch, Requester, finish};

const NAME: &str = "owid";
const ENERGY_LABEL: &str = "energy";

/// Columns of the bulk energy dataset and the fields they feed. Matched exactly.
pub const ENERGY_FIELDS: &[(&str, &str)] = &[
    ("solar_electricity", "solarElec"),
    ("wind_electricity", "windElec"),
    ("nuclear_electricity", "nuclearElec"),
    ("fossil_electricity", "fossilElec"),
    ("renewables_electricity", "renewableElec"),
    ("hydro_electricity", "hydroElec"),
    ("solar_share_elec", "solarShare"),
    ("wind_share_elec", "windShare"),
    ("nuclear_share_elec", "nuclearShare"),
    ("fossil_share_elec", "fossilShareElec"),
    ("renewables_share_elec", "renewableShare"),
    ("co2", "co2"),
    ("co2_per_capita", "co2PerCap"),
    ("co2_per_gdp", "co2PerGDP"),
    ("total_ghg", "totalGhg"),
    ("methane", "methane"),
    ("nitrous_oxide", "nitrousOxide"),
    ("share_global_co2", "shareGlobalCo2"),
    ("coal_co2", "coalCo2"),
    ("oil_co2", "oilCo2"),
    ("gas_co2", "gasCo2"),
    ("cumulative_co2", "cumulativeCo2"),
];

/// Header fragments that never name a chart's value column. `year` is excluded only as
/// a whole header, so "mean years of schooling" stays eligible.
const NON_VALUE_HEADERS: &[&str] =
    &["entity", "code", "annotation", "world region", "note", "country"];

/// One grapher chart feeding one field. Slugs are tried in order; charts get renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwidChart {
    /// Canonical field name.
    pub field: String,
    /// Chart slugs, preferred first.
    pub slugs: Vec<String>,
    /// Fragment of the value column header. `None` takes the first non-key column.
    pub value_keyword: Option<String>,
}

impl OwidChart {
    /// Chart over `slugs` with automatic value column detection.
    pub fn new(field: impl Into<String>, slugs: &[&str]) -> Self {
        Self {
            field: field.into(),
            slugs: slugs.iter().map(|s| (*s).to_string()).collect(),
            value_keyword: None,
        }
    }

    /// Select the value column by header fragment.
    #[must_use]
    pub fn value_column(mut self, keyword: impl Into<String>) -> Self {
        self.value_keyword = Some(keyword.into());
        self
    }

    fn value_col(&self, headers: &[String]) -> Option<usize> {
        match &self.value_keyword {
            Some(kw) => {
                let kw = kw.to_lowercase();
                headers.iter().position(|h| h.contains(&kw))
            }
            None => headers
                .iter()
                .position(|h| h != "year" && !NON_VALUE_HEADERS.iter().any(|s| h.contains(s))),
        }
    }

    /// Header row, code, year, and value columns of a chart table.
    fn mapping(
        &self,
        rows: &[Vec<Cell>],
        ctx: &ExtractContext,
    ) -> Result<HeaderMapping, WorldexError> {
        let specs = [ColumnSpec::entity("code"), ColumnSpec::year("year")];
        let mut mapping = locate_table(NAME, rows, &ctx.locate_options(), &specs)?;
        let headers = lower_headers(&rows[mapping.header_row]);
        let col = self.value_col(&headers).ok_or_else(|| {
            WorldexError::schema_not_found(NAME, format!("{}: value column", self.field))
        })?;
        if mapping.entity_col.is_none() {
            return Err(WorldexError::schema_not_found(
                NAME,
                format!("{}: Code column", self.field),
            ));
        }
        mapping.fields = vec![(self.field.clone(), col)];
        Ok(mapping)
    }
}

fn lower_headers(row: &[Cell]) -> Vec<String> {
    row.iter().map(|c| c.text().trim().to_lowercase()).collect()
}

/// The default chart set.
#[must_use]
pub fn default_charts() -> Vec<OwidChart> {
    vec![
        OwidChart::new("diabetesRate", &["diabetes-prevalence"]),
        OwidChart::new("childMortality", &["child-mortality"]),
        OwidChart::new("lifeExpOwid", &["life-expectancy"]),
        OwidChart::new("maternMortOwid", &["maternal-mortality"]),
        OwidChart::new("cancerDeaths", &["death-rate-from-cancer"]),
        OwidChart::new("suicideRate", &["suicide-death-rates-by-sex"]).value_column("Both sexes"),
        OwidChart::new(
            "alcoholConsump",
            &["total-alcohol-consumption-per-capita", "alcohol-consumption-per-person"],
        ),
        OwidChart::new("homicideRate", &["homicide-rate"]),
        OwidChart::new(
            "cvdDeaths",
            &[
                "death-rate-from-cardiovascular-diseases",
                "cardiovascular-disease-death-rates-age-standardized",
            ],
        ),
        OwidChart::new("malariaDeaths", &["malaria-death-rates", "malaria-death-rate"]),
        OwidChart::new("hivRate", &["hiv-prevalence", "share-of-population-with-hiv-sdgs"]),
        OwidChart::new(
            "smokingDeaths",
            &["death-rates-from-smoking", "share-of-deaths-from-smoking"],
        ),
        OwidChart::new(
            "airPollutionDeaths",
            &["death-rate-from-air-pollution", "outdoor-air-pollution-deaths"],
        ),
        OwidChart::new(
            "prisonPop",
            &["prison-population", "incarceration-rate", "share-of-population-in-prison"],
        ),
        OwidChart::new("roadDeaths", &["road-deaths", "road-injury-deaths", "death-rates-road"]),
        OwidChart::new("genderWageGap", &["gender-pay-gap-oecd", "gender-wage-gap-oecd"]),
        OwidChart::new(
            "depressionRate",
            &[
                "share-with-depression",
                "depressive-disorders-prevalence-ihme",
                "depression-prevalence",
            ],
        ),
        OwidChart::new(
            "corruptionIndex",
            &["ti-corruption-perception-index", "corruption-perceptions-index-cpi"],
        )
        .value_column("Corruption"),
        OwidChart::new("pressFreedom", &["press-freedom-rsf"]).value_column("Press Freedom"),
        OwidChart::new("womenInParl", &["share-of-women-in-parliament", "women-in-parliaments"]),
        OwidChart::new("militarySpend", &["military-expenditure-as-share-of-gdp"]),
        OwidChart::new("touristArrivals", &["international-tourist-arrivals"]),
        OwidChart::new(
            "safeWater",
            &[
                "share-of-population-with-access-to-clean-water",
                "access-to-safe-drinking-water",
                "drinking-water-coverage",
            ],
        ),
        OwidChart::new(
            "safeSanitation",
            &[
                "share-of-population-using-safely-managed-sanitation",
                "safely-managed-sanitation",
            ],
        ),
        OwidChart::new(
            "cleanFuels",
            &[
                "access-to-clean-fuels-and-technologies-for-cooking",
                "share-with-clean-cooking-fuels",
            ],
        ),
        OwidChart::new(
            "dailyCalories",
            &["daily-per-capita-caloric-supply", "daily-caloric-supply"],
        ),
        OwidChart::new("meatSupply", &["meat-supply-per-person"]),
        OwidChart::new("forestOwid", &["forest-area-as-share-of-land-area"]),
        OwidChart::new("plasticWaste", &["plastic-waste-per-capita"]),
        OwidChart::new(
            "eduSpendOwid",
            &[
                "total-government-expenditure-on-education-gdp",
                "government-expenditure-on-education-gdp",
            ],
        ),
        OwidChart::new("meanSchoolingOwid", &["mean-years-of-schooling"]),
        OwidChart::new("extremePoverty", &["share-of-population-in-extreme-poverty"]),
        OwidChart::new("birthRateOwid", &["crude-birth-rate"]),
    ]
}

/// Our World in Data: the bulk energy dataset plus individual grapher charts.
pub struct OwidSource {
    req: Requester,
    energy_url: Option<String>,
    grapher_root: String,
    charts: Vec<OwidChart>,
}

impl OwidSource {
    /// Bulk energy and emissions CSV.
    pub const ENERGY_URL: &'static str =
        "https://owid-public.owid.io/data/energy/owid-energy-data.csv";
    /// Grapher chart root; charts live at `{root}/{slug}.csv`.
    pub const GRAPHER_ROOT: &'static str = "https://ourworldindata.org/grapher";

    /// Source over the energy dataset and [`default_charts`].
    #[must_use]
    pub fn new(http: Arc<dyn HttpFetch>) -> Self {
        Self {
            req: Requester::new(http, NAME, Duration::from_millis(300)),
            energy_url: Some(Self::ENERGY_URL.to_string()),
            grapher_root: Self::GRAPHER_ROOT.to_string(),
            charts: default_charts(),
        }
    }

    /// Download the energy dataset from another location.
    #[must_use]
    pub fn with_energy_url(mut self, url: impl Into<String>) -> Self {
        self.energy_url = Some(url.into());
        self
    }

    /// Skip the energy dataset.
    #[must_use]
    pub fn without_energy(mut self) -> Self {
        self.energy_url = None;
        self
    }

    /// Point chart requests at another root.
    #[must_use]
    pub fn with_grapher_root(mut self, root: impl Into<String>) -> Self {
        self.grapher_root = root.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the chart set.
    #[must_use]
    pub fn with_charts(mut self, charts: Vec<OwidChart>) -> Self {
        self.charts = charts;
        self
    }

    /// Pause between chart requests.
    #[must_use]
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.req.set_delay(delay);
        self
    }

    async fn fetch_energy(&self, url: &str) -> Result<Vec<Vec<Cell>>, WorldexError> {
        let body = self.req.bytes(url).await?;
        off_thread(NAME, move || csv_rows(NAME, &body)).await
    }

    /// First slug that downloads and has recognisable columns.
    async fn fetch_chart(
        &self,
        chart: &OwidChart,
        ctx: &ExtractContext,
    ) -> Result<Vec<Vec<Cell>>, WorldexError> {
        let mut last_err = None;
        for (i, slug) in chart.slugs.iter().enumerate() {
            if i > 0 {
                self.req.pause().await;
            }
            let url = format!("{}/{slug}.csv", self.grapher_root);
            let rows = match self.req.bytes(&url).await {
                Ok(body) => csv_rows(NAME, &body),
                Err(e) => Err(e),
            };
            match rows.and_then(|rows| chart.mapping(&rows, ctx).map(|_| rows)) {
                Ok(rows) => return Ok(rows),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        field = %chart.field,
                        slug = %slug,
                        error = %e,
                        "slug failed"
                    );
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            WorldexError::source_unavailable(NAME, format!("{}: no slugs", chart.field))
        }))
    }

    fn extract_energy(
        rows: &[Vec<Cell>],
        ctx: &ExtractContext,
    ) -> Result<Extraction, WorldexError> {
        let specs = [ColumnSpec::entity("iso_code"), ColumnSpec::year("year")];
        let mut mapping = locate_table(NAME, rows, &ctx.locate_options(), &specs)?;
        let headers = lower_headers(&rows[mapping.header_row]);

        let mut missing = Vec::new();
        for (column, field) in ENERGY_FIELDS {
            match headers.iter().position(|h| h == column) {
                Some(col) => mapping.fields.push(((*field).to_string(), col)),
                None => missing.push(*column),
            }
        }
        let mut out = extract_long(NAME, rows, &mapping, &EntityResolver::codes_only(), ctx)?;
        if !missing.is_empty() {
            out.warn(format!("{ENERGY_LABEL}: missing columns {}", missing.join(", ")));
        }
        Ok(out)
    }
}

#[async_trait]
impl IndicatorSource for OwidSource {
    fn name(&self) -> &'static str {
        NAME
    }

    fn vendor(&self) -> &'static str {
        "Our World in Data"
    }

    fn merge_policy(&self) -> Option<MergePolicy> {
        Some(MergePolicy::Overwrite)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "worldex_sources::owid::fetch",
            skip(self),
            fields(charts = self.charts.len()),
        )
    )]
    async fn fetch(&self) -> Result<Payload, WorldexError> {
        let mut payload = Payload::new();
        let mut last_err = None;

        if let Some(url) = &self.energy_url {
            match self.fetch_energy(url).await {
                Ok(rows) => payload.push_table(ENERGY_LABEL, rows),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %e, "energy dataset failed");
                    payload.warn(format!("{ENERGY_LABEL}: {e}"));
                    last_err = Some(e);
                }
            }
        }

        // Only header checks run here, so the default context is enough.
        let probe = ExtractContext::new(EntityResolver::codes_only());
        for chart in &self.charts {
            self.req.pause().await;
            match self.fetch_chart(chart, &probe).await {
                Ok(rows) => payload.push_table(chart.field.as_str(), rows),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(field = %chart.field, error = %e, "all slugs failed");
                    payload.warn(format!("{}: all slugs failed: {e}", chart.field));
                    last_err = Some(e);
                }
            }
        }
        finish(NAME, payload, last_err)
    }

    fn extract(&self, payload: Payload, ctx: &ExtractContext) -> Result<Extraction, WorldexError> {
        let resolver = EntityResolver::codes_only();
        extract_parts(NAME, payload, |part| {
            let rows = part.table(NAME)?;
            if part.label == ENERGY_LABEL {
                return Self::extract_energy(rows, ctx);
            }
            let chart = self
                .charts
                .iter()
                .find(|c| c.field == part.label)
                .ok_or_else(|| {
                    WorldexError::decode(NAME, format!("unexpected chart {}", part.label))
                })?;
            let mapping = chart.mapping(rows, ctx)?;
            extract_long(NAME, rows, &mapping, &resolver, ctx)
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
    fn energy_columns_match_exactly() {
        let table = rows(
            "country,year,iso_code,coal_co2,co2,co2_per_capita\n\
             France,2022,FRA,5.0,300.1,4.6\n\
             France,2023,FRA,4.1,290.3,\n\
             World,2023,,1500,37000,4.7\n",
        );
        let out = OwidSource::extract_energy(&table, &ctx()).unwrap();
        assert_eq!(out.fields.get("FRA", "co2").unwrap().value, 290.3);
        assert_eq!(out.fields.get("FRA", "coalCo2").unwrap().value, 4.1);
        let per_cap = out.fields.get("FRA", "co2PerCap").unwrap();
        assert_eq!((per_cap.value, per_cap.year.as_str()), (4.6, "2022"));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn chart_value_column_is_detected() {
        let chart = OwidChart::new("homicideRate", &["homicide-rate"]);
        let table = rows(
            "Entity,Code,Year,World region according to OWID,Homicide rate per 100k\n\
             Brazil,BRA,2021,South America,22.4\n\
             Brazil,BRA,2022,South America,20.6\n\
             World,OWID_WRL,2022,,5.8\n",
        );
        let m = chart.mapping(&table, &ctx()).unwrap();
        assert_eq!(m.fields, vec![("homicideRate".to_string(), 4)]);
        let out = extract_long(NAME, &table, &m, &EntityResolver::codes_only(), &ctx()).unwrap();
        assert_eq!(out.fields.get("BRA", "homicideRate").unwrap().value, 20.6);
        assert_eq!(out.fields.entities(), 1);
    }

    #[test]
    fn chart_value_keyword_selects_column() {
        let chart = OwidChart::new("suicideRate", &["x"]).value_column("Both sexes");
        let table = rows("Entity,Code,Year,Male,Female,Both sexes\nJapan,JPN,2021,22,10,16\n");
        let m = chart.mapping(&table, &ctx()).unwrap();
        assert_eq!(m.field_col("suicideRate"), Some(5));
    }
}
