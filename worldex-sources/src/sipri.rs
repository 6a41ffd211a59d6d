use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use worldex_core::{
    Cell, ColumnSpec, ExtractContext, Extraction, IndicatorSource, MergePolicy, Payload,
    WorldexError, extract_parts, extract_wide, locate_table,
};

use crate::decode::{off_thread, pick_sheet, workbook_from_bytes};
use crate::http::{HttpFetch, Requester, finish};

const NAME: &str = "sipri";

/// One sheet of the military-expenditure workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct SipriSheet {
    /// Case-insensitive fragment of the sheet name.
    pub sheet: String,
    /// Canonical field name.
    pub field: String,
    /// Multiplier applied to selected values (shares are published as fractions).
    pub scale: f64,
}

impl SipriSheet {
    /// Sheet mapping with a unit multiplier.
    pub fn new(sheet: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            field: field.into(),
            scale: 1.0,
        }
    }

    /// Override the multiplier.
    #[must_use]
    pub const fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// The default sheet set.
#[must_use]
pub fn default_sheets() -> Vec<SipriSheet> {
    vec![
        SipriSheet::new("Current US$", "milexCurrentUSD"),
        SipriSheet::new("Constant (2023) US$", "milexConstantUSD"),
        SipriSheet::new("Share of GDP", "milexPctGDP").scale(100.0),
        SipriSheet::new("Per capita", "milexPerCapita"),
        SipriSheet::new("Share of Govt. spending", "milexPctGovt").scale(100.0),
    ]
}

/// SIPRI Military Expenditure Database workbook.
///
/// Countries are listed by name, so entities go through the run's name resolver.
pub struct SipriSource {
    req: Requester,
    url: String,
    sheets: Vec<SipriSheet>,
}

impl SipriSource {
    /// Published workbook location.
    pub const URL: &'static str =
        "https://www.sipri.org/sites/default/files/SIPRI-Milex-data-1949-2024_2.xlsx";

    /// Source over [`default_sheets`].
    #[must_use]
    pub fn new(http: Arc<dyn HttpFetch>) -> Self {
        Self {
            req: Requester::new(http, NAME, Duration::ZERO),
            url: Self::URL.to_string(),
            sheets: default_sheets(),
        }
    }

    /// Download from another location.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Replace the sheet set.
    #[must_use]
    pub fn with_sheets(mut self, sheets: Vec<SipriSheet>) -> Self {
        self.sheets = sheets;
        self
    }

    fn extract_sheet(
        sheet: &SipriSheet,
        rows: &[Vec<Cell>],
        ctx: &ExtractContext,
    ) -> Result<Extraction, WorldexError> {
        let opts = ctx
            .locate_options()
            .detect_year_run()
            .entity_fallback_first_column();
        let mapping = locate_table(NAME, rows, &opts, &[ColumnSpec::entity("country")])?;
        extract_wide(NAME, rows, &mapping, &sheet.field, sheet.scale, &ctx.resolver, ctx)
    }
}

#[async_trait]
impl IndicatorSource for SipriSource {
    fn name(&self) -> &'static str {
        NAME
    }

    fn vendor(&self) -> &'static str {
        "Stockholm International Peace Research Institute"
    }

    fn merge_policy(&self) -> Option<MergePolicy> {
        Some(MergePolicy::Overwrite)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "worldex_sources::sipri::fetch",
            skip(self),
            fields(url = %self.url),
        )
    )]
    async fn fetch(&self) -> Result<Payload, WorldexError> {
        let body = self.req.bytes(&self.url).await?;
        let workbook = off_thread(NAME, move || workbook_from_bytes(NAME, body)).await?;

        let mut payload = Payload::new();
        let mut last_err = None;
        for sheet in &self.sheets {
            match pick_sheet(&workbook, &[sheet.sheet.as_str()]) {
                Some(idx) => payload.push_table(sheet.field.as_str(), workbook[idx].1.clone()),
                None => {
                    let e =
                        WorldexError::schema_not_found(NAME, format!("sheet '{}'", sheet.sheet));
                    payload.warn(e.to_string());
                    last_err = Some(e);
                }
            }
        }
        finish(NAME, payload, last_err)
    }

    fn extract(&self, payload: Payload, ctx: &ExtractContext) -> Result<Extraction, WorldexError> {
        extract_parts(NAME, payload, |part| {
            let sheet = self
                .sheets
                .iter()
                .find(|s| s.field == part.label)
                .ok_or_else(|| {
                    WorldexError::decode(NAME, format!("unexpected sheet {}", part.label))
                })?;
            Self::extract_sheet(sheet, part.table(NAME)?, ctx)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldex_core::EntityResolver;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::from(*c)).collect()
    }

    #[test]
    fn shares_are_scaled_to_percent() {
        let rows = vec![
            row(&["Military expenditure by country as percentage of GDP"]),
            row(&["Figures are a share of GDP"]),
            row(&["", "Notes", "2021", "2022", "2023"]),
            row(&["Africa", "", "", "", ""]),
            row(&["France", "", "0.019", "0.019", "0.021"]),
            row(&["Korea, South", "", "0.027", "0.026", "..."]),
        ];
        let ctx = ExtractContext::new(EntityResolver::default()).with_cutoff_year(2025);
        let sheet = &default_sheets()[2];
        let out = SipriSource::extract_sheet(sheet, &rows, &ctx).unwrap();

        let fra = out.fields.get("FRA", "milexPctGDP").unwrap();
        assert!((fra.value - 2.1).abs() < 1e-9);
        assert_eq!(fra.year, "2023");
        let kor = out.fields.get("KOR", "milexPctGDP").unwrap();
        assert_eq!(kor.year, "2022");
    }
}
