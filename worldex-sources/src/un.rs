use std::path::{Path, PathBuf};

use async_trait::async_trait;
use worldex_core::{
    Cell, ColumnSpec, EntityResolver, ExtractContext, Extraction, IndicatorSource, MergePolicy,
    Payload, WorldexError, extract_long, extract_parts, locate_table,
};

use crate::decode::{off_thread, pick_sheet, workbook_from_path};
use crate::http::finish;

const NAME: &str = "un-population";

/// One World Population Prospects workbook: how to find it and which columns to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnWorkbook {
    /// Case-insensitive fragment of the file name.
    pub keyword: String,
    /// Preferred sheet name fragment.
    pub sheet: String,
    /// `(header keyword, field)` pairs in priority order.
    pub columns: Vec<(String, String)>,
}

impl UnWorkbook {
    /// Workbook matched by `keyword`, read from its estimates sheet.
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            sheet: "Estimates".to_string(),
            columns: Vec::new(),
        }
    }

    /// Add a column mapping.
    #[must_use]
    pub fn column(mut self, header: impl Into<String>, field: impl Into<String>) -> Self {
        self.columns.push((header.into(), field.into()));
        self
    }

    /// Prefer a different sheet.
    #[must_use]
    pub fn sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = sheet.into();
        self
    }
}

/// The default workbook set.
#[must_use]
pub fn default_workbooks() -> Vec<UnWorkbook> {
    vec![
        UnWorkbook::new("Population Data")
            .column("0-14", "popAge0to14")
            .column("15-64", "popAge15to64")
            .column("65", "popAge65plus")
            .column("Dependency", "dependencyRatio"),
        UnWorkbook::new("Deaths by Age")
            .column("Neonatal", "neonateMortality")
            .column("Under age 1", "neonateMortality"),
        UnWorkbook::new("Female Deaths Age").column("Neonatal", "neonateMortalityF"),
        UnWorkbook::new("Male Deaths Age").column("Neonatal", "neonateMortalityM"),
        UnWorkbook::new("Births by Age")
            .column("Total", "totalBirths")
            .column("15-19", "birthsAge15to19")
            .column("Adolescent", "adolBirthRate"),
    ]
}

/// UN World Population Prospects workbooks previously downloaded into a directory.
///
/// Fills gaps only: the other demographic sources take precedence.
pub struct UnPopulationSource {
    dir: PathBuf,
    workbooks: Vec<UnWorkbook>,
}

impl UnPopulationSource {
    /// Source reading workbooks from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            workbooks: default_workbooks(),
        }
    }

    /// Replace the workbook set.
    #[must_use]
    pub fn with_workbooks(mut self, workbooks: Vec<UnWorkbook>) -> Self {
        self.workbooks = workbooks;
        self
    }

    fn extract_workbook(
        wb: &UnWorkbook,
        rows: &[Vec<Cell>],
        ctx: &ExtractContext,
    ) -> Result<Extraction, WorldexError> {
        let mut specs = vec![ColumnSpec::entity("iso3"), ColumnSpec::year("year")];
        specs.extend(wb.columns.iter().map(|(h, f)| ColumnSpec::field(h.as_str(), f.as_str())));
        let opts = ctx.locate_options().sentinel("iso3");
        let mapping = locate_table(NAME, rows, &opts, &specs)?;
        extract_long(NAME, rows, &mapping, &EntityResolver::codes_only(), ctx)
    }
}

fn xlsx_files(dir: &Path) -> Result<Vec<PathBuf>, WorldexError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| WorldexError::source_unavailable(NAME, format!("{}: {e}", dir.display())))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|x| x.eq_ignore_ascii_case("xlsx")))
        .collect();
    files.sort();
    Ok(files)
}

fn load(dir: &Path, workbooks: &[UnWorkbook]) -> Result<Payload, WorldexError> {
    let files = xlsx_files(dir)?;
    if files.is_empty() {
        return Err(WorldexError::source_unavailable(
            NAME,
            format!("no .xlsx files in {}", dir.display()),
        ));
    }

    let mut payload = Payload::new();
    let mut last_err = None;
    for wb in workbooks {
        let needle = wb.keyword.to_lowercase();
        let Some(path) = files.iter().find(|p| {
            p.file_name()
                .is_some_and(|n| n.to_string_lossy().to_lowercase().contains(&needle))
        }) else {
            payload.warn(format!("{}: no matching workbook", wb.keyword));
            continue;
        };
        match workbook_from_path(NAME, path) {
            Ok(mut sheets) => {
                let idx = pick_sheet(&sheets, &[wb.sheet.as_str(), "estimate"]).unwrap_or(0);
                let (_, rows) = sheets.swap_remove(idx);
                payload.push_table(wb.keyword.as_str(), rows);
            }
            Err(e) => {
                payload.warn(format!("{}: {e}", wb.keyword));
                last_err = Some(e);
            }
        }
    }
    if payload.is_empty() && last_err.is_none() {
        return Err(WorldexError::source_unavailable(
            NAME,
            format!("no expected workbook in {}", dir.display()),
        ));
    }
    finish(NAME, payload, last_err)
}

#[async_trait]
impl IndicatorSource for UnPopulationSource {
    fn name(&self) -> &'static str {
        NAME
    }

    fn vendor(&self) -> &'static str {
        "UN DESA Population Division"
    }

    fn merge_policy(&self) -> Option<MergePolicy> {
        Some(MergePolicy::FillOnly)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "worldex_sources::un::fetch",
            skip(self),
            fields(dir = %self.dir.display()),
        )
    )]
    async fn fetch(&self) -> Result<Payload, WorldexError> {
        let dir = self.dir.clone();
        let workbooks = self.workbooks.clone();
        off_thread(NAME, move || load(&dir, &workbooks)).await
    }

    fn extract(&self, payload: Payload, ctx: &ExtractContext) -> Result<Extraction, WorldexError> {
        extract_parts(NAME, payload, |part| {
            let wb = self
                .workbooks
                .iter()
                .find(|w| w.keyword == part.label)
                .ok_or_else(|| {
                    WorldexError::decode(NAME, format!("unexpected workbook {}", part.label))
                })?;
            Self::extract_workbook(wb, part.table(NAME)?, ctx)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::from(*c)).collect()
    }

    #[test]
    fn shared_field_goes_to_first_matching_column() {
        let rows = vec![
            row(&["United Nations"]),
            row(&["Region", "ISO3 Alpha-code", "Year", "Under age 1", "Neonatal deaths"]),
            row(&["France", "FRA", "2022", "2.1", "1.3"]),
            row(&["France", "FRA", "2023", "2.0", "1.2"]),
        ];
        let wb = &default_workbooks()[1];
        let ctx = ExtractContext::default().with_cutoff_year(2025);
        let out = UnPopulationSource::extract_workbook(wb, &rows, &ctx).unwrap();
        let obs = out.fields.get("FRA", "neonateMortality").unwrap();
        assert_eq!((obs.value, obs.year.as_str()), (2.0, "2023"));
    }

    #[test]
    fn years_unit_in_data_header_does_not_hide_column() {
        let rows = vec![
            row(&["Region", "ISO3 Alpha-code", "Year", "Mean age at childbearing (years)"]),
            row(&["France", "FRA", "2022", "31.0"]),
            row(&["France", "FRA", "2023", "31.1"]),
        ];
        let wb = UnWorkbook::new("Fertility").column("childbearing", "meanAgeChildbearing");
        let ctx = ExtractContext::default().with_cutoff_year(2025);
        let out = UnPopulationSource::extract_workbook(&wb, &rows, &ctx).unwrap();
        let obs = out.fields.get("FRA", "meanAgeChildbearing").unwrap();
        assert_eq!((obs.value, obs.year.as_str()), (31.1, "2023"));
    }

    #[test]
    fn empty_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path(), &default_workbooks()).unwrap_err();
        assert!(matches!(err, WorldexError::SourceUnavailable { .. }));
    }

    #[test]
    fn unmatched_workbooks_are_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("unrelated.xlsx"), b"not a workbook").unwrap();
        let err = load(dir.path(), &default_workbooks()).unwrap_err();
        assert!(matches!(err, WorldexError::SourceUnavailable { .. }));
    }
}
