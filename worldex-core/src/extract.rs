//! Table extraction: drive schema location, entity resolution, and temporal selection
//! over a decoded table to produce a `SourceFieldMap`.
//!
//! Three layouts are supported:
//! - long: one row per entity and year, one column per field;
//! - wide: one row per entity, one column per year, one field per table;
//! - indicators: one row per entity, year, and indicator code, with a single value column.

use std::collections::BTreeSet;

use crate::resolve::{EntityResolver, Resolution};
use crate::schema::{ColumnSpec, HeaderMapping, LocateOptions, locate};
use crate::temporal::{LatestTracker, default_cutoff_year, default_undated_year, select_latest};
use crate::types::{
    Cell, ColumnTieBreak, CountryCode, DEFAULT_SCAN_LIMIT, SourceFieldMap, WorldexConfig,
    WorldexError,
};

static EMPTY: Cell = Cell::Empty;

/// Run-wide settings handed to every source's `extract`.
#[derive(Debug, Clone)]
pub struct ExtractContext {
    /// Resolver for name-keyed sources. Code-keyed sources use [`EntityResolver::codes_only`].
    pub resolver: EntityResolver,
    /// Latest acceptable observation year.
    pub cutoff_year: i32,
    /// Year label for observations from undated tables.
    pub undated_year: String,
    /// Header scan limit.
    pub scan_limit: usize,
    /// Column tie-break.
    pub tie_break: ColumnTieBreak,
}

impl Default for ExtractContext {
    fn default() -> Self {
        Self::new(EntityResolver::default())
    }
}

impl ExtractContext {
    /// Context with clock-derived cutoff and undated label.
    #[must_use]
    pub fn new(resolver: EntityResolver) -> Self {
        Self {
            resolver,
            cutoff_year: default_cutoff_year(),
            undated_year: default_undated_year(),
            scan_limit: DEFAULT_SCAN_LIMIT,
            tie_break: ColumnTieBreak::HeaderOrder,
        }
    }

    /// Context from run configuration; unset years fall back to the clock.
    #[must_use]
    pub fn from_config(cfg: &WorldexConfig, resolver: EntityResolver) -> Self {
        Self {
            resolver,
            cutoff_year: cfg.cutoff_year.unwrap_or_else(default_cutoff_year),
            undated_year: cfg.undated_year.clone().unwrap_or_else(default_undated_year),
            scan_limit: cfg.scan_limit,
            tie_break: cfg.tie_break,
        }
    }

    /// Fixed cutoff, for deterministic tests and replays.
    #[must_use]
    pub const fn with_cutoff_year(mut self, year: i32) -> Self {
        self.cutoff_year = year;
        self
    }

    /// Locate options seeded with this context's scan limit and tie-break.
    #[must_use]
    pub fn locate_options(&self) -> LocateOptions {
        LocateOptions::default()
            .scan_limit(self.scan_limit)
            .tie_break(self.tie_break)
    }
}

/// One source's extracted fields plus diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Extracted observations.
    pub fields: SourceFieldMap,
    /// Distinct identifiers no strategy resolved.
    pub unresolved: BTreeSet<String>,
    /// Distinct non-blank identifiers skipped without resolution.
    pub skipped: BTreeSet<String>,
    /// Non-fatal issues.
    pub warnings: Vec<String>,
}

impl Extraction {
    /// Empty extraction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `raw`, recording unresolved and skipped identifiers.
    pub fn resolve(&mut self, resolver: &EntityResolver, raw: &str) -> Option<CountryCode> {
        match resolver.resolve(raw) {
            Resolution::Resolved { code, .. } => Some(code),
            Resolution::Skipped => {
                let id = raw.trim();
                if !id.is_empty() {
                    self.skipped.insert(id.to_string());
                }
                None
            }
            Resolution::Unresolved => {
                self.unresolved.insert(raw.trim().to_string());
                None
            }
        }
    }

    /// Record a warning.
    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Fold a later part of the same source into this one; the later part wins on
    /// field collisions.
    pub fn absorb(&mut self, other: Self) {
        self.fields.extend(other.fields);
        self.unresolved.extend(other.unresolved);
        self.skipped.extend(other.skipped);
        self.warnings.extend(other.warnings);
    }

    /// Number of extracted field observations.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.field_count()
    }
}

/// Locate a header or fail with `SchemaNotFound` attributed to `source`.
///
/// # Errors
/// Returns `SchemaNotFound` when no header row qualifies within the scan limit.
pub fn locate_table(
    source: &str,
    rows: &[Vec<Cell>],
    opts: &LocateOptions,
    specs: &[ColumnSpec],
) -> Result<HeaderMapping, WorldexError> {
    locate(rows, opts, specs).ok_or_else(|| {
        let what = opts.sentinel.as_ref().map_or_else(
            || "header row".to_string(),
            |s| format!("header row containing {s:?}"),
        );
        WorldexError::schema_not_found(source, format!("{what} within {} rows", opts.scan_limit))
    })
}

fn required(source: &str, col: Option<usize>, what: &str) -> Result<usize, WorldexError> {
    col.ok_or_else(|| WorldexError::schema_not_found(source, format!("{what} column")))
}

fn data_rows<'a>(rows: &'a [Vec<Cell>], mapping: &HeaderMapping) -> &'a [Vec<Cell>] {
    rows.get(mapping.header_row + 1..).unwrap_or(&[])
}

fn cell(row: &[Cell], col: usize) -> &Cell {
    row.get(col).unwrap_or(&EMPTY)
}

/// Long layout: per `(entity, field)` keep the latest valid row.
///
/// Without a year column every row carries `ctx.undated_year`, so the first valid
/// value per `(entity, field)` wins.
///
/// # Errors
/// Returns `SchemaNotFound` if no entity column or no field column was assigned.
pub fn extract_long(
    source: &str,
    rows: &[Vec<Cell>],
    mapping: &HeaderMapping,
    resolver: &EntityResolver,
    ctx: &ExtractContext,
) -> Result<Extraction, WorldexError> {
    let entity_col = required(source, mapping.entity_col, "entity")?;
    if mapping.fields.is_empty() {
        return Err(WorldexError::schema_not_found(source, "any field column"));
    }

    let mut out = Extraction::new();
    let mut tracker = LatestTracker::new(ctx.cutoff_year);
    for row in data_rows(rows, mapping) {
        let Some(code) = out.resolve(resolver, &cell(row, entity_col).text()) else {
            continue;
        };
        let year = mapping
            .year_col
            .map_or_else(|| ctx.undated_year.clone(), |c| cell(row, c).text());
        for (field, col) in &mapping.fields {
            tracker.offer((code.clone(), field.clone()), &year, cell(row, *col));
        }
    }
    for ((code, field), obs) in tracker.into_observations() {
        out.fields.insert(code, field, obs);
    }
    Ok(out)
}

/// Wide layout: one field per table, years as columns. Selected values are multiplied
/// by `scale`.
///
/// # Errors
/// Returns `SchemaNotFound` if no entity column or no year column exists.
pub fn extract_wide(
    source: &str,
    rows: &[Vec<Cell>],
    mapping: &HeaderMapping,
    field: &str,
    scale: f64,
    resolver: &EntityResolver,
    ctx: &ExtractContext,
) -> Result<Extraction, WorldexError> {
    let entity_col = required(source, mapping.entity_col, "entity")?;
    if mapping.year_columns.is_empty() {
        return Err(WorldexError::schema_not_found(source, "year columns"));
    }

    let mut out = Extraction::new();
    for row in data_rows(rows, mapping) {
        let Some(code) = out.resolve(resolver, &cell(row, entity_col).text()) else {
            continue;
        };
        let observations = mapping
            .year_columns
            .iter()
            .map(|(col, label)| (label.as_str(), cell(row, *col)));
        if let Some(mut obs) = select_latest(observations, ctx.cutoff_year) {
            obs.value *= scale;
            out.fields.insert(code, field, obs);
        }
    }
    Ok(out)
}

/// Indicator layout: rows whose indicator code appears in `indicators` feed the mapped
/// field; other indicator codes are ignored.
///
/// # Errors
/// Returns `SchemaNotFound` if the entity, indicator, or value column is missing.
pub fn extract_indicators(
    source: &str,
    rows: &[Vec<Cell>],
    mapping: &HeaderMapping,
    indicators: &[(&str, &str)],
    resolver: &EntityResolver,
    ctx: &ExtractContext,
) -> Result<Extraction, WorldexError> {
    let entity_col = required(source, mapping.entity_col, "entity")?;
    let indicator_col = required(source, mapping.indicator_col, "indicator")?;
    let value_col = required(source, mapping.value_col, "value")?;

    let mut out = Extraction::new();
    let mut tracker = LatestTracker::new(ctx.cutoff_year);
    for row in data_rows(rows, mapping) {
        let indicator = cell(row, indicator_col).text();
        let Some((_, field)) = indicators.iter().find(|(code, _)| *code == indicator) else {
            continue;
        };
        let Some(code) = out.resolve(resolver, &cell(row, entity_col).text()) else {
            continue;
        };
        let year = mapping
            .year_col
            .map_or_else(|| ctx.undated_year.clone(), |c| cell(row, c).text());
        tracker.offer((code, (*field).to_string()), &year, cell(row, value_col));
    }
    for ((code, field), obs) in tracker.into_observations() {
        out.fields.insert(code, field, obs);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Observed;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::from(*c)).collect()
    }

    fn ctx() -> ExtractContext {
        ExtractContext::default().with_cutoff_year(2025)
    }

    #[test]
    fn long_layout_keeps_latest_row_per_entity() {
        let rows = vec![
            row(&["Notes"]),
            row(&["Location", "ISO3 Alpha-code", "Year", "Total Population"]),
            row(&["France", "FRA", "2022", "67.9"]),
            row(&["France", "FRA", "2024", "68.2"]),
            row(&["France", "FRA", "2030", "70.0"]),
            row(&["World", "", "2024", "8100"]),
        ];
        let specs = [
            ColumnSpec::entity("iso3"),
            ColumnSpec::year("year"),
            ColumnSpec::field("total population", "population"),
        ];
        let opts = ctx().locate_options().sentinel("iso3");
        let m = locate_table("un", &rows, &opts, &specs).unwrap();
        let out = extract_long("un", &rows, &m, &EntityResolver::codes_only(), &ctx()).unwrap();
        assert_eq!(out.fields.get("FRA", "population"), Some(&Observed::new(68.2, "2024")));
        assert_eq!(out.fields.entities(), 1);
        assert!(out.unresolved.is_empty());
    }

    #[test]
    fn wide_layout_scales_and_records_unresolved_names() {
        let rows = vec![
            row(&["Military expenditure as a share of GDP"]),
            row(&["Country", "Notes", "2021", "2022", "2023"]),
            row(&["AFRICA", "", "", "", ""]),
            row(&["Czechia", "", "0.013", "0.014", "xxx"]),
            row(&["Atlantis Prime", "", "0.1", "", ""]),
        ];
        let opts = ctx()
            .locate_options()
            .sentinel("country")
            .detect_year_run()
            .entity_fallback_first_column();
        let m = locate_table("sipri", &rows, &opts, &[ColumnSpec::entity("country")]).unwrap();
        let out = extract_wide("sipri", &rows, &m, "milexPctGDP", 100.0, &ctx().resolver, &ctx()).unwrap();
        let obs = out.fields.get("CZE", "milexPctGDP").unwrap();
        assert!((obs.value - 1.4).abs() < 1e-9);
        assert_eq!(obs.year, "2022");
        assert!(out.unresolved.contains("Atlantis Prime"));
        assert!(out.skipped.contains("AFRICA"));
    }

    #[test]
    fn indicator_layout_ignores_unmapped_codes() {
        let rows = vec![
            row(&["indicator_id", "country_id", "year", "value", "magnitude"]),
            row(&["CR.1", "KEN", "2019", "84.1", ""]),
            row(&["CR.1", "KEN", "2021", "86.0", ""]),
            row(&["XX.9", "KEN", "2021", "1", ""]),
        ];
        let specs = [
            ColumnSpec::entity("country_id"),
            ColumnSpec::year("year"),
            ColumnSpec::indicator("indicator_id"),
            ColumnSpec::value("value"),
        ];
        let m = locate_table("uis", &rows, &ctx().locate_options(), &specs).unwrap();
        let out = extract_indicators(
            "uis",
            &rows,
            &m,
            &[("CR.1", "primaryCompletion")],
            &EntityResolver::codes_only(),
            &ctx(),
        )
        .unwrap();
        assert_eq!(out.fields.field_count(), 1);
        assert_eq!(out.fields.get("KEN", "primaryCompletion").unwrap().year, "2021");
    }

    #[test]
    fn missing_header_is_schema_not_found() {
        let rows = vec![row(&["a", "b"])];
        let err = locate_table("un", &rows, &LocateOptions::default().sentinel("ISO3"), &[]).unwrap_err();
        assert!(matches!(err, WorldexError::SchemaNotFound { .. }));
    }
}
