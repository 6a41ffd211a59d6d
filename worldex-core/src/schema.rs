//! Header location and column assignment for loosely structured tables.
//!
//! A header row is found within a bounded prefix by a sentinel keyword or by a majority
//! of four-digit year tokens. Header cells are then matched against ordered
//! `(keyword, target)` specs by case-insensitive substring; each target is claimed by at
//! most one column, and columns stay eligible for other unclaimed targets.

use serde::{Deserialize, Serialize};

use crate::temporal::is_year_token;
use crate::types::{Cell, ColumnTieBreak, DEFAULT_SCAN_LIMIT};

/// Destination of a header column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnTarget {
    /// Entity identifier (code or name).
    Entity,
    /// Explicit year column.
    Year,
    /// Indicator code column in long indicator tables.
    Indicator,
    /// Single value column in long indicator tables.
    Value,
    /// A canonical data field.
    Field(String),
}

impl ColumnTarget {
    /// True for roles that are never data fields.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        !matches!(self, Self::Field(_))
    }
}

/// One `(keyword, target)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Case-insensitive substring looked for in header cells.
    pub keyword: String,
    /// What a matching column is assigned to.
    pub target: ColumnTarget,
}

impl ColumnSpec {
    /// Spec with an explicit target.
    pub fn new(keyword: impl Into<String>, target: ColumnTarget) -> Self {
        Self {
            keyword: keyword.into(),
            target,
        }
    }

    /// Entity column keyword.
    pub fn entity(keyword: impl Into<String>) -> Self {
        Self::new(keyword, ColumnTarget::Entity)
    }

    /// Year column keyword.
    pub fn year(keyword: impl Into<String>) -> Self {
        Self::new(keyword, ColumnTarget::Year)
    }

    /// Indicator column keyword.
    pub fn indicator(keyword: impl Into<String>) -> Self {
        Self::new(keyword, ColumnTarget::Indicator)
    }

    /// Value column keyword.
    pub fn value(keyword: impl Into<String>) -> Self {
        Self::new(keyword, ColumnTarget::Value)
    }

    /// Data field keyword.
    pub fn field(keyword: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(keyword, ColumnTarget::Field(field.into()))
    }

    fn matches(&self, header_lower: &str) -> bool {
        !header_lower.is_empty() && header_lower.contains(&self.keyword.to_lowercase())
    }
}

/// Header detection and assignment options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocateOptions {
    /// Keyword whose presence marks the header row.
    pub sentinel: Option<String>,
    /// Also accept a row whose non-empty cells are mostly four-digit years.
    pub detect_year_run: bool,
    /// Rows scanned before giving up.
    pub scan_limit: usize,
    /// Which column wins when several match the same target.
    pub tie_break: ColumnTieBreak,
    /// Use column 0 as the entity column when no entity keyword matched.
    pub entity_fallback_first_column: bool,
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self {
            sentinel: None,
            detect_year_run: false,
            scan_limit: DEFAULT_SCAN_LIMIT,
            tie_break: ColumnTieBreak::HeaderOrder,
            entity_fallback_first_column: false,
        }
    }
}

impl LocateOptions {
    /// Set the sentinel keyword.
    #[must_use]
    pub fn sentinel(mut self, keyword: impl Into<String>) -> Self {
        self.sentinel = Some(keyword.into());
        self
    }

    /// Enable year-run header detection.
    #[must_use]
    pub const fn detect_year_run(mut self) -> Self {
        self.detect_year_run = true;
        self
    }

    /// Enable the first-column entity fallback.
    #[must_use]
    pub const fn entity_fallback_first_column(mut self) -> Self {
        self.entity_fallback_first_column = true;
        self
    }

    /// Override the scan limit.
    #[must_use]
    pub const fn scan_limit(mut self, rows: usize) -> Self {
        self.scan_limit = rows;
        self
    }

    /// Override the tie-break.
    #[must_use]
    pub const fn tie_break(mut self, tie_break: ColumnTieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }
}

/// Where things are in a located table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderMapping {
    /// Index of the header row; data rows follow it.
    pub header_row: usize,
    /// Entity identifier column.
    pub entity_col: Option<usize>,
    /// Explicit year column.
    pub year_col: Option<usize>,
    /// Indicator code column.
    pub indicator_col: Option<usize>,
    /// Value column for indicator tables.
    pub value_col: Option<usize>,
    /// Year-named columns in header order, with their labels.
    pub year_columns: Vec<(usize, String)>,
    /// Field name to column, in claim order.
    pub fields: Vec<(String, usize)>,
}

impl HeaderMapping {
    /// Column claimed by `field`.
    #[must_use]
    pub fn field_col(&self, field: &str) -> Option<usize> {
        self.fields.iter().find(|(f, _)| f == field).map(|(_, c)| *c)
    }

    /// Columns holding the entity, year, indicator, or value role.
    #[must_use]
    pub fn role_columns(&self) -> Vec<usize> {
        [self.entity_col, self.year_col, self.indicator_col, self.value_col]
            .into_iter()
            .flatten()
            .collect()
    }

    fn claimed(&self, target: &ColumnTarget) -> bool {
        match target {
            ColumnTarget::Entity => self.entity_col.is_some(),
            ColumnTarget::Year => self.year_col.is_some(),
            ColumnTarget::Indicator => self.indicator_col.is_some(),
            ColumnTarget::Value => self.value_col.is_some(),
            ColumnTarget::Field(f) => self.field_col(f).is_some(),
        }
    }

    fn claim(&mut self, target: &ColumnTarget, col: usize) {
        match target {
            ColumnTarget::Entity => self.entity_col = Some(col),
            ColumnTarget::Year => self.year_col = Some(col),
            ColumnTarget::Indicator => self.indicator_col = Some(col),
            ColumnTarget::Value => self.value_col = Some(col),
            ColumnTarget::Field(f) => self.fields.push((f.clone(), col)),
        }
    }
}

/// Index of the header row within the first `opts.scan_limit` rows.
#[must_use]
pub fn find_header_row(rows: &[Vec<Cell>], opts: &LocateOptions) -> Option<usize> {
    let sentinel = opts.sentinel.as_ref().map(|s| s.to_lowercase());
    rows.iter().take(opts.scan_limit).position(|row| {
        let texts: Vec<String> = row.iter().map(Cell::text).filter(|t| !t.is_empty()).collect();
        if texts.is_empty() {
            return false;
        }
        if sentinel.is_none() && !opts.detect_year_run {
            return true;
        }
        let joined = texts.join(" ").to_lowercase();
        if sentinel.as_ref().is_some_and(|s| joined.contains(s.as_str())) {
            return true;
        }
        opts.detect_year_run && texts.iter().filter(|t| is_year_token(t)).count() * 2 > texts.len()
    })
}

/// Locate the header row and assign columns. `None` means no header was found.
#[must_use]
pub fn locate(rows: &[Vec<Cell>], opts: &LocateOptions, specs: &[ColumnSpec]) -> Option<HeaderMapping> {
    let header_row = find_header_row(rows, opts)?;
    let headers: Vec<String> = rows[header_row]
        .iter()
        .map(|c| c.text().to_lowercase())
        .collect();

    let mut mapping = HeaderMapping {
        header_row,
        ..HeaderMapping::default()
    };

    // Roles first, so only the columns actually holding a role are kept out of the fields.
    assign(
        &mut mapping,
        &headers,
        specs.iter().filter(|s| s.target.is_reserved()),
        opts.tie_break,
        |_| true,
    );
    if mapping.entity_col.is_none() && opts.entity_fallback_first_column && !headers.is_empty() {
        mapping.entity_col = Some(0);
    }
    let roles = mapping.role_columns();
    assign(
        &mut mapping,
        &headers,
        specs.iter().filter(|s| !s.target.is_reserved()),
        opts.tie_break,
        |col| !roles.contains(&col),
    );

    mapping.year_columns = rows[header_row]
        .iter()
        .enumerate()
        .filter(|(col, _)| !roles.contains(col))
        .map(|(col, cell)| (col, cell.text()))
        .filter(|(_, t)| is_year_token(t))
        .collect();

    Some(mapping)
}

fn assign<'a>(
    mapping: &mut HeaderMapping,
    headers: &[String],
    specs: impl Iterator<Item = &'a ColumnSpec> + Clone,
    tie_break: ColumnTieBreak,
    eligible: impl Fn(usize) -> bool,
) {
    match tie_break {
        ColumnTieBreak::HeaderOrder => {
            for (col, header) in headers.iter().enumerate() {
                if !eligible(col) {
                    continue;
                }
                for spec in specs.clone() {
                    if spec.matches(header) && !mapping.claimed(&spec.target) {
                        mapping.claim(&spec.target, col);
                    }
                }
            }
        }
        ColumnTieBreak::KeywordOrder => {
            for spec in specs {
                if mapping.claimed(&spec.target) {
                    continue;
                }
                if let Some(col) = headers
                    .iter()
                    .enumerate()
                    .position(|(col, h)| eligible(col) && spec.matches(h))
                {
                    mapping.claim(&spec.target, col);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::from(*c)).collect()
    }

    #[test]
    fn sentinel_row_found_after_preamble() {
        let rows = vec![
            row(&["World Population Prospects"]),
            row(&[]),
            row(&["Country", "ISO3", "2020", "2021", "Dependency Ratio"]),
            row(&["France", "FRA", "1", "2", "60.1"]),
        ];
        let specs = [
            ColumnSpec::entity("ISO3"),
            ColumnSpec::field("Dependency", "dependencyRatio"),
        ];
        let m = locate(&rows, &LocateOptions::default().sentinel("ISO3"), &specs).unwrap();
        assert_eq!(m.header_row, 2);
        assert_eq!(m.entity_col, Some(1));
        assert_eq!(m.field_col("dependencyRatio"), Some(4));
        let years: Vec<usize> = m.year_columns.iter().map(|(c, _)| *c).collect();
        assert_eq!(years, vec![2, 3]);
    }

    #[test]
    fn not_found_beyond_scan_limit() {
        let mut rows: Vec<Vec<Cell>> = (0..30).map(|_| row(&["notes"])).collect();
        rows.push(row(&["ISO3"]));
        assert!(locate(&rows, &LocateOptions::default().sentinel("ISO3"), &[]).is_none());
    }

    #[test]
    fn year_run_detection_requires_majority() {
        let rows = vec![
            row(&["Country", "Notes", "2020"]),
            row(&["Country", "2019", "2020", "2021"]),
        ];
        let opts = LocateOptions::default().detect_year_run().entity_fallback_first_column();
        let m = locate(&rows, &opts, &[]).unwrap();
        assert_eq!(m.header_row, 1);
        assert_eq!(m.entity_col, Some(0));
        assert_eq!(m.year_columns.len(), 3);
    }

    #[test]
    fn header_order_first_column_wins() {
        let rows = vec![row(&["ISO3", "Under age 1", "Neonatal"])];
        let specs = [
            ColumnSpec::entity("iso3"),
            ColumnSpec::field("neonatal", "infantDeaths"),
            ColumnSpec::field("under age 1", "infantDeaths"),
        ];
        let opts = LocateOptions::default().sentinel("iso3");
        let m = locate(&rows, &opts, &specs).unwrap();
        assert_eq!(m.field_col("infantDeaths"), Some(1));

        let m = locate(&rows, &opts.tie_break(ColumnTieBreak::KeywordOrder), &specs).unwrap();
        assert_eq!(m.field_col("infantDeaths"), Some(2));
    }

    #[test]
    fn one_column_may_satisfy_several_fields_but_not_the_entity_column() {
        let rows = vec![row(&["ISO3 Alpha-code", "Total Deaths"])];
        let specs = [
            ColumnSpec::entity("iso3"),
            ColumnSpec::field("alpha", "alphaField"),
            ColumnSpec::field("deaths", "deaths"),
            ColumnSpec::field("total", "total"),
        ];
        let m = locate(&rows, &LocateOptions::default().sentinel("iso3"), &specs).unwrap();
        assert_eq!(m.entity_col, Some(0));
        assert_eq!(m.field_col("alphaField"), None);
        assert_eq!(m.field_col("deaths"), Some(1));
        assert_eq!(m.field_col("total"), Some(1));
    }

    #[test]
    fn data_header_containing_role_keyword_stays_a_field() {
        let rows = vec![row(&[
            "ISO3 Alpha-code",
            "Year",
            "Life Expectancy at Age 65 (years)",
            "ISO3 of partner",
        ])];
        let specs = [
            ColumnSpec::entity("iso3"),
            ColumnSpec::year("year"),
            ColumnSpec::field("65", "lifeExp65"),
            ColumnSpec::field("partner", "partner"),
        ];
        for tie_break in [ColumnTieBreak::HeaderOrder, ColumnTieBreak::KeywordOrder] {
            let opts = LocateOptions::default().sentinel("iso3").tie_break(tie_break);
            let m = locate(&rows, &opts, &specs).unwrap();
            assert_eq!(m.entity_col, Some(0));
            assert_eq!(m.year_col, Some(1));
            assert_eq!(m.field_col("lifeExp65"), Some(2));
            assert_eq!(m.field_col("partner"), Some(3));
        }
    }

    #[test]
    fn fallback_entity_column_is_not_a_year_column() {
        let rows = vec![row(&["2019", "2020", "2021"])];
        let opts = LocateOptions::default().detect_year_run().entity_fallback_first_column();
        let m = locate(&rows, &opts, &[]).unwrap();
        assert_eq!(m.entity_col, Some(0));
        let years: Vec<usize> = m.year_columns.iter().map(|(c, _)| *c).collect();
        assert_eq!(years, vec![1, 2]);
    }
}
