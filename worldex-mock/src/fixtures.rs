//! Canned payloads in the mock row format.
//!
//! A mock part is a JSON object `{"rows": [{"entity", "field", "value", "year"}]}`.
//! `entity` goes through the run's resolver, so names and codes both work.

use serde_json::{Value, json};
use worldex_core::Payload;

/// One mock row.
#[must_use]
pub fn row(entity: &str, field: &str, value: impl Into<Value>, year: &str) -> Value {
    json!({ "entity": entity, "field": field, "value": value.into(), "year": year })
}

/// Single-part payload holding `rows`.
#[must_use]
pub fn payload(rows: Vec<Value>) -> Payload {
    Payload::new().with_json("rows", json!({ "rows": rows }))
}

/// Bank-style growth figures for a handful of countries.
#[must_use]
pub fn growth() -> Payload {
    payload(vec![
        row("FRA", "gdpGrowth", 1.1, "2023"),
        row("FRA", "gdpGrowth", 0.9, "2024"),
        row("DEU", "gdpGrowth", -0.3, "2023"),
        row("BRA", "gdpGrowth", 2.9, "2023"),
        row("USA", "gdpGrowth", 2.5, "2023"),
    ])
}

/// Population figures keyed by country name, including one unresolvable name.
#[must_use]
pub fn population_by_name() -> Payload {
    payload(vec![
        row("France", "population", 68.2, "2024"),
        row("Germany", "population", 84.5, "2024"),
        row("Côte d'Ivoire", "population", 29.6, "2024"),
        row("Atlantis Prime", "population", 0.1, "2024"),
        row("World", "population", 8100.0, "2024"),
    ])
}
