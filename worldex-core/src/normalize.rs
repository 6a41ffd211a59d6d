//! Value normalization: raw cells and JSON values to finite numbers or absence.

use serde_json::Value;

use crate::types::Cell;

/// Strings that mean "no data" in upstream files, compared case-insensitively after trimming.
pub const PLACEHOLDERS: [&str; 5] = ["", "nan", "none", "...", "xxx"];

/// Normalize a raw string. Thousands separators are stripped before parsing.
#[must_use]
pub fn normalize_str(raw: &str) -> Option<f64> {
    let t = raw.trim();
    if PLACEHOLDERS.iter().any(|p| t.eq_ignore_ascii_case(p)) {
        return None;
    }
    let cleaned: String = t.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Normalize a decoded table cell.
#[must_use]
pub fn normalize_cell(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) => Some(*n).filter(|v| v.is_finite()),
        Cell::Text(s) => normalize_str(s),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

/// Normalize a JSON value. Only numbers and numeric strings count.
#[must_use]
pub fn normalize_json(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => normalize_str(s),
        _ => None,
    }
}

/// Anything the temporal selector can normalize.
pub trait RawValue {
    /// A finite number, or `None` for absence.
    fn normalized(&self) -> Option<f64>;
}

impl RawValue for Cell {
    fn normalized(&self) -> Option<f64> {
        normalize_cell(self)
    }
}

impl RawValue for Value {
    fn normalized(&self) -> Option<f64> {
        normalize_json(self)
    }
}

impl RawValue for str {
    fn normalized(&self) -> Option<f64> {
        normalize_str(self)
    }
}

impl RawValue for String {
    fn normalized(&self) -> Option<f64> {
        normalize_str(self)
    }
}

impl RawValue for f64 {
    fn normalized(&self) -> Option<f64> {
        Some(*self).filter(|v| v.is_finite())
    }
}

impl<T: RawValue + ?Sized> RawValue for &T {
    fn normalized(&self) -> Option<f64> {
        (**self).normalized()
    }
}

impl<T: RawValue> RawValue for Option<T> {
    fn normalized(&self) -> Option<f64> {
        self.as_ref().and_then(RawValue::normalized)
    }
}
