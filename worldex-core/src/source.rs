use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::{ExtractContext, Extraction};
use crate::types::{Cell, MergePolicy, SourceKey, WorldexError};

/// Decoded body of one payload part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum PayloadBody {
    /// Parsed JSON response.
    Json(Value),
    /// Decoded table rows.
    Table(Vec<Vec<Cell>>),
}

/// One labelled part of a payload, e.g. one indicator request or one workbook sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadPart {
    /// Part label; adapters use it to pick the field mapping.
    pub label: String,
    /// Decoded body.
    pub body: PayloadBody,
}

/// What `fetch` hands to `extract`.
///
/// Serializable so caching middleware can persist it between runs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Payload {
    /// Parts in fetch order.
    pub parts: Vec<PayloadPart>,
    /// Parts that failed to fetch or decode.
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl Payload {
    /// Empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a JSON part.
    pub fn push_json(&mut self, label: impl Into<String>, value: Value) {
        self.parts.push(PayloadPart {
            label: label.into(),
            body: PayloadBody::Json(value),
        });
    }

    /// Append a table part.
    pub fn push_table(&mut self, label: impl Into<String>, rows: Vec<Vec<Cell>>) {
        self.parts.push(PayloadPart {
            label: label.into(),
            body: PayloadBody::Table(rows),
        });
    }

    /// Builder form of [`Payload::push_json`].
    #[must_use]
    pub fn with_json(mut self, label: impl Into<String>, value: Value) -> Self {
        self.push_json(label, value);
        self
    }

    /// Builder form of [`Payload::push_table`].
    #[must_use]
    pub fn with_table(mut self, label: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        self.push_table(label, rows);
        self
    }

    /// Record a part-level failure.
    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// True if no part was fetched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl PayloadPart {
    /// The JSON body, or a `Decode` error attributed to `source`.
    ///
    /// # Errors
    /// Returns `Decode` when the part holds a table.
    pub fn json(&self, source: &str) -> Result<&Value, WorldexError> {
        match &self.body {
            PayloadBody::Json(v) => Ok(v),
            PayloadBody::Table(_) => Err(WorldexError::decode(
                source,
                format!("part '{}' is a table, expected JSON", self.label),
            )),
        }
    }

    /// The table body, or a `Decode` error attributed to `source`.
    ///
    /// # Errors
    /// Returns `Decode` when the part holds JSON.
    pub fn table(&self, source: &str) -> Result<&[Vec<Cell>], WorldexError> {
        match &self.body {
            PayloadBody::Table(rows) => Ok(rows),
            PayloadBody::Json(_) => Err(WorldexError::decode(
                source,
                format!("part '{}' is JSON, expected a table", self.label),
            )),
        }
    }
}

/// A source of country indicators.
///
/// `fetch` does all I/O and returns decoded parts; `extract` is pure and turns a payload
/// into a field map. Failures of either are confined to this source by the orchestrator.
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    /// Stable identifier used in reports, logs, and cache file names.
    fn name(&self) -> &'static str;

    /// Typed key for the source.
    fn key(&self) -> SourceKey {
        SourceKey::new(self.name())
    }

    /// Human-friendly publisher name.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Conflict policy this source merges under. `None` defers to the run policy.
    fn merge_policy(&self) -> Option<MergePolicy> {
        None
    }

    /// Delay the orchestrator waits after this source's last fetch, outside the fetch
    /// timeout. Zero by default.
    fn pause_after_fetch(&self) -> Duration {
        Duration::ZERO
    }

    /// Fetch and decode the raw payload.
    async fn fetch(&self) -> Result<Payload, WorldexError>;

    /// Turn a payload into a field map.
    ///
    /// Multi-part sources degrade per part: a failed part becomes a warning, and the
    /// call fails only when every part failed.
    fn extract(&self, payload: Payload, ctx: &ExtractContext) -> Result<Extraction, WorldexError>;
}

/// Run `per_part` over every part, folding successes and turning failures into warnings.
///
/// # Errors
/// Returns the last part error when the payload is non-empty and no part succeeded,
/// or `Decode` when the payload has no parts at all.
pub fn extract_parts<F>(source: &str, payload: Payload, mut per_part: F) -> Result<Extraction, WorldexError>
where
    F: FnMut(&PayloadPart) -> Result<Extraction, WorldexError>,
{
    let mut out = Extraction::new();
    out.warnings.extend(payload.warnings);
    if payload.parts.is_empty() {
        return Err(WorldexError::decode(source, "payload has no parts"));
    }
    let mut last_err = None;
    let mut any_ok = false;
    for part in &payload.parts {
        match per_part(part) {
            Ok(ex) => {
                any_ok = true;
                out.absorb(ex);
            }
            Err(e) => {
                out.warn(format!("{}: {e}", part.label));
                last_err = Some(e);
            }
        }
    }
    match (any_ok, last_err) {
        (false, Some(e)) => Err(e),
        _ => Ok(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_roundtrips_through_json() {
        let p = Payload::new()
            .with_json("NGDP_RPCH", json!({"values": {}}))
            .with_table("sheet", vec![vec![Cell::from("ISO3"), Cell::Number(2020.0), Cell::Empty]]);
        let s = serde_json::to_string(&p).unwrap();
        let de: Payload = serde_json::from_str(&s).unwrap();
        assert_eq!(de, p);
    }

    #[test]
    fn extract_parts_fails_only_when_all_parts_fail() {
        let p = Payload::new().with_json("a", json!(1)).with_json("b", json!(2));
        let ok = extract_parts("x", p.clone(), |part| {
            if part.label == "a" {
                Err(WorldexError::decode("x", "bad"))
            } else {
                Ok(Extraction::new())
            }
        })
        .unwrap();
        assert_eq!(ok.warnings.len(), 1);

        let err = extract_parts("x", p, |_| Err(WorldexError::decode("x", "bad"))).unwrap_err();
        assert!(matches!(err, WorldexError::Decode { .. }));
    }
}
