//! Scriptable `IndicatorSource` for tests.
//!
//! `MockSource` returns, fails, or hangs on `fetch` as instructed through its
//! controller, and extracts the row format described in [`fixtures`]. Rows flow through
//! the run's resolver and year cutoff, so the mock exercises the same selection rules as
//! a real adapter.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use worldex_core::{
    ExtractContext, Extraction, IndicatorSource, LatestTracker, MergePolicy, Payload, PayloadPart,
    WorldexError, extract_parts,
};

pub mod fixtures;

/// Instruction for how `fetch` should behave.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(WorldexError),
    /// Hang indefinitely (simulate a timeout).
    Hang,
}

struct State {
    behavior: MockBehavior<Payload>,
}

/// Controller handle used by tests to drive a `MockSource` from the outside.
#[derive(Clone)]
pub struct MockController {
    state: Arc<Mutex<State>>,
    fetches: Arc<AtomicUsize>,
}

impl MockController {
    /// Replace the fetch behavior.
    pub async fn set_behavior(&self, behavior: MockBehavior<Payload>) {
        self.state.lock().await.behavior = behavior;
    }

    /// Number of `fetch` calls observed so far.
    #[must_use]
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

/// Mock source with a fixed name and scriptable fetch.
pub struct MockSource {
    name: &'static str,
    policy: Option<MergePolicy>,
    state: Arc<Mutex<State>>,
    fetches: Arc<AtomicUsize>,
}

impl MockSource {
    /// Source that returns `payload` on every fetch.
    #[must_use]
    pub fn returning(name: &'static str, payload: Payload) -> Self {
        Self::with_behavior(name, MockBehavior::Return(payload))
    }

    /// Source that fails every fetch with `err`.
    #[must_use]
    pub fn failing(name: &'static str, err: WorldexError) -> Self {
        Self::with_behavior(name, MockBehavior::Fail(err))
    }

    /// Source whose fetch never completes.
    #[must_use]
    pub fn hanging(name: &'static str) -> Self {
        Self::with_behavior(name, MockBehavior::Hang)
    }

    /// Source with an explicit initial behavior.
    #[must_use]
    pub fn with_behavior(name: &'static str, behavior: MockBehavior<Payload>) -> Self {
        Self {
            name,
            policy: None,
            state: Arc::new(Mutex::new(State { behavior })),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Source plus a controller for changing its behavior mid-test.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Self, MockController) {
        let src = Self::with_behavior(name, MockBehavior::Return(Payload::new()));
        let ctrl = src.controller();
        (src, ctrl)
    }

    /// Declare a per-source merge policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// A controller sharing this source's state.
    #[must_use]
    pub fn controller(&self) -> MockController {
        MockController {
            state: Arc::clone(&self.state),
            fetches: Arc::clone(&self.fetches),
        }
    }

    fn extract_part(&self, part: &PayloadPart, ctx: &ExtractContext) -> Result<Extraction, WorldexError> {
        let body = part.json(self.name)?;
        let rows = body
            .get("rows")
            .and_then(Value::as_array)
            .ok_or_else(|| WorldexError::schema_not_found(self.name, "rows array"))?;

        let mut out = Extraction::new();
        let mut tracker = LatestTracker::new(ctx.cutoff_year);
        for r in rows {
            let entity = r.get("entity").and_then(Value::as_str).unwrap_or_default();
            let Some(field) = r.get("field").and_then(Value::as_str) else {
                continue;
            };
            let Some(code) = out.resolve(&ctx.resolver, entity) else {
                continue;
            };
            let year = r
                .get("year")
                .and_then(Value::as_str)
                .map_or_else(|| ctx.undated_year.clone(), str::to_string);
            let value = r.get("value").cloned().unwrap_or(Value::Null);
            tracker.offer((code, field.to_string()), &year, &value);
        }
        for ((code, field), obs) in tracker.into_observations() {
            out.fields.insert(code, field, obs);
        }
        Ok(out)
    }
}

#[async_trait]
impl IndicatorSource for MockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }

    fn merge_policy(&self) -> Option<MergePolicy> {
        self.policy
    }

    async fn fetch(&self) -> Result<Payload, WorldexError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let behavior = self.state.lock().await.behavior.clone();
        match behavior {
            MockBehavior::Return(p) => Ok(p),
            MockBehavior::Fail(e) => Err(e),
            MockBehavior::Hang => std::future::pending().await,
        }
    }

    fn extract(&self, payload: Payload, ctx: &ExtractContext) -> Result<Extraction, WorldexError> {
        extract_parts(self.name, payload, |part| self.extract_part(part, ctx))
    }
}
