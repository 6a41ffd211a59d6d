#![allow(dead_code)]

use std::sync::Arc;

use worldex::{CanonicalStore, CountryCode, IndicatorSource, Observed, RecordStore, WorldexError};
use worldex_mock::MockSource;

pub fn arc(src: MockSource) -> Arc<dyn IndicatorSource> {
    Arc::new(src)
}

pub fn code(s: &str) -> CountryCode {
    CountryCode::parse(s).expect("valid code")
}

pub fn store_with(entries: &[(&str, &str, f64, &str)]) -> CanonicalStore {
    let mut store = CanonicalStore::new();
    for (c, field, value, year) in entries {
        store
            .record_mut(code(c))
            .insert(*field, Observed::new(*value, *year));
    }
    store
}

/// Store that loads fine but refuses every save.
pub struct ReadOnlyStore;

impl RecordStore for ReadOnlyStore {
    fn load(&self) -> Result<CanonicalStore, WorldexError> {
        Ok(CanonicalStore::new())
    }

    fn save(&self, _store: &CanonicalStore) -> Result<(), WorldexError> {
        Err(WorldexError::store_unwritable("read-only", "permission denied"))
    }

    fn describe(&self) -> String {
        "read-only".to_string()
    }
}
