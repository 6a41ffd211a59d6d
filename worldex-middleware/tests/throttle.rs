use std::sync::Arc;
use std::time::Duration;

use worldex_core::{IndicatorSource, WorldexError};
use worldex_middleware::SourceBuilder;
use worldex_mock::{MockSource, fixtures};

#[tokio::test(start_paused = true)]
async fn fetch_returns_at_once_and_reports_the_pause() {
    let raw: Arc<dyn IndicatorSource> = Arc::new(MockSource::returning("wb", fixtures::growth()));
    let wrapped = SourceBuilder::new(raw).with_throttle(Duration::from_millis(400)).build();

    let start = tokio::time::Instant::now();
    let payload = wrapped.fetch().await.unwrap();
    assert!(!payload.is_empty());
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(wrapped.pause_after_fetch(), Duration::from_millis(400));
    assert_eq!(wrapped.name(), "wb");
}

#[tokio::test]
async fn failed_fetch_is_propagated_and_still_paused() {
    let raw: Arc<dyn IndicatorSource> = Arc::new(MockSource::failing(
        "imf",
        WorldexError::source_unavailable("imf", "HTTP 500"),
    ));
    let wrapped = SourceBuilder::new(raw).with_throttle(Duration::from_millis(500)).build();

    let err = wrapped.fetch().await.unwrap_err();
    assert_eq!(err.source_name(), Some("imf"));
    assert_eq!(wrapped.pause_after_fetch(), Duration::from_millis(500));
}

#[tokio::test]
async fn cache_hit_skips_the_pause() {
    let dir = tempfile::tempdir().unwrap();
    let raw: Arc<dyn IndicatorSource> = Arc::new(MockSource::returning("wb", fixtures::growth()));
    let wrapped = SourceBuilder::new(raw)
        .with_throttle(Duration::from_millis(300))
        .with_cache(dir.path(), None)
        .build();

    wrapped.fetch().await.unwrap();
    assert_eq!(wrapped.pause_after_fetch(), Duration::from_millis(300));
    wrapped.fetch().await.unwrap();
    assert_eq!(wrapped.pause_after_fetch(), Duration::ZERO);
}

#[test]
fn builder_replaces_existing_layer_and_orders_outermost_first() {
    let raw: Arc<dyn IndicatorSource> = Arc::new(MockSource::returning("wb", fixtures::growth()));
    let b = SourceBuilder::new(raw)
        .with_throttle(Duration::from_millis(100))
        .with_cache("/tmp/worldex-cache", None)
        .with_throttle(Duration::from_millis(250));

    let names: Vec<_> = b.describe().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, ["ThrottledSource", "CachedSource", "RawSource"]);
    assert_eq!(b.describe()[0].1["delay_ms"], 250);
}
