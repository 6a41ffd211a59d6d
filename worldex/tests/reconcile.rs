mod helpers;

use std::time::Duration;

use helpers::{ReadOnlyStore, arc, store_with};
use worldex::{
    FetchMode, JsonFileStore, MemoryStore, MergePolicy, Observed, Reconciler, RecordStore,
    SourceStatus, WorldexError,
};
use worldex_middleware::SourceBuilder;
use worldex_mock::{MockSource, fixtures};

#[tokio::test]
async fn fill_only_adds_missing_fields_and_keeps_existing() {
    let mut store = store_with(&[("DEU", "gdpGrowth", 0.2, "2022")]);
    let r = Reconciler::builder()
        .with_source(arc(MockSource::returning("wb", fixtures::growth())))
        .cutoff_year(2025)
        .build()
        .unwrap();

    let report = r.reconcile(&mut store).await;

    assert_eq!(store.field("FRA", "gdpGrowth"), Some(&Observed::new(0.9, "2024")));
    assert_eq!(store.field("DEU", "gdpGrowth"), Some(&Observed::new(0.2, "2022")));
    assert_eq!(report.sources.len(), 1);
    assert_eq!(report.sources[0].fields_extracted, 4);
    assert_eq!(report.sources[0].fields_added, 3);
    assert_eq!(report.countries_before, 1);
    assert_eq!(report.countries_after, 4);
}

#[tokio::test]
async fn earlier_source_wins_under_fill_only() {
    let first = fixtures::payload(vec![fixtures::row("FRA", "population", 68.0, "2023")]);
    let second = fixtures::payload(vec![fixtures::row("FRA", "population", 99.0, "2024")]);
    let r = Reconciler::builder()
        .with_source(arc(MockSource::returning("a", first)))
        .with_source(arc(MockSource::returning("b", second)))
        .cutoff_year(2025)
        .build()
        .unwrap();

    let mut store = worldex::CanonicalStore::new();
    let report = r.reconcile(&mut store).await;

    assert_eq!(store.field("FRA", "population"), Some(&Observed::new(68.0, "2023")));
    assert_eq!(report.sources[1].fields_added, 0);
}

#[tokio::test]
async fn overwrite_source_replaces_existing_values() {
    let mut store = store_with(&[("FRA", "gdpGrowth", 5.0, "2019")]);
    let r = Reconciler::builder()
        .with_source(arc(
            MockSource::returning("wb", fixtures::growth()).with_policy(MergePolicy::Overwrite),
        ))
        .cutoff_year(2025)
        .build()
        .unwrap();

    let report = r.reconcile(&mut store).await;

    assert_eq!(store.field("FRA", "gdpGrowth"), Some(&Observed::new(0.9, "2024")));
    assert_eq!(report.sources[0].policy, MergePolicy::Overwrite);
}

#[tokio::test]
async fn failing_source_is_skipped_and_run_continues() {
    let r = Reconciler::builder()
        .with_source(arc(MockSource::failing(
            "down",
            WorldexError::source_unavailable("down", "HTTP 503"),
        )))
        .with_source(arc(MockSource::returning("wb", fixtures::growth())))
        .cutoff_year(2025)
        .build()
        .unwrap();

    let mut store = worldex::CanonicalStore::new();
    let report = r.reconcile(&mut store).await;

    assert!(report.sources[0].is_skipped());
    assert_eq!(report.sources[0].fields_added, 0);
    assert!(!report.sources[1].is_skipped());
    assert!(store.field("FRA", "gdpGrowth").is_some());
    assert_eq!(report.skipped().count(), 1);
}

#[tokio::test(start_paused = true)]
async fn hanging_source_times_out() {
    let r = Reconciler::builder()
        .with_source(arc(MockSource::hanging("slow")))
        .with_source(arc(MockSource::returning("wb", fixtures::growth())))
        .source_timeout(Duration::from_secs(5))
        .cutoff_year(2025)
        .build()
        .unwrap();

    let mut store = worldex::CanonicalStore::new();
    let report = r.reconcile(&mut store).await;

    match &report.sources[0].status {
        SourceStatus::Skipped { reason } => {
            assert_eq!(reason, &WorldexError::source_timeout("slow"));
        }
        SourceStatus::Merged => panic!("expected timeout skip"),
    }
    assert!(store.field("FRA", "gdpGrowth").is_some());
}

#[tokio::test(start_paused = true)]
async fn politeness_delay_does_not_count_against_timeout() {
    let throttled = SourceBuilder::new(arc(MockSource::returning("wb", fixtures::growth())))
        .with_throttle(Duration::from_secs(10))
        .build();
    let r = Reconciler::builder()
        .with_source(throttled)
        .source_timeout(Duration::from_secs(1))
        .cutoff_year(2025)
        .build()
        .unwrap();

    let start = tokio::time::Instant::now();
    let mut store = worldex::CanonicalStore::new();
    let report = r.reconcile(&mut store).await;

    assert_eq!(report.sources[0].status, SourceStatus::Merged);
    assert!(store.field("FRA", "gdpGrowth").is_some());
    assert!(start.elapsed() >= Duration::from_secs(10));
}

#[tokio::test]
async fn unresolved_names_are_reported() {
    let r = Reconciler::builder()
        .with_source(arc(MockSource::returning("un", fixtures::population_by_name())))
        .cutoff_year(2025)
        .build()
        .unwrap();

    let mut store = worldex::CanonicalStore::new();
    let report = r.reconcile(&mut store).await;

    assert_eq!(report.sources[0].unresolved, vec!["Atlantis Prime".to_string()]);
    assert_eq!(report.unresolved(), 1);
    assert!(store.field("CIV", "population").is_some());
    assert!(store.field("WLD", "population").is_none());
}

#[tokio::test]
async fn concurrent_fetch_keeps_registration_precedence() {
    let first = fixtures::payload(vec![fixtures::row("FRA", "population", 1.0, "2020")]);
    let second = fixtures::payload(vec![fixtures::row("FRA", "population", 2.0, "2024")]);
    let r = Reconciler::builder()
        .with_source(arc(MockSource::returning("a", first)))
        .with_source(arc(MockSource::returning("b", second)))
        .fetch_mode(FetchMode::Concurrent)
        .cutoff_year(2025)
        .build()
        .unwrap();

    let mut store = worldex::CanonicalStore::new();
    let report = r.reconcile(&mut store).await;

    assert_eq!(store.field("FRA", "population"), Some(&Observed::new(1.0, "2020")));
    let names: Vec<_> = report.sources.iter().map(|s| s.source.as_str()).collect();
    assert_eq!(names, ["a", "b"]);
}

#[tokio::test]
async fn run_persists_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("countries.json");
    let records = JsonFileStore::new(&path);
    let r = Reconciler::builder()
        .with_source(arc(MockSource::returning("wb", fixtures::growth())))
        .cutoff_year(2025)
        .build()
        .unwrap();

    let report = r.run(&records).await.unwrap();
    assert_eq!(report.fields_added(), 4);

    let reloaded = records.load().unwrap();
    assert_eq!(reloaded.field("FRA", "gdpGrowth"), Some(&Observed::new(0.9, "2024")));

    // A second fill-only run adds nothing.
    let again = r.run(&records).await.unwrap();
    assert_eq!(again.fields_added(), 0);
}

#[tokio::test]
async fn run_with_all_sources_failing_still_saves() {
    let records = MemoryStore::new(store_with(&[("FRA", "population", 68.0, "2023")]));
    let r = Reconciler::builder()
        .with_source(arc(MockSource::failing(
            "down",
            WorldexError::Other("connection reset".into()),
        )))
        .build()
        .unwrap();

    let report = r.run(&records).await.unwrap();
    assert_eq!(report.skipped().count(), 1);
    match &report.sources[0].status {
        SourceStatus::Skipped { reason } => assert_eq!(reason.source_name(), Some("down")),
        SourceStatus::Merged => panic!("expected skip"),
    }
    assert_eq!(records.snapshot().unwrap().len(), 1);
}

#[tokio::test]
async fn failed_save_fails_the_run() {
    let r = Reconciler::builder()
        .with_source(arc(MockSource::returning("wb", fixtures::growth())))
        .build()
        .unwrap();
    let err = r.run(&ReadOnlyStore).await.unwrap_err();
    assert!(err.is_fatal());
}

#[tokio::test]
async fn corrupt_store_fails_before_any_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("countries.json");
    std::fs::write(&path, "{ not json").unwrap();

    let (src, ctrl) = MockSource::new_with_controller("wb");
    let r = Reconciler::builder().with_source(arc(src)).build().unwrap();
    let err = r.run(&JsonFileStore::new(&path)).await.unwrap_err();

    assert!(matches!(err, WorldexError::StoreCorrupt { .. }));
    assert_eq!(ctrl.fetches(), 0);
}
