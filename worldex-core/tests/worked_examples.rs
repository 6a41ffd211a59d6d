use serde_json::json;
use worldex_core::{
    CanonicalStore, Cell, ColumnSpec, CountryCode, EntityResolver, ExtractContext, Extraction,
    LocateOptions, MergePolicy, Observed, Resolution, SourceFieldMap, locate, merge,
    normalize_str, select_latest,
};

#[test]
fn temporal_selector_skips_placeholder() {
    let obs = [("2019", json!(5)), ("2021", json!("...")), ("2020", json!(7))];
    assert_eq!(select_latest(obs, 2025), Some(Observed::new(7.0, "2020")));
}

#[test]
fn schema_locator_claims_entity_and_dependency_columns() {
    let rows: Vec<Vec<Cell>> = vec![
        vec!["Annual demographic indicators".into()],
        ["Country", "ISO3", "2020", "2021", "Dependency Ratio"]
            .into_iter()
            .map(Cell::from)
            .collect(),
    ];
    let specs = [
        ColumnSpec::entity("ISO3"),
        ColumnSpec::field("Dependency", "dependencyRatio"),
    ];
    let m = locate(&rows, &LocateOptions::default().sentinel("ISO3"), &specs).unwrap();
    assert_eq!(m.header_row, 1);
    assert_eq!(m.entity_col, Some(1));
    assert_eq!(m.field_col("dependencyRatio"), Some(4));
}

#[test]
fn entity_resolver_examples() {
    let r = EntityResolver::default();
    assert_eq!(r.resolve("USA").code().map(CountryCode::as_str), Some("USA"));
    assert_eq!(r.resolve("Czechia").code().map(CountryCode::as_str), Some("CZE"));
    assert_eq!(r.resolve("Nonexistent Country"), Resolution::Unresolved);

    let mut ex = Extraction::new();
    assert!(ex.resolve(&r, "Nonexistent Country").is_none());
    assert!(ex.unresolved.contains("Nonexistent Country"));
}

#[test]
fn value_normalizer_examples() {
    assert_eq!(normalize_str("1,234.5"), Some(1234.5));
    assert_eq!(normalize_str("xxx"), None);
    assert_eq!(worldex_core::normalize_json(&serde_json::Value::Null), None);
}

#[test]
fn first_gdp_growth_for_france_is_kept_under_fill_only() {
    let fra = CountryCode::parse("FRA").unwrap();
    let mut store = CanonicalStore::new();

    let mut wb = SourceFieldMap::new();
    wb.insert(fra.clone(), "gdpGrowth", Observed::new(1.1, "2024"));
    let mut imf = SourceFieldMap::new();
    imf.insert(fra, "gdpGrowth", Observed::new(0.8, "2025"));

    assert_eq!(merge(&mut store, &wb, MergePolicy::FillOnly).added, 1);
    assert_eq!(merge(&mut store, &imf, MergePolicy::FillOnly).added, 0);
    assert_eq!(store.field("FRA", "gdpGrowth"), Some(&Observed::new(1.1, "2024")));
}

#[test]
fn context_from_config_honours_explicit_years() {
    let cfg = worldex_core::WorldexConfig {
        cutoff_year: Some(2020),
        undated_year: Some("2019".into()),
        ..Default::default()
    };
    let ctx = ExtractContext::from_config(&cfg, EntityResolver::codes_only());
    assert_eq!(ctx.cutoff_year, 2020);
    assert_eq!(ctx.undated_year, "2019");
}
