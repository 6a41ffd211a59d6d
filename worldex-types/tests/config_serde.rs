use std::time::Duration;

use worldex_types::{
    ColumnTieBreak, DEFAULT_SCAN_LIMIT, FetchMode, MergePolicy, WorldexConfig,
};

#[test]
fn default_config_is_fill_only_sequential_header_order() {
    let cfg = WorldexConfig::default();
    assert_eq!(cfg.merge_policy, MergePolicy::FillOnly);
    assert_eq!(cfg.fetch_mode, FetchMode::Sequential);
    assert_eq!(cfg.tie_break, ColumnTieBreak::HeaderOrder);
    assert_eq!(cfg.scan_limit, DEFAULT_SCAN_LIMIT);
    assert!(cfg.cutoff_year.is_none());
    assert!(cfg.undated_year.is_none());
}

#[test]
fn partial_config_fills_missing_fields_from_default() {
    let json = r#"{ "merge_policy": "overwrite", "cutoff_year": 2025 }"#;
    let cfg: WorldexConfig = serde_json::from_str(json).expect("deserialize partial config");
    assert_eq!(cfg.merge_policy, MergePolicy::Overwrite);
    assert_eq!(cfg.cutoff_year, Some(2025));
    assert_eq!(cfg.scan_limit, DEFAULT_SCAN_LIMIT);
    assert_eq!(cfg.fetch_mode, FetchMode::Sequential);
}

#[test]
fn enums_use_kebab_case_names() {
    assert_eq!(
        serde_json::to_string(&MergePolicy::FillOnly).unwrap(),
        "\"fill-only\""
    );
    assert_eq!(
        serde_json::to_string(&ColumnTieBreak::KeywordOrder).unwrap(),
        "\"keyword-order\""
    );
    let mode: FetchMode = serde_json::from_str("\"concurrent\"").unwrap();
    assert_eq!(mode, FetchMode::Concurrent);
}

#[test]
fn config_roundtrip_preserves_timeout() {
    let cfg = WorldexConfig {
        source_timeout: Duration::from_millis(1500),
        tie_break: ColumnTieBreak::KeywordOrder,
        ..WorldexConfig::default()
    };
    let json = serde_json::to_string(&cfg).unwrap();
    let de: WorldexConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(de, cfg);
}
