use assert_cmd::Command;
use predicates::prelude::*;

fn worldex() -> Command {
    let mut cmd = Command::cargo_bin("worldex").unwrap();
    cmd.env_remove("WORLDEX_CONFIG")
        .env_remove("UNESCO_API_KEY")
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn list_sources_prints_catalog() {
    worldex()
        .arg("--list-sources")
        .assert()
        .success()
        .stdout(predicate::str::contains("worldbank").and(predicate::str::contains("owid")));
}

#[test]
fn unknown_source_fails_before_any_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("countries.json");
    worldex()
        .args(["--sources", "worldbank,eurostat", "--store"])
        .arg(&store)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown source"));
    assert!(!store.exists());
}

#[test]
fn unknown_config_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("worldex.toml");
    std::fs::write(&cfg, "merge_polcy = \"overwrite\"\n").unwrap();
    worldex()
        .arg("--config")
        .arg(&cfg)
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}

#[test]
fn skipped_source_still_saves_store() {
    let dir = tempfile::tempdir().unwrap();
    let un_dir = dir.path().join("un");
    std::fs::create_dir(&un_dir).unwrap();
    let store = dir.path().join("out").join("countries.json");

    worldex()
        .args(["--sources", "un-population", "--un-dir"])
        .arg(&un_dir)
        .arg("--store")
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains("un-population").and(predicate::str::contains("skipped")));
    assert!(store.exists());
}

#[test]
fn json_report_lists_each_source() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("countries.json");
    let out = worldex()
        .args(["--json", "--sources", "un-population", "--un-dir"])
        .arg(dir.path().join("missing"))
        .arg("--store")
        .arg(&store)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(report["sources"][0]["source"], "un-population");
    assert_eq!(report["sources"][0]["status"], "skipped");
}

#[test]
fn corrupt_store_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("countries.json");
    std::fs::write(&store, "{ not json").unwrap();
    worldex()
        .args(["--sources", "un-population", "--un-dir"])
        .arg(dir.path())
        .arg("--store")
        .arg(&store)
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt"));
    assert_eq!(std::fs::read_to_string(&store).unwrap(), "{ not json");
}
