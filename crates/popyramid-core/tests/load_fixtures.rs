use popyramid_core::{Error, LayoutConfig, load_dataset};
use std::path::PathBuf;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

#[test]
fn bundled_fixtures_load() {
    for name in ["mydata.csv", "Maried.csv"] {
        let path = workspace_root().join("fixtures").join(name);
        let ds = load_dataset(&path).expect("fixture loads");
        assert_eq!(ds.len(), 91, "{name}");
        assert_eq!(ds.records[0].age, "0");
        assert_eq!(ds.records[90].age, "90");
        assert!(ds.max_count().is_some_and(|m| m > 0.0));
    }
}

#[test]
fn mydata_max_count() {
    let ds = load_dataset(workspace_root().join("fixtures").join("mydata.csv")).expect("load");
    assert_eq!(ds.max_count(), Some(35700.0));
}

#[test]
fn missing_file_is_io_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let err = load_dataset(tmp.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert!(err.to_string().contains("nope.csv"));
}

#[test]
fn reads_file_written_to_disk() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("rows.csv");
    std::fs::write(&path, "Age,Males,Females\n0-4,100,90\n90+,10,5\n").expect("write");
    let ds = load_dataset(&path).expect("load");
    assert_eq!(ds.max_count(), Some(100.0));
    assert_eq!(ds.distinct_ages(), vec!["0-4", "90+"]);
}

#[test]
fn static_config_fixture_matches_preset() {
    let text = std::fs::read_to_string(
        workspace_root()
            .join("fixtures")
            .join("config")
            .join("static.json"),
    )
    .expect("config fixture");
    let cfg = LayoutConfig::from_json_str(&text).expect("valid config");
    assert_eq!(cfg, LayoutConfig::static_preset());
}
