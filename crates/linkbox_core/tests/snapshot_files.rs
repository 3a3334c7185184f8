mod common;

use chrono::{TimeZone, Utc};
use common::RecordingKv;
use linkbox_core::{ExportError, ImportOutcome, LinkStore, StoreConfig, StoreError};

#[test]
fn export_writes_timestamped_pretty_file() {
    let dir = tempfile::tempdir().unwrap();
    let kv = RecordingKv::new();
    let mut store = LinkStore::load(&kv, StoreConfig::default());
    store.create("News", "a\nb");
    store.take_notices();

    let now = Utc.timestamp_millis_opt(1_714_566_645_123).unwrap();
    let path = store.export_to_dir(dir.path(), now).unwrap();

    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "link_manager_data_2024-05-01T12-30-45-123Z.json"
    );
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\n  {\n    \"id\": \"box-1\""));
    assert!(!store.take_notices()[0].is_error());
}

#[test]
fn export_then_import_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let kv = RecordingKv::new();
    let mut store = LinkStore::load(&kv, StoreConfig::default());
    store.create("one", "https://one.example");
    store.create("two", "https://two.example/\n");
    let path = store.export_to_dir(dir.path(), Utc::now()).unwrap();

    store.clear_all();
    let outcome = store.import_from_file(&path, true).unwrap();

    assert_eq!(outcome, ImportOutcome::Imported { groups: 2 });
    assert_eq!(store.groups()[1].links, "https://two.example/\n");
}

#[test]
fn unconfirmed_file_import_does_not_read_the_file() {
    let kv = RecordingKv::new();
    let mut store = LinkStore::load(&kv, StoreConfig::default());

    let outcome = store
        .import_from_file("/definitely/not/here.json", false)
        .unwrap();
    assert_eq!(outcome, ImportOutcome::Cancelled);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let kv = RecordingKv::new();
    let mut store = LinkStore::load(&kv, StoreConfig::default());

    let err = store
        .import_from_file(dir.path().join("missing.json"), true)
        .unwrap_err();
    assert!(matches!(err, ExportError::Io(_)));
}

#[test]
fn malformed_file_surfaces_store_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"[{"id":"a","label":1,"links":""}]"#).unwrap();
    let kv = RecordingKv::new();
    let mut store = LinkStore::load(&kv, StoreConfig::default());
    store.create("kept", "");

    let err = store.import_from_file(&path, true).unwrap_err();
    assert!(matches!(
        err,
        ExportError::Store(StoreError::MalformedInput(_))
    ));
    assert_eq!(store.groups()[0].label, "kept");
}

#[test]
fn non_utf8_file_is_malformed_input_and_keeps_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("binary.json");
    std::fs::write(&path, [0xff, 0xfe, b'[', b']']).unwrap();
    let kv = RecordingKv::new();
    let mut store = LinkStore::load(&kv, StoreConfig::default());
    store.create("kept", "https://kept.example");
    store.take_notices();

    let err = store.import_from_file(&path, true).unwrap_err();

    assert!(matches!(
        err,
        ExportError::Store(StoreError::MalformedInput(_))
    ));
    assert_eq!(store.len(), 1);
    assert_eq!(store.groups()[0].label, "kept");
    assert!(store.take_notices()[0].is_error());
}
