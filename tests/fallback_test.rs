use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let mut cmd = Command::new(cargo_bin!("vend-session"));
    cmd.arg("simulate")
        .arg("--approve-delay-ms")
        .arg("0")
        .arg("--settings-db")
        .arg("some_db");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING: Persistent settings requested via --settings-db, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory settings."))
        .stdout(predicate::str::contains("outcome,completed:1.00"));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("settings_db");

    let mut cmd = Command::new(cargo_bin!("vend-session"));
    cmd.arg("simulate")
        .arg("--approve-delay-ms")
        .arg("0")
        .arg("--settings-db")
        .arg(&db_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARNING").not());
}
