//! Integration tests for physical compaction.

use std::collections::BTreeMap;

use dbase_engine::{DbfError, DbfFile, FieldSchema, FieldValue, OpenMode};

fn schema() -> Vec<FieldSchema> {
    vec![FieldSchema::character("NAME", 10)]
}

fn values(name: &str) -> BTreeMap<String, FieldValue> {
    BTreeMap::from([("NAME".to_string(), FieldValue::character(name))])
}

#[test]
fn test_pack_drops_deleted_and_renumbers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pack.dbf");

    let mut db = DbfFile::create(&path, schema()).unwrap();
    for name in ["A", "B", "C", "D"] {
        db.add_record(&values(name)).unwrap();
    }
    db.delete_record(1).unwrap();
    db.delete_record(3).unwrap();

    let retained = db.pack().unwrap();
    assert_eq!(retained, 2);
    assert_eq!(db.record_count(), 2);

    let first = db.record(1).unwrap();
    assert!(!first.deleted);
    assert_eq!(first.values[0], FieldValue::character("B"));

    let second = db.record(2).unwrap();
    assert!(!second.deleted);
    assert_eq!(second.values[0], FieldValue::character("D"));

    assert!(db.record(3).is_err());
}

#[test]
fn test_pack_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reopen.dbf");

    let mut db = DbfFile::create(&path, schema()).unwrap();
    for name in ["A", "B", "C"] {
        db.add_record(&values(name)).unwrap();
    }
    db.delete_record(2).unwrap();
    db.pack().unwrap();
    db.close().unwrap();

    let mut db = DbfFile::open(&path, OpenMode::ReadWrite).unwrap();
    assert_eq!(db.record_count(), 2);
    assert_eq!(db.record(1).unwrap().values[0], FieldValue::character("A"));
    assert_eq!(db.record(2).unwrap().values[0], FieldValue::character("C"));
}

#[test]
fn test_pack_without_deleted_records_is_identity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noop.dbf");

    let mut db = DbfFile::create(&path, schema()).unwrap();
    for name in ["A", "B"] {
        db.add_record(&values(name)).unwrap();
    }

    assert_eq!(db.pack().unwrap(), 2);
    assert_eq!(db.record_count(), 2);
    assert_eq!(db.record(1).unwrap().values[0], FieldValue::character("A"));
    assert_eq!(db.record(2).unwrap().values[0], FieldValue::character("B"));
}

#[test]
fn test_pack_everything_deleted_leaves_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.dbf");

    let mut db = DbfFile::create(&path, schema()).unwrap();
    db.add_record(&values("A")).unwrap();
    db.delete_record(1).unwrap();

    assert_eq!(db.pack().unwrap(), 0);
    assert_eq!(db.record_count(), 0);
    assert!(db.record(1).is_err());

    // Header block only, no record bytes.
    let size = std::fs::metadata(&path).unwrap().len();
    assert_eq!(size, 32 + 32 + 1);
}

#[test]
fn test_pack_shrinks_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shrink.dbf");

    let mut db = DbfFile::create(&path, schema()).unwrap();
    for name in ["A", "B", "C", "D"] {
        db.add_record(&values(name)).unwrap();
    }
    let before = std::fs::metadata(&path).unwrap().len();

    db.delete_record(4).unwrap();
    db.pack().unwrap();

    let after = std::fs::metadata(&path).unwrap().len();
    assert_eq!(before - after, 11); // one 10-byte record plus its flag byte
}

#[test]
fn test_failed_pack_keeps_handle_usable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doomed.dbf");

    let mut db = DbfFile::create(&path, schema()).unwrap();
    db.add_record(&values("A")).unwrap();

    // Removing the directory makes the temp-file step fail; the open handle
    // still reaches the unlinked file afterwards.
    std::fs::remove_dir_all(dir.path()).unwrap();
    assert!(matches!(db.pack(), Err(DbfError::Io(_))));

    assert_eq!(db.record_count(), 1);
    assert_eq!(db.record(1).unwrap().values[0], FieldValue::character("A"));
}

#[test]
fn test_add_after_pack() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("append.dbf");

    let mut db = DbfFile::create(&path, schema()).unwrap();
    for name in ["A", "B", "C"] {
        db.add_record(&values(name)).unwrap();
    }
    db.delete_record(1).unwrap();
    db.pack().unwrap();

    let index = db.add_record(&values("E")).unwrap();
    assert_eq!(index, 3);
    assert_eq!(db.record(3).unwrap().values[0], FieldValue::character("E"));
}
