use jobtrack_core::db::migrations::latest_version;
use jobtrack_core::db::{open_db, open_db_in_memory, DbError};
use jobtrack_core::{SlotStorage, SqliteSlotStorage, StorageError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_slots");
    assert_table_exists(&conn, "kv_revision");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracker.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "kv_slots");
}

#[test]
fn reopening_database_keeps_slot_values_and_revisions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracker.db");

    let storage = SqliteSlotStorage::try_new(open_db(&path).unwrap()).unwrap();
    storage.set_item("jobApplications", "[]").unwrap();
    let revision = storage.revision("jobApplications").unwrap();
    drop(storage);

    let storage = SqliteSlotStorage::try_new(open_db(&path).unwrap()).unwrap();
    assert_eq!(
        storage.get_item("jobApplications").unwrap().as_deref(),
        Some("[]")
    );
    assert_eq!(storage.revision("jobApplications").unwrap(), revision);
}

#[test]
fn slot_storage_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteSlotStorage::try_new(conn)
        .err()
        .expect("raw connection should be rejected");
    assert!(matches!(
        err,
        StorageError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
