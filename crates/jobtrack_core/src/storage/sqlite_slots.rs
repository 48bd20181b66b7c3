//! SQLite-backed slot storage.
//!
//! # Responsibility
//! - Persist slot values in the `kv_slots` table.
//! - Assign revisions from the shared `kv_revision` counter.
//!
//! # Invariants
//! - Each write bumps the counter and upserts the slot in one transaction.
//! - Construction fails for connections that were not opened via `open_db*`.

use super::{validate_key, SlotStorage, StorageError, StorageResult};
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};

const REQUIRED_TABLES: [&str; 2] = ["kv_slots", "kv_revision"];

/// Slot storage over an owned, migrated SQLite connection.
///
/// Two instances opened on the same database file behave like two browser
/// tabs sharing one storage area.
pub struct SqliteSlotStorage {
    conn: Connection,
}

impl SqliteSlotStorage {
    /// Wraps a connection after checking schema version and required tables.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` when the schema is incomplete.
    pub fn try_new(conn: Connection) -> StorageResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(&conn)?;
        if actual_version != expected_version {
            return Err(StorageError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        for table in REQUIRED_TABLES {
            if !table_exists(&conn, table)? {
                return Err(StorageError::MissingRequiredTable(table));
            }
        }

        Ok(Self { conn })
    }

    /// Borrows the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Releases the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    fn bump_revision(&self) -> StorageResult<i64> {
        self.conn
            .execute("UPDATE kv_revision SET value = value + 1 WHERE id = 1;", [])?;
        let revision = self
            .conn
            .query_row("SELECT value FROM kv_revision WHERE id = 1;", [], |row| {
                row.get::<_, i64>(0)
            })?;
        Ok(revision)
    }
}

impl SlotStorage for SqliteSlotStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_slots WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        validate_key(key)?;
        let tx = self.conn.unchecked_transaction()?;
        let revision = self.bump_revision()?;
        tx.execute(
            "INSERT INTO kv_slots (key, value, revision, updated_at)
             VALUES (?1, ?2, ?3, CAST(strftime('%s', 'now') AS INTEGER) * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                revision = excluded.revision,
                updated_at = excluded.updated_at;",
            params![key, value, revision],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM kv_slots WHERE key = ?1;", [key])?;
        if removed > 0 {
            self.bump_revision()?;
        }
        tx.commit()?;
        Ok(())
    }

    fn revision(&self, key: &str) -> StorageResult<Option<u64>> {
        validate_key(key)?;
        let revision = self
            .conn
            .query_row(
                "SELECT revision FROM kv_slots WHERE key = ?1;",
                [key],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        revision
            .map(|value| {
                u64::try_from(value).map_err(|_| {
                    StorageError::Db(DbError::CorruptRevision {
                        key: key.to_string(),
                        value,
                    })
                })
            })
            .transpose()
    }
}

fn table_exists(conn: &Connection, table: &str) -> StorageResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
