//! Entity repositories over the SQLite storage engine.
//!
//! # Responsibility
//! - Define the uniform CRUD contract shared by hotels, rooms and
//!   reservations.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Writes validate against the schema registry before touching storage.
//! - Update checks the addressing key against the body key before touching
//!   storage.
//! - Each write commits as one transaction; cascades ride along in it.

use crate::db::migrations::latest_version;
use crate::schema::{schema_for, EntityKind};
use rusqlite::Connection;

pub mod error;
pub mod existence;
mod guard;
pub mod hotel_repo;
pub mod hotel_room_repo;
pub mod lookup_repo;
pub mod room_reservation_repo;

pub use error::{ConflictReason, ErrorKind, RepoError, RepoResult};
pub use existence::RecordKey;

/// CRUD contract implemented once per mutable entity.
pub trait EntityRepository {
    const KIND: EntityKind;
    type Entity;
    type Key: RecordKey + Copy;

    /// Returns every record. No paging; order is not part of the contract.
    fn list(&self) -> RepoResult<Vec<Self::Entity>>;
    /// Fetches one record or fails with `NotFound`.
    fn get(&self, key: Self::Key) -> RepoResult<Self::Entity>;
    fn exists(&self, key: Self::Key) -> RepoResult<bool>;
    /// Validates and inserts; returns the stored record with its assigned
    /// key and version.
    fn create(&self, entity: &Self::Entity) -> RepoResult<Self::Entity>;
    /// Replaces the record at `key` if it is still at `entity.version`.
    fn update(&self, key: Self::Key, entity: &Self::Entity) -> RepoResult<()>;
    /// Deletes the record at `key` and returns its prior state.
    fn delete(&self, key: Self::Key) -> RepoResult<Self::Entity>;
}

/// Verifies `conn` is migrated and carries the table for `kind`.
pub(crate) fn ensure_connection_ready(conn: &Connection, kind: EntityKind) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let schema = schema_for(kind);
    if !table_exists(conn, schema.table)? {
        return Err(RepoError::MissingRequiredTable(schema.table));
    }

    let present = table_columns(conn, schema.table)?;
    for column in schema.columns() {
        if !present.iter().any(|current| current == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: schema.table,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    Ok(columns)
}
