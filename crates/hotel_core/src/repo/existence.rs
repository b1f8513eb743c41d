//! Existence checks keyed by the schema registry.
//!
//! Used to tell apart the outcomes of a failed write: a vanished record
//! (`NotFound`), a concurrent modification or duplicate key (`Conflict`),
//! and a dangling foreign key (`MissingReference`).

use crate::model::hotel::HotelId;
use crate::model::hotel_room::HotelRoomKey;
use crate::repo::error::{RepoError, RepoResult};
use crate::schema::{
    parents_of, schema_for, EntityKind, FieldValue, RelationshipSchema, SchemaRecord,
};
use rusqlite::{params_from_iter, Connection};
use std::fmt::Display;

/// Primary key values in schema registry column order.
pub trait RecordKey: Display {
    fn key_values(&self) -> Vec<i64>;
}

impl RecordKey for HotelId {
    fn key_values(&self) -> Vec<i64> {
        vec![*self]
    }
}

impl RecordKey for HotelRoomKey {
    fn key_values(&self) -> Vec<i64> {
        vec![self.room_number, self.hotel_id]
    }
}

/// Reports whether a `kind` row with `key` currently exists.
pub fn record_exists<K: RecordKey + ?Sized>(
    conn: &Connection,
    kind: EntityKind,
    key: &K,
) -> RepoResult<bool> {
    let schema = schema_for(kind);
    let values = key.key_values();
    if values.len() != schema.primary_key().len() {
        return Err(RepoError::InvalidData(format!(
            "{kind} key `{key}` has {} parts, expected {}",
            values.len(),
            schema.primary_key().len()
        )));
    }
    Ok(rows_exist(conn, schema.table, schema.primary_key(), &values)?)
}

/// Finds the first parent relationship of `record` whose referenced row is
/// absent.
pub fn find_missing_parent<R: SchemaRecord>(
    conn: &Connection,
    record: &R,
) -> RepoResult<Option<&'static RelationshipSchema>> {
    for relationship in parents_of(R::KIND) {
        let mut values = Vec::with_capacity(relationship.columns.len());
        for column in relationship.columns {
            match record.field_value(column) {
                Some(FieldValue::Integer(value)) => values.push(value),
                _ => {
                    return Err(RepoError::InvalidData(format!(
                        "{} column `{column}` is not an integer foreign key",
                        R::KIND
                    )))
                }
            }
        }

        let parent = schema_for(relationship.parent);
        if !rows_exist(conn, parent.table, relationship.parent_columns, &values)? {
            return Ok(Some(relationship));
        }
    }
    Ok(None)
}

fn rows_exist(
    conn: &Connection,
    table: &str,
    columns: &[&str],
    values: &[i64],
) -> rusqlite::Result<bool> {
    let predicate = columns
        .iter()
        .enumerate()
        .map(|(index, column)| format!("{column} = ?{}", index + 1))
        .collect::<Vec<_>>()
        .join(" AND ");
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE {predicate});"),
        params_from_iter(values.iter()),
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
