//! Read-only access to the room type and bed type lookup tables.

use crate::model::lookup::{BedType, RoomType};
use crate::repo::error::RepoResult;
use crate::repo::ensure_connection_ready;
use crate::schema::EntityKind;
use rusqlite::{Connection, Row};

pub struct SqliteLookupRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLookupRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, EntityKind::RoomType)?;
        ensure_connection_ready(conn, EntityKind::BedType)?;
        Ok(Self { conn })
    }

    pub fn list_room_types(&self) -> RepoResult<Vec<RoomType>> {
        self.list("room_types", |row| {
            Ok(RoomType {
                id: row.get("id")?,
                name: row.get("name")?,
            })
        })
    }

    pub fn list_bed_types(&self) -> RepoResult<Vec<BedType>> {
        self.list("bed_types", |row| {
            Ok(BedType {
                id: row.get("id")?,
                name: row.get("name")?,
            })
        })
    }

    fn list<T>(
        &self,
        table: &str,
        parse: impl Fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> RepoResult<Vec<T>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT id, name FROM {table} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse(row)?);
        }
        Ok(items)
    }
}
