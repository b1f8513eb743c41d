//! Hotel repository over the `hotels` table.
//!
//! # Invariants
//! - `id` is assigned by SQLite (`AUTOINCREMENT`), never reused.
//! - Deleting a hotel cascades to its rooms and their reservations.

use crate::model::hotel::{Hotel, HotelId};
use crate::model::INITIAL_VERSION;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::existence::record_exists;
use crate::repo::guard::{guarded_delete, guarded_insert, guarded_update};
use crate::repo::{ensure_connection_ready, EntityRepository};
use crate::schema::{EntityKind, SchemaRecord};
use rusqlite::{params, Connection, OptionalExtension, Row};

const HOTEL_SELECT_SQL: &str = "SELECT
    id,
    name,
    address,
    phone_number,
    version
FROM hotels";

/// SQLite-backed hotel repository.
pub struct SqliteHotelRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHotelRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, EntityKind::Hotel)?;
        Ok(Self { conn })
    }
}

impl EntityRepository for SqliteHotelRepository<'_> {
    const KIND: EntityKind = EntityKind::Hotel;
    type Entity = Hotel;
    type Key = HotelId;

    fn list(&self) -> RepoResult<Vec<Hotel>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HOTEL_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut hotels = Vec::new();
        while let Some(row) = rows.next()? {
            hotels.push(parse_hotel_row(row)?);
        }
        Ok(hotels)
    }

    fn get(&self, id: HotelId) -> RepoResult<Hotel> {
        fetch_hotel(self.conn, id)?.ok_or_else(|| RepoError::not_found(Self::KIND, id))
    }

    fn exists(&self, id: HotelId) -> RepoResult<bool> {
        record_exists(self.conn, Self::KIND, &id)
    }

    fn create(&self, hotel: &Hotel) -> RepoResult<Hotel> {
        Hotel::schema().validate(hotel)?;

        let id = guarded_insert(self.conn, hotel, None::<&HotelId>, |conn| {
            conn.execute(
                "INSERT INTO hotels (name, address, phone_number, version)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    hotel.name.as_str(),
                    hotel.address.as_str(),
                    hotel.phone_number.as_str(),
                    INITIAL_VERSION,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        Ok(Hotel {
            id,
            version: INITIAL_VERSION,
            ..hotel.clone()
        })
    }

    fn update(&self, id: HotelId, hotel: &Hotel) -> RepoResult<()> {
        Hotel::schema().validate(hotel)?;
        if hotel.id != id {
            return Err(RepoError::KeyMismatch {
                entity: Self::KIND,
                addressed: id.to_string(),
                supplied: hotel.id.to_string(),
            });
        }

        guarded_update(self.conn, hotel, &id, hotel.version, |conn| {
            conn.execute(
                "UPDATE hotels
                 SET
                    name = ?1,
                    address = ?2,
                    phone_number = ?3,
                    version = version + 1
                 WHERE id = ?4
                   AND version = ?5;",
                params![
                    hotel.name.as_str(),
                    hotel.address.as_str(),
                    hotel.phone_number.as_str(),
                    id,
                    hotel.version,
                ],
            )
        })
    }

    fn delete(&self, id: HotelId) -> RepoResult<Hotel> {
        guarded_delete(
            self.conn,
            Self::KIND,
            &id,
            |conn| fetch_hotel(conn, id),
            |conn| conn.execute("DELETE FROM hotels WHERE id = ?1;", [id]),
        )
    }
}

fn fetch_hotel(conn: &Connection, id: HotelId) -> RepoResult<Option<Hotel>> {
    let row = conn
        .query_row(
            &format!("{HOTEL_SELECT_SQL} WHERE id = ?1;"),
            [id],
            |row| Ok(parse_hotel_row(row)),
        )
        .optional()?;
    row.transpose()
}

fn parse_hotel_row(row: &Row<'_>) -> RepoResult<Hotel> {
    let hotel = Hotel {
        id: row.get("id")?,
        name: row.get("name")?,
        address: row.get("address")?,
        phone_number: row.get("phone_number")?,
        version: row.get("version")?,
    };
    Hotel::schema().validate(&hotel).map_err(|err| {
        RepoError::InvalidData(format!("hotel {} failed validation: {err}", hotel.id))
    })?;
    Ok(hotel)
}
