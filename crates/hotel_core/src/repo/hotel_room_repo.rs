//! Hotel room repository over the `hotel_rooms` table.
//!
//! # Invariants
//! - The composite key `(room_number, hotel_id)` is chosen by the caller;
//!   inserting an existing key is a `Conflict`, not a storage failure.
//! - `room_type_id` and `bed_type_id` must reference existing lookup rows.

use crate::model::hotel::HotelId;
use crate::model::hotel_room::{HotelRoom, HotelRoomKey};
use crate::model::INITIAL_VERSION;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::existence::record_exists;
use crate::repo::guard::{guarded_delete, guarded_insert, guarded_update};
use crate::repo::{ensure_connection_ready, EntityRepository};
use crate::schema::{EntityKind, SchemaRecord};
use rusqlite::{params, Connection, OptionalExtension, Params, Row};

const HOTEL_ROOM_SELECT_SQL: &str = "SELECT
    room_number,
    hotel_id,
    nightly_rate,
    number_of_beds,
    room_type_id,
    bed_type_id,
    version
FROM hotel_rooms";

/// SQLite-backed hotel room repository.
pub struct SqliteHotelRoomRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHotelRoomRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, EntityKind::HotelRoom)?;
        Ok(Self { conn })
    }

    /// Lists the rooms of one hotel, ordered by room number.
    ///
    /// An unknown `hotel_id` yields an empty list, not `NotFound`.
    pub fn list_for_hotel(&self, hotel_id: HotelId) -> RepoResult<Vec<HotelRoom>> {
        query_rooms(
            self.conn,
            &format!("{HOTEL_ROOM_SELECT_SQL} WHERE hotel_id = ?1 ORDER BY room_number ASC;"),
            [hotel_id],
        )
    }
}

impl EntityRepository for SqliteHotelRoomRepository<'_> {
    const KIND: EntityKind = EntityKind::HotelRoom;
    type Entity = HotelRoom;
    type Key = HotelRoomKey;

    fn list(&self) -> RepoResult<Vec<HotelRoom>> {
        query_rooms(
            self.conn,
            &format!("{HOTEL_ROOM_SELECT_SQL} ORDER BY hotel_id ASC, room_number ASC;"),
            params![],
        )
    }

    fn get(&self, key: HotelRoomKey) -> RepoResult<HotelRoom> {
        fetch_room(self.conn, key)?.ok_or_else(|| RepoError::not_found(Self::KIND, key))
    }

    fn exists(&self, key: HotelRoomKey) -> RepoResult<bool> {
        record_exists(self.conn, Self::KIND, &key)
    }

    fn create(&self, room: &HotelRoom) -> RepoResult<HotelRoom> {
        HotelRoom::schema().validate(room)?;
        let key = room.key();

        guarded_insert(self.conn, room, Some(&key), |conn| {
            conn.execute(
                "INSERT INTO hotel_rooms (
                    room_number,
                    hotel_id,
                    nightly_rate,
                    number_of_beds,
                    room_type_id,
                    bed_type_id,
                    version
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    room.room_number,
                    room.hotel_id,
                    room.nightly_rate,
                    room.number_of_beds,
                    room.room_type_id,
                    room.bed_type_id,
                    INITIAL_VERSION,
                ],
            )
        })?;

        Ok(HotelRoom {
            version: INITIAL_VERSION,
            ..room.clone()
        })
    }

    fn update(&self, key: HotelRoomKey, room: &HotelRoom) -> RepoResult<()> {
        HotelRoom::schema().validate(room)?;
        if room.key() != key {
            return Err(RepoError::KeyMismatch {
                entity: Self::KIND,
                addressed: key.to_string(),
                supplied: room.key().to_string(),
            });
        }

        guarded_update(self.conn, room, &key, room.version, |conn| {
            conn.execute(
                "UPDATE hotel_rooms
                 SET
                    nightly_rate = ?1,
                    number_of_beds = ?2,
                    room_type_id = ?3,
                    bed_type_id = ?4,
                    version = version + 1
                 WHERE room_number = ?5
                   AND hotel_id = ?6
                   AND version = ?7;",
                params![
                    room.nightly_rate,
                    room.number_of_beds,
                    room.room_type_id,
                    room.bed_type_id,
                    key.room_number,
                    key.hotel_id,
                    room.version,
                ],
            )
        })
    }

    fn delete(&self, key: HotelRoomKey) -> RepoResult<HotelRoom> {
        guarded_delete(
            self.conn,
            Self::KIND,
            &key,
            |conn| fetch_room(conn, key),
            |conn| {
                conn.execute(
                    "DELETE FROM hotel_rooms WHERE room_number = ?1 AND hotel_id = ?2;",
                    [key.room_number, key.hotel_id],
                )
            },
        )
    }
}

fn query_rooms<P: Params>(conn: &Connection, sql: &str, params: P) -> RepoResult<Vec<HotelRoom>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut rooms = Vec::new();
    while let Some(row) = rows.next()? {
        rooms.push(parse_room_row(row)?);
    }
    Ok(rooms)
}

fn fetch_room(conn: &Connection, key: HotelRoomKey) -> RepoResult<Option<HotelRoom>> {
    let row = conn
        .query_row(
            &format!("{HOTEL_ROOM_SELECT_SQL} WHERE room_number = ?1 AND hotel_id = ?2;"),
            [key.room_number, key.hotel_id],
            |row| Ok(parse_room_row(row)),
        )
        .optional()?;
    row.transpose()
}

fn parse_room_row(row: &Row<'_>) -> RepoResult<HotelRoom> {
    Ok(HotelRoom {
        room_number: row.get("room_number")?,
        hotel_id: row.get("hotel_id")?,
        nightly_rate: row.get("nightly_rate")?,
        number_of_beds: row.get("number_of_beds")?,
        room_type_id: row.get("room_type_id")?,
        bed_type_id: row.get("bed_type_id")?,
        version: row.get("version")?,
    })
}
