//! Room reservation repository over the `room_reservations` table.
//!
//! # Invariants
//! - `reservation_id` is assigned by SQLite; a supplied value is ignored on
//!   create.
//! - `(room_number, hotel_id)` must reference an existing hotel room.
//! - Date ranges are stored as given. Overlaps are not checked.

use crate::model::hotel_room::HotelRoomKey;
use crate::model::room_reservation::{ReservationId, RoomReservation};
use crate::model::INITIAL_VERSION;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::existence::record_exists;
use crate::repo::guard::{guarded_delete, guarded_insert, guarded_update};
use crate::repo::{ensure_connection_ready, EntityRepository};
use crate::schema::{EntityKind, SchemaRecord};
use rusqlite::{params, Connection, OptionalExtension, Params, Row};

const RESERVATION_SELECT_SQL: &str = "SELECT
    reservation_id,
    hotel_id,
    room_number,
    start_date,
    end_date,
    version
FROM room_reservations";

pub struct SqliteRoomReservationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRoomReservationRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, EntityKind::RoomReservation)?;
        Ok(Self { conn })
    }

    /// Lists reservations of one room ordered by start date.
    pub fn list_for_room(&self, room: HotelRoomKey) -> RepoResult<Vec<RoomReservation>> {
        query_reservations(
            self.conn,
            &format!(
                "{RESERVATION_SELECT_SQL}
                 WHERE room_number = ?1 AND hotel_id = ?2
                 ORDER BY start_date ASC, reservation_id ASC;"
            ),
            [room.room_number, room.hotel_id],
        )
    }
}

impl EntityRepository for SqliteRoomReservationRepository<'_> {
    const KIND: EntityKind = EntityKind::RoomReservation;
    type Entity = RoomReservation;
    type Key = ReservationId;

    fn list(&self) -> RepoResult<Vec<RoomReservation>> {
        query_reservations(
            self.conn,
            &format!("{RESERVATION_SELECT_SQL} ORDER BY reservation_id ASC;"),
            params![],
        )
    }

    fn get(&self, id: ReservationId) -> RepoResult<RoomReservation> {
        fetch_reservation(self.conn, id)?.ok_or_else(|| RepoError::not_found(Self::KIND, id))
    }

    fn exists(&self, id: ReservationId) -> RepoResult<bool> {
        record_exists(self.conn, Self::KIND, &id)
    }

    fn create(&self, reservation: &RoomReservation) -> RepoResult<RoomReservation> {
        RoomReservation::schema().validate(reservation)?;

        let reservation_id =
            guarded_insert(self.conn, reservation, None::<&ReservationId>, |conn| {
                conn.execute(
                    "INSERT INTO room_reservations (
                        hotel_id,
                        room_number,
                        start_date,
                        end_date,
                        version
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        reservation.hotel_id,
                        reservation.room_number,
                        reservation.start_date,
                        reservation.end_date,
                        INITIAL_VERSION,
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })?;

        Ok(RoomReservation {
            reservation_id,
            version: INITIAL_VERSION,
            ..reservation.clone()
        })
    }

    fn update(&self, id: ReservationId, reservation: &RoomReservation) -> RepoResult<()> {
        RoomReservation::schema().validate(reservation)?;
        if reservation.reservation_id != id {
            return Err(RepoError::KeyMismatch {
                entity: Self::KIND,
                addressed: id.to_string(),
                supplied: reservation.reservation_id.to_string(),
            });
        }

        guarded_update(self.conn, reservation, &id, reservation.version, |conn| {
            conn.execute(
                "UPDATE room_reservations
                 SET
                    hotel_id = ?1,
                    room_number = ?2,
                    start_date = ?3,
                    end_date = ?4,
                    version = version + 1
                 WHERE reservation_id = ?5
                   AND version = ?6;",
                params![
                    reservation.hotel_id,
                    reservation.room_number,
                    reservation.start_date,
                    reservation.end_date,
                    id,
                    reservation.version,
                ],
            )
        })
    }

    fn delete(&self, id: ReservationId) -> RepoResult<RoomReservation> {
        guarded_delete(
            self.conn,
            Self::KIND,
            &id,
            |conn| fetch_reservation(conn, id),
            |conn| conn.execute("DELETE FROM room_reservations WHERE reservation_id = ?1;", [id]),
        )
    }
}

fn query_reservations<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> RepoResult<Vec<RoomReservation>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut reservations = Vec::new();
    while let Some(row) = rows.next()? {
        reservations.push(parse_reservation_row(row)?);
    }
    Ok(reservations)
}

fn fetch_reservation(conn: &Connection, id: ReservationId) -> RepoResult<Option<RoomReservation>> {
    let row = conn
        .query_row(
            &format!("{RESERVATION_SELECT_SQL} WHERE reservation_id = ?1;"),
            [id],
            |row| Ok(parse_reservation_row(row)),
        )
        .optional()?;
    row.transpose()
}

fn parse_reservation_row(row: &Row<'_>) -> RepoResult<RoomReservation> {
    Ok(RoomReservation {
        reservation_id: row.get("reservation_id")?,
        hotel_id: row.get("hotel_id")?,
        room_number: row.get("room_number")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        version: row.get("version")?,
    })
}
