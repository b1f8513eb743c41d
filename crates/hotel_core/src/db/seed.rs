//! Demo data set for fresh databases.
//!
//! # Invariants
//! - Runs only when `hotels` is empty; a populated database is never touched.
//! - All demo rows commit in one transaction or not at all.

use super::DbResult;
use log::info;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use std::time::Instant;

struct SeedHotel {
    name: &'static str,
    address: &'static str,
    phone_number: &'static str,
    rooms: &'static [SeedRoom],
}

struct SeedRoom {
    room_number: i64,
    nightly_rate: f64,
    number_of_beds: i64,
    room_type_id: i64,
    bed_type_id: i64,
}

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
/// 2024-06-01T00:00:00Z
const FIRST_STAY_START_MS: i64 = 1_717_200_000_000;

const SEED_HOTELS: &[SeedHotel] = &[
    SeedHotel {
        name: "Forward Operating Base Comfort",
        address: "Hellscape",
        phone_number: "1-800-289-8234",
        rooms: &[
            SeedRoom {
                room_number: 101,
                nightly_rate: 89.0,
                number_of_beds: 1,
                room_type_id: 1,
                bed_type_id: 2,
            },
            SeedRoom {
                room_number: 102,
                nightly_rate: 119.5,
                number_of_beds: 2,
                room_type_id: 2,
                bed_type_id: 1,
            },
        ],
    },
    SeedHotel {
        name: "Harborview Inn",
        address: "12 Quay Street, Portsmouth",
        phone_number: "+44 23 9200 0000",
        rooms: &[SeedRoom {
            room_number: 1,
            nightly_rate: 240.0,
            number_of_beds: 1,
            room_type_id: 3,
            bed_type_id: 3,
        }],
    },
];

/// Counts of rows inserted by [`seed_sample_data`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub hotels: usize,
    pub rooms: usize,
    pub reservations: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.hotels == 0 && self.rooms == 0 && self.reservations == 0
    }
}

/// Inserts the demo data set when no hotel exists yet.
///
/// Returns an empty report when the database already holds hotels.
pub fn seed_sample_data(conn: &Connection) -> DbResult<SeedReport> {
    let started_at = Instant::now();
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    let existing: i64 = tx.query_row("SELECT COUNT(*) FROM hotels;", [], |row| row.get(0))?;
    if existing > 0 {
        info!(
            "event=db_seed module=db status=skipped existing_hotels={existing} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        return Ok(SeedReport::default());
    }

    let mut report = SeedReport::default();
    let mut first_room = None;
    for hotel in SEED_HOTELS {
        tx.execute(
            "INSERT INTO hotels (name, address, phone_number) VALUES (?1, ?2, ?3);",
            params![hotel.name, hotel.address, hotel.phone_number],
        )?;
        let hotel_id = tx.last_insert_rowid();
        report.hotels += 1;

        for room in hotel.rooms {
            tx.execute(
                "INSERT INTO hotel_rooms (
                    room_number,
                    hotel_id,
                    nightly_rate,
                    number_of_beds,
                    room_type_id,
                    bed_type_id
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    room.room_number,
                    hotel_id,
                    room.nightly_rate,
                    room.number_of_beds,
                    room.room_type_id,
                    room.bed_type_id,
                ],
            )?;
            first_room.get_or_insert((room.room_number, hotel_id));
            report.rooms += 1;
        }
    }

    if let Some((room_number, hotel_id)) = first_room {
        tx.execute(
            "INSERT INTO room_reservations (hotel_id, room_number, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                hotel_id,
                room_number,
                FIRST_STAY_START_MS,
                FIRST_STAY_START_MS + 3 * DAY_MS
            ],
        )?;
        report.reservations += 1;
    }

    tx.commit()?;
    info!(
        "event=db_seed module=db status=ok hotels={} rooms={} reservations={} duration_ms={}",
        report.hotels,
        report.rooms,
        report.reservations,
        started_at.elapsed().as_millis()
    );
    Ok(report)
}
