use hotel_core::db::open_db_in_memory;
use hotel_core::schema::{cascade_closure, delete_behavior, DeleteBehavior};
use hotel_core::{
    EntityKind, EntityRepository, ErrorKind, Hotel, HotelRoom, HotelRoomKey, RoomReservation,
    SqliteHotelRepository, SqliteHotelRoomRepository, SqliteRoomReservationRepository,
};
use rusqlite::Connection;

const START_MS: i64 = 1_740_000_000_000;

struct Fixture {
    hotel_id: i64,
    rooms: Vec<HotelRoomKey>,
    reservation_ids: Vec<i64>,
}

fn populate(conn: &Connection, name: &str) -> Fixture {
    let hotel = SqliteHotelRepository::try_new(conn)
        .unwrap()
        .create(&Hotel::new(name, "Lake Road 3", "555-0170"))
        .unwrap();
    let rooms_repo = SqliteHotelRoomRepository::try_new(conn).unwrap();
    let reservations_repo = SqliteRoomReservationRepository::try_new(conn).unwrap();

    let mut rooms = Vec::new();
    let mut reservation_ids = Vec::new();
    for room_number in [1, 2] {
        let room = rooms_repo
            .create(&HotelRoom {
                room_number,
                hotel_id: hotel.id,
                nightly_rate: 60.0,
                number_of_beds: 1,
                room_type_id: 1,
                bed_type_id: 1,
                version: 0,
            })
            .unwrap();
        rooms.push(room.key());
        let reservation = reservations_repo
            .create(&RoomReservation::new(room.key(), START_MS, START_MS + 1))
            .unwrap();
        reservation_ids.push(reservation.reservation_id);
    }

    Fixture {
        hotel_id: hotel.id,
        rooms,
        reservation_ids,
    }
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn registry_declares_the_cascade_chain() {
    assert_eq!(
        delete_behavior("hotel_rooms_hotel"),
        Some(DeleteBehavior::Cascade)
    );
    assert_eq!(
        delete_behavior("hotel_rooms_bed_type"),
        Some(DeleteBehavior::Restrict)
    );
    assert_eq!(
        cascade_closure(EntityKind::Hotel),
        vec![EntityKind::HotelRoom, EntityKind::RoomReservation]
    );
}

#[test]
fn deleting_hotel_removes_its_rooms_and_reservations_only() {
    let conn = open_db_in_memory().unwrap();
    let doomed = populate(&conn, "Doomed");
    let survivor = populate(&conn, "Survivor");

    SqliteHotelRepository::try_new(&conn)
        .unwrap()
        .delete(doomed.hotel_id)
        .unwrap();

    let rooms = SqliteHotelRoomRepository::try_new(&conn).unwrap();
    let reservations = SqliteRoomReservationRepository::try_new(&conn).unwrap();
    for key in &doomed.rooms {
        assert_eq!(rooms.get(*key).unwrap_err().kind(), ErrorKind::NotFound);
    }
    for id in &doomed.reservation_ids {
        assert!(!reservations.exists(*id).unwrap());
    }

    assert_eq!(rooms.list_for_hotel(survivor.hotel_id).unwrap().len(), 2);
    for id in &survivor.reservation_ids {
        assert!(reservations.exists(*id).unwrap());
    }
    assert_eq!(count(&conn, "hotel_rooms"), 2);
    assert_eq!(count(&conn, "room_reservations"), 2);
}

#[test]
fn deleting_room_removes_only_its_reservations() {
    let conn = open_db_in_memory().unwrap();
    let fixture = populate(&conn, "Alpha");

    let removed = SqliteHotelRoomRepository::try_new(&conn)
        .unwrap()
        .delete(fixture.rooms[0])
        .unwrap();
    assert_eq!(removed.key(), fixture.rooms[0]);

    let reservations = SqliteRoomReservationRepository::try_new(&conn).unwrap();
    assert!(!reservations.exists(fixture.reservation_ids[0]).unwrap());
    assert!(reservations.exists(fixture.reservation_ids[1]).unwrap());
    assert!(SqliteHotelRepository::try_new(&conn)
        .unwrap()
        .exists(fixture.hotel_id)
        .unwrap());
}

#[test]
fn failed_delete_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    populate(&conn, "Alpha");

    let err = SqliteHotelRepository::try_new(&conn)
        .unwrap()
        .delete(9_999)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(count(&conn, "hotels"), 1);
    assert_eq!(count(&conn, "hotel_rooms"), 2);
    assert_eq!(count(&conn, "room_reservations"), 2);
}

#[test]
fn deleting_first_hotel_drops_its_room() {
    let conn = open_db_in_memory().unwrap();
    let hotels = SqliteHotelRepository::try_new(&conn).unwrap();
    let rooms = SqliteHotelRoomRepository::try_new(&conn).unwrap();

    let hotel = hotels
        .create(&Hotel::new(
            "Forward Operating Base Comfort",
            "Hellscape",
            "1-800-289-8234",
        ))
        .unwrap();
    assert_eq!(hotel.id, 1);

    rooms
        .create(&HotelRoom {
            room_number: 101,
            hotel_id: 1,
            nightly_rate: 99.50,
            number_of_beds: 2,
            room_type_id: 1,
            bed_type_id: 1,
            version: 0,
        })
        .unwrap();

    hotels.delete(1).unwrap();
    assert_eq!(
        rooms.get(HotelRoomKey::new(101, 1)).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}
