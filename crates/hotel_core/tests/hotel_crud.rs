use hotel_core::db::open_db_in_memory;
use hotel_core::{
    ConflictReason, EntityKind, EntityRepository, ErrorKind, Hotel, RepoError,
    SqliteHotelRepository, ValidationFailure, INITIAL_VERSION,
};

fn sample_hotel() -> Hotel {
    Hotel::new("Grand Budapest", "1 Alpine Way, Zubrowka", "+36 1 555 0000")
}

#[test]
fn create_assigns_id_and_initial_version() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHotelRepository::try_new(&conn).unwrap();

    let mut input = sample_hotel();
    input.id = 42;
    input.version = 9;
    let created = repo.create(&input).unwrap();

    assert_ne!(created.id, 42);
    assert!(created.id > 0);
    assert_eq!(created.version, INITIAL_VERSION);
    assert_eq!(created.name, "Grand Budapest");

    let loaded = repo.get(created.id).unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn server_generated_ids_are_distinct_and_not_reused() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHotelRepository::try_new(&conn).unwrap();

    let first = repo.create(&sample_hotel()).unwrap();
    let second = repo.create(&sample_hotel()).unwrap();
    assert_ne!(first.id, second.id);

    repo.delete(second.id).unwrap();
    let third = repo.create(&sample_hotel()).unwrap();
    assert!(third.id > second.id);
}

#[test]
fn list_returns_every_hotel() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHotelRepository::try_new(&conn).unwrap();
    assert!(repo.list().unwrap().is_empty());

    let first = repo.create(&sample_hotel()).unwrap();
    let second = repo
        .create(&Hotel::new("Overlook", "Sidewinder, Colorado", "555-0199"))
        .unwrap();

    let ids: Vec<_> = repo.list().unwrap().into_iter().map(|hotel| hotel.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[test]
fn create_rejects_missing_and_overlong_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHotelRepository::try_new(&conn).unwrap();

    let mut blank_name = sample_hotel();
    blank_name.name = "   ".to_string();
    match repo.create(&blank_name).unwrap_err() {
        RepoError::Validation(err) => {
            assert_eq!(err.field, "name");
            assert_eq!(err.reason, ValidationFailure::Missing);
        }
        other => panic!("unexpected error: {other}"),
    }

    let mut long_phone = sample_hotel();
    long_phone.phone_number = "9".repeat(101);
    match repo.create(&long_phone).unwrap_err() {
        RepoError::Validation(err) => {
            assert_eq!(err.field, "phoneNumber");
            assert_eq!(
                err.reason,
                ValidationFailure::TooLong {
                    max: 100,
                    actual: 101
                }
            );
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(repo.list().unwrap().is_empty());
}

#[test]
fn name_at_length_limit_is_accepted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHotelRepository::try_new(&conn).unwrap();

    let mut hotel = sample_hotel();
    hotel.name = "n".repeat(100);
    hotel.address = "a".repeat(200);
    let created = repo.create(&hotel).unwrap();
    assert_eq!(repo.get(created.id).unwrap().name.len(), 100);

    hotel.name = "n".repeat(101);
    assert_eq!(repo.create(&hotel).unwrap_err().kind(), ErrorKind::Validation);
}

#[test]
fn length_limit_counts_characters_not_bytes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHotelRepository::try_new(&conn).unwrap();

    let mut hotel = sample_hotel();
    hotel.name = "é".repeat(100);
    repo.create(&hotel).unwrap();
}

#[test]
fn update_replaces_fields_and_bumps_version() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHotelRepository::try_new(&conn).unwrap();

    let mut hotel = repo.create(&sample_hotel()).unwrap();
    hotel.address = "2 Alpine Way, Zubrowka".to_string();
    repo.update(hotel.id, &hotel).unwrap();

    let loaded = repo.get(hotel.id).unwrap();
    assert_eq!(loaded.address, "2 Alpine Way, Zubrowka");
    assert_eq!(loaded.version, INITIAL_VERSION + 1);
}

#[test]
fn update_with_mismatched_key_leaves_record_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHotelRepository::try_new(&conn).unwrap();

    let first = repo.create(&sample_hotel()).unwrap();
    let second = repo
        .create(&Hotel::new("Overlook", "Sidewinder, Colorado", "555-0199"))
        .unwrap();

    let mut body = second.clone();
    body.name = "Hijacked".to_string();
    match repo.update(first.id, &body).unwrap_err() {
        RepoError::KeyMismatch {
            entity, addressed, ..
        } => {
            assert_eq!(entity, EntityKind::Hotel);
            assert_eq!(addressed, first.id.to_string());
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(repo.get(first.id).unwrap(), first);
    assert_eq!(repo.get(second.id).unwrap(), second);
}

#[test]
fn update_validates_body() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHotelRepository::try_new(&conn).unwrap();

    let mut hotel = repo.create(&sample_hotel()).unwrap();
    hotel.address = String::new();
    assert_eq!(
        repo.update(hotel.id, &hotel).unwrap_err().kind(),
        ErrorKind::Validation
    );
    assert_eq!(repo.get(hotel.id).unwrap().version, INITIAL_VERSION);
}

#[test]
fn update_with_stale_version_is_conflict() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHotelRepository::try_new(&conn).unwrap();

    let hotel = repo.create(&sample_hotel()).unwrap();
    let mut fresh = hotel.clone();
    fresh.name = "First writer".to_string();
    repo.update(hotel.id, &fresh).unwrap();

    let mut stale = hotel.clone();
    stale.name = "Second writer".to_string();
    match repo.update(hotel.id, &stale).unwrap_err() {
        RepoError::Conflict { reason, .. } => {
            assert_eq!(
                reason,
                ConflictReason::StaleVersion {
                    expected: INITIAL_VERSION
                }
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(repo.get(hotel.id).unwrap().name, "First writer");
}

#[test]
fn update_of_missing_hotel_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHotelRepository::try_new(&conn).unwrap();

    let mut ghost = sample_hotel();
    ghost.id = 404;
    ghost.version = INITIAL_VERSION;
    assert_eq!(
        repo.update(404, &ghost).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert!(repo.list().unwrap().is_empty());
}

#[test]
fn get_and_delete_of_missing_hotel_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHotelRepository::try_new(&conn).unwrap();

    assert_eq!(repo.get(1).unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(repo.delete(1).unwrap_err().kind(), ErrorKind::NotFound);
    assert!(!repo.exists(1).unwrap());
}

#[test]
fn delete_returns_prior_state() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHotelRepository::try_new(&conn).unwrap();

    let hotel = repo.create(&sample_hotel()).unwrap();
    let deleted = repo.delete(hotel.id).unwrap();
    assert_eq!(deleted, hotel);
    assert_eq!(repo.get(hotel.id).unwrap_err().kind(), ErrorKind::NotFound);
}
