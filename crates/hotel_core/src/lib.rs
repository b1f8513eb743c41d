//! Hotel reservation core: schema registry, SQLite storage, entity
//! repositories with optimistic concurrency, and the services on top.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schema;
pub mod service;

pub use db::seed::{seed_sample_data, SeedReport};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::hotel::{Hotel, HotelId};
pub use model::hotel_room::{HotelRoom, HotelRoomKey, RoomNumber};
pub use model::lookup::{BedType, BedTypeId, RoomType, RoomTypeId};
pub use model::room_reservation::{ReservationId, RoomReservation};
pub use model::{RowVersion, INITIAL_VERSION};
pub use repo::hotel_repo::SqliteHotelRepository;
pub use repo::hotel_room_repo::SqliteHotelRoomRepository;
pub use repo::lookup_repo::SqliteLookupRepository;
pub use repo::room_reservation_repo::SqliteRoomReservationRepository;
pub use repo::{ConflictReason, EntityRepository, ErrorKind, RepoError, RepoResult};
pub use schema::{EntityKind, ValidationError, ValidationFailure};
pub use service::EntityService;

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
