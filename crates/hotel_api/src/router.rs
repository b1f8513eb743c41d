//! Request router: addressing-key extraction, body decoding and dispatch
//! into the entity services.
//!
//! # Responsibility
//! - Match `(method, path)` against the fixed route table.
//! - Open one database connection per request and hand it to the core.
//! - Translate results and errors into status codes and JSON bodies.
//!
//! # Invariants
//! - Unknown paths and bad methods are rejected before the database is opened.
//! - Every request emits exactly one `api_request` log event.

use crate::config::ApiConfig;
use crate::error::ApiError;
use hotel_core::db::open_db;
use hotel_core::schema::schema_for;
use hotel_core::{
    EntityKind, EntityRepository, EntityService, HotelId, HotelRoomKey, RepoError, ReservationId,
    SqliteHotelRepository, SqliteHotelRoomRepository, SqliteLookupRepository,
    SqliteRoomReservationRepository,
};
use log::{error, info, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Parses an HTTP-style method name, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    /// Raw JSON body, if any.
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>, body: Option<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path, None)
    }

    pub fn post(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(Method::Post, path, Some(body.into()))
    }

    pub fn put(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(Method::Put, path, Some(body.into()))
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path, None)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// `None` for `204 No Content`.
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    fn json(status: u16, payload: &impl Serialize) -> Result<Self, ApiError> {
        let value = serde_json::to_value(payload).map_err(ApiError::Encode)?;
        Ok(Self::new(status, Some(value)))
    }

    fn no_content() -> Self {
        Self::new(204, None)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

const COLLECTION_METHODS: &[Method] = &[Method::Get, Method::Post];
const ITEM_METHODS: &[Method] = &[Method::Get, Method::Put, Method::Delete];
const READ_METHODS: &[Method] = &[Method::Get];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Hotels,
    Hotel(HotelId),
    RoomsOfHotel(HotelId),
    Rooms,
    Room(HotelRoomKey),
    ReservationsOfRoom(HotelRoomKey),
    Reservations,
    Reservation(ReservationId),
    RoomTypes,
    BedTypes,
}

#[derive(Debug, Clone, Copy)]
enum RouteShape {
    Hotels,
    Hotel,
    RoomsOfHotel,
    Rooms,
    Room,
    ReservationsOfRoom,
    Reservations,
    Reservation,
    RoomTypes,
    BedTypes,
}

const ROUTE_PATTERNS: &[(RouteShape, &str)] = &[
    (RouteShape::Hotels, r"^/api/hotels$"),
    (RouteShape::Hotel, r"^/api/hotels/([^/]+)$"),
    (RouteShape::RoomsOfHotel, r"^/api/hotels/([^/]+)/rooms$"),
    (RouteShape::Rooms, r"^/api/hotel-rooms$"),
    (RouteShape::Room, r"^/api/hotel-rooms/([^/]+)/([^/]+)$"),
    (
        RouteShape::ReservationsOfRoom,
        r"^/api/hotel-rooms/([^/]+)/([^/]+)/reservations$",
    ),
    (RouteShape::Reservations, r"^/api/room-reservations$"),
    (RouteShape::Reservation, r"^/api/room-reservations/([^/]+)$"),
    (RouteShape::RoomTypes, r"^/api/room-types$"),
    (RouteShape::BedTypes, r"^/api/bed-types$"),
];

static ROUTES: Lazy<Vec<(RouteShape, Regex)>> = Lazy::new(|| {
    ROUTE_PATTERNS
        .iter()
        .map(|(shape, pattern)| (*shape, Regex::new(pattern).expect("valid route pattern")))
        .collect()
});

impl Route {
    fn parse(path: &str) -> Result<Self, ApiError> {
        let path = path.split('?').next().unwrap_or_default();
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };

        for (shape, regex) in ROUTES.iter() {
            if let Some(captures) = regex.captures(path) {
                return shape.build(&captures);
            }
        }
        Err(ApiError::RouteNotFound)
    }

    fn allowed_methods(self) -> &'static [Method] {
        match self {
            Self::Hotels | Self::Rooms | Self::Reservations => COLLECTION_METHODS,
            Self::Hotel(_) | Self::Room(_) | Self::Reservation(_) => ITEM_METHODS,
            Self::RoomsOfHotel(_)
            | Self::ReservationsOfRoom(_)
            | Self::RoomTypes
            | Self::BedTypes => READ_METHODS,
        }
    }

    /// Path template used in logs, free of caller-supplied values.
    fn template(self) -> &'static str {
        match self {
            Self::Hotels => "/api/hotels",
            Self::Hotel(_) => "/api/hotels/{id}",
            Self::RoomsOfHotel(_) => "/api/hotels/{id}/rooms",
            Self::Rooms => "/api/hotel-rooms",
            Self::Room(_) => "/api/hotel-rooms/{hotelId}/{roomNumber}",
            Self::ReservationsOfRoom(_) => "/api/hotel-rooms/{hotelId}/{roomNumber}/reservations",
            Self::Reservations => "/api/room-reservations",
            Self::Reservation(_) => "/api/room-reservations/{id}",
            Self::RoomTypes => "/api/room-types",
            Self::BedTypes => "/api/bed-types",
        }
    }
}

impl RouteShape {
    fn build(self, captures: &Captures<'_>) -> Result<Route, ApiError> {
        let key = |index: usize| parse_key(captures.get(index).map_or("", |m| m.as_str()));
        let room_key = || -> Result<HotelRoomKey, ApiError> {
            let hotel_id = key(1)?;
            let room_number = key(2)?;
            Ok(HotelRoomKey::new(room_number, hotel_id))
        };

        Ok(match self {
            Self::Hotels => Route::Hotels,
            Self::Hotel => Route::Hotel(key(1)?),
            Self::RoomsOfHotel => Route::RoomsOfHotel(key(1)?),
            Self::Rooms => Route::Rooms,
            Self::Room => Route::Room(room_key()?),
            Self::ReservationsOfRoom => Route::ReservationsOfRoom(room_key()?),
            Self::Reservations => Route::Reservations,
            Self::Reservation => Route::Reservation(key(1)?),
            Self::RoomTypes => Route::RoomTypes,
            Self::BedTypes => Route::BedTypes,
        })
    }
}

fn parse_key(segment: &str) -> Result<i64, ApiError> {
    segment
        .parse::<i64>()
        .map_err(|_| ApiError::MalformedKey(segment.to_string()))
}

/// Dispatches requests against the configured database.
pub struct Router {
    config: ApiConfig,
}

impl Router {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    /// Router over the process-wide environment config.
    pub fn from_env() -> Self {
        Self::new(ApiConfig::process().clone())
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Handles one request. Never panics on caller input.
    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let request_id = Uuid::new_v4();
        let started_at = Instant::now();

        let route = Route::parse(&request.path);
        let template = route.as_ref().map_or("unmatched", |route| route.template());
        let outcome = route.and_then(|route| self.dispatch(route, request));
        let duration_ms = started_at.elapsed().as_millis();
        let method = request.method.as_str();

        match outcome {
            Ok(response) => {
                info!(
                    "event=api_request module=api request_id={request_id} method={method} route={template} status={} duration_ms={duration_ms}",
                    response.status
                );
                response
            }
            Err(err) if err.is_fatal() => {
                error!(
                    "event=api_request module=api request_id={request_id} method={method} route={template} status={} duration_ms={duration_ms} error={err}",
                    err.status()
                );
                err.into_response()
            }
            Err(err) => {
                warn!(
                    "event=api_request module=api request_id={request_id} method={method} route={template} status={} error_kind={} duration_ms={duration_ms}",
                    err.status(),
                    err.label()
                );
                err.into_response()
            }
        }
    }

    fn dispatch(&self, route: Route, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let allowed = route.allowed_methods();
        if !allowed.contains(&request.method) {
            return Err(ApiError::MethodNotAllowed {
                method: request.method,
                allowed,
            });
        }

        let conn = self.open_connection()?;
        match route {
            Route::Hotels => collection(&hotels(&conn)?, request),
            Route::Hotel(id) => item(&hotels(&conn)?, id, request),
            Route::RoomsOfHotel(hotel_id) => {
                require_parent(&hotels(&conn)?, EntityKind::Hotel, hotel_id)?;
                let rooms = rooms(&conn)?;
                ApiResponse::json(200, &rooms.repo().list_for_hotel(hotel_id)?)
            }
            Route::Rooms => collection(&rooms(&conn)?, request),
            Route::Room(key) => item(&rooms(&conn)?, key, request),
            Route::ReservationsOfRoom(key) => {
                require_parent(&rooms(&conn)?, EntityKind::HotelRoom, key)?;
                let reservations = reservations(&conn)?;
                ApiResponse::json(200, &reservations.repo().list_for_room(key)?)
            }
            Route::Reservations => collection(&reservations(&conn)?, request),
            Route::Reservation(id) => item(&reservations(&conn)?, id, request),
            Route::RoomTypes => {
                ApiResponse::json(200, &SqliteLookupRepository::try_new(&conn)?.list_room_types()?)
            }
            Route::BedTypes => {
                ApiResponse::json(200, &SqliteLookupRepository::try_new(&conn)?.list_bed_types()?)
            }
        }
    }

    fn open_connection(&self) -> Result<Connection, ApiError> {
        Ok(open_db(&self.config.db_path)?)
    }
}

fn hotels(conn: &Connection) -> Result<EntityService<SqliteHotelRepository<'_>>, ApiError> {
    Ok(EntityService::new(SqliteHotelRepository::try_new(conn)?))
}

fn rooms(conn: &Connection) -> Result<EntityService<SqliteHotelRoomRepository<'_>>, ApiError> {
    Ok(EntityService::new(SqliteHotelRoomRepository::try_new(conn)?))
}

fn reservations(
    conn: &Connection,
) -> Result<EntityService<SqliteRoomReservationRepository<'_>>, ApiError> {
    Ok(EntityService::new(SqliteRoomReservationRepository::try_new(
        conn,
    )?))
}

fn require_parent<R: EntityRepository>(
    service: &EntityService<R>,
    entity: EntityKind,
    key: R::Key,
) -> Result<(), ApiError> {
    if service.exists(key)? {
        Ok(())
    } else {
        Err(RepoError::NotFound {
            entity,
            key: key.to_string(),
        }
        .into())
    }
}

fn collection<R>(service: &EntityService<R>, request: &ApiRequest) -> Result<ApiResponse, ApiError>
where
    R: EntityRepository,
    R::Entity: Serialize + DeserializeOwned,
{
    match request.method {
        Method::Get => ApiResponse::json(200, &service.list()?),
        Method::Post => {
            let entity = decode_entity::<R>(request)?;
            ApiResponse::json(201, &service.create(&entity)?)
        }
        method => Err(ApiError::MethodNotAllowed {
            method,
            allowed: COLLECTION_METHODS,
        }),
    }
}

fn item<R>(
    service: &EntityService<R>,
    key: R::Key,
    request: &ApiRequest,
) -> Result<ApiResponse, ApiError>
where
    R: EntityRepository,
    R::Entity: Serialize + DeserializeOwned,
{
    match request.method {
        Method::Get => ApiResponse::json(200, &service.get(key)?),
        Method::Put => {
            let entity = decode_entity::<R>(request)?;
            service.update(key, &entity)?;
            Ok(ApiResponse::no_content())
        }
        Method::Delete => ApiResponse::json(200, &service.delete(key)?),
        method => Err(ApiError::MethodNotAllowed {
            method,
            allowed: ITEM_METHODS,
        }),
    }
}

/// Decodes a request body into `R::Entity`.
///
/// Absent or null required fields are reported as validation failures
/// naming the wire field; any other shape error is a malformed body.
fn decode_entity<R>(request: &ApiRequest) -> Result<R::Entity, ApiError>
where
    R: EntityRepository,
    R::Entity: DeserializeOwned,
{
    let body = request
        .body
        .as_deref()
        .filter(|body| !body.trim().is_empty())
        .ok_or(ApiError::MissingBody)?;
    let document: Value = serde_json::from_str(body).map_err(ApiError::MalformedBody)?;
    if let Some(fields) = document.as_object() {
        schema_for(R::KIND)
            .validate_presence(|name| matches!(fields.get(name), Some(value) if !value.is_null()))
            .map_err(RepoError::Validation)?;
    }
    serde_json::from_value(document).map_err(ApiError::MalformedBody)
}
