//! Room reservation record.
//!
//! Reservations are not checked for overlapping date ranges.

use crate::model::hotel::HotelId;
use crate::model::hotel_room::{HotelRoomKey, RoomNumber};
use crate::model::RowVersion;
use crate::schema::{EntityKind, FieldValue, SchemaRecord};
use serde::{Deserialize, Serialize};

/// Server-generated reservation identifier.
pub type ReservationId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomReservation {
    /// Ignored on create; must equal the addressing key on update.
    #[serde(default)]
    pub reservation_id: ReservationId,
    pub hotel_id: HotelId,
    pub room_number: RoomNumber,
    /// Unix epoch milliseconds.
    pub start_date: i64,
    /// Unix epoch milliseconds.
    pub end_date: i64,
    #[serde(default)]
    pub version: RowVersion,
}

impl RoomReservation {
    /// Builds an unsaved reservation for `room`.
    pub fn new(room: HotelRoomKey, start_date: i64, end_date: i64) -> Self {
        Self {
            reservation_id: 0,
            hotel_id: room.hotel_id,
            room_number: room.room_number,
            start_date,
            end_date,
            version: 0,
        }
    }

    /// Key of the reserved room.
    pub fn room_key(&self) -> HotelRoomKey {
        HotelRoomKey::new(self.room_number, self.hotel_id)
    }
}

impl SchemaRecord for RoomReservation {
    const KIND: EntityKind = EntityKind::RoomReservation;

    fn field_value(&self, column: &str) -> Option<FieldValue<'_>> {
        match column {
            "reservation_id" => Some(FieldValue::Integer(self.reservation_id)),
            "hotel_id" => Some(FieldValue::Integer(self.hotel_id)),
            "room_number" => Some(FieldValue::Integer(self.room_number)),
            "start_date" => Some(FieldValue::Integer(self.start_date)),
            "end_date" => Some(FieldValue::Integer(self.end_date)),
            _ => None,
        }
    }
}
