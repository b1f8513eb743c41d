//! Hotel room record and its composite key.
//!
//! Room numbers are only unique within one hotel, so a room is addressed by
//! `(room_number, hotel_id)` and the caller chooses both parts.

use crate::model::hotel::HotelId;
use crate::model::lookup::{BedTypeId, RoomTypeId};
use crate::model::RowVersion;
use crate::schema::{EntityKind, FieldValue, SchemaRecord};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type RoomNumber = i64;

/// Composite primary key of a hotel room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelRoomKey {
    pub room_number: RoomNumber,
    pub hotel_id: HotelId,
}

impl HotelRoomKey {
    pub fn new(room_number: RoomNumber, hotel_id: HotelId) -> Self {
        Self {
            room_number,
            hotel_id,
        }
    }
}

impl Display for HotelRoomKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "room {} of hotel {}", self.room_number, self.hotel_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelRoom {
    pub room_number: RoomNumber,
    pub hotel_id: HotelId,
    pub nightly_rate: f64,
    pub number_of_beds: i64,
    pub room_type_id: RoomTypeId,
    pub bed_type_id: BedTypeId,
    #[serde(default)]
    pub version: RowVersion,
}

impl HotelRoom {
    pub fn key(&self) -> HotelRoomKey {
        HotelRoomKey::new(self.room_number, self.hotel_id)
    }
}

impl SchemaRecord for HotelRoom {
    const KIND: EntityKind = EntityKind::HotelRoom;

    fn field_value(&self, column: &str) -> Option<FieldValue<'_>> {
        match column {
            "room_number" => Some(FieldValue::Integer(self.room_number)),
            "hotel_id" => Some(FieldValue::Integer(self.hotel_id)),
            "nightly_rate" => Some(FieldValue::Real(self.nightly_rate)),
            "number_of_beds" => Some(FieldValue::Integer(self.number_of_beds)),
            "room_type_id" => Some(FieldValue::Integer(self.room_type_id)),
            "bed_type_id" => Some(FieldValue::Integer(self.bed_type_id)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HotelRoom, HotelRoomKey};

    #[test]
    fn wire_format_is_camel_case_and_version_defaults() {
        let room: HotelRoom = serde_json::from_str(
            r#"{"roomNumber":101,"hotelId":1,"nightlyRate":99.5,"numberOfBeds":2,"roomTypeId":1,"bedTypeId":3}"#,
        )
        .unwrap();
        assert_eq!(room.key(), HotelRoomKey::new(101, 1));
        assert_eq!(room.bed_type_id, 3);
        assert_eq!(room.version, 0);

        let value = serde_json::to_value(&room).unwrap();
        assert_eq!(value["nightlyRate"], 99.5);
        assert!(value.get("nightly_rate").is_none());
    }

    #[test]
    fn key_display_names_both_parts() {
        assert_eq!(HotelRoomKey::new(7, 2).to_string(), "room 7 of hotel 2");
    }
}
