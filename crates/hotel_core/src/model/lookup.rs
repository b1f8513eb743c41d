//! Read-only lookup records referenced by hotel rooms.

use serde::{Deserialize, Serialize};

pub type RoomTypeId = i64;
pub type BedTypeId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomType {
    pub id: RoomTypeId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedType {
    pub id: BedTypeId,
    pub name: String,
}
