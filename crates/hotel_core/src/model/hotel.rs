//! Hotel record.

use crate::model::RowVersion;
use crate::schema::{EntityKind, FieldValue, SchemaRecord};
use serde::{Deserialize, Serialize};

/// Server-generated hotel identifier.
pub type HotelId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    /// Ignored on create; must equal the addressing key on update.
    #[serde(default)]
    pub id: HotelId,
    pub name: String,
    pub address: String,
    pub phone_number: String,
    #[serde(default)]
    pub version: RowVersion,
}

impl Hotel {
    /// Builds an unsaved hotel. `id` and `version` are assigned on create.
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            address: address.into(),
            phone_number: phone_number.into(),
            version: 0,
        }
    }
}

impl SchemaRecord for Hotel {
    const KIND: EntityKind = EntityKind::Hotel;

    fn field_value(&self, column: &str) -> Option<FieldValue<'_>> {
        match column {
            "id" => Some(FieldValue::Integer(self.id)),
            "name" => Some(FieldValue::Text(&self.name)),
            "address" => Some(FieldValue::Text(&self.address)),
            "phone_number" => Some(FieldValue::Text(&self.phone_number)),
            _ => None,
        }
    }
}
