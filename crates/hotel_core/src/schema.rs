//! Schema registry for hotel entities.
//!
//! # Responsibility
//! - Declare key shape, required fields, length limits and numeric floors
//!   for every entity in one static table.
//! - Declare delete behavior for every foreign-key relationship.
//! - Validate records against those declarations before any storage call.
//!
//! # Invariants
//! - Read-only after startup: everything here is `'static` data.
//! - Column names match `db/migrations/0001_init.sql`.
//! - `primary_key()` order matches the SQL primary key order.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Every table known to the hotel core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Hotel,
    HotelRoom,
    RoomReservation,
    RoomType,
    BedType,
}

impl EntityKind {
    /// Stable lowercase label used in logs and error payloads.
    pub fn label(self) -> &'static str {
        match self {
            Self::Hotel => "hotel",
            Self::HotelRoom => "hotel_room",
            Self::RoomReservation => "room_reservation",
            Self::RoomType => "room_type",
            Self::BedType => "bed_type",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What happens to child rows when the parent row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteBehavior {
    /// Child rows are deleted in the same transaction.
    Cascade,
    /// Parent delete fails while any child row references it.
    Restrict,
}

/// Who assigns the primary key on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyGeneration {
    /// Storage engine assigns the key; supplied values are ignored.
    Server,
    /// Caller supplies the key; duplicates are conflicts.
    Caller,
}

/// Declared constraints for one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSchema {
    /// SQL column name.
    pub column: &'static str,
    /// Wire (JSON) field name, reported back in validation errors.
    pub wire_name: &'static str,
    pub required: bool,
    /// Maximum length in characters for text columns.
    pub max_length: Option<usize>,
    /// Inclusive lower bound for numeric columns.
    pub min_value: Option<f64>,
}

impl FieldSchema {
    const fn required(column: &'static str, wire_name: &'static str) -> Self {
        Self {
            column,
            wire_name,
            required: true,
            max_length: None,
            min_value: None,
        }
    }

    const fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    const fn min_value(mut self, min: f64) -> Self {
        self.min_value = Some(min);
        self
    }
}

/// Declared shape of one table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub table: &'static str,
    primary_key: &'static [&'static str],
    pub key_generation: KeyGeneration,
    /// Optimistic concurrency column, absent for read-only lookups.
    pub version_column: Option<&'static str>,
    fields: &'static [FieldSchema],
}

impl EntitySchema {
    /// Primary key columns in declaration order.
    pub fn primary_key(&self) -> &'static [&'static str] {
        self.primary_key
    }

    /// All declared fields, key columns included.
    pub fn fields(&self) -> &'static [FieldSchema] {
        self.fields
    }

    /// Columns a caller must provide on create.
    ///
    /// Server-generated key columns are excluded.
    pub fn required_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|field| field.required && !self.is_generated_key(field.column))
            .map(|field| field.column)
            .collect()
    }

    pub fn field(&self, column: &str) -> Option<&'static FieldSchema> {
        self.fields.iter().find(|field| field.column == column)
    }

    pub fn max_length(&self, column: &str) -> Option<usize> {
        self.field(column).and_then(|field| field.max_length)
    }

    pub fn min_value(&self, column: &str) -> Option<f64> {
        self.field(column).and_then(|field| field.min_value)
    }

    /// Columns a repository must find on the live table, version included.
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns: Vec<_> = self.fields.iter().map(|field| field.column).collect();
        columns.extend(self.version_column);
        columns
    }

    fn is_generated_key(&self, column: &str) -> bool {
        self.key_generation == KeyGeneration::Server && self.primary_key.contains(&column)
    }

    /// Checks `record` against every declared field constraint.
    ///
    /// Server-generated key columns are skipped: their supplied value is
    /// ignored on create and checked against the addressing key on update.
    pub fn validate<R: SchemaRecord>(&self, record: &R) -> Result<(), ValidationError> {
        for field in self.fields {
            if self.is_generated_key(field.column) {
                continue;
            }
            let failure = match record.field_value(field.column) {
                None if field.required => Some(ValidationFailure::Missing),
                None => None,
                Some(FieldValue::Text(value)) => check_text(field, value),
                Some(FieldValue::Integer(value)) => check_number(field, value as f64),
                Some(FieldValue::Real(value)) => check_number(field, value),
            };
            if let Some(reason) = failure {
                return Err(ValidationError {
                    entity: self.kind,
                    field: field.wire_name,
                    reason,
                });
            }
        }
        Ok(())
    }

    /// Checks that a wire document carries every required field a caller
    /// must supply, before it is decoded into a record.
    ///
    /// `is_present` receives wire field names and should treat explicit
    /// nulls as absent.
    pub fn validate_presence(
        &self,
        is_present: impl Fn(&str) -> bool,
    ) -> Result<(), ValidationError> {
        let missing = self
            .fields
            .iter()
            .filter(|field| field.required && !self.is_generated_key(field.column))
            .find(|field| !is_present(field.wire_name));
        match missing {
            Some(field) => Err(ValidationError {
                entity: self.kind,
                field: field.wire_name,
                reason: ValidationFailure::Missing,
            }),
            None => Ok(()),
        }
    }
}

fn check_text(field: &FieldSchema, value: &str) -> Option<ValidationFailure> {
    if field.required && value.trim().is_empty() {
        return Some(ValidationFailure::Missing);
    }
    let length = value.chars().count();
    match field.max_length {
        Some(max) if length > max => Some(ValidationFailure::TooLong {
            max,
            actual: length,
        }),
        _ => None,
    }
}

fn check_number(field: &FieldSchema, value: f64) -> Option<ValidationFailure> {
    if !value.is_finite() {
        return Some(ValidationFailure::NotFinite);
    }
    match field.min_value {
        Some(min) if value < min => Some(ValidationFailure::BelowMinimum { min }),
        _ => None,
    }
}

/// Declared foreign-key relationship between two tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipSchema {
    /// Stable relationship name, e.g. `hotel_rooms_hotel`.
    pub name: &'static str,
    pub parent: EntityKind,
    pub child: EntityKind,
    /// Foreign key columns on the child table.
    pub columns: &'static [&'static str],
    /// Referenced columns on the parent table, positionally paired with
    /// `columns`.
    pub parent_columns: &'static [&'static str],
    pub on_delete: DeleteBehavior,
}

/// Value view a record exposes to the registry validator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Integer(i64),
    Real(f64),
}

/// Implemented by every record that is validated against the registry.
pub trait SchemaRecord {
    const KIND: EntityKind;

    /// Returns the value for `column`, or `None` when the record does not
    /// carry it.
    fn field_value(&self, column: &str) -> Option<FieldValue<'_>>;

    fn schema() -> &'static EntitySchema {
        schema_for(Self::KIND)
    }
}

/// Why a field failed validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValidationFailure {
    Missing,
    TooLong { max: usize, actual: usize },
    BelowMinimum { min: f64 },
    NotFinite,
}

/// Record violates a registry constraint. Raised before any storage call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationError {
    pub entity: EntityKind,
    /// Wire field name of the offending field.
    pub field: &'static str,
    pub reason: ValidationFailure,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let entity = self.entity;
        let field = self.field;
        match self.reason {
            ValidationFailure::Missing => write!(f, "{entity}.{field} is required"),
            ValidationFailure::TooLong { max, actual } => write!(
                f,
                "{entity}.{field} must be at most {max} characters, got {actual}"
            ),
            ValidationFailure::BelowMinimum { min } => {
                write!(f, "{entity}.{field} must be at least {min}")
            }
            ValidationFailure::NotFinite => write!(f, "{entity}.{field} must be a finite number"),
        }
    }
}

impl Error for ValidationError {}

const HOTEL_FIELDS: &[FieldSchema] = &[
    FieldSchema::required("id", "id"),
    FieldSchema::required("name", "name").max_length(100),
    FieldSchema::required("address", "address").max_length(200),
    FieldSchema::required("phone_number", "phoneNumber").max_length(100),
];

const HOTEL_ROOM_FIELDS: &[FieldSchema] = &[
    FieldSchema::required("room_number", "roomNumber"),
    FieldSchema::required("hotel_id", "hotelId"),
    FieldSchema::required("nightly_rate", "nightlyRate").min_value(0.0),
    FieldSchema::required("number_of_beds", "numberOfBeds").min_value(1.0),
    FieldSchema::required("room_type_id", "roomTypeId"),
    FieldSchema::required("bed_type_id", "bedTypeId"),
];

const ROOM_RESERVATION_FIELDS: &[FieldSchema] = &[
    FieldSchema::required("reservation_id", "reservationId"),
    FieldSchema::required("hotel_id", "hotelId"),
    FieldSchema::required("room_number", "roomNumber"),
    FieldSchema::required("start_date", "startDate"),
    FieldSchema::required("end_date", "endDate"),
];

const LOOKUP_FIELDS: &[FieldSchema] = &[
    FieldSchema::required("id", "id"),
    FieldSchema::required("name", "name"),
];

static HOTEL: EntitySchema = EntitySchema {
    kind: EntityKind::Hotel,
    table: "hotels",
    primary_key: &["id"],
    key_generation: KeyGeneration::Server,
    version_column: Some("version"),
    fields: HOTEL_FIELDS,
};

static HOTEL_ROOM: EntitySchema = EntitySchema {
    kind: EntityKind::HotelRoom,
    table: "hotel_rooms",
    primary_key: &["room_number", "hotel_id"],
    key_generation: KeyGeneration::Caller,
    version_column: Some("version"),
    fields: HOTEL_ROOM_FIELDS,
};

static ROOM_RESERVATION: EntitySchema = EntitySchema {
    kind: EntityKind::RoomReservation,
    table: "room_reservations",
    primary_key: &["reservation_id"],
    key_generation: KeyGeneration::Server,
    version_column: Some("version"),
    fields: ROOM_RESERVATION_FIELDS,
};

static ROOM_TYPE: EntitySchema = EntitySchema {
    kind: EntityKind::RoomType,
    table: "room_types",
    primary_key: &["id", "name"],
    key_generation: KeyGeneration::Server,
    version_column: None,
    fields: LOOKUP_FIELDS,
};

static BED_TYPE: EntitySchema = EntitySchema {
    kind: EntityKind::BedType,
    table: "bed_types",
    primary_key: &["id", "name"],
    key_generation: KeyGeneration::Server,
    version_column: None,
    fields: LOOKUP_FIELDS,
};

const RELATIONSHIPS: &[RelationshipSchema] = &[
    RelationshipSchema {
        name: "hotel_rooms_hotel",
        parent: EntityKind::Hotel,
        child: EntityKind::HotelRoom,
        columns: &["hotel_id"],
        parent_columns: &["id"],
        on_delete: DeleteBehavior::Cascade,
    },
    RelationshipSchema {
        name: "room_reservations_hotel_room",
        parent: EntityKind::HotelRoom,
        child: EntityKind::RoomReservation,
        columns: &["room_number", "hotel_id"],
        parent_columns: &["room_number", "hotel_id"],
        on_delete: DeleteBehavior::Cascade,
    },
    RelationshipSchema {
        name: "hotel_rooms_room_type",
        parent: EntityKind::RoomType,
        child: EntityKind::HotelRoom,
        columns: &["room_type_id"],
        parent_columns: &["id"],
        on_delete: DeleteBehavior::Restrict,
    },
    RelationshipSchema {
        name: "hotel_rooms_bed_type",
        parent: EntityKind::BedType,
        child: EntityKind::HotelRoom,
        columns: &["bed_type_id"],
        parent_columns: &["id"],
        on_delete: DeleteBehavior::Restrict,
    },
];

/// Returns the declared schema for `kind`.
pub fn schema_for(kind: EntityKind) -> &'static EntitySchema {
    match kind {
        EntityKind::Hotel => &HOTEL,
        EntityKind::HotelRoom => &HOTEL_ROOM,
        EntityKind::RoomReservation => &ROOM_RESERVATION,
        EntityKind::RoomType => &ROOM_TYPE,
        EntityKind::BedType => &BED_TYPE,
    }
}

pub fn relationship(name: &str) -> Option<&'static RelationshipSchema> {
    RELATIONSHIPS.iter().find(|relationship| relationship.name == name)
}

/// Delete behavior for a named relationship.
pub fn delete_behavior(name: &str) -> Option<DeleteBehavior> {
    relationship(name).map(|relationship| relationship.on_delete)
}

/// Relationships in which `child` holds the foreign key.
pub fn parents_of(child: EntityKind) -> impl Iterator<Item = &'static RelationshipSchema> {
    RELATIONSHIPS
        .iter()
        .filter(move |relationship| relationship.child == child)
}

/// Entity kinds whose rows disappear together with a `parent` row,
/// following cascade relationships transitively.
pub fn cascade_closure(parent: EntityKind) -> Vec<EntityKind> {
    let mut reached = Vec::new();
    let mut pending = vec![parent];
    while let Some(current) = pending.pop() {
        for relationship in RELATIONSHIPS {
            if relationship.parent == current
                && relationship.on_delete == DeleteBehavior::Cascade
                && !reached.contains(&relationship.child)
            {
                reached.push(relationship.child);
                pending.push(relationship.child);
            }
        }
    }
    reached
}
