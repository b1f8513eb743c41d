//! Hotel domain model.
//!
//! # Responsibility
//! - Define the records persisted by the hotel core and their key types.
//! - Expose field values to the schema registry for validation.
//!
//! # Invariants
//! - Relationships are plain foreign-key fields; records never own or
//!   borrow each other.
//! - Every mutable record carries the `version` it was read at.

pub mod hotel;
pub mod hotel_room;
pub mod lookup;
pub mod room_reservation;

/// Optimistic concurrency token. Starts at 1 and grows by one per update.
pub type RowVersion = i64;

/// Version assigned to freshly inserted rows.
pub const INITIAL_VERSION: RowVersion = 1;
