//! Core use-case services.
//!
//! # Responsibility
//! - Expose entity CRUD to router layers through one generic entry point.
//! - Emit one `entity_<op>` log event per call with outcome and duration.
//!
//! # Invariants
//! - Services never bypass repository validation or the concurrency guard.
//! - Errors are returned unchanged; the service only observes them.

pub mod entity_service;

pub use entity_service::EntityService;
