//! Request router collaborator for the hotel core.
//!
//! # Responsibility
//! - Turn `(method, path, body)` requests into entity service calls.
//! - Map typed core results to status codes and JSON bodies.
//!
//! # Invariants
//! - Exported functions never panic on caller input.
//! - One fresh database connection per request; nothing is shared across
//!   requests except configuration.

pub mod config;
pub mod error;
pub mod router;

pub use config::ApiConfig;
pub use error::ApiError;
pub use router::{ApiRequest, ApiResponse, Method, Router};

/// Health-check passthrough to the core.
pub fn ping() -> &'static str {
    hotel_core::ping()
}

pub fn core_version() -> &'static str {
    hotel_core::core_version()
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
