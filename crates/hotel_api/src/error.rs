//! Router error type and its mapping to response status codes.
//!
//! # Invariants
//! - Every repository `ErrorKind` maps to exactly one status.
//! - Fatal details are logged, never echoed to the caller.

use crate::router::{ApiResponse, Method};
use hotel_core::{DbError, ErrorKind, RepoError};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

#[derive(Debug)]
pub enum ApiError {
    Repo(RepoError),
    /// Database could not be opened or migrated.
    Storage(DbError),
    MissingBody,
    MalformedBody(serde_json::Error),
    /// A path segment that should be an integer key is not one.
    MalformedKey(String),
    RouteNotFound,
    MethodNotAllowed {
        method: Method,
        allowed: &'static [Method],
    },
    Encode(serde_json::Error),
}

/// JSON error envelope returned for every non-2xx response.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'static str,
    message: &'a str,
    field: Option<&'static str>,
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            Self::Repo(err) => match err.kind() {
                ErrorKind::Validation | ErrorKind::KeyMismatch | ErrorKind::MissingReference => {
                    400
                }
                ErrorKind::NotFound => 404,
                ErrorKind::Conflict => 409,
                ErrorKind::Fatal => 500,
            },
            Self::MissingBody | Self::MalformedBody(_) | Self::MalformedKey(_) => 400,
            Self::RouteNotFound => 404,
            Self::MethodNotAllowed { .. } => 405,
            Self::Storage(_) | Self::Encode(_) => 500,
        }
    }

    /// Stable snake_case discriminant placed in the `error` field.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Repo(err) => err.kind().label(),
            Self::MissingBody | Self::MalformedBody(_) => "malformed_body",
            Self::MalformedKey(_) => "malformed_key",
            Self::RouteNotFound => "route_not_found",
            Self::MethodNotAllowed { .. } => "method_not_allowed",
            Self::Storage(_) | Self::Encode(_) => ErrorKind::Fatal.label(),
        }
    }

    /// Wire name of the offending field, for validation failures.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Repo(RepoError::Validation(err)) => Some(err.field),
            _ => None,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.status() >= 500
    }

    pub fn into_response(self) -> ApiResponse {
        let message = if self.is_fatal() {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        };
        let body = ErrorBody {
            error: self.label(),
            message: &message,
            field: self.field(),
        };
        match serde_json::to_value(&body) {
            Ok(value) => ApiResponse::new(self.status(), Some(value)),
            Err(_) => ApiResponse::new(500, None),
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::MissingBody => write!(f, "request body is required"),
            Self::MalformedBody(err) => write!(f, "malformed request body: {err}"),
            Self::MalformedKey(segment) => write!(f, "`{segment}` is not a valid key"),
            Self::RouteNotFound => write!(f, "no such route"),
            Self::MethodNotAllowed { method, allowed } => {
                let allowed: Vec<_> = allowed.iter().map(|method| method.as_str()).collect();
                write!(
                    f,
                    "method {} not allowed here; expected one of {}",
                    method.as_str(),
                    allowed.join(", ")
                )
            }
            Self::Encode(err) => write!(f, "failed to encode response: {err}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::MalformedBody(err) | Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use hotel_core::{
        ConflictReason, EntityKind, RepoError, ValidationError, ValidationFailure,
    };

    #[test]
    fn repository_kinds_map_to_statuses() {
        let conflict = ApiError::from(RepoError::Conflict {
            entity: EntityKind::HotelRoom,
            key: "room 1 of hotel 1".to_string(),
            reason: ConflictReason::DuplicateKey,
        });
        assert_eq!(conflict.status(), 409);

        let missing = ApiError::from(RepoError::NotFound {
            entity: EntityKind::Hotel,
            key: "3".to_string(),
        });
        assert_eq!(missing.status(), 404);

        let reference = ApiError::from(RepoError::MissingReference {
            entity: EntityKind::HotelRoom,
            relationship: None,
        });
        assert_eq!(reference.status(), 400);

        assert_eq!(ApiError::from(RepoError::InvalidData("x".into())).status(), 500);
    }

    #[test]
    fn validation_body_names_the_field() {
        let response = ApiError::from(RepoError::Validation(ValidationError {
            entity: EntityKind::Hotel,
            field: "phoneNumber",
            reason: ValidationFailure::TooLong {
                max: 100,
                actual: 120,
            },
        }))
        .into_response();

        assert_eq!(response.status, 400);
        let body = response.body.unwrap();
        assert_eq!(body["error"], "validation");
        assert_eq!(body["field"], "phoneNumber");
    }

    #[test]
    fn fatal_body_hides_details() {
        let response = ApiError::from(RepoError::InvalidData("row 7 is corrupt".into()))
            .into_response();
        assert_eq!(response.status, 500);
        let body = response.body.unwrap();
        assert_eq!(body["error"], "fatal");
        assert_eq!(body["message"], "internal server error");
        assert!(body["field"].is_null());
    }
}
