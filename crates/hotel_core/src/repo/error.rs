//! Repository error taxonomy.
//!
//! # Invariants
//! - `Validation`, `KeyMismatch`, `MissingReference` and `NotFound` mean
//!   nothing was written.
//! - `Conflict` means a concurrent writer got there first; the committed
//!   state is whatever that writer left.
//! - Every other variant is fatal for the current request.

use crate::db::DbError;
use crate::model::RowVersion;
use crate::schema::{EntityKind, ValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Why a write was rejected as a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// Caller-supplied key already exists.
    DuplicateKey,
    /// Row changed since the caller read it at `expected`.
    StaleVersion { expected: RowVersion },
}

/// Coarse discriminant callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    KeyMismatch,
    NotFound,
    Conflict,
    MissingReference,
    Fatal,
}

impl ErrorKind {
    /// Stable snake_case label for logs and payloads.
    pub fn label(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::KeyMismatch => "key_mismatch",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::MissingReference => "missing_reference",
            Self::Fatal => "fatal",
        }
    }
}

#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    /// Addressing key and the key embedded in the body disagree.
    KeyMismatch {
        entity: EntityKind,
        addressed: String,
        supplied: String,
    },
    NotFound {
        entity: EntityKind,
        key: String,
    },
    Conflict {
        entity: EntityKind,
        key: String,
        reason: ConflictReason,
    },
    /// A foreign key points at a row that does not exist.
    MissingReference {
        entity: EntityKind,
        /// Relationship name from the schema registry, when it could be
        /// identified.
        relationship: Option<&'static str>,
    },
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::KeyMismatch { .. } => ErrorKind::KeyMismatch,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::MissingReference { .. } => ErrorKind::MissingReference,
            Self::Db(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => ErrorKind::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Fatal
    }

    pub(crate) fn not_found(entity: EntityKind, key: impl Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::KeyMismatch {
                entity,
                addressed,
                supplied,
            } => write!(
                f,
                "{entity} key mismatch: addressed {addressed}, body carries {supplied}"
            ),
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::Conflict {
                entity,
                key,
                reason: ConflictReason::DuplicateKey,
            } => write!(f, "{entity} already exists: {key}"),
            Self::Conflict {
                entity,
                key,
                reason: ConflictReason::StaleVersion { expected },
            } => write!(
                f,
                "{entity} {key} was modified concurrently (expected version {expected})"
            ),
            Self::MissingReference {
                entity,
                relationship: Some(relationship),
            } => write!(f, "{entity} references a missing row via {relationship}"),
            Self::MissingReference {
                entity,
                relationship: None,
            } => write!(f, "{entity} references a missing row"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted hotel data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "hotel repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "hotel repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "hotel repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
