//! Optimistic concurrency guard and atomic write helpers.
//!
//! # Responsibility
//! - Run every create/update/delete inside one immediate transaction.
//! - Turn storage-level signals (zero rows affected, constraint failures)
//!   into typed repository outcomes.
//!
//! # Invariants
//! - A versioned update that matches no row never commits; the existence
//!   check runs in the same transaction so it sees the same snapshot.
//! - No automatic retry. Retrying a `Conflict` is the caller's decision.
//! - A failed write leaves prior state unchanged (the transaction is rolled
//!   back on drop).

use crate::model::RowVersion;
use crate::repo::error::{ConflictReason, RepoError, RepoResult};
use crate::repo::existence::{find_missing_parent, record_exists, RecordKey};
use crate::schema::{EntityKind, SchemaRecord};
use rusqlite::ffi;
use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior};

/// Result of one versioned write at the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VersionedWrite {
    Committed,
    VersionMismatch,
}

impl VersionedWrite {
    fn from_changed_rows(changed: usize) -> RepoResult<Self> {
        match changed {
            0 => Ok(Self::VersionMismatch),
            1 => Ok(Self::Committed),
            other => Err(RepoError::InvalidData(format!(
                "versioned update touched {other} rows, expected at most one"
            ))),
        }
    }
}

/// Issues a versioned update and resolves a mismatch into `NotFound` or
/// `Conflict`.
///
/// `write` must return the number of rows affected by an
/// `UPDATE … WHERE <key> AND version = expected`.
pub(crate) fn guarded_update<R, K>(
    conn: &Connection,
    record: &R,
    key: &K,
    expected: RowVersion,
    write: impl FnOnce(&Connection) -> rusqlite::Result<usize>,
) -> RepoResult<()>
where
    R: SchemaRecord,
    K: RecordKey,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let outcome = match write(&tx) {
        Ok(changed) => VersionedWrite::from_changed_rows(changed)?,
        Err(err) => return Err(classify_write_error(&tx, record, None::<&K>, err)),
    };

    match outcome {
        VersionedWrite::Committed => {
            tx.commit()?;
            Ok(())
        }
        VersionedWrite::VersionMismatch => {
            if record_exists(&tx, R::KIND, key)? {
                Err(RepoError::Conflict {
                    entity: R::KIND,
                    key: key.to_string(),
                    reason: ConflictReason::StaleVersion { expected },
                })
            } else {
                Err(RepoError::not_found(R::KIND, key))
            }
        }
    }
}

/// Inserts `record` and returns what `write` produced, committing only on
/// success.
///
/// `caller_key` is set for entities whose key the caller chooses; a
/// constraint failure on an existing key is then reported as a
/// `Conflict` instead of a fatal error.
pub(crate) fn guarded_insert<R, K, T>(
    conn: &Connection,
    record: &R,
    caller_key: Option<&K>,
    write: impl FnOnce(&Connection) -> rusqlite::Result<T>,
) -> RepoResult<T>
where
    R: SchemaRecord,
    K: RecordKey,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let value = match write(&tx) {
        Ok(value) => value,
        Err(err) => return Err(classify_write_error(&tx, record, caller_key, err)),
    };
    tx.commit()?;
    Ok(value)
}

/// Fetches, deletes and returns the prior state of one row in a single
/// transaction. Cascades declared in the schema run inside the same
/// transaction.
pub(crate) fn guarded_delete<T, K>(
    conn: &Connection,
    kind: EntityKind,
    key: &K,
    fetch: impl FnOnce(&Connection) -> RepoResult<Option<T>>,
    delete: impl FnOnce(&Connection) -> rusqlite::Result<usize>,
) -> RepoResult<T>
where
    K: RecordKey,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let Some(prior) = fetch(&tx)? else {
        return Err(RepoError::not_found(kind, key));
    };
    let removed = delete(&tx)?;
    if removed != 1 {
        return Err(RepoError::InvalidData(format!(
            "delete of {kind} {key} removed {removed} rows"
        )));
    }
    tx.commit()?;
    Ok(prior)
}

fn classify_write_error<R, K>(
    conn: &Connection,
    record: &R,
    caller_key: Option<&K>,
    err: rusqlite::Error,
) -> RepoError
where
    R: SchemaRecord,
    K: RecordKey,
{
    let failure = match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            *failure
        }
        _ => return err.into(),
    };

    if failure.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
        return match find_missing_parent(conn, record) {
            Ok(relationship) => RepoError::MissingReference {
                entity: R::KIND,
                relationship: relationship.map(|relationship| relationship.name),
            },
            Err(lookup_err) => lookup_err,
        };
    }

    if let Some(key) = caller_key {
        match record_exists(conn, R::KIND, key) {
            Ok(true) => {
                return RepoError::Conflict {
                    entity: R::KIND,
                    key: key.to_string(),
                    reason: ConflictReason::DuplicateKey,
                }
            }
            Ok(false) => {}
            Err(lookup_err) => return lookup_err,
        }
    }

    err.into()
}
