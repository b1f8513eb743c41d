//! Generic CRUD service over any [`EntityRepository`].

use crate::repo::{EntityRepository, ErrorKind, RepoResult};
use log::{error, info, warn};
use std::time::Instant;

/// Use-case wrapper that logs every repository call.
pub struct EntityService<R: EntityRepository> {
    repo: R,
}

impl<R: EntityRepository> EntityService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrows the repository for entity-specific queries.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn list(&self) -> RepoResult<Vec<R::Entity>> {
        observe::<R, _>("list", || self.repo.list())
    }

    pub fn get(&self, key: R::Key) -> RepoResult<R::Entity> {
        observe::<R, _>("get", || self.repo.get(key))
    }

    pub fn exists(&self, key: R::Key) -> RepoResult<bool> {
        observe::<R, _>("exists", || self.repo.exists(key))
    }

    /// Creates a record; the returned entity carries the stored key and
    /// version.
    pub fn create(&self, entity: &R::Entity) -> RepoResult<R::Entity> {
        observe::<R, _>("create", || self.repo.create(entity))
    }

    /// Replaces the record at `key`.
    ///
    /// `entity.version` must be the version the caller last observed.
    pub fn update(&self, key: R::Key, entity: &R::Entity) -> RepoResult<()> {
        observe::<R, _>("update", || self.repo.update(key, entity))
    }

    pub fn delete(&self, key: R::Key) -> RepoResult<R::Entity> {
        observe::<R, _>("delete", || self.repo.delete(key))
    }
}

fn observe<R: EntityRepository, T>(
    op: &'static str,
    call: impl FnOnce() -> RepoResult<T>,
) -> RepoResult<T> {
    let started_at = Instant::now();
    let result = call();
    let duration_ms = started_at.elapsed().as_millis();
    let entity = R::KIND;

    match &result {
        Ok(_) => info!(
            "event=entity_{op} module=service entity={entity} status=ok duration_ms={duration_ms}"
        ),
        Err(err) if err.kind() == ErrorKind::Fatal => error!(
            "event=entity_{op} module=service entity={entity} status=error error_kind=fatal duration_ms={duration_ms} error={err}"
        ),
        Err(err) => warn!(
            "event=entity_{op} module=service entity={entity} status=rejected error_kind={} duration_ms={duration_ms}",
            err.kind().label()
        ),
    }

    result
}
