//! Repository contract
//!
//! Reads go straight to the store. Mutations are staged and only reach the
//! store when [`Repository::save_changes`] runs.

use async_trait::async_trait;
use domain::{Entity, PaginatedResult, Projection, Specification};

use crate::error::ApplicationError;

/// Generic data access over one entity type within one tenant
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// All rows matching `spec`, in its order
    async fn list(&self, spec: Option<&Specification<T>>) -> Result<Vec<T>, ApplicationError>;

    /// Like [`list`](Self::list), projecting each row as it is read
    async fn list_projected<O: Projection<T>>(
        &self,
        spec: Option<&Specification<T>>,
    ) -> Result<Vec<O>, ApplicationError>;

    /// First row with this identifier that also satisfies `spec`
    async fn get_by_id(
        &self,
        id: &T::Id,
        spec: Option<&Specification<T>>,
    ) -> Result<T, ApplicationError>;

    async fn get_by_id_projected<O: Projection<T>>(
        &self,
        id: &T::Id,
        spec: Option<&Specification<T>>,
    ) -> Result<O, ApplicationError>;

    async fn exists(&self, spec: Option<&Specification<T>>) -> Result<bool, ApplicationError>;

    async fn count(&self, spec: Option<&Specification<T>>) -> Result<u64, ApplicationError>;

    /// Stage an insert; no uniqueness check is made
    async fn create(&self, entity: T) -> Result<T, ApplicationError>;

    /// Stage inserts, returning identifiers in input order
    async fn create_range(&self, entities: Vec<T>) -> Result<Vec<T::Id>, ApplicationError>;

    /// Stage a full replace of the stored row
    async fn update(&self, entity: T) -> Result<T, ApplicationError>;

    /// Stage removal of the stored row, returning it
    async fn remove_by_id(&self, id: &T::Id) -> Result<T, ApplicationError>;

    /// One page of projected rows plus totals
    ///
    /// `page` is 1-based. Bounds are validated by the caller.
    async fn get_paginated<O: Projection<T>>(
        &self,
        page: u32,
        page_size: u32,
        spec: Option<&Specification<T>>,
    ) -> Result<PaginatedResult<O>, ApplicationError>;

    /// Commit every staged change atomically
    async fn save_changes(&self) -> Result<u64, ApplicationError>;
}
