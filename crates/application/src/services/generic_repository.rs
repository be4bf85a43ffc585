//! Generic repository over an [`EntityStore`]
//!
//! One instance serves one request for one tenant. It owns the staged change
//! set and the tracked baselines used to detect no-op updates; neither is
//! shared across requests. Commits are serialized per instance, so each
//! staged change is handed to the store at most once.

use std::{collections::HashMap, fmt, sync::Arc};

use async_trait::async_trait;
use domain::{
    DomainError, Entity, PaginatedResult, Projection, Specification, TenantContext,
    pagination::page_offset,
};
use futures::TryStreamExt;
use parking_lot::Mutex;
use tokio::sync::Mutex as CommitLock;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{ChangeSet, EntityStore, Repository, StagedChange},
    query::{EntityQuery, SpecificationEvaluator},
};

/// Repository for entities of type `T` within one tenant
pub struct GenericRepository<T: Entity> {
    store: Arc<dyn EntityStore<T>>,
    tenant: TenantContext,
    pending: Mutex<ChangeSet<T>>,
    tracked: Mutex<HashMap<T::Id, T>>,
    commit_lock: CommitLock<()>,
}

impl<T: Entity> fmt::Debug for GenericRepository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericRepository")
            .field("entity", &T::ENTITY_NAME)
            .field("tenant", &self.tenant)
            .field("pending", &self.pending.lock().len())
            .finish_non_exhaustive()
    }
}

impl<T: Entity> GenericRepository<T> {
    /// Create a repository over a store already bound to `tenant`
    pub fn new(store: Arc<dyn EntityStore<T>>, tenant: TenantContext) -> Self {
        Self {
            store,
            tenant,
            pending: Mutex::new(ChangeSet::new()),
            tracked: Mutex::new(HashMap::new()),
            commit_lock: CommitLock::new(()),
        }
    }

    pub const fn tenant(&self) -> &TenantContext {
        &self.tenant
    }

    /// Number of staged, uncommitted changes
    pub fn pending_changes(&self) -> usize {
        self.pending.lock().len()
    }

    fn stage(&self, change: StagedChange<T>) {
        debug!(kind = change.kind(), id = %change.id(), "Staged change");
        self.pending.lock().push(change);
    }

    fn track(&self, rows: &[T]) {
        let mut tracked = self.tracked.lock();
        for row in rows {
            tracked.insert(row.id().clone(), row.clone());
        }
    }

    fn not_found(id: &T::Id) -> ApplicationError {
        DomainError::not_found(T::ENTITY_NAME, id.to_string()).into()
    }

    fn by_id(id: &T::Id, spec: Option<&Specification<T>>) -> EntityQuery<T> {
        SpecificationEvaluator::apply(EntityQuery::new(), spec)
            .with_id(id.clone())
            .take(1)
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for GenericRepository<T> {
    #[instrument(skip(self, spec), fields(tenant_id = %self.tenant.tenant_id(), entity = T::ENTITY_NAME))]
    async fn list(&self, spec: Option<&Specification<T>>) -> Result<Vec<T>, ApplicationError> {
        let query = SpecificationEvaluator::apply(EntityQuery::new(), spec);
        let rows = self.store.fetch(&query).await?;
        self.track(&rows);
        debug!(rows = rows.len(), "Listed entities");
        Ok(rows)
    }

    #[instrument(skip(self, spec), fields(tenant_id = %self.tenant.tenant_id(), entity = T::ENTITY_NAME))]
    async fn list_projected<O: Projection<T>>(
        &self,
        spec: Option<&Specification<T>>,
    ) -> Result<Vec<O>, ApplicationError> {
        let query = SpecificationEvaluator::apply_for_projection(EntityQuery::new(), spec);
        self.store
            .stream(&query)
            .map_ok(|row| O::project(&row))
            .try_collect()
            .await
    }

    #[instrument(skip(self, spec), fields(tenant_id = %self.tenant.tenant_id(), entity = T::ENTITY_NAME))]
    async fn get_by_id(
        &self,
        id: &T::Id,
        spec: Option<&Specification<T>>,
    ) -> Result<T, ApplicationError> {
        let query = Self::by_id(id, spec);
        let row = self
            .store
            .fetch(&query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Self::not_found(id))?;
        self.track(std::slice::from_ref(&row));
        Ok(row)
    }

    #[instrument(skip(self, spec), fields(tenant_id = %self.tenant.tenant_id(), entity = T::ENTITY_NAME))]
    async fn get_by_id_projected<O: Projection<T>>(
        &self,
        id: &T::Id,
        spec: Option<&Specification<T>>,
    ) -> Result<O, ApplicationError> {
        let query = SpecificationEvaluator::apply_for_projection(EntityQuery::new(), spec)
            .with_id(id.clone())
            .take(1);
        self.store
            .stream(&query)
            .map_ok(|row| O::project(&row))
            .try_next()
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn exists(&self, spec: Option<&Specification<T>>) -> Result<bool, ApplicationError> {
        let query = SpecificationEvaluator::apply_for_projection(EntityQuery::new(), spec);
        self.store.any(&query).await
    }

    async fn count(&self, spec: Option<&Specification<T>>) -> Result<u64, ApplicationError> {
        let query = SpecificationEvaluator::apply_for_projection(EntityQuery::new(), spec);
        self.store.count(&query).await
    }

    async fn create(&self, entity: T) -> Result<T, ApplicationError> {
        self.stage(StagedChange::Insert(entity.clone()));
        Ok(entity)
    }

    async fn create_range(&self, entities: Vec<T>) -> Result<Vec<T::Id>, ApplicationError> {
        let ids = entities.iter().map(|e| e.id().clone()).collect();
        let mut pending = self.pending.lock();
        for entity in entities {
            pending.push(StagedChange::Insert(entity));
        }
        Ok(ids)
    }

    #[instrument(skip(self, entity), fields(tenant_id = %self.tenant.tenant_id(), entity = T::ENTITY_NAME, id = %entity.id()))]
    async fn update(&self, entity: T) -> Result<T, ApplicationError> {
        let nothing_to_update =
            || ApplicationError::from(DomainError::nothing_to_update(T::ENTITY_NAME, entity.id().to_string()));

        let baseline = self.tracked.lock().get(entity.id()).cloned();
        if baseline.as_ref() == Some(&entity) {
            return Err(nothing_to_update());
        }

        let stored = self
            .store
            .find(entity.id())
            .await?
            .ok_or_else(|| Self::not_found(entity.id()))?;
        if baseline.is_none() && stored == entity {
            return Err(nothing_to_update());
        }

        self.stage(StagedChange::Update(entity.clone()));
        Ok(entity)
    }

    #[instrument(skip(self), fields(tenant_id = %self.tenant.tenant_id(), entity = T::ENTITY_NAME))]
    async fn remove_by_id(&self, id: &T::Id) -> Result<T, ApplicationError> {
        let stored = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        self.stage(StagedChange::Remove(stored.clone()));
        Ok(stored)
    }

    #[instrument(skip(self, spec), fields(tenant_id = %self.tenant.tenant_id(), entity = T::ENTITY_NAME))]
    async fn get_paginated<O: Projection<T>>(
        &self,
        page: u32,
        page_size: u32,
        spec: Option<&Specification<T>>,
    ) -> Result<PaginatedResult<O>, ApplicationError> {
        let query = SpecificationEvaluator::apply_for_projection(EntityQuery::new(), spec);

        let total_count = self
            .store
            .count(&query)
            .await
            .map_err(|e| ApplicationError::pagination(page, page_size, e))?;

        let paged = query
            .skip(page_offset(page, page_size))
            .take(u64::from(page_size));
        let data: Vec<O> = self
            .store
            .stream(&paged)
            .map_ok(|row| O::project(&row))
            .try_collect()
            .await
            .map_err(|e| ApplicationError::pagination(page, page_size, e))?;

        debug!(page, page_size, total_count, rows = data.len(), "Loaded page");
        Ok(PaginatedResult::new(data, total_count, page, page_size))
    }

    #[instrument(skip(self), fields(tenant_id = %self.tenant.tenant_id(), entity = T::ENTITY_NAME))]
    async fn save_changes(&self) -> Result<u64, ApplicationError> {
        let _commit = self.commit_lock.lock().await;
        let snapshot = self.pending.lock().clone();
        if snapshot.is_empty() {
            return Ok(0);
        }
        let staged = snapshot.len();

        let affected = match self.store.commit(snapshot).await {
            Ok(affected) => affected,
            Err(e) => {
                warn!(error = %e, staged, "Commit failed; staged changes retained");
                return Err(e);
            },
        };

        let committed = self.pending.lock().drain_front(staged);
        let mut tracked = self.tracked.lock();
        for change in committed {
            match change {
                StagedChange::Insert(entity) | StagedChange::Update(entity) => {
                    tracked.insert(entity.id().clone(), entity);
                },
                StagedChange::Remove(entity) => {
                    tracked.remove(entity.id());
                },
            }
        }

        info!(affected, staged, "Saved changes");
        Ok(affected)
    }
}
