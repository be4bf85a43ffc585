//! SQLite document store
//!
//! Stores each entity as a JSON document in the `documents` table, keyed by
//! `(tenant_id, collection, id)`. Every statement is scoped to the store's
//! tenant, so tenants sharing a database never see each other's rows.
//!
//! Filters and orderings are closures, so rows are decoded and evaluated in
//! process. Identifier lookups are pushed down into SQL.

use std::{fmt, marker::PhantomData};

use application::{
    error::ApplicationError,
    ports::{ChangeSet, EntityStore, EntityStream, StagedChange},
    query::EntityQuery,
};
use async_trait::async_trait;
use chrono::Utc;
use domain::{Entity, TenantId};
use futures::{StreamExt, TryStreamExt, stream};
use serde::{Serialize, de::DeserializeOwned};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, instrument};

use super::error::{map_document_error, map_sqlx_error};

/// Document-backed [`EntityStore`] bound to one tenant
pub struct SqliteDocumentStore<T> {
    pool: SqlitePool,
    tenant_id: TenantId,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> fmt::Debug for SqliteDocumentStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteDocumentStore")
            .field("collection", &T::ENTITY_NAME)
            .field("tenant_id", &self.tenant_id)
            .finish_non_exhaustive()
    }
}

impl<T> Clone for SqliteDocumentStore<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            tenant_id: self.tenant_id.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> SqliteDocumentStore<T>
where
    T: Entity + Serialize + DeserializeOwned,
{
    /// Create a store over `pool` scoped to `tenant_id`
    pub const fn new(pool: SqlitePool, tenant_id: TenantId) -> Self {
        Self {
            pool,
            tenant_id,
            _entity: PhantomData,
        }
    }

    pub const fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Decode every candidate row for `query` in insertion order
    async fn load(&self, query: &EntityQuery<T>) -> Result<Vec<T>, ApplicationError> {
        let bodies: Vec<(String,)> = match query.id() {
            Some(id) => {
                sqlx::query_as(
                    "SELECT body FROM documents
                     WHERE tenant_id = $1 AND collection = $2 AND id = $3
                     ORDER BY rowid",
                )
                .bind(self.tenant_id.as_str())
                .bind(T::ENTITY_NAME)
                .bind(id.to_string())
                .fetch_all(&self.pool)
                .await
            },
            None => {
                sqlx::query_as(
                    "SELECT body FROM documents
                     WHERE tenant_id = $1 AND collection = $2
                     ORDER BY rowid",
                )
                .bind(self.tenant_id.as_str())
                .bind(T::ENTITY_NAME)
                .fetch_all(&self.pool)
                .await
            },
        }
        .map_err(map_sqlx_error)?;

        bodies
            .into_iter()
            .map(|(body,)| serde_json::from_str(&body).map_err(|e| map_document_error(&e)))
            .collect()
    }

    async fn count_all(&self) -> Result<u64, ApplicationError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM documents WHERE tenant_id = $1 AND collection = $2",
        )
        .bind(self.tenant_id.as_str())
        .bind(T::ENTITY_NAME)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn apply(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        change: &StagedChange<T>,
        now: &str,
    ) -> Result<u64, ApplicationError> {
        let id = change.id().to_string();
        let result = match change {
            StagedChange::Insert(entity) => {
                let body = serde_json::to_string(entity).map_err(|e| map_document_error(&e))?;
                sqlx::query(
                    "INSERT INTO documents (tenant_id, collection, id, body, created_at, updated_at)
                     VALUES ($1, $2, $3, $4, $5, $5)",
                )
                .bind(self.tenant_id.as_str())
                .bind(T::ENTITY_NAME)
                .bind(&id)
                .bind(&body)
                .bind(now)
                .execute(&mut **tx)
                .await
            },
            StagedChange::Update(entity) => {
                let body = serde_json::to_string(entity).map_err(|e| map_document_error(&e))?;
                sqlx::query(
                    "UPDATE documents SET body = $4, updated_at = $5
                     WHERE tenant_id = $1 AND collection = $2 AND id = $3",
                )
                .bind(self.tenant_id.as_str())
                .bind(T::ENTITY_NAME)
                .bind(&id)
                .bind(&body)
                .bind(now)
                .execute(&mut **tx)
                .await
            },
            StagedChange::Remove(_) => {
                sqlx::query(
                    "DELETE FROM documents WHERE tenant_id = $1 AND collection = $2 AND id = $3",
                )
                .bind(self.tenant_id.as_str())
                .bind(T::ENTITY_NAME)
                .bind(&id)
                .execute(&mut **tx)
                .await
            },
        }
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(ApplicationError::Storage(format!(
                "{} {id} no longer exists; {} rejected",
                T::ENTITY_NAME,
                change.kind()
            )));
        }
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl<T> EntityStore<T> for SqliteDocumentStore<T>
where
    T: Entity + Serialize + DeserializeOwned,
{
    fn stream<'a>(&'a self, query: &'a EntityQuery<T>) -> EntityStream<'a, T> {
        let rows = stream::once(async move { self.load(query).await })
            .map_ok(move |rows| {
                stream::iter(query.execute(rows).into_iter().map(Ok::<T, ApplicationError>))
            })
            .try_flatten();
        rows.boxed()
    }

    #[instrument(skip(self, query), fields(tenant_id = %self.tenant_id, collection = T::ENTITY_NAME))]
    async fn count(&self, query: &EntityQuery<T>) -> Result<u64, ApplicationError> {
        if !query.is_filtered() {
            let total = self.count_all().await?;
            let remaining = total.saturating_sub(query.skip_count());
            return Ok(query.take_count().map_or(remaining, |take| remaining.min(take)));
        }
        let rows = self.load(query).await?;
        Ok(query.count_in(&rows))
    }

    #[instrument(skip(self, changes), fields(tenant_id = %self.tenant_id, collection = T::ENTITY_NAME, staged = changes.len()))]
    async fn commit(&self, changes: ChangeSet<T>) -> Result<u64, ApplicationError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let mut affected = 0;
        for change in &changes {
            affected += self.apply(&mut tx, change, &now).await?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(affected, "Documents committed");
        Ok(affected)
    }
}
