//! SQLite adapter for the TenantRegistry port

use application::{error::ApplicationError, ports::TenantRegistryPort};
use async_trait::async_trait;
use chrono::Utc;
use domain::{TenantId, TenantRecord};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::error::map_sqlx_error;

/// SQLite implementation of the tenant registry
#[derive(Debug, Clone)]
pub struct SqliteTenantRegistry {
    pool: SqlitePool,
}

impl SqliteTenantRegistry {
    /// Create a new SQLite tenant registry
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace a tenant record
    #[instrument(skip(self, record), fields(tenant_id = %record.id))]
    pub async fn upsert(&self, record: &TenantRecord) -> Result<(), ApplicationError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO tenants (id, name, is_active, connection_target, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $5)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 is_active = excluded.is_active,
                 connection_target = excluded.connection_target,
                 updated_at = excluded.updated_at",
        )
        .bind(record.id.as_str())
        .bind(&record.name)
        .bind(record.is_active)
        .bind(&record.connection_target)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(active = record.is_active, "Tenant upserted");
        Ok(())
    }
}

#[async_trait]
impl TenantRegistryPort for SqliteTenantRegistry {
    #[instrument(skip(self), fields(tenant_id = %id))]
    async fn find(&self, id: &TenantId) -> Result<Option<TenantRecord>, ApplicationError> {
        let row: Option<TenantRow> = sqlx::query_as(
            "SELECT id, name, is_active, connection_target FROM tenants WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(TenantRow::into_record))
    }

    async fn list(&self) -> Result<Vec<TenantRecord>, ApplicationError> {
        let rows: Vec<TenantRow> = sqlx::query_as(
            "SELECT id, name, is_active, connection_target FROM tenants ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TenantRow::into_record).collect())
    }
}

/// Row type for tenant queries
#[derive(sqlx::FromRow)]
struct TenantRow {
    id: String,
    name: String,
    is_active: bool,
    connection_target: Option<String>,
}

impl TenantRow {
    fn into_record(self) -> TenantRecord {
        TenantRecord {
            id: TenantId::new(self.id),
            name: self.name,
            is_active: self.is_active,
            connection_target: self.connection_target,
        }
    }
}
