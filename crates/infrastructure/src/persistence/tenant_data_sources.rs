//! Routing from tenant context to data source
//!
//! Tenants without a connection target share one database and are separated
//! by the document store's tenant filter. Tenants with a target get their
//! own pool, opened on first use and kept for the life of the process.

use std::{collections::HashMap, sync::Arc};

use application::{
    error::ApplicationError,
    ports::EntityStore,
    services::GenericRepository,
};
use domain::{Entity, TenantContext};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;
use tracing::{info, instrument};

use super::{
    async_connection::{AsyncDatabase, AsyncDatabaseConfig},
    document_store::SqliteDocumentStore,
};
use crate::config::DatabaseConfig;

/// Opens tenant-scoped stores over shared or dedicated databases
#[derive(Debug)]
pub struct TenantDataSources {
    shared: AsyncDatabase,
    dedicated: Mutex<HashMap<String, AsyncDatabase>>,
    max_connections: u32,
    run_migrations: bool,
}

impl TenantDataSources {
    pub fn new(shared: AsyncDatabase, config: &DatabaseConfig) -> Self {
        Self {
            shared,
            dedicated: Mutex::new(HashMap::new()),
            max_connections: config.max_connections,
            run_migrations: config.run_migrations,
        }
    }

    /// The shared database, also home of the tenant registry
    pub const fn shared(&self) -> &AsyncDatabase {
        &self.shared
    }

    /// Number of dedicated pools opened so far
    pub async fn dedicated_pools(&self) -> usize {
        self.dedicated.lock().await.len()
    }

    /// Database serving `tenant`
    #[instrument(skip(self, tenant), fields(tenant_id = %tenant.tenant_id()))]
    pub async fn database_for(&self, tenant: &TenantContext) -> Result<AsyncDatabase, ApplicationError> {
        let Some(target) = tenant.connection_target() else {
            return Ok(self.shared.clone());
        };

        let mut dedicated = self.dedicated.lock().await;
        if let Some(db) = dedicated.get(target) {
            return Ok(db.clone());
        }

        let db = AsyncDatabase::new(&AsyncDatabaseConfig::from_url(target, self.max_connections)).await?;
        if self.run_migrations {
            db.migrate().await?;
        }
        info!("Opened dedicated tenant database");
        dedicated.insert(target.to_string(), db.clone());
        Ok(db)
    }

    /// Document store for `T` scoped to `tenant`
    pub async fn store_for<T>(
        &self,
        tenant: &TenantContext,
    ) -> Result<Arc<dyn EntityStore<T>>, ApplicationError>
    where
        T: Entity + Serialize + DeserializeOwned,
    {
        let db = self.database_for(tenant).await?;
        Ok(Arc::new(SqliteDocumentStore::<T>::new(
            db.pool().clone(),
            tenant.tenant_id().clone(),
        )))
    }

    /// Repository for `T` scoped to `tenant`
    pub async fn repository_for<T>(
        &self,
        tenant: &TenantContext,
    ) -> Result<GenericRepository<T>, ApplicationError>
    where
        T: Entity + Serialize + DeserializeOwned,
    {
        let store = self.store_for::<T>(tenant).await?;
        Ok(GenericRepository::new(store, tenant.clone()))
    }
}
