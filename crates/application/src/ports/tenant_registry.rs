//! Tenant registry port
//!
//! Looks up tenant records by identifier and lists the registry. The resolver uses it to validate
//! the identified tenant and to learn its routing target.

use async_trait::async_trait;
use domain::{TenantId, TenantRecord};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for tenant registry lookups
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TenantRegistryPort: Send + Sync {
    /// Find a tenant record by identifier, active or not
    async fn find(&self, id: &TenantId) -> Result<Option<TenantRecord>, ApplicationError>;

    /// All registered tenants ordered by identifier
    async fn list(&self) -> Result<Vec<TenantRecord>, ApplicationError>;
}
