//! Tenant context abstraction for multi-tenant data isolation
//!
//! This module provides the foundational abstractions for multi-tenant support:
//!
//! - [`TenantContext`] - The tenant published for a single request
//! - [`TenantRecord`] - A row of the tenant registry
//!
//! # Shared vs Dedicated Stores
//!
//! A tenant either owns a dedicated data source (its `connection_target`) or
//! lives in the shared default store, where every statement carries a
//! mandatory tenant filter.
//!
//! # Examples
//!
//! ```
//! use domain::tenant::TenantContext;
//! use domain::TenantId;
//!
//! let context = TenantContext::new(TenantId::new("acme"), None, None);
//! assert!(context.uses_shared_store());
//! ```

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::{TenantId, UserId};
use crate::{
    entities::Entity,
    fields::{FieldRegistry, HasFields},
};

/// Context carrying tenant information through the request lifecycle
///
/// Created once per request by the tenant resolver and immutable afterwards.
/// It is the only input that decides which data source a repository targets.
///
/// # Thread Safety
///
/// `TenantContext` is `Send + Sync` and can be safely shared across threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    tenant_id: TenantId,
    connection_target: Option<String>,
    caller_user_id: Option<UserId>,
}

impl TenantContext {
    /// Create a new tenant context
    pub const fn new(
        tenant_id: TenantId,
        connection_target: Option<String>,
        caller_user_id: Option<UserId>,
    ) -> Self {
        Self {
            tenant_id,
            connection_target,
            caller_user_id,
        }
    }

    /// Build the context published for a validated registry record
    pub fn from_record(record: &TenantRecord, caller_user_id: Option<UserId>) -> Self {
        Self::new(
            record.id.clone(),
            record.connection_target.clone(),
            caller_user_id,
        )
    }

    /// Get the tenant ID from this context
    pub const fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Dedicated data source of this tenant, `None` for the shared store
    pub fn connection_target(&self) -> Option<&str> {
        self.connection_target.as_deref()
    }

    /// Authenticated caller, when the identity carried one
    pub const fn caller_user_id(&self) -> Option<&UserId> {
        self.caller_user_id.as_ref()
    }

    /// Whether queries for this tenant run against the shared store
    pub const fn uses_shared_store(&self) -> bool {
        self.connection_target.is_none()
    }
}

/// Registry entry for a tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    /// Tenant identifier
    pub id: TenantId,
    /// Display name
    pub name: String,
    /// Inactive tenants are rejected during resolution
    pub is_active: bool,
    /// Dedicated data source, `None` for the shared store
    pub connection_target: Option<String>,
}

impl TenantRecord {
    /// Active tenant on the shared store
    pub fn shared(id: TenantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_active: true,
            connection_target: None,
        }
    }

    /// Active tenant on a dedicated store
    pub fn dedicated(id: TenantId, name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_active: true,
            connection_target: Some(target.into()),
        }
    }

    /// Mark the record inactive
    #[must_use]
    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }
}

impl HasFields for TenantRecord {
    fn field_registry() -> &'static FieldRegistry<Self> {
        static REGISTRY: LazyLock<FieldRegistry<TenantRecord>> = LazyLock::new(|| {
            FieldRegistry::builder("TenantRecord")
                .field("Id", |t: &TenantRecord| t.id.as_str().into())
                .field("Name", |t: &TenantRecord| t.name.as_str().into())
                .field("IsActive", |t: &TenantRecord| t.is_active.into())
                .field("ConnectionTarget", |t: &TenantRecord| {
                    t.connection_target.as_deref().into()
                })
                .build()
        });
        &REGISTRY
    }
}

impl Entity for TenantRecord {
    type Id = TenantId;
    const ENTITY_NAME: &'static str = "Tenant";

    fn id(&self) -> &TenantId {
        &self.id
    }
}
