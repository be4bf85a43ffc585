//! Tenant handlers
//!
//! `GET /v1/tenant` echoes the tenant resolved for the request. The registry
//! listing is restricted to the root tenant.

use std::sync::Arc;

use application::{ports::Repository, services::GenericRepository};
use axum::{Json, extract::State};
use domain::{Projection, Specification, TenantContext, TenantRecord};
use infrastructure::InMemoryEntityStore;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::common::{PageQuery, PageResponse};
use crate::{
    error::ApiError,
    middleware::{CurrentTenant, ValidatedQuery},
    state::AppState,
};

/// Resolved tenant of the current request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentTenantResponse {
    pub tenant_id: String,
    pub dedicated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl From<&TenantContext> for CurrentTenantResponse {
    fn from(tenant: &TenantContext) -> Self {
        Self {
            tenant_id: tenant.tenant_id().to_string(),
            dedicated: !tenant.uses_shared_store(),
            user_id: tenant.caller_user_id().map(ToString::to_string),
        }
    }
}

/// Registry entry as listed to administrators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSummary {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    pub dedicated: bool,
}

impl Projection<TenantRecord> for TenantSummary {
    fn project(record: &TenantRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: record.name.clone(),
            is_active: record.is_active,
            dedicated: record.connection_target.is_some(),
        }
    }
}

pub async fn current_tenant(CurrentTenant(tenant): CurrentTenant) -> Json<CurrentTenantResponse> {
    Json(CurrentTenantResponse::from(&tenant))
}

/// Page through the tenant registry, sorted by `sort` (default `Id`)
#[instrument(skip(state, tenant), fields(tenant_id = %tenant.tenant_id()))]
pub async fn list_tenants(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> Result<Json<PageResponse<TenantSummary>>, ApiError> {
    if !tenant.tenant_id().is_root() {
        return Err(ApiError::Forbidden(
            "listing tenants requires the root tenant".to_string(),
        ));
    }

    let page = query.page_request()?;
    let spec = Specification::<TenantRecord>::builder()
        .order_by_descriptor_or(query.sort_descriptor(), "Id")?
        .build();

    let records = state.registry.list().await?;
    let repository = GenericRepository::new(Arc::new(InMemoryEntityStore::with_rows(records)), tenant);
    let result = repository
        .get_paginated::<TenantSummary>(page.page(), page.page_size(), Some(&spec))
        .await?;

    Ok(Json(result.into()))
}
