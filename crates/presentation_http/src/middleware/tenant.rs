//! Tenant resolution middleware
//!
//! Resolves the tenant of every request before it reaches a handler through a
//! per-request [`TenantScope`] and publishes the resolved scope as a request
//! extension. Requests naming an unknown or inactive tenant are answered
//! with 403.

use application::{
    ApplicationError,
    services::{CallerIdentity, TenantRequest, TenantScope},
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::TenantContext;
use tracing::{Instrument, info_span};

use crate::{error::ApiError, state::AppState};

/// Build the resolver input from request headers and an upstream identity
///
/// Authentication layers in front of this middleware insert the
/// [`CallerIdentity`] extension; without it only the host and headers count.
pub fn tenant_request(headers: &HeaderMap, identity: Option<CallerIdentity>) -> TenantRequest {
    let mut request = TenantRequest::new();
    if let Some(identity) = identity {
        request = request.with_identity(identity);
    }
    if let Some(host) = headers.get(header::HOST).and_then(|v| v.to_str().ok()) {
        request = request.with_host(host);
    }
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            request = request.with_header(name.as_str(), value);
        }
    }
    request
}

/// Resolve the request tenant and insert it into request extensions
pub async fn tenant_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = request.extensions().get::<CallerIdentity>().cloned();
    let tenant_request = tenant_request(request.headers(), identity);

    let mut scope = TenantScope::new();
    let tenant_id = match scope.resolve(&state.resolver, &tenant_request).await {
        Ok(tenant) => tenant.tenant_id().clone(),
        Err(e) => return ApiError::from(e).into_response(),
    };

    let span = info_span!("tenant", tenant_id = %tenant_id);
    request.extensions_mut().insert(scope);
    next.run(request).instrument(span).await
}

/// Extractor for the tenant published by [`tenant_middleware`]
///
/// Rejects with `TenantNotResolved` unless the request carries a scope in
/// the `Resolved` state.
#[derive(Debug, Clone)]
pub struct CurrentTenant(pub TenantContext);

impl<S: Send + Sync> FromRequestParts<S> for CurrentTenant {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let scope = parts
            .extensions
            .get::<TenantScope>()
            .ok_or_else(|| ApiError::from(ApplicationError::TenantNotResolved))?;
        Ok(Self(scope.context()?.clone()))
    }
}
