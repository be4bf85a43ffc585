//! Route definitions

use axum::{Router, middleware::from_fn_with_state, routing::get};
use tower_http::trace::TraceLayer;

use crate::{handlers, middleware::tenant_middleware, state::AppState};

/// Create the main router with all routes
///
/// Everything under `/v1` runs behind the tenant middleware; health
/// endpoints do not require a tenant.
pub fn create_router(state: AppState) -> Router {
    let tenant_scoped = Router::new()
        .route("/v1/tenant", get(handlers::tenants::current_tenant))
        .route("/v1/tenants", get(handlers::tenants::list_tenants))
        .route_layer(from_fn_with_state(state.clone(), tenant_middleware));

    Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .merge(tenant_scoped)
        .layer(TraceLayer::new_for_http())
        // Attach state
        .with_state(state)
}
