//! Tenantry HTTP presentation layer
//!
//! Resolves the tenant of each request and exposes the tenant endpoints.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use middleware::{CurrentTenant, ValidatedQuery, ValidationError, tenant_middleware};
pub use routes::create_router;
pub use state::AppState;
