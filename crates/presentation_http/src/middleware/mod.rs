//! HTTP middleware components
//!
//! Tenant resolution and query validation.

pub mod tenant;
pub mod validation;

pub use tenant::{CurrentTenant, tenant_middleware, tenant_request};
pub use validation::{ValidatedQuery, ValidationError};
