//! Value Objects - Immutable, identity-less domain primitives

pub mod tenant;
mod tenant_id;
mod user_id;

pub use tenant::{TenantContext, TenantRecord};
pub use tenant_id::{ROOT_TENANT, TenantId};
pub use user_id::UserId;
