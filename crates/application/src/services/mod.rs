//! Application services - Use case implementations

mod generic_repository;
mod tenant_resolver;
mod tenant_scope;

pub use generic_repository::GenericRepository;
pub use tenant_resolver::{
    CallerIdentity, DEFAULT_EXCLUDED_HOST_SUFFIX, DEFAULT_TENANT_KEY, DEFAULT_USER_ID_CLAIM,
    TenantRequest, TenantResolutionConfig, TenantResolver, TenantSource,
};
pub use tenant_scope::{ResolutionState, TenantScope};
