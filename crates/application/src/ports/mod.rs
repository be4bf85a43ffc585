//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod entity_store;
mod repository;
mod tenant_registry;

pub use entity_store::{ChangeSet, EntityStore, EntityStream, StagedChange};
pub use repository::Repository;
#[cfg(test)]
pub use tenant_registry::MockTenantRegistryPort;
pub use tenant_registry::TenantRegistryPort;
