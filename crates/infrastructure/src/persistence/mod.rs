//! Persistence module
//!
//! sqlx/SQLite storage for the tenant registry and entity documents, an
//! in-memory entity store, and per-tenant data source routing.

pub mod async_connection;
pub mod document_store;
pub mod error;
pub mod in_memory_store;
pub mod tenant_data_sources;
pub mod tenant_registry;

pub use async_connection::{AsyncDatabase, AsyncDatabaseConfig, AsyncDatabaseError};
pub use document_store::SqliteDocumentStore;
pub use error::map_sqlx_error;
pub use in_memory_store::InMemoryEntityStore;
pub use tenant_data_sources::TenantDataSources;
pub use tenant_registry::SqliteTenantRegistry;
