//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: SQLite storage for
//! the tenant registry and entity documents, configuration loading and
//! logging setup.

pub mod config;
pub mod persistence;
pub mod telemetry;

pub use config::{
    AppConfig, DatabaseConfig, Environment, ServerConfig, TelemetryAppConfig, TenancyConfig,
};
pub use persistence::{
    AsyncDatabase, AsyncDatabaseConfig, InMemoryEntityStore, SqliteDocumentStore,
    SqliteTenantRegistry, TenantDataSources,
};
pub use telemetry::{TelemetryError, init_telemetry};
