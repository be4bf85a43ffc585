//! Application state shared across handlers

use std::{fmt, sync::Arc};

use application::{ports::TenantRegistryPort, services::TenantResolver};
use infrastructure::{AppConfig, TenantDataSources};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Identifies and validates the tenant of each request
    pub resolver: Arc<TenantResolver>,
    /// Tenant registry, for administrative listing
    pub registry: Arc<dyn TenantRegistryPort>,
    /// Routes a resolved tenant to its data source
    pub data_sources: Arc<TenantDataSources>,
    /// Application configuration
    pub config: Arc<AppConfig>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("environment", &self.config.environment)
            .finish_non_exhaustive()
    }
}
