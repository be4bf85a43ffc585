//! Database (SQLite) configuration.

use serde::{Deserialize, Serialize};

use super::default_true;

/// Shared SQLite database configuration
///
/// Dedicated tenant databases reuse `max_connections` and `run_migrations`;
/// their URL comes from the tenant record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection URL of the shared database
    #[serde(default = "default_db_url")]
    pub url: String,

    /// Maximum number of concurrent database connections per pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Whether to run pending migrations when a pool is opened (default: true)
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_db_url() -> String {
    "sqlite:tenantry.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
            max_connections: default_max_connections(),
            run_migrations: true,
        }
    }
}
