//! Application configuration
//!
//! Loaded from built-in defaults, an optional `config.toml` in the working
//! directory, and `TENANTRY_`-prefixed environment variables (nested keys
//! separated by `__`, e.g. `TENANTRY_DATABASE__URL`).

use std::fmt;

use serde::{Deserialize, Serialize};

mod database;
mod server;
mod telemetry;
mod tenancy;

pub use database::DatabaseConfig;
pub use server::ServerConfig;
pub use telemetry::TelemetryAppConfig;
pub use tenancy::TenancyConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "TENANTRY";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Application environment (development or production)
///
/// Selects the host segment count used for subdomain tenant resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment - hosts without a public domain suffix
    #[default]
    Development,
    /// Production environment - hosts under the public domain
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development or production)
    #[serde(default)]
    pub environment: Environment,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Shared database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Tenant resolution configuration
    #[serde(default)]
    pub tenancy: TenancyConfig,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryAppConfig,
}

impl AppConfig {
    /// Load configuration from environment and optional file
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::from_sources(
            config::Config::builder()
                // Load from file if exists
                .add_source(config::File::with_name("config").required(false))
                // Override with environment variables (e.g., TENANTRY_DATABASE__URL)
                .add_source(
                    config::Environment::with_prefix(ENV_PREFIX)
                        .prefix_separator("_")
                        .separator("__")
                        .list_separator(",")
                        .with_list_parse_key("tenancy.excluded_host_suffixes")
                        .try_parsing(true),
                ),
        )
    }

    /// Load configuration from a TOML document, over the defaults
    pub fn from_toml(toml: &str) -> Result<Self, config::ConfigError> {
        Self::from_sources(
            config::Config::builder()
                .add_source(config::File::from_str(toml, config::FileFormat::Toml)),
        )
    }

    fn from_sources(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no request could succeed with
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.database.max_connections == 0 {
            return Err(config::ConfigError::Message(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        self.tenancy.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_default_is_development() {
        assert_eq!(Environment::default(), Environment::Development);
    }

    #[test]
    fn environment_display() {
        assert_eq!(format!("{}", Environment::Development), "development");
        assert_eq!(format!("{}", Environment::Production), "production");
    }

    #[test]
    fn environment_from_str() {
        assert_eq!(
            "dev".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert_eq!(
            "PRODUCTION".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.tenancy.default_tenant, "root");
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn toml_overrides_sections() {
        let config = AppConfig::from_toml(
            r#"
            environment = "production"

            [database]
            url = "sqlite::memory:"

            [tenancy]
            header_name = "x-tenant"
            production_host_segments = 4

            [server]
            port = 8080

            [telemetry]
            json = true
            "#,
        )
        .unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert!(config.database.run_migrations);
        assert_eq!(config.tenancy.header_name, "x-tenant");
        assert!(config.telemetry.json);
        assert_eq!(config.server.bind_address(), "127.0.0.1:8080");

        let resolution = config.tenancy.resolution_config(config.environment);
        assert_eq!(resolution.host_segments, 4);
        assert_eq!(resolution.header_name, "x-tenant");
    }

    #[test]
    fn zero_connections_is_rejected() {
        let err = AppConfig::from_toml("[database]\nmax_connections = 0").unwrap_err();
        assert!(err.to_string().contains("max_connections"));
    }
}
