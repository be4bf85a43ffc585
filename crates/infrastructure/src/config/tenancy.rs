//! Tenant resolution configuration.

use application::services::{
    DEFAULT_EXCLUDED_HOST_SUFFIX, DEFAULT_TENANT_KEY, DEFAULT_USER_ID_CLAIM,
    TenantResolutionConfig,
};
use domain::ROOT_TENANT;
use serde::{Deserialize, Serialize};

use super::Environment;

/// How the tenant of a request is identified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenancyConfig {
    /// Caller identity claim carrying the tenant identifier
    #[serde(default = "default_tenant_key")]
    pub claim_name: String,

    /// Caller identity claim carrying the user identifier
    #[serde(default = "default_user_id_claim")]
    pub user_id_claim: String,

    /// Request header carrying the tenant identifier
    #[serde(default = "default_tenant_key")]
    pub header_name: String,

    /// Tenant used when a request carries no tenant signal
    #[serde(default = "default_tenant")]
    pub default_tenant: String,

    /// Host segments marking a subdomain in development (`acme.localhost`)
    #[serde(default = "default_development_host_segments")]
    pub development_host_segments: usize,

    /// Host segments marking a subdomain in production (`acme.example.com`)
    #[serde(default = "default_production_host_segments")]
    pub production_host_segments: usize,

    /// Platform hosting suffixes never treated as tenant subdomains
    #[serde(default = "default_excluded_host_suffixes")]
    pub excluded_host_suffixes: Vec<String>,
}

fn default_tenant_key() -> String {
    DEFAULT_TENANT_KEY.to_string()
}

fn default_user_id_claim() -> String {
    DEFAULT_USER_ID_CLAIM.to_string()
}

fn default_tenant() -> String {
    ROOT_TENANT.to_string()
}

const fn default_development_host_segments() -> usize {
    2
}

const fn default_production_host_segments() -> usize {
    3
}

fn default_excluded_host_suffixes() -> Vec<String> {
    vec![DEFAULT_EXCLUDED_HOST_SUFFIX.to_string()]
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            claim_name: default_tenant_key(),
            user_id_claim: default_user_id_claim(),
            header_name: default_tenant_key(),
            default_tenant: default_tenant(),
            development_host_segments: default_development_host_segments(),
            production_host_segments: default_production_host_segments(),
            excluded_host_suffixes: default_excluded_host_suffixes(),
        }
    }
}

impl TenancyConfig {
    /// Resolver settings for `environment`
    pub fn resolution_config(&self, environment: Environment) -> TenantResolutionConfig {
        let host_segments = match environment {
            Environment::Development => self.development_host_segments,
            Environment::Production => self.production_host_segments,
        };
        TenantResolutionConfig {
            claim_name: self.claim_name.clone(),
            user_id_claim: self.user_id_claim.clone(),
            header_name: self.header_name.clone(),
            default_tenant: self.default_tenant.clone(),
            host_segments,
            excluded_host_suffixes: self.excluded_host_suffixes.clone(),
        }
    }

    pub(super) fn validate(&self) -> Result<(), config::ConfigError> {
        let names = [
            ("tenancy.claim_name", &self.claim_name),
            ("tenancy.header_name", &self.header_name),
            ("tenancy.default_tenant", &self.default_tenant),
        ];
        if let Some((key, _)) = names.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(config::ConfigError::Message(format!("{key} must not be blank")));
        }
        if self.development_host_segments < 2 || self.production_host_segments < 2 {
            return Err(config::ConfigError::Message(
                "tenancy host segment counts must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}
