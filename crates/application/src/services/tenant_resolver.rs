//! Tenant resolution
//!
//! Identifies the tenant of an inbound request from, in order: the caller's
//! `tenant` claim, the host subdomain, the `tenant` header, and finally the
//! reserved root tenant. The identified tenant must exist in the registry and
//! be active.

use std::{collections::HashMap, fmt, sync::Arc};

use domain::{DomainError, ROOT_TENANT, TenantContext, TenantId, UserId};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{error::ApplicationError, ports::TenantRegistryPort};

/// Default claim and header name carrying the tenant identifier
pub const DEFAULT_TENANT_KEY: &str = "tenant";

/// Default claim carrying the caller's user identifier
pub const DEFAULT_USER_ID_CLAIM: &str = "uid";

/// Default platform hosting suffix excluded from subdomain derivation
pub const DEFAULT_EXCLUDED_HOST_SUFFIX: &str = "azurewebsites.net";

/// Settings for [`TenantResolver`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantResolutionConfig {
    pub claim_name: String,
    pub user_id_claim: String,
    pub header_name: String,
    pub default_tenant: String,
    /// Exact number of `.`-separated host segments that marks a subdomain
    pub host_segments: usize,
    pub excluded_host_suffixes: Vec<String>,
}

impl Default for TenantResolutionConfig {
    fn default() -> Self {
        Self {
            claim_name: DEFAULT_TENANT_KEY.to_string(),
            user_id_claim: DEFAULT_USER_ID_CLAIM.to_string(),
            header_name: DEFAULT_TENANT_KEY.to_string(),
            default_tenant: ROOT_TENANT.to_string(),
            host_segments: 3,
            excluded_host_suffixes: vec![DEFAULT_EXCLUDED_HOST_SUFFIX.to_string()],
        }
    }
}

impl TenantResolutionConfig {
    #[must_use]
    pub const fn with_host_segments(mut self, segments: usize) -> Self {
        self.host_segments = segments;
        self
    }
}

/// Claims of the authenticated caller, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerIdentity {
    claims: HashMap<String, String>,
}

impl CallerIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.claims.insert(name.into(), value.into());
        self
    }

    pub fn claim(&self, name: &str) -> Option<&str> {
        self.claims.get(name).map(String::as_str)
    }
}

/// The parts of an inbound request that carry tenant signals
#[derive(Debug, Clone, Default)]
pub struct TenantRequest {
    identity: Option<CallerIdentity>,
    host: Option<String>,
    headers: HashMap<String, String>,
}

impl TenantRequest {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_identity(mut self, identity: CallerIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Add a header; names are case-insensitive
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub const fn identity(&self) -> Option<&CallerIdentity> {
        self.identity.as_ref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn claim(&self, name: &str) -> Option<&str> {
        self.identity.as_ref().and_then(|identity| identity.claim(name))
    }
}

/// Where the tenant identifier came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantSource {
    Claim,
    Subdomain,
    Header,
    Fallback,
}

impl fmt::Display for TenantSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Claim => "claim",
            Self::Subdomain => "subdomain",
            Self::Header => "header",
            Self::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Whether `host` (lowercase) is `domain` itself or one of its subdomains
fn is_on_domain(host: &str, domain: &str) -> bool {
    let domain = domain.trim().trim_start_matches('.').to_ascii_lowercase();
    if domain.is_empty() {
        return false;
    }
    host.strip_suffix(domain.as_str())
        .is_some_and(|rest| rest.is_empty() || rest.ends_with('.'))
}

/// Resolves and validates the tenant of a request
pub struct TenantResolver {
    registry: Arc<dyn TenantRegistryPort>,
    config: TenantResolutionConfig,
}

impl fmt::Debug for TenantResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TenantResolver {
    pub fn new(registry: Arc<dyn TenantRegistryPort>, config: TenantResolutionConfig) -> Self {
        Self { registry, config }
    }

    pub const fn config(&self) -> &TenantResolutionConfig {
        &self.config
    }

    /// Identify the tenant without consulting the registry
    pub fn identify(&self, request: &TenantRequest) -> (TenantId, TenantSource) {
        if let Some(claim) = non_blank(request.claim(&self.config.claim_name)) {
            return (TenantId::new(claim), TenantSource::Claim);
        }
        if let Some(subdomain) = request.host().and_then(|host| self.subdomain(host)) {
            return (TenantId::new(subdomain), TenantSource::Subdomain);
        }
        if let Some(header) = non_blank(request.header(&self.config.header_name)) {
            return (TenantId::new(header), TenantSource::Header);
        }
        (
            TenantId::new(self.config.default_tenant.as_str()),
            TenantSource::Fallback,
        )
    }

    /// First host segment when the host has exactly the configured number
    /// of segments and is not on an excluded hosting platform
    fn subdomain<'h>(&self, host: &'h str) -> Option<&'h str> {
        let host = host.split(':').next().unwrap_or(host).trim();
        let lowered = host.to_ascii_lowercase();
        if self
            .config
            .excluded_host_suffixes
            .iter()
            .any(|suffix| is_on_domain(&lowered, suffix))
        {
            return None;
        }

        let mut segments = host.split('.');
        let first = segments.next()?;
        if segments.count() + 1 != self.config.host_segments {
            return None;
        }
        non_blank(Some(first))
    }

    /// Identify and validate the tenant, producing its context
    #[instrument(skip(self, request))]
    pub async fn resolve(&self, request: &TenantRequest) -> Result<TenantContext, ApplicationError> {
        let (tenant_id, source) = self.identify(request);
        debug!(tenant_id = %tenant_id, source = %source, "Identified tenant");

        let record = self.registry.find(&tenant_id).await?;
        let record = match record {
            Some(record) if record.is_active => record,
            Some(_) => {
                warn!(tenant_id = %tenant_id, source = %source, "Rejected inactive tenant");
                return Err(DomainError::InvalidTenant(format!("tenant '{tenant_id}' is inactive")).into());
            },
            None => {
                warn!(tenant_id = %tenant_id, source = %source, "Rejected unknown tenant");
                return Err(DomainError::InvalidTenant(format!("tenant '{tenant_id}' does not exist")).into());
            },
        };

        let caller = non_blank(request.claim(&self.config.user_id_claim)).map(UserId::new);
        Ok(TenantContext::from_record(&record, caller))
    }
}
