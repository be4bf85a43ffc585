//! Tenant identifier value object
//!
//! # Examples
//!
//! ```
//! use domain::TenantId;
//!
//! let tenant_id = TenantId::parse("acme").unwrap();
//! assert_eq!(tenant_id.as_str(), "acme");
//!
//! // Anonymous and bootstrap requests fall back to the root tenant
//! assert!(TenantId::default().is_root());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Identifier of the reserved tenant used when a request carries no tenant signal
pub const ROOT_TENANT: &str = "root";

/// A tenant identifier
///
/// Tenants are isolated organizational units. Identifiers arrive as free-form
/// strings (token claim, subdomain label, header value) and are looked up in
/// the tenant registry before use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Create a tenant ID without validation
    ///
    /// Surrounding whitespace is trimmed.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.len() == id.len() {
            Self(id)
        } else {
            Self(trimmed.to_string())
        }
    }

    /// Parse a tenant ID, rejecting empty or whitespace-only input
    ///
    /// # Examples
    ///
    /// ```
    /// use domain::TenantId;
    ///
    /// assert!(TenantId::parse("acme").is_ok());
    /// assert!(TenantId::parse("   ").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::ValidationError(
                "tenant id must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The reserved root tenant
    pub fn root() -> Self {
        Self(ROOT_TENANT.to_string())
    }

    /// Check if this is the root tenant
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_TENANT
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TenantId {
    /// Returns the root tenant
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_root() {
        assert!(TenantId::default().is_root());
        assert_eq!(TenantId::default().as_str(), ROOT_TENANT);
    }

    #[test]
    fn new_trims_whitespace() {
        assert_eq!(TenantId::new("  acme ").as_str(), "acme");
    }

    #[test]
    fn parse_rejects_blank() {
        assert!(TenantId::parse("").is_err());
        assert!(TenantId::parse(" \t ").is_err());
    }

    #[test]
    fn parse_accepts_value() {
        let id = TenantId::parse("acme").unwrap();
        assert_eq!(id.to_string(), "acme");
        assert!(!id.is_root());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = TenantId::new("acme");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"acme\"");
        let back: TenantId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
