//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A sort or filter path does not resolve against the entity's field registry
    #[error("Field not found: '{path}' (no member named '{segment}')")]
    FieldNotFound { path: String, segment: String },

    /// Entity not found
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// Update requested for an entity that did not change since it was loaded
    #[error("Nothing to update for {entity_type} {id}")]
    NothingToUpdate { entity_type: String, id: String },

    /// Resolved tenant is unknown or inactive
    #[error("Invalid tenant: {0}")]
    InvalidTenant(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Create a field-not-found error
    pub fn field_not_found(path: impl Into<String>, segment: impl Into<String>) -> Self {
        Self::FieldNotFound {
            path: path.into(),
            segment: segment.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Create a nothing-to-update error
    pub fn nothing_to_update(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NothingToUpdate {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Whether this error means the requested row does not exist
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
