//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error (field paths, not found, nothing to update, invalid tenant)
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Store-level failure (connectivity, constraint violation)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Store failure while fetching a page
    #[error("Failed to load page {page} (page size {page_size}): {source}")]
    Pagination {
        page: u32,
        page_size: u32,
        #[source]
        source: Box<ApplicationError>,
    },

    /// A repository was requested before the tenant was resolved
    #[error("No tenant resolved for this request")]
    TenantNotResolved,

    /// The operation was cancelled by the caller
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Wrap a store failure with the page that was being loaded
    pub fn pagination(page: u32, page_size: u32, source: Self) -> Self {
        Self::Pagination {
            page,
            page_size,
            source: Box::new(source),
        }
    }

    /// The domain error at the root of this error, if any
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            Self::Pagination { source, .. } => source.domain(),
            _ => None,
        }
    }

    /// Check if this error means the requested entity does not exist
    pub fn is_not_found(&self) -> bool {
        self.domain().is_some_and(DomainError::is_not_found)
    }
}
