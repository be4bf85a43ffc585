//! Per-request tenant resolution state

use domain::TenantContext;
use tracing::debug;

use super::tenant_resolver::{TenantRequest, TenantResolver};
use crate::error::ApplicationError;

/// Resolution progress for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResolutionState {
    #[default]
    Unresolved,
    Resolving,
    Resolved(TenantContext),
    Failed(String),
}

impl ResolutionState {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved(_) | Self::Failed(_))
    }
}

/// Holds the tenant of one request
///
/// Only a `Resolved` scope hands out a context, so nothing downstream can
/// build a repository for a request whose tenant failed validation.
#[derive(Debug, Clone, Default)]
pub struct TenantScope {
    state: ResolutionState,
}

impl TenantScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope already holding `context`
    pub const fn resolved(context: TenantContext) -> Self {
        Self {
            state: ResolutionState::Resolved(context),
        }
    }

    pub const fn state(&self) -> &ResolutionState {
        &self.state
    }

    /// Run the resolver once for this request
    ///
    /// A scope resolves at most once; later calls fail without touching the
    /// resolver. If the returned future is dropped mid-flight the scope stays
    /// in `Resolving` and never yields a context.
    pub async fn resolve(
        &mut self,
        resolver: &TenantResolver,
        request: &TenantRequest,
    ) -> Result<&TenantContext, ApplicationError> {
        if self.state != ResolutionState::Unresolved {
            return Err(ApplicationError::Internal(
                "tenant scope has already been resolved".to_string(),
            ));
        }

        self.state = ResolutionState::Resolving;
        match resolver.resolve(request).await {
            Ok(context) => {
                debug!(tenant_id = %context.tenant_id(), "Tenant scope resolved");
                self.state = ResolutionState::Resolved(context);
                self.context()
            },
            Err(e) => {
                self.state = ResolutionState::Failed(e.to_string());
                Err(e)
            },
        }
    }

    /// The resolved context, or an error in any other state
    pub fn context(&self) -> Result<&TenantContext, ApplicationError> {
        match &self.state {
            ResolutionState::Resolved(context) => Ok(context),
            _ => Err(ApplicationError::TenantNotResolved),
        }
    }
}
