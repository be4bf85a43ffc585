//! Application layer - Use cases and orchestration
//!
//! Contains the query description and specification evaluator, the store and
//! registry ports, the generic repository and tenant resolution.
//! Orchestrates domain objects and infrastructure adapters.

pub mod cancellation;
pub mod error;
pub mod ports;
pub mod query;
pub mod services;

pub use cancellation::with_cancellation;
pub use error::ApplicationError;
pub use ports::*;
pub use query::{EntityQuery, SpecificationEvaluator};
pub use services::*;
