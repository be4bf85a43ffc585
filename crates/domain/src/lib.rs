//! Domain layer for Tenantry
//!
//! Contains the entity contract, field registries, sort descriptors,
//! specifications, pagination and tenant value objects.
//! This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod fields;
pub mod pagination;
pub mod sorting;
pub mod specification;
pub mod value_objects;

// Re-export tenant module for convenient access
pub use value_objects::tenant;

pub use entities::{Entity, Projection};
pub use errors::DomainError;
pub use fields::{FieldPath, FieldRegistry, FieldValue, HasFields};
pub use pagination::{PageRequest, PaginatedResult};
pub use sorting::{SortDirection, SortKey, parse_sort};
pub use specification::{FilterOp, OrderKey, Specification, SpecificationBuilder};
pub use value_objects::*;
