//! Query specifications
//!
//! A [`Specification`] describes *what* to query over one entity type: an
//! optional filter predicate, eager-load hints and an ordering. It is built
//! once through [`SpecificationBuilder`] and is immutable afterwards.
//!
//! Field paths given to the builder are resolved against the entity's
//! [`FieldRegistry`](crate::fields::FieldRegistry) immediately, so an unknown
//! path is a construction-time [`DomainError::FieldNotFound`], never a silent
//! no-op at query time.

use std::{cmp::Ordering, fmt, sync::Arc};

use crate::{
    errors::DomainError,
    fields::{Accessor, FieldValue, HasFields},
    sorting::{SortDirection, SortKey, parse_sort},
};

/// Shared filter predicate
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Resolved sort key: label, direction and accessor
pub struct OrderKey<T> {
    label: String,
    direction: SortDirection,
    key: Accessor<T>,
}

impl<T> OrderKey<T> {
    pub fn new(label: impl Into<String>, direction: SortDirection, key: Accessor<T>) -> Self {
        Self {
            label: label.into(),
            direction,
            key,
        }
    }

    /// Field path or caller-supplied label
    pub fn label(&self) -> &str {
        &self.label
    }

    pub const fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Compare two items under this key and its direction
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        self.direction.apply((self.key)(a).cmp(&(self.key)(b)))
    }
}

impl<T> Clone for OrderKey<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            direction: self.direction,
            key: Arc::clone(&self.key),
        }
    }
}

impl<T> fmt::Debug for OrderKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderKey")
            .field("label", &self.label)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

/// Compare two items by successive keys; later keys only break ties
pub fn compare_by_keys<T>(keys: &[OrderKey<T>], a: &T, b: &T) -> Ordering {
    keys.iter()
        .map(|key| key.compare(a, b))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Comparison operator for field filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Case-insensitive substring match on text values
    Contains,
}

impl FilterOp {
    /// Evaluate `actual <op> expected`
    ///
    /// Range comparisons involving null are false.
    pub fn test(self, actual: &FieldValue, expected: &FieldValue) -> bool {
        match self {
            Self::Eq => actual == expected,
            Self::Ne => actual != expected,
            Self::Contains => match (actual.as_text(), expected.as_text()) {
                (Some(haystack), Some(needle)) => haystack
                    .to_lowercase()
                    .contains(&needle.to_lowercase()),
                _ => false,
            },
            _ if actual.is_null() || expected.is_null() => false,
            Self::Lt => actual < expected,
            Self::Le => actual <= expected,
            Self::Gt => actual > expected,
            Self::Ge => actual >= expected,
        }
    }
}

/// Declarative filter, eager-load hints and ordering over `T`
pub struct Specification<T> {
    criteria: Option<Predicate<T>>,
    includes: Vec<String>,
    order: Vec<OrderKey<T>>,
}

impl<T: HasFields> Specification<T> {
    /// Start building a specification
    pub fn builder() -> SpecificationBuilder<T> {
        SpecificationBuilder {
            criteria: None,
            includes: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Specification matching everything, unordered
    pub fn all() -> Self {
        Self::default()
    }
}

impl<T> Specification<T> {
    pub fn criteria(&self) -> Option<&Predicate<T>> {
        self.criteria.as_ref()
    }

    /// Eager-load hints, in declaration order
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Sort keys; the first is primary
    pub fn order(&self) -> &[OrderKey<T>] {
        &self.order
    }

    pub fn is_ordered(&self) -> bool {
        !self.order.is_empty()
    }

    /// Whether `item` passes the filter (always true without one)
    pub fn is_satisfied_by(&self, item: &T) -> bool {
        self.criteria
            .as_ref()
            .is_none_or(|predicate| predicate(item))
    }

    /// Compare two items under this specification's ordering
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        compare_by_keys(&self.order, a, b)
    }
}

impl<T> Default for Specification<T> {
    fn default() -> Self {
        Self {
            criteria: None,
            includes: Vec::new(),
            order: Vec::new(),
        }
    }
}

impl<T> Clone for Specification<T> {
    fn clone(&self) -> Self {
        Self {
            criteria: self.criteria.clone(),
            includes: self.includes.clone(),
            order: self.order.clone(),
        }
    }
}

impl<T> fmt::Debug for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("filtered", &self.criteria.is_some())
            .field("includes", &self.includes)
            .field("order", &self.order)
            .finish()
    }
}

/// Chainable builder for [`Specification`]
pub struct SpecificationBuilder<T> {
    criteria: Option<Predicate<T>>,
    includes: Vec<String>,
    order: Vec<OrderKey<T>>,
}

impl<T> fmt::Debug for SpecificationBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecificationBuilder")
            .field("filtered", &self.criteria.is_some())
            .field("includes", &self.includes)
            .field("order", &self.order)
            .finish()
    }
}

impl<T: HasFields> SpecificationBuilder<T> {
    /// Add a filter predicate; repeated calls are combined with AND
    #[must_use]
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let combined: Predicate<T> = match self.criteria.take() {
            None => Arc::new(predicate),
            Some(existing) => Arc::new(move |item: &T| existing(item) && predicate(item)),
        };
        self.criteria = Some(combined);
        self
    }

    /// Filter on a (possibly nested) member resolved by path
    pub fn filter_field(
        self,
        path: &str,
        op: FilterOp,
        value: impl Into<FieldValue>,
    ) -> Result<Self, DomainError> {
        let field = T::field_registry().resolve(path)?;
        let expected = value.into();
        Ok(self.filter(move |item: &T| op.test(&field.value(item), &expected)))
    }

    /// Add an eager-load hint
    #[must_use]
    pub fn include(mut self, relation: impl Into<String>) -> Self {
        self.includes.push(relation.into());
        self
    }

    /// Replace the ordering with an ascending key
    pub fn order_by(self, path: &str) -> Result<Self, DomainError> {
        self.push_path(path, SortDirection::Ascending, true)
    }

    /// Replace the ordering with a descending key
    pub fn order_by_descending(self, path: &str) -> Result<Self, DomainError> {
        self.push_path(path, SortDirection::Descending, true)
    }

    /// Append an ascending tie-breaker
    pub fn then_by(self, path: &str) -> Result<Self, DomainError> {
        self.push_path(path, SortDirection::Ascending, false)
    }

    /// Append a descending tie-breaker
    pub fn then_by_descending(self, path: &str) -> Result<Self, DomainError> {
        self.push_path(path, SortDirection::Descending, false)
    }

    /// Replace the ordering with parsed sort keys
    ///
    /// Every key is resolved before the ordering is touched. An empty key
    /// list leaves the current ordering in place.
    pub fn order_by_sort_keys(mut self, keys: &[SortKey]) -> Result<Self, DomainError> {
        let resolved = keys
            .iter()
            .map(|key| {
                let field = T::field_registry().resolve(key.field_path())?;
                Ok(OrderKey::new(field.path(), key.direction(), field.accessor()))
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        if !resolved.is_empty() {
            self.order = resolved;
        }
        Ok(self)
    }

    /// Replace the ordering with a sort descriptor such as `Name,-CreatedOn`
    pub fn order_by_descriptor(self, descriptor: &str) -> Result<Self, DomainError> {
        self.order_by_sort_keys(&parse_sort(descriptor))
    }

    /// Like [`order_by_descriptor`](Self::order_by_descriptor), using
    /// `default` when `descriptor` is blank
    pub fn order_by_descriptor_or(
        self,
        descriptor: &str,
        default: &str,
    ) -> Result<Self, DomainError> {
        let keys = parse_sort(descriptor);
        if keys.is_empty() {
            self.order_by_descriptor(default)
        } else {
            self.order_by_sort_keys(&keys)
        }
    }

    /// Replace the ordering with a key computed by `key`
    #[must_use]
    pub fn order_by_key<F>(mut self, label: &str, direction: SortDirection, key: F) -> Self
    where
        F: Fn(&T) -> FieldValue + Send + Sync + 'static,
    {
        self.order.clear();
        self.order.push(OrderKey::new(label, direction, Arc::new(key)));
        self
    }

    /// Append a tie-breaker computed by `key`
    #[must_use]
    pub fn then_by_key<F>(mut self, label: &str, direction: SortDirection, key: F) -> Self
    where
        F: Fn(&T) -> FieldValue + Send + Sync + 'static,
    {
        self.order.push(OrderKey::new(label, direction, Arc::new(key)));
        self
    }

    pub fn build(self) -> Specification<T> {
        Specification {
            criteria: self.criteria,
            includes: self.includes,
            order: self.order,
        }
    }

    fn push_path(
        mut self,
        path: &str,
        direction: SortDirection,
        replace: bool,
    ) -> Result<Self, DomainError> {
        let field = T::field_registry().resolve(path)?;
        if replace {
            self.order.clear();
        }
        self.order
            .push(OrderKey::new(field.path(), direction, field.accessor()));
        Ok(self)
    }
}
