//! Entity store port
//!
//! A store executes [`EntityQuery`] descriptions for one entity type inside
//! one tenant's data source, and applies staged changes as a single unit.

use std::pin::Pin;

use async_trait::async_trait;
use domain::Entity;
use futures::{Stream, StreamExt, TryStreamExt};

use crate::{error::ApplicationError, query::EntityQuery};

/// Rows streamed out of a store
pub type EntityStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T, ApplicationError>> + Send + 'a>>;

/// One staged mutation
#[derive(Debug, Clone, PartialEq)]
pub enum StagedChange<T> {
    /// New row
    Insert(T),
    /// Full replace of the row with the same identifier
    Update(T),
    /// Delete of the row with the same identifier
    Remove(T),
}

impl<T: Entity> StagedChange<T> {
    pub const fn entity(&self) -> &T {
        match self {
            Self::Insert(e) | Self::Update(e) | Self::Remove(e) => e,
        }
    }

    pub fn id(&self) -> &T::Id {
        self.entity().id()
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Remove(_) => "remove",
        }
    }
}

/// Ordered set of staged mutations committed together
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet<T> {
    changes: Vec<StagedChange<T>>,
}

impl<T> ChangeSet<T> {
    pub const fn new() -> Self {
        Self {
            changes: Vec::new(),
        }
    }

    pub fn push(&mut self, change: StagedChange<T>) {
        self.changes.push(change);
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StagedChange<T>> {
        self.changes.iter()
    }

    /// Remove and return the first `count` changes
    pub fn drain_front(&mut self, count: usize) -> Vec<StagedChange<T>> {
        let count = count.min(self.changes.len());
        self.changes.drain(..count).collect()
    }
}

impl<T> Default for ChangeSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntoIterator for ChangeSet<T> {
    type Item = StagedChange<T>;
    type IntoIter = std::vec::IntoIter<StagedChange<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ChangeSet<T> {
    type Item = &'a StagedChange<T>;
    type IntoIter = std::slice::Iter<'a, StagedChange<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

impl<T> FromIterator<StagedChange<T>> for ChangeSet<T> {
    fn from_iter<I: IntoIterator<Item = StagedChange<T>>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}

/// Port for reading and writing entities of one type
///
/// Implementations are bound to a single tenant. Shared-store implementations
/// must apply the tenant filter to every statement they run.
#[async_trait]
pub trait EntityStore<T: Entity>: Send + Sync {
    /// Stream the rows `query` yields, in query order
    fn stream<'a>(&'a self, query: &'a EntityQuery<T>) -> EntityStream<'a, T>;

    /// Number of rows `query` yields, honouring skip/take
    async fn count(&self, query: &EntityQuery<T>) -> Result<u64, ApplicationError>;

    /// Apply every change or none of them, returning the affected row count
    async fn commit(&self, changes: ChangeSet<T>) -> Result<u64, ApplicationError>;

    /// Materialize the rows `query` yields
    async fn fetch(&self, query: &EntityQuery<T>) -> Result<Vec<T>, ApplicationError> {
        self.stream(query).try_collect().await
    }

    /// Whether `query` yields at least one row
    async fn any(&self, query: &EntityQuery<T>) -> Result<bool, ApplicationError> {
        let limited = query.clone().take(1);
        let first = self.stream(&limited).next().await;
        first.transpose().map(|row| row.is_some())
    }

    /// Load the stored row with this identifier
    async fn find(&self, id: &T::Id) -> Result<Option<T>, ApplicationError> {
        let query = EntityQuery::new().with_id(id.clone()).take(1);
        let mut rows = self.fetch(&query).await?;
        Ok(rows.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::fixtures::{Product, product};

    #[test]
    fn staged_change_exposes_entity_and_kind() {
        let change = StagedChange::Remove(product(9, "Z", 0));
        assert_eq!(*change.id(), 9);
        assert_eq!(change.kind(), "remove");
        assert_eq!(change.entity().name, "Z");
    }

    #[test]
    fn drain_front_keeps_later_changes() {
        let mut changes: ChangeSet<Product> = [
            StagedChange::Insert(product(1, "A", 0)),
            StagedChange::Insert(product(2, "B", 0)),
            StagedChange::Update(product(1, "A2", 0)),
        ]
        .into_iter()
        .collect();

        let drained = changes.drain_front(2);
        assert_eq!(drained.len(), 2);
        assert_eq!(changes.len(), 1);
        assert!(matches!(changes.iter().next(), Some(StagedChange::Update(_))));

        assert_eq!(changes.drain_front(10).len(), 1);
        assert!(changes.is_empty());
    }

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<S: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn EntityStore<Product>>();
    }
}
