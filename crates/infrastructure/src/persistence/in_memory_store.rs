//! In-process entity store
//!
//! Rows live in a `Vec` behind a read-write lock, in insertion order. A
//! commit validates every staged change against a working copy and swaps it
//! in under one write lock, so either all changes land or none do.

use std::{fmt, sync::Arc};

use application::{
    error::ApplicationError,
    ports::{ChangeSet, EntityStore, EntityStream, StagedChange},
    query::EntityQuery,
};
use async_trait::async_trait;
use domain::Entity;
use futures::{StreamExt, stream};
use parking_lot::RwLock;
use tracing::{debug, instrument};

/// [`EntityStore`] kept entirely in memory
pub struct InMemoryEntityStore<T> {
    rows: Arc<RwLock<Vec<T>>>,
}

impl<T: Entity> fmt::Debug for InMemoryEntityStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryEntityStore")
            .field("collection", &T::ENTITY_NAME)
            .field("rows", &self.rows.read().len())
            .finish()
    }
}

/// Clones share the same rows
impl<T> Clone for InMemoryEntityStore<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<T: Entity> Default for InMemoryEntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> InMemoryEntityStore<T> {
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    /// Seed the store with existing rows
    pub fn with_rows(rows: Vec<T>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows)),
        }
    }

    /// Copy of every stored row in insertion order
    pub fn snapshot(&self) -> Vec<T> {
        self.rows.read().clone()
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    fn position(rows: &[T], id: &T::Id) -> Option<usize> {
        rows.iter().position(|row| row.id() == id)
    }

    fn violation(change: &StagedChange<T>, reason: &str) -> ApplicationError {
        ApplicationError::Storage(format!(
            "{} {} {reason}; {} rejected",
            T::ENTITY_NAME,
            change.id(),
            change.kind()
        ))
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for InMemoryEntityStore<T> {
    fn stream<'a>(&'a self, query: &'a EntityQuery<T>) -> EntityStream<'a, T> {
        let rows = query.execute(self.snapshot());
        stream::iter(rows.into_iter().map(Ok::<T, ApplicationError>)).boxed()
    }

    async fn count(&self, query: &EntityQuery<T>) -> Result<u64, ApplicationError> {
        Ok(query.count_in(self.rows.read().iter()))
    }

    #[instrument(skip(self, changes), fields(collection = T::ENTITY_NAME, staged = changes.len()))]
    async fn commit(&self, changes: ChangeSet<T>) -> Result<u64, ApplicationError> {
        let mut rows = self.rows.write();
        let mut working = rows.clone();

        for change in &changes {
            let existing = Self::position(&working, change.id());
            match (change, existing) {
                (StagedChange::Insert(entity), None) => working.push(entity.clone()),
                (StagedChange::Insert(_), Some(_)) => {
                    return Err(Self::violation(change, "already exists"));
                },
                (StagedChange::Update(entity), Some(index)) => working[index] = entity.clone(),
                (StagedChange::Remove(_), Some(index)) => {
                    working.remove(index);
                },
                (StagedChange::Update(_) | StagedChange::Remove(_), None) => {
                    return Err(Self::violation(change, "no longer exists"));
                },
            }
        }

        *rows = working;
        let affected = changes.len() as u64;
        debug!(affected, "In-memory changes committed");
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use domain::{FieldRegistry, HasFields};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        id: u32,
        label: String,
    }

    impl HasFields for Tag {
        fn field_registry() -> &'static FieldRegistry<Self> {
            static REGISTRY: LazyLock<FieldRegistry<Tag>> = LazyLock::new(|| {
                FieldRegistry::builder("Tag")
                    .field("Id", |t: &Tag| t.id.into())
                    .field("Label", |t: &Tag| t.label.as_str().into())
                    .build()
            });
            &REGISTRY
        }
    }

    impl Entity for Tag {
        type Id = u32;
        const ENTITY_NAME: &'static str = "Tag";

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    fn tag(id: u32, label: &str) -> Tag {
        Tag {
            id,
            label: label.to_string(),
        }
    }

    fn changes(items: Vec<StagedChange<Tag>>) -> ChangeSet<Tag> {
        items.into_iter().collect()
    }

    #[tokio::test]
    async fn commit_applies_changes_in_order() {
        let store = InMemoryEntityStore::with_rows(vec![tag(1, "a")]);
        let affected = store
            .commit(changes(vec![
                StagedChange::Insert(tag(2, "b")),
                StagedChange::Update(tag(1, "a2")),
                StagedChange::Remove(tag(2, "b")),
            ]))
            .await
            .unwrap();

        assert_eq!(affected, 3);
        assert_eq!(store.snapshot(), vec![tag(1, "a2")]);
    }

    #[tokio::test]
    async fn duplicate_insert_applies_nothing() {
        let store = InMemoryEntityStore::with_rows(vec![tag(1, "a")]);
        let err = store
            .commit(changes(vec![
                StagedChange::Insert(tag(2, "b")),
                StagedChange::Insert(tag(1, "dup")),
            ]))
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::Storage(_)));
        assert_eq!(store.snapshot(), vec![tag(1, "a")]);
    }

    #[tokio::test]
    async fn missing_update_target_applies_nothing() {
        let store = InMemoryEntityStore::with_rows(vec![tag(1, "a")]);
        let err = store
            .commit(changes(vec![
                StagedChange::Remove(tag(1, "a")),
                StagedChange::Update(tag(7, "ghost")),
            ]))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Storage error: Tag 7 no longer exists; update rejected"
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn clones_share_rows() {
        let store = InMemoryEntityStore::<Tag>::new();
        let other = store.clone();
        store
            .commit(changes(vec![StagedChange::Insert(tag(1, "a"))]))
            .await
            .unwrap();
        assert_eq!(other.find(&1).await.unwrap(), Some(tag(1, "a")));
        assert!(!other.is_empty());
    }

    #[tokio::test]
    async fn stream_applies_query() {
        let store = InMemoryEntityStore::with_rows(vec![tag(1, "b"), tag(2, "a"), tag(3, "c")]);
        let query = EntityQuery::<Tag>::new()
            .filter(|t: &Tag| t.label != "c")
            .take(1);
        let rows = store.fetch(&query).await.unwrap();
        assert_eq!(rows, vec![tag(1, "b")]);
        assert_eq!(store.count(&query).await.unwrap(), 1);
    }
}
