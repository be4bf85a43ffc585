//! Lazy query descriptions
//!
//! An [`EntityQuery`] describes filter, eager-load hints, ordering and paging
//! over one entity type without touching any data. Stores receive the
//! description and decide how to execute it; [`EntityQuery::execute`] is the
//! reference in-process execution they can fall back to.

mod evaluator;

use std::{cmp::Ordering, fmt, sync::Arc};

use domain::{
    Entity,
    specification::{OrderKey, Predicate, compare_by_keys},
};

pub use evaluator::SpecificationEvaluator;

/// Unmaterialized query over `T`
pub struct EntityQuery<T: Entity> {
    id: Option<T::Id>,
    criteria: Option<Predicate<T>>,
    includes: Vec<String>,
    order: Vec<OrderKey<T>>,
    skip: u64,
    take: Option<u64>,
}

impl<T: Entity> EntityQuery<T> {
    /// Query over every row, unordered
    pub fn new() -> Self {
        Self {
            id: None,
            criteria: None,
            includes: Vec::new(),
            order: Vec::new(),
            skip: 0,
            take: None,
        }
    }

    /// Restrict to the row with this identifier
    #[must_use]
    pub fn with_id(mut self, id: T::Id) -> Self {
        self.id = Some(id);
        self
    }

    /// Add a predicate, combined with any existing one using AND
    #[must_use]
    pub fn filter_predicate(mut self, predicate: Predicate<T>) -> Self {
        let combined: Predicate<T> = match self.criteria.take() {
            None => predicate,
            Some(existing) => Arc::new(move |item: &T| existing(item) && predicate(item)),
        };
        self.criteria = Some(combined);
        self
    }

    /// Add a predicate closure, combined using AND
    #[must_use]
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter_predicate(Arc::new(predicate))
    }

    /// Add an eager-load hint
    #[must_use]
    pub fn include(mut self, relation: impl Into<String>) -> Self {
        self.includes.push(relation.into());
        self
    }

    /// Drop all eager-load hints
    #[must_use]
    pub fn without_includes(mut self) -> Self {
        self.includes.clear();
        self
    }

    /// Make `key` the primary ordering, discarding previous keys
    #[must_use]
    pub fn order_by(mut self, key: OrderKey<T>) -> Self {
        self.order.clear();
        self.order.push(key);
        self
    }

    /// Append `key` as a tie-breaker for the existing ordering
    #[must_use]
    pub fn then_by(mut self, key: OrderKey<T>) -> Self {
        self.order.push(key);
        self
    }

    /// Skip the first `count` matching rows
    #[must_use]
    pub const fn skip(mut self, count: u64) -> Self {
        self.skip = count;
        self
    }

    /// Return at most `count` rows
    #[must_use]
    pub const fn take(mut self, count: u64) -> Self {
        self.take = Some(count);
        self
    }

    /// Drop skip/take
    #[must_use]
    pub const fn without_paging(mut self) -> Self {
        self.skip = 0;
        self.take = None;
        self
    }

    pub const fn id(&self) -> Option<&T::Id> {
        self.id.as_ref()
    }

    pub const fn is_filtered(&self) -> bool {
        self.criteria.is_some() || self.id.is_some()
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn order(&self) -> &[OrderKey<T>] {
        &self.order
    }

    pub const fn skip_count(&self) -> u64 {
        self.skip
    }

    pub const fn take_count(&self) -> Option<u64> {
        self.take
    }

    /// Whether `item` passes the identifier and predicate filters
    pub fn matches(&self, item: &T) -> bool {
        self.id.as_ref().is_none_or(|id| item.id() == id)
            && self.criteria.as_ref().is_none_or(|predicate| predicate(item))
    }

    /// Compare two items under the query ordering
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        compare_by_keys(&self.order, a, b)
    }

    /// Execute the description over an in-memory sequence
    ///
    /// Filters, sorts stably by the ordering keys (rows tied on every key keep
    /// their input order), then applies skip and take.
    pub fn execute<I>(&self, items: I) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
    {
        let mut matched: Vec<T> = items.into_iter().filter(|item| self.matches(item)).collect();
        if !self.order.is_empty() {
            matched.sort_by(|a, b| self.compare(a, b));
        }
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let take = self
            .take
            .map_or(usize::MAX, |t| usize::try_from(t).unwrap_or(usize::MAX));
        matched.into_iter().skip(skip).take(take).collect()
    }

    /// Number of rows this query yields from `items`, honouring skip/take
    pub fn count_in<'a, I>(&self, items: I) -> u64
    where
        I: IntoIterator<Item = &'a T>,
    {
        let matched = items.into_iter().filter(|item| self.matches(item)).count();
        let remaining = (matched as u64).saturating_sub(self.skip);
        self.take.map_or(remaining, |take| remaining.min(take))
    }
}

impl<T: Entity> Default for EntityQuery<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Clone for EntityQuery<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            criteria: self.criteria.clone(),
            includes: self.includes.clone(),
            order: self.order.clone(),
            skip: self.skip,
            take: self.take,
        }
    }
}

impl<T: Entity> fmt::Debug for EntityQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityQuery")
            .field("entity", &T::ENTITY_NAME)
            .field("id", &self.id)
            .field("filtered", &self.criteria.is_some())
            .field("includes", &self.includes)
            .field("order", &self.order)
            .field("skip", &self.skip)
            .field("take", &self.take)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::LazyLock;

    use domain::{Entity, FieldRegistry, HasFields, Projection};

    #[derive(Debug, Clone, PartialEq)]
    pub struct Supplier {
        pub name: String,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Product {
        pub id: u32,
        pub name: String,
        pub date: i64,
        pub supplier: Option<Supplier>,
    }

    impl HasFields for Supplier {
        fn field_registry() -> &'static FieldRegistry<Self> {
            static REGISTRY: LazyLock<FieldRegistry<Supplier>> = LazyLock::new(|| {
                FieldRegistry::builder("Supplier")
                    .field("Name", |s: &Supplier| s.name.as_str().into())
                    .build()
            });
            &REGISTRY
        }
    }

    impl HasFields for Product {
        fn field_registry() -> &'static FieldRegistry<Self> {
            static REGISTRY: LazyLock<FieldRegistry<Product>> = LazyLock::new(|| {
                FieldRegistry::builder("Product")
                    .field("Id", |p: &Product| p.id.into())
                    .field("Name", |p: &Product| p.name.as_str().into())
                    .field("Date", |p: &Product| p.date.into())
                    .nested("Supplier", |p: &Product| p.supplier.as_ref())
                    .build()
            });
            &REGISTRY
        }
    }

    impl Entity for Product {
        type Id = u32;
        const ENTITY_NAME: &'static str = "Product";

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    /// Name-only projection
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ProductName(pub String);

    impl Projection<Product> for ProductName {
        fn project(entity: &Product) -> Self {
            Self(entity.name.clone())
        }
    }

    pub fn product(id: u32, name: &str, date: i64) -> Product {
        Product {
            id,
            name: name.to_string(),
            date,
            supplier: None,
        }
    }

    /// Four rows with a duplicated name at different dates
    pub fn four_rows() -> Vec<Product> {
        vec![
            product(1, "B", 1),
            product(2, "A", 1),
            product(3, "A", 3),
            product(4, "C", 2),
        ]
    }
}

#[cfg(test)]
mod tests {
    use domain::{HasFields, SortDirection, Specification};

    use super::{fixtures::*, *};

    fn ids(rows: &[Product]) -> Vec<u32> {
        rows.iter().map(|p| p.id).collect()
    }

    #[test]
    fn unfiltered_query_keeps_input_order() {
        let rows = EntityQuery::<Product>::new().execute(four_rows());
        assert_eq!(ids(&rows), vec![1, 2, 3, 4]);
    }

    #[test]
    fn filters_combine_with_and() {
        let query = EntityQuery::<Product>::new()
            .filter(|p: &Product| p.name == "A")
            .filter(|p: &Product| p.date > 1);
        assert_eq!(ids(&query.execute(four_rows())), vec![3]);
    }

    #[test]
    fn id_restriction_applies_with_predicate() {
        let query = EntityQuery::<Product>::new()
            .with_id(2)
            .filter(|p: &Product| p.name == "A");
        assert_eq!(ids(&query.execute(four_rows())), vec![2]);

        let miss = EntityQuery::<Product>::new()
            .with_id(2)
            .filter(|p: &Product| p.name == "B");
        assert!(miss.execute(four_rows()).is_empty());
    }

    #[test]
    fn skip_and_take_page_through_sorted_rows() {
        let spec = Specification::<Product>::builder()
            .order_by("Id")
            .unwrap()
            .build();
        let query = SpecificationEvaluator::apply(EntityQuery::new(), Some(&spec))
            .skip(1)
            .take(2);
        assert_eq!(ids(&query.execute(four_rows())), vec![2, 3]);
        assert_eq!(query.count_in(&four_rows()), 2);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let rows = vec![product(1, "A", 1), product(2, "A", 1), product(3, "A", 1)];
        let query = EntityQuery::<Product>::new().order_by(OrderKey::new(
            "Name",
            SortDirection::Descending,
            Product::field_registry().resolve("Name").unwrap().accessor(),
        ));
        assert_eq!(ids(&query.execute(rows)), vec![1, 2, 3]);
    }

    #[test]
    fn count_ignores_rows_skipped_past_the_end() {
        let query = EntityQuery::<Product>::new().skip(10);
        assert_eq!(query.count_in(&four_rows()), 0);
    }

    #[test]
    fn without_paging_and_includes_reset_hints() {
        let query = EntityQuery::<Product>::new()
            .include("Supplier")
            .skip(3)
            .take(1)
            .without_paging()
            .without_includes();
        assert!(query.includes().is_empty());
        assert_eq!(query.skip_count(), 0);
        assert_eq!(query.take_count(), None);
    }
}
