//! Applies a [`Specification`] to an [`EntityQuery`]

use domain::{Entity, Specification};

use super::EntityQuery;

/// Composes specifications onto query descriptions
///
/// The evaluator never touches data. It only extends the description, so
/// counting and paging later run against the unmaterialized query.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecificationEvaluator;

impl SpecificationEvaluator {
    /// Apply filter, eager-load hints and ordering from `spec`
    ///
    /// `None` returns the query unchanged.
    pub fn apply<T: Entity>(query: EntityQuery<T>, spec: Option<&Specification<T>>) -> EntityQuery<T> {
        let Some(spec) = spec else {
            return query;
        };

        let query = Self::apply_filter(query, spec);
        let query = spec
            .includes()
            .iter()
            .fold(query, |query, relation| query.include(relation.clone()));
        Self::apply_order(query, spec)
    }

    /// Apply filter and ordering only, for reads that project rows
    pub fn apply_for_projection<T: Entity>(
        query: EntityQuery<T>,
        spec: Option<&Specification<T>>,
    ) -> EntityQuery<T> {
        let Some(spec) = spec else {
            return query;
        };
        let query = Self::apply_filter(query, spec);
        Self::apply_order(query, spec)
    }

    fn apply_filter<T: Entity>(query: EntityQuery<T>, spec: &Specification<T>) -> EntityQuery<T> {
        match spec.criteria() {
            Some(predicate) => query.filter_predicate(predicate.clone()),
            None => query,
        }
    }

    fn apply_order<T: Entity>(query: EntityQuery<T>, spec: &Specification<T>) -> EntityQuery<T> {
        let mut keys = spec.order().iter().cloned();
        let Some(primary) = keys.next() else {
            return query;
        };
        keys.fold(query.order_by(primary), EntityQuery::then_by)
    }
}

#[cfg(test)]
mod tests {
    use domain::{FilterOp, SortDirection};

    use super::*;
    use crate::query::fixtures::{Product, Supplier, four_rows, product};

    fn names_and_dates(rows: &[Product]) -> Vec<(String, i64)> {
        rows.iter().map(|p| (p.name.clone(), p.date)).collect()
    }

    #[test]
    fn missing_specification_leaves_query_untouched() {
        let query = EntityQuery::<Product>::new().include("Supplier").take(2);
        let applied = SpecificationEvaluator::apply(query, None);

        assert_eq!(applied.includes(), ["Supplier".to_string()]);
        assert_eq!(applied.take_count(), Some(2));
        assert!(applied.order().is_empty());
        assert!(!applied.is_filtered());
    }

    #[test]
    fn name_then_descending_date() {
        let spec = Specification::<Product>::builder()
            .order_by_descriptor("Name,-Date")
            .unwrap()
            .build();
        let rows = SpecificationEvaluator::apply(EntityQuery::new(), Some(&spec)).execute(four_rows());

        assert_eq!(
            names_and_dates(&rows),
            vec![
                ("A".to_string(), 3),
                ("A".to_string(), 1),
                ("B".to_string(), 1),
                ("C".to_string(), 2),
            ]
        );
    }

    #[test]
    fn specification_filter_is_anded_with_existing_filter() {
        let spec = Specification::<Product>::builder()
            .filter_field("Name", FilterOp::Eq, "A")
            .unwrap()
            .build();
        let query = EntityQuery::<Product>::new().filter(|p: &Product| p.date >= 2);
        let rows = SpecificationEvaluator::apply(query, Some(&spec)).execute(four_rows());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 3);
    }

    #[test]
    fn includes_are_carried_unless_projecting() {
        let spec = Specification::<Product>::builder().include("Supplier").build();

        let full = SpecificationEvaluator::apply(EntityQuery::new(), Some(&spec));
        assert_eq!(full.includes(), ["Supplier".to_string()]);

        let projected = SpecificationEvaluator::apply_for_projection(EntityQuery::new(), Some(&spec));
        assert!(projected.includes().is_empty());
    }

    #[test]
    fn specification_order_replaces_existing_primary_order() {
        let by_date = Specification::<Product>::builder()
            .order_by_descending("Date")
            .unwrap()
            .build();
        let by_name = Specification::<Product>::builder()
            .order_by("Name")
            .unwrap()
            .build();

        let query = SpecificationEvaluator::apply(EntityQuery::new(), Some(&by_date));
        let query = SpecificationEvaluator::apply(query, Some(&by_name));

        assert_eq!(query.order().len(), 1);
        assert_eq!(query.order()[0].label(), "Name");
        assert_eq!(query.order()[0].direction(), SortDirection::Ascending);
    }

    #[test]
    fn absent_nested_values_sort_first() {
        let mut with_supplier = product(1, "X", 1);
        with_supplier.supplier = Some(Supplier { name: "Acme".into() });
        let without_supplier = product(2, "Y", 1);

        let spec = Specification::<Product>::builder()
            .order_by("Supplier.Name")
            .unwrap()
            .build();
        let rows = SpecificationEvaluator::apply(EntityQuery::new(), Some(&spec))
            .execute(vec![with_supplier, without_supplier]);

        assert_eq!(rows.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2, 1]);
    }
}
