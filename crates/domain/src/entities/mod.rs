//! Entity and projection contracts
//!
//! Entities are plain data structs. Identity is the typed identifier alone;
//! equality over all fields is what change tracking compares against.

use std::{fmt, hash::Hash};

use crate::fields::HasFields;

/// A domain record with a typed identifier
///
/// # Examples
///
/// ```
/// use std::sync::LazyLock;
/// use domain::{Entity, fields::{FieldRegistry, HasFields}};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Supplier {
///     id: u32,
///     name: String,
/// }
///
/// impl HasFields for Supplier {
///     fn field_registry() -> &'static FieldRegistry<Self> {
///         static REGISTRY: LazyLock<FieldRegistry<Supplier>> = LazyLock::new(|| {
///             FieldRegistry::builder("Supplier")
///                 .field("Id", |s: &Supplier| s.id.into())
///                 .field("Name", |s: &Supplier| s.name.as_str().into())
///                 .build()
///         });
///         &REGISTRY
///     }
/// }
///
/// impl Entity for Supplier {
///     type Id = u32;
///     const ENTITY_NAME: &'static str = "Supplier";
///
///     fn id(&self) -> &u32 {
///         &self.id
///     }
/// }
/// ```
pub trait Entity: HasFields + Clone + PartialEq + fmt::Debug {
    /// Identifier type
    type Id: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// Name used in errors, logs and as the storage collection
    const ENTITY_NAME: &'static str;

    fn id(&self) -> &Self::Id;
}

/// Output shape produced from an entity during a read
pub trait Projection<T>: Sized + Send + 'static {
    fn project(entity: &T) -> Self;
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use super::*;
    use crate::fields::FieldRegistry;

    #[derive(Debug, Clone, PartialEq)]
    struct Widget {
        id: u32,
        label: String,
    }

    impl HasFields for Widget {
        fn field_registry() -> &'static FieldRegistry<Self> {
            static REGISTRY: LazyLock<FieldRegistry<Widget>> = LazyLock::new(|| {
                FieldRegistry::builder("Widget")
                    .field("Label", |w: &Widget| w.label.as_str().into())
                    .build()
            });
            &REGISTRY
        }
    }

    impl Entity for Widget {
        type Id = u32;
        const ENTITY_NAME: &'static str = "Widget";

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    struct WidgetLabel(String);

    impl Projection<Widget> for WidgetLabel {
        fn project(entity: &Widget) -> Self {
            Self(entity.label.clone())
        }
    }

    #[test]
    fn projection_maps_entity() {
        let widget = Widget {
            id: 1,
            label: "gear".to_string(),
        };
        assert_eq!(WidgetLabel::project(&widget).0, "gear");
        assert_eq!(*widget.id(), 1);
        assert_eq!(Widget::ENTITY_NAME, "Widget");
    }
}
