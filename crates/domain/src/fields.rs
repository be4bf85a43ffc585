//! Field registries and property-path resolution
//!
//! Every queryable type declares an explicit [`FieldRegistry`] mapping member
//! names to accessors. Dotted paths such as `Supplier.Name` are resolved one
//! segment at a time, descending into the registry of the nested type, and
//! yield a typed accessor producing a totally ordered [`FieldValue`].
//!
//! # Examples
//!
//! ```
//! use std::sync::LazyLock;
//! use domain::fields::{FieldRegistry, FieldValue, HasFields};
//!
//! struct City {
//!     name: String,
//! }
//!
//! struct Customer {
//!     name: String,
//!     city: Option<City>,
//! }
//!
//! impl HasFields for City {
//!     fn field_registry() -> &'static FieldRegistry<Self> {
//!         static REGISTRY: LazyLock<FieldRegistry<City>> = LazyLock::new(|| {
//!             FieldRegistry::builder("City")
//!                 .field("Name", |c: &City| c.name.as_str().into())
//!                 .build()
//!         });
//!         &REGISTRY
//!     }
//! }
//!
//! impl HasFields for Customer {
//!     fn field_registry() -> &'static FieldRegistry<Self> {
//!         static REGISTRY: LazyLock<FieldRegistry<Customer>> = LazyLock::new(|| {
//!             FieldRegistry::builder("Customer")
//!                 .field("Name", |c: &Customer| c.name.as_str().into())
//!                 .nested("City", |c: &Customer| c.city.as_ref())
//!                 .build()
//!         });
//!         &REGISTRY
//!     }
//! }
//!
//! let path = Customer::field_registry().resolve("city.name").unwrap();
//! let customer = Customer { name: "Ada".into(), city: Some(City { name: "Oslo".into() }) };
//! assert_eq!(path.value(&customer), FieldValue::from("Oslo"));
//! assert!(Customer::field_registry().resolve("City.Zip").is_err());
//! ```

use std::{cmp::Ordering, fmt, sync::Arc};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::DomainError;

/// Comparable value read from an entity member
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Absent value; sorts before every other value
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
}

impl FieldValue {
    /// Ordering rank between unrelated variants
    const fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Integer(_) | Self::Float(_) => 2,
            Self::Text(_) => 3,
            Self::Timestamp(_) => 4,
            Self::Uuid(_) => 5,
        }
    }

    /// Whether this is [`FieldValue::Null`]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Signed zeros compare equal
fn canonical_float(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

/// Exact ordering of an integer against a float, consistent with
/// [`f64::total_cmp`] for NaN and infinities
fn cmp_integer_float(int: i64, float: f64) -> Ordering {
    // 2^63, the smallest float above i64::MAX
    const I64_END: f64 = 9_223_372_036_854_775_808.0;

    if float.is_nan() {
        return if float.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if float >= I64_END {
        return Ordering::Less;
    }
    if float < -I64_END {
        return Ordering::Greater;
    }

    let whole = float.trunc();
    #[allow(clippy::cast_possible_truncation)]
    let whole_int = whole as i64;
    int.cmp(&whole_int)
        .then_with(|| 0.0_f64.total_cmp(&canonical_float(float - whole)))
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => {
                canonical_float(*a).total_cmp(&canonical_float(*b))
            },
            (Self::Integer(a), Self::Float(b)) => cmp_integer_float(*a, *b),
            (Self::Float(a), Self::Integer(b)) => cmp_integer_float(*b, *a).reverse(),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            (Self::Uuid(a), Self::Uuid(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FieldValue {}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Timestamp(v) => f.write_str(&v.to_rfc3339()),
            Self::Uuid(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&String> for FieldValue {
    fn from(v: &String) -> Self {
        Self::Text(v.clone())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<Uuid> for FieldValue {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl<V: Into<Self>> From<Option<V>> for FieldValue {
    fn from(v: Option<V>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Type-erased accessor reading one (possibly nested) member of `T`
pub type Accessor<T> = Arc<dyn Fn(&T) -> FieldValue + Send + Sync>;

/// Resolves the remaining path segments below a nested member
type NestedResolver<T> = Arc<dyn Fn(&[&str]) -> Result<Accessor<T>, String> + Send + Sync>;

enum FieldNode<T> {
    Scalar(Accessor<T>),
    Nested(NestedResolver<T>),
}

struct FieldEntry<T> {
    name: &'static str,
    node: FieldNode<T>,
}

/// Types that expose a static field registry
pub trait HasFields: Sized + Send + Sync + 'static {
    /// The registry describing this type's queryable members
    fn field_registry() -> &'static FieldRegistry<Self>;
}

/// Explicit mapping from member names of `T` to accessors
pub struct FieldRegistry<T> {
    type_name: &'static str,
    entries: Vec<FieldEntry<T>>,
}

impl<T: 'static> FieldRegistry<T> {
    /// Start a registry for the named type
    pub const fn builder(type_name: &'static str) -> FieldRegistryBuilder<T> {
        FieldRegistryBuilder {
            type_name,
            entries: Vec::new(),
        }
    }

    /// Name of the described type
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Registered top-level member names, in registration order
    pub fn member_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    /// Resolve a dotted path into an accessor
    ///
    /// Segments are matched case-insensitively. Fails with
    /// [`DomainError::FieldNotFound`] naming the first segment that does not
    /// match a member of the type reached so far.
    pub fn resolve(&self, path: &str) -> Result<FieldPath<T>, DomainError> {
        let path = path.trim();
        let segments: Vec<&str> = path.split('.').map(str::trim).collect();
        self.resolve_segments(&segments)
            .map(|accessor| FieldPath {
                path: path.to_string(),
                accessor,
            })
            .map_err(|segment| DomainError::field_not_found(path, segment))
    }

    /// Whether `path` resolves against this registry
    pub fn contains(&self, path: &str) -> bool {
        self.resolve(path).is_ok()
    }

    fn find(&self, name: &str) -> Option<&FieldEntry<T>> {
        if name.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    /// Err carries the failing segment
    fn resolve_segments(&self, segments: &[&str]) -> Result<Accessor<T>, String> {
        let (head, rest) = segments.split_first().ok_or_else(String::new)?;
        let entry = self.find(head).ok_or_else(|| (*head).to_string())?;

        match (&entry.node, rest.first()) {
            (FieldNode::Scalar(accessor), None) => Ok(Arc::clone(accessor)),
            (FieldNode::Scalar(_), Some(next)) => Err((*next).to_string()),
            // A nested object has no ordering of its own
            (FieldNode::Nested(_), None) => Err((*head).to_string()),
            (FieldNode::Nested(resolver), Some(_)) => resolver(rest),
        }
    }
}

impl<T> fmt::Debug for FieldRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("type_name", &self.type_name)
            .field(
                "members",
                &self.entries.iter().map(|e| e.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Builder for [`FieldRegistry`]
pub struct FieldRegistryBuilder<T> {
    type_name: &'static str,
    entries: Vec<FieldEntry<T>>,
}

impl<T: 'static> FieldRegistryBuilder<T> {
    /// Register a scalar member
    #[must_use]
    pub fn field<F>(mut self, name: &'static str, accessor: F) -> Self
    where
        F: Fn(&T) -> FieldValue + Send + Sync + 'static,
    {
        self.entries.push(FieldEntry {
            name,
            node: FieldNode::Scalar(Arc::new(accessor)),
        });
        self
    }

    /// Register a nested member whose own registry resolves deeper segments
    ///
    /// When `project` returns `None` every path below the member reads as
    /// [`FieldValue::Null`].
    #[must_use]
    pub fn nested<U, P>(mut self, name: &'static str, project: P) -> Self
    where
        U: HasFields,
        P: for<'a> Fn(&'a T) -> Option<&'a U> + Send + Sync + 'static,
    {
        let project = Arc::new(project);
        let resolver: NestedResolver<T> = Arc::new(move |rest: &[&str]| {
            let inner = U::field_registry().resolve_segments(rest)?;
            let project = Arc::clone(&project);
            let accessor: Accessor<T> = Arc::new(move |item: &T| {
                project(item).map_or(FieldValue::Null, |nested| inner(nested))
            });
            Ok(accessor)
        });
        self.entries.push(FieldEntry {
            name,
            node: FieldNode::Nested(resolver),
        });
        self
    }

    /// Finish the registry
    pub fn build(self) -> FieldRegistry<T> {
        FieldRegistry {
            type_name: self.type_name,
            entries: self.entries,
        }
    }
}

/// A resolved field path bound to its accessor
pub struct FieldPath<T> {
    path: String,
    accessor: Accessor<T>,
}

impl<T> FieldPath<T> {
    /// The path as supplied (trimmed)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Read the value from an item
    pub fn value(&self, item: &T) -> FieldValue {
        (self.accessor)(item)
    }

    /// Shared handle to the accessor
    pub fn accessor(&self) -> Accessor<T> {
        Arc::clone(&self.accessor)
    }
}

impl<T> Clone for FieldPath<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            accessor: Arc::clone(&self.accessor),
        }
    }
}

impl<T> fmt::Debug for FieldPath<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldPath")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
