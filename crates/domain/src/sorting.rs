//! Sort descriptors
//!
//! A sort descriptor is a comma-separated list of field paths, each optionally
//! prefixed with `-` for descending order:
//!
//! ```
//! use domain::sorting::{SortDirection, parse_sort};
//!
//! let keys = parse_sort("Name,-CreatedOn,Address.City");
//! assert_eq!(keys.len(), 3);
//! assert_eq!(keys[1].field_path(), "CreatedOn");
//! assert_eq!(keys[1].direction(), SortDirection::Descending);
//! ```

use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};

/// Direction of a single sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Apply this direction to an ascending comparison result
    #[must_use]
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }

    pub const fn is_descending(self) -> bool {
        matches!(self, Self::Descending)
    }
}

/// One parsed entry of a sort descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    field_path: String,
    direction: SortDirection,
}

impl SortKey {
    pub fn new(field_path: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field_path: field_path.into(),
            direction,
        }
    }

    pub fn ascending(field_path: impl Into<String>) -> Self {
        Self::new(field_path, SortDirection::Ascending)
    }

    pub fn descending(field_path: impl Into<String>) -> Self {
        Self::new(field_path, SortDirection::Descending)
    }

    /// Dotted member path, unresolved
    pub fn field_path(&self) -> &str {
        &self.field_path
    }

    pub const fn direction(&self) -> SortDirection {
        self.direction
    }

    pub const fn is_descending(&self) -> bool {
        self.direction.is_descending()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_descending() {
            f.write_str("-")?;
        }
        f.write_str(&self.field_path)
    }
}

/// Parse a sort descriptor into ordered sort keys
///
/// Position in the returned list is tie-break precedence: the first key is
/// the primary sort. Blank input yields an empty list, blank segments are
/// skipped and duplicate paths are kept as given.
pub fn parse_sort(descriptor: &str) -> Vec<SortKey> {
    descriptor
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.strip_prefix('-') {
            Some(path) => SortKey::descending(path.trim()),
            None => SortKey::ascending(segment),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_directions() {
        assert_eq!(
            parse_sort("Name,-Date"),
            vec![SortKey::ascending("Name"), SortKey::descending("Date")]
        );
    }

    #[test]
    fn parses_single_descending_key() {
        assert_eq!(parse_sort("-Name"), vec![SortKey::descending("Name")]);
    }

    #[test]
    fn empty_descriptor_yields_no_keys() {
        assert!(parse_sort("").is_empty());
        assert!(parse_sort("   ").is_empty());
    }

    #[test]
    fn trims_segments_and_skips_blanks() {
        assert_eq!(
            parse_sort(" Name , ,- Supplier.Name "),
            vec![
                SortKey::ascending("Name"),
                SortKey::descending("Supplier.Name")
            ]
        );
    }

    #[test]
    fn keeps_duplicates_in_order() {
        let keys = parse_sort("Name,-Name");
        assert_eq!(
            keys,
            vec![SortKey::ascending("Name"), SortKey::descending("Name")]
        );
    }

    #[test]
    fn display_round_trips_descriptor() {
        let rendered: Vec<String> = parse_sort("Name,-Date")
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(rendered.join(","), "Name,-Date");
    }

    #[test]
    fn direction_reverses_ordering() {
        assert_eq!(
            SortDirection::Descending.apply(Ordering::Less),
            Ordering::Greater
        );
        assert_eq!(SortDirection::Ascending.apply(Ordering::Less), Ordering::Less);
    }
}
