//! Caller user identifier value object

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of the authenticated caller, as carried by the identity token
///
/// The value is opaque to this layer: it is attached to the tenant context
/// on a best-effort basis and never validated here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a user id claim value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_displays_raw_value() {
        let id = UserId::new("user-17");
        assert_eq!(id.to_string(), "user-17");
        assert_eq!(id.as_str(), "user-17");
    }
}
