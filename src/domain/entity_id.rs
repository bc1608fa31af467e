//! Entity identifier.
//!
//! [`EntityId`] is a newtype around an arbitrary string so that entity keys
//! cannot be confused with field names or session identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of one entity in the world.
///
/// No format constraints: any string the client chooses (e.g. `"sprite1"`)
/// is a valid id. Serialized transparently as a JSON string so it can be
/// used directly as an object key on the wire.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Creates an `EntityId` from anything string-like.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}
