//! Entity records and the world mapping.

use std::collections::BTreeMap;

use super::EntityId;

/// Schemaless record of one entity: field name to any JSON value.
///
/// Absent fields simply do not appear. An empty map is a valid record and is
/// what readers get back for entities that were never written.
pub type EntityRecord = serde_json::Map<String, serde_json::Value>;

/// The full store contents at an instant.
///
/// Ordered by id so snapshots serialize deterministically.
pub type World = BTreeMap<EntityId, EntityRecord>;

/// Interprets a JSON value as an [`EntityRecord`].
///
/// Returns `None` for anything that is not a JSON object.
#[must_use]
pub fn record_from_value(value: serde_json::Value) -> Option<EntityRecord> {
    match value {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    }
}
