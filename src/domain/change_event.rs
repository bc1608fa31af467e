//! Change events emitted by the store after every accepted mutation.
//!
//! A [`ChangeEvent`] carries the post-mutation state of exactly one entity.
//! On the wire it is a single-key JSON object `{"<entity>": {..record..}}`,
//! the same shape subscribers send back to edit the world.

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{EntityId, EntityRecord};

/// Post-mutation state of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// Entity that changed.
    pub entity: EntityId,
    /// Full record of the entity after the mutation was applied.
    pub record: EntityRecord,
}

impl ChangeEvent {
    /// Creates a new event.
    #[must_use]
    pub fn new(entity: EntityId, record: EntityRecord) -> Self {
        Self { entity, record }
    }

    /// Encodes the event as a wire frame.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] if encoding fails.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for ChangeEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.entity, &self.record)?;
        map.end()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> EntityRecord {
        let serde_json::Value::Object(map) = value else {
            panic!("expected object");
        };
        map
    }

    #[test]
    fn frame_is_single_key_object() {
        let event = ChangeEvent::new(EntityId::from("sprite1"), record(json!({"x": 1, "y": 2})));
        let Ok(frame) = event.to_frame() else {
            panic!("encoding failed");
        };
        let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&frame) else {
            panic!("frame is not JSON");
        };
        assert_eq!(parsed, json!({"sprite1": {"x": 1, "y": 2}}));
    }

    #[test]
    fn empty_record_still_encodes() {
        let event = ChangeEvent::new(EntityId::from("ghost"), EntityRecord::new());
        assert_eq!(event.to_frame().ok().as_deref(), Some(r#"{"ghost":{}}"#));
    }
}
