//! Inbound edit frames.
//!
//! Subscribers edit the world by sending text frames of the same shape the
//! server broadcasts: a JSON object mapping entity id to record,
//! `{"sprite1": {"x": 1, "y": 2}}`. The whole frame is validated before
//! anything is applied, so a bad frame never causes a partial mutation.
//! Entities are applied in the order they appear in the frame.

use crate::domain::{EntityId, EntityRecord, record_from_value};

/// Entity records to set, in the order they appeared in the payload.
pub type EditBatch = Vec<(EntityId, EntityRecord)>;

/// Reasons an inbound frame is rejected.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Payload is not JSON.
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload is JSON but not an object.
    #[error("frame must be a JSON object of entity records")]
    NotAnObject,

    /// One of the entity values is not an object.
    #[error("record for entity {0} is not a JSON object")]
    RecordNotObject(String),
}

/// Parses a text frame into the records it sets.
///
/// An empty object parses to an empty batch, which callers treat as a no-op.
///
/// # Errors
///
/// Returns a [`FrameError`] if the text is not a JSON object whose values
/// are all objects.
pub fn parse_edit_frame(text: &str) -> Result<EditBatch, FrameError> {
    parse_edit_value(serde_json::from_str(text)?)
}

/// Interprets an already parsed JSON value as a set of entity records.
///
/// # Errors
///
/// Returns a [`FrameError`] if the value is not an object whose values are
/// all objects.
pub fn parse_edit_value(value: serde_json::Value) -> Result<EditBatch, FrameError> {
    let serde_json::Value::Object(entries) = value else {
        return Err(FrameError::NotAnObject);
    };

    let mut batch = EditBatch::with_capacity(entries.len());
    for (entity, value) in entries {
        let Some(record) = record_from_value(value) else {
            return Err(FrameError::RecordNotObject(entity));
        };
        batch.push((EntityId::from(entity), record));
    }
    Ok(batch)
}
