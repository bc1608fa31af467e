//! Entity edit DTOs.

use utoipa::ToSchema;

use crate::domain::EntityRecord;
use crate::error::SyncError;

/// Request body for `POST /entity/{id}`.
///
/// `x` and `y` are required; `colour` and `radius` are applied only when
/// present. Any other field in the body is ignored.
#[derive(Debug, Clone, ToSchema)]
pub struct EntityEditRequest {
    /// Horizontal position.
    #[schema(value_type = Object)]
    pub x: serde_json::Value,
    /// Vertical position.
    #[schema(value_type = Object)]
    pub y: serde_json::Value,
    /// Optional colour.
    #[schema(value_type = Option<Object>)]
    pub colour: Option<serde_json::Value>,
    /// Optional radius.
    #[schema(value_type = Option<Object>)]
    pub radius: Option<serde_json::Value>,
}

impl EntityEditRequest {
    /// Picks the edit fields out of a request body.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MissingField`] if `x` or `y` is absent.
    pub fn from_record(body: &EntityRecord) -> Result<Self, SyncError> {
        let field = |name: &'static str| body.get(name).cloned();
        Ok(Self {
            x: field("x").ok_or(SyncError::MissingField("x"))?,
            y: field("y").ok_or(SyncError::MissingField("y"))?,
            colour: field("colour"),
            radius: field("radius"),
        })
    }

    /// Flattens the edit into fields, in application order.
    #[must_use]
    pub fn into_fields(self) -> EntityRecord {
        let mut fields = EntityRecord::new();
        fields.insert("x".to_string(), self.x);
        fields.insert("y".to_string(), self.y);
        if let Some(colour) = self.colour {
            fields.insert("colour".to_string(), colour);
        }
        if let Some(radius) = self.radius {
            fields.insert("radius".to_string(), radius);
        }
        fields
    }
}
