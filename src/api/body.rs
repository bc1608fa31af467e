//! Lenient JSON body extraction.
//!
//! Browser clients of the edit surface do not always send a JSON
//! `Content-Type`. [`JsonBody`] therefore parses the raw body as JSON
//! regardless of headers, unlike [`axum::Json`].

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};

use crate::domain::{EntityRecord, record_from_value};
use crate::error::SyncError;

/// Request body parsed as JSON regardless of `Content-Type`.
#[derive(Debug)]
pub struct JsonBody(pub serde_json::Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = SyncError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| SyncError::InvalidRequest(e.body_text()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(SyncError::InvalidRequest("empty request body".to_string()));
        }
        Ok(Self(serde_json::from_slice(&bytes)?))
    }
}

impl JsonBody {
    /// Requires the body to be a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidRequest`] for any other JSON value.
    pub fn into_record(self) -> Result<EntityRecord, SyncError> {
        record_from_value(self.0)
            .ok_or_else(|| SyncError::InvalidRequest("body must be a JSON object".to_string()))
    }
}
