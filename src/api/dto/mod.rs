//! Data Transfer Objects for REST request/response serialization.

pub mod entity_dto;
pub mod system_dto;

pub use entity_dto::*;
pub use system_dto::*;
