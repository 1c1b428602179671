//! HTTP handlers for visa-api.

pub mod applications;
pub mod documents;
pub mod system;

use uuid::Uuid;

use crate::error::ApiError;

/// Parse a path id, reporting a malformed value as a client error.
pub(crate) fn parse_id(raw: &str, resource: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::BadRequest(format!("Invalid {} id", resource)))
}
