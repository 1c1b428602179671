//! UUID v7 utilities for time-ordered identifiers.
//!
//! Applications and documents are keyed by UUIDv7, which embeds a
//! millisecond Unix timestamp in its first 48 bits, so IDs sort roughly in
//! creation order. Request ids use the same version.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
///
/// # Example
///
/// ```
/// use visa_core::uuid_utils::{is_v7, new_v7};
///
/// let id = new_v7();
/// assert!(is_v7(&id));
/// ```
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Check if a UUID is version 7.
#[inline]
pub fn is_v7(uuid: &Uuid) -> bool {
    uuid.get_version_num() == 7
}
