//! Identifier generation for stored documents.
//!
//! Documents are keyed by opaque strings. Store-generated IDs are UUIDv7 in
//! hyphenated form, so they sort by creation time; caller-supplied IDs are
//! accepted as-is unless blank.

use uuid::Uuid;

/// Generate a new store ID.
#[inline]
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

/// True if `id` parses as a UUIDv7, i.e. was generated by [`new_id`].
pub fn is_generated(id: &str) -> bool {
    Uuid::parse_str(id)
        .map(|u| u.get_version_num() == 7)
        .unwrap_or(false)
}

/// The ID, unless it is missing or blank.
///
/// Callers send `""` for "not yet assigned", so a blank ID never names an
/// entity.
pub fn present_id(id: Option<&str>) -> Option<&str> {
    id.filter(|s| !s.trim().is_empty())
}
