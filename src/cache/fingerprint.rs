//! Request fingerprinting
//!
//! Derives the cache key for a content request.

/// Separator between the normalized fields. Not expected in object or
/// subject names.
pub const FINGERPRINT_SEPARATOR: &str = "::";

/// Returns the cache key for an `(object_name, subject)` pair.
///
/// Fields are trimmed and lower-cased, so requests that differ only in
/// case or surrounding whitespace share a key.
pub fn fingerprint(object_name: &str, subject: &str) -> String {
    format!(
        "{}{}{}",
        object_name.trim().to_lowercase(),
        FINGERPRINT_SEPARATOR,
        subject.trim().to_lowercase()
    )
}
