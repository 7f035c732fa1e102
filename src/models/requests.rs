//! Request DTOs for the content gateway API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for content generation (POST /api/ai)
///
/// # Fields
/// - `object_name`: The object the camera recognised (e.g. "tree")
/// - `subject`: The school subject to frame the content in (e.g. "biology")
///
/// Both fields are optional at the wire level so that a missing field is
/// reported as a validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    /// Name of the recognised object
    #[serde(default)]
    pub object_name: Option<String>,
    /// Subject perspective
    #[serde(default)]
    pub subject: Option<String>,
}

/// A content request whose fields passed validation.
///
/// Values are trimmed but keep their original casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidContentRequest {
    pub object_name: String,
    pub subject: String,
}

impl ContentRequest {
    /// Creates a request from raw field values.
    pub fn new(object_name: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            object_name: Some(object_name.into()),
            subject: Some(subject.into()),
        }
    }

    /// Validates the request data
    ///
    /// Returns the trimmed fields if both are present and non-empty,
    /// or an error message otherwise.
    pub fn validate(&self) -> Result<ValidContentRequest, String> {
        let object_name = self.object_name.as_deref().map(str::trim).unwrap_or("");
        let subject = self.subject.as_deref().map(str::trim).unwrap_or("");

        if object_name.is_empty() || subject.is_empty() {
            return Err("Missing objectName or subject".to_string());
        }

        Ok(ValidContentRequest {
            object_name: object_name.to_string(),
            subject: subject.to_string(),
        })
    }
}
