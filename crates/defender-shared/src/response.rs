//! Error body returned by every rejected or failed request.

use serde::{Deserialize, Serialize};

/// `{"description": "..."}`
///
/// The description is a fixed, client-safe sentence. Internal details are
/// logged server-side and never placed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub description: String,
}

impl ErrorResponse {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new("Resource not found.")
    }

    pub fn internal_error() -> Self {
        Self::new("Internal server error.")
    }
}
