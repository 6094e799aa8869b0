//! Shared response payload types for API handlers.
//!
//! Annotation reads return the stored artifact as-is; these types cover the
//! acknowledgements returned by uploads and edits.

use serde::Serialize;

/// `{ "message": ... }` acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
