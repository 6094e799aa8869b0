use humanosync_core::error::CoreError;

/// Errors from the file-backed annotation store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A domain-level error (missing artifact, bad frame key, bad index).
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed annotation file: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::Core(CoreError::NotFound {
            entity,
            id: id.into(),
        })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Core(CoreError::NotFound { .. }))
    }
}
