use std::sync::Arc;

use humanosync_pipeline::{ExtractionJob, StatusStore};
use humanosync_store::AnnotationStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Per-video annotation artifacts under `config.data_dir`.
    pub store: Arc<AnnotationStore>,
    /// In-process extraction status, keyed by video id.
    pub status: Arc<StatusStore>,
    /// Extraction job spawned for every upload.
    pub job: Arc<ExtractionJob>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let store = AnnotationStore::new(config.data_dir.clone(), config.pipeline.indexing);
        let job = config.pipeline.build_job();
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            status: Arc::new(StatusStore::new()),
            job: Arc::new(job),
        }
    }
}
