use std::collections::HashMap;

use humanosync_core::extraction::ExtractionState;
use humanosync_core::types::{Timestamp, VideoId};
use tokio::sync::RwLock;

/// Last known state of one video's extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEntry {
    pub state: ExtractionState,
    pub updated_at: Timestamp,
}

/// In-process extraction status, keyed by video id.
///
/// Advisory only: entries are lost on restart, so a missing id means
/// "unknown", not "not started". Thread-safe via interior `RwLock`; wrap in
/// `Arc` to share between the HTTP layer and extraction tasks.
#[derive(Debug, Default)]
pub struct StatusStore {
    entries: RwLock<HashMap<VideoId, StatusEntry>>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `state` for a video, replacing any previous entry.
    pub async fn set(&self, video_id: &str, state: ExtractionState) {
        let entry = StatusEntry {
            state,
            updated_at: chrono::Utc::now(),
        };
        self.entries
            .write()
            .await
            .insert(video_id.to_string(), entry);
    }

    pub async fn get(&self, video_id: &str) -> Option<StatusEntry> {
        self.entries.read().await.get(video_id).cloned()
    }
}
