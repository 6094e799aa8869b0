//! Raw JSON artifact files for a single video directory.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use humanosync_core::pose::{ObjectMap, PoseMap};
use humanosync_core::segment::ActionSegment;
use humanosync_core::summary::{
    ProcessingSummary, ACTIONS_FILE, OBJECTS_FILE, POSE_FILE, SUMMARY_FILE,
};

use crate::error::StoreError;

/// Handle to one video's artifact directory.
///
/// Reads return `Ok(None)` when the file does not exist. Writes replace the
/// whole file; there is no locking, so concurrent writers of the same
/// artifact race and the last write wins.
#[derive(Debug, Clone)]
pub struct VideoArtifacts {
    dir: PathBuf,
}

impl VideoArtifacts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn exists(&self) -> Result<bool, StoreError> {
        Ok(tokio::fs::try_exists(&self.dir).await?)
    }

    pub async fn create(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    pub async fn read_pose(&self) -> Result<Option<PoseMap>, StoreError> {
        read_json(&self.dir.join(POSE_FILE)).await
    }

    pub async fn read_objects(&self) -> Result<Option<ObjectMap>, StoreError> {
        read_json(&self.dir.join(OBJECTS_FILE)).await
    }

    pub async fn read_actions(&self) -> Result<Option<Vec<ActionSegment>>, StoreError> {
        read_json(&self.dir.join(ACTIONS_FILE)).await
    }

    pub async fn read_summary(&self) -> Result<Option<ProcessingSummary>, StoreError> {
        read_json(&self.dir.join(SUMMARY_FILE)).await
    }

    pub async fn write_pose(&self, pose: &PoseMap) -> Result<(), StoreError> {
        self.write(POSE_FILE, pose).await
    }

    pub async fn write_objects(&self, objects: &ObjectMap) -> Result<(), StoreError> {
        self.write(OBJECTS_FILE, objects).await
    }

    pub async fn write_actions(&self, actions: &[ActionSegment]) -> Result<(), StoreError> {
        self.write(ACTIONS_FILE, actions).await
    }

    pub async fn write_summary(&self, summary: &ProcessingSummary) -> Result<(), StoreError> {
        self.write(SUMMARY_FILE, summary).await
    }

    async fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        self.create().await?;
        let path = self.dir.join(name);
        let body = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(&path, body).await?;
        tracing::debug!(path = %path.display(), "Wrote annotation artifact");
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
