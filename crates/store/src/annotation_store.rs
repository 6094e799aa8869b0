//! Per-video annotation reads and edits on top of [`VideoArtifacts`].
//!
//! Every edit is a read-modify-write of a single artifact file. Edits to
//! different artifacts are independent; concurrent edits to the same
//! artifact of the same video race at the file level (last writer wins).

use std::path::{Path, PathBuf};

use humanosync_core::error::CoreError;
use humanosync_core::export::AnnotationBundle;
use humanosync_core::frame::FrameIndexing;
use humanosync_core::pose::{ObjectDetection, ObjectMap, PoseMap, PoseRecord};
use humanosync_core::segment::{sort_by_start, ActionSegment};
use humanosync_core::types::FrameIndex;

use crate::artifacts::VideoArtifacts;
use crate::error::StoreError;
use crate::models::{
    ArtifactPresence, BulkAnnotations, FrameView, ARTIFACT_ACTIONS, ARTIFACT_OBJECTS,
    ARTIFACT_POSE,
};

/// Annotation datasets for all videos under one data root.
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    root: PathBuf,
    indexing: FrameIndexing,
}

impl AnnotationStore {
    pub fn new(root: impl Into<PathBuf>, indexing: FrameIndexing) -> Self {
        Self {
            root: root.into(),
            indexing,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn indexing(&self) -> FrameIndexing {
        self.indexing
    }

    /// Artifact handle for a video. Rejects ids that are not a single
    /// plain path component.
    pub fn artifacts(&self, video_id: &str) -> Result<VideoArtifacts, StoreError> {
        validate_video_id(video_id)?;
        Ok(VideoArtifacts::new(self.root.join(video_id)))
    }

    pub async fn video_exists(&self, video_id: &str) -> Result<bool, StoreError> {
        self.artifacts(video_id)?.exists().await
    }

    /// Artifact handle for a video whose directory must already exist.
    async fn existing(&self, video_id: &str) -> Result<VideoArtifacts, StoreError> {
        let artifacts = self.artifacts(video_id)?;
        if !artifacts.exists().await? {
            return Err(StoreError::not_found("Video", video_id));
        }
        Ok(artifacts)
    }

    // -----------------------------------------------------------------------
    // Whole-artifact reads
    // -----------------------------------------------------------------------

    /// Load the pose artifact, or `NotFound` when it has not been written.
    pub async fn load_pose(&self, video_id: &str) -> Result<PoseMap, StoreError> {
        self.artifacts(video_id)?
            .read_pose()
            .await?
            .ok_or_else(|| StoreError::not_found("Pose annotations", video_id))
    }

    pub async fn load_objects(&self, video_id: &str) -> Result<ObjectMap, StoreError> {
        self.artifacts(video_id)?
            .read_objects()
            .await?
            .ok_or_else(|| StoreError::not_found("Object annotations", video_id))
    }

    pub async fn load_actions(&self, video_id: &str) -> Result<Vec<ActionSegment>, StoreError> {
        self.artifacts(video_id)?
            .read_actions()
            .await?
            .ok_or_else(|| StoreError::not_found("Action annotations", video_id))
    }

    /// Whichever artifacts exist, for export. `NotFound` if the video has no
    /// data directory.
    pub async fn bundle(&self, video_id: &str) -> Result<AnnotationBundle, StoreError> {
        let artifacts = self.existing(video_id).await?;
        Ok(AnnotationBundle {
            pose: artifacts.read_pose().await?,
            objects: artifacts.read_objects().await?,
            actions: artifacts.read_actions().await?,
        })
    }

    pub async fn presence(&self, video_id: &str) -> Result<ArtifactPresence, StoreError> {
        let artifacts = self.existing(video_id).await?;
        let pose = artifacts.read_pose().await?;
        let has_objects = artifacts.read_objects().await?.is_some();
        let has_actions = artifacts.read_actions().await?.is_some();

        Ok(ArtifactPresence {
            has_pose: pose.is_some(),
            has_objects,
            has_actions,
            frame_count: pose.map_or(0, |p| p.len()),
        })
    }

    /// Pose, detections and covering action segments for one frame.
    pub async fn frame_view(
        &self,
        video_id: &str,
        frame: FrameIndex,
    ) -> Result<FrameView, StoreError> {
        let key = self.indexing.key(frame)?;
        let artifacts = self.existing(video_id).await?;

        let pose = artifacts
            .read_pose()
            .await?
            .and_then(|mut p| p.remove(&key));
        let objects = artifacts
            .read_objects()
            .await?
            .and_then(|mut o| o.remove(&key));
        let actions = artifacts.read_actions().await?.map(|actions| {
            actions
                .into_iter()
                .filter(|seg| seg.contains(frame))
                .collect()
        });

        Ok(FrameView {
            frame,
            pose,
            objects,
            actions,
        })
    }

    // -----------------------------------------------------------------------
    // Edits
    // -----------------------------------------------------------------------

    /// Replace the pose record at `frame_key`. The pose artifact must exist.
    pub async fn upsert_pose_frame(
        &self,
        video_id: &str,
        frame_key: &str,
        record: PoseRecord,
    ) -> Result<(), StoreError> {
        self.indexing.index_of(frame_key)?;
        let mut pose = self.load_pose(video_id).await?;
        pose.insert(frame_key.to_string(), record);
        self.artifacts(video_id)?.write_pose(&pose).await?;

        tracing::info!(video_id, frame_key, "Updated pose frame");
        Ok(())
    }

    /// Replace the detection list at `frame_key`. The objects artifact must
    /// exist.
    pub async fn upsert_objects_frame(
        &self,
        video_id: &str,
        frame_key: &str,
        detections: Vec<ObjectDetection>,
    ) -> Result<(), StoreError> {
        self.indexing.index_of(frame_key)?;
        let mut objects = self.load_objects(video_id).await?;
        objects.insert(frame_key.to_string(), detections);
        self.artifacts(video_id)?.write_objects(&objects).await?;

        tracing::info!(video_id, frame_key, "Updated object frame");
        Ok(())
    }

    /// Append a segment and re-sort the list by `start_frame`.
    ///
    /// Creates the action list if the video has none yet. Overlap with
    /// existing segments is not checked. Returns the stored list.
    pub async fn append_action(
        &self,
        video_id: &str,
        segment: ActionSegment,
    ) -> Result<Vec<ActionSegment>, StoreError> {
        segment.validate()?;
        let artifacts = self.existing(video_id).await?;

        let mut actions = artifacts.read_actions().await?.unwrap_or_default();
        actions.push(segment);
        sort_by_start(&mut actions);
        artifacts.write_actions(&actions).await?;

        tracing::info!(video_id, count = actions.len(), "Appended action segment");
        Ok(actions)
    }

    /// Remove the segment at zero-based `index` in stored order.
    ///
    /// An out-of-range index fails with `OutOfRange` and leaves the list as
    /// it was.
    pub async fn delete_action(
        &self,
        video_id: &str,
        index: usize,
    ) -> Result<ActionSegment, StoreError> {
        let mut actions = self.load_actions(video_id).await?;
        if index >= actions.len() {
            return Err(CoreError::OutOfRange {
                index,
                len: actions.len(),
            }
            .into());
        }

        let removed = actions.remove(index);
        self.artifacts(video_id)?.write_actions(&actions).await?;

        tracing::info!(video_id, index, label = %removed.label, "Deleted action segment");
        Ok(removed)
    }

    /// Replace whole artifacts. Absent or empty entries are skipped; all
    /// frame keys and segments are validated before anything is written.
    /// Returns the names of the artifacts saved.
    pub async fn save_bulk(
        &self,
        video_id: &str,
        bulk: BulkAnnotations,
    ) -> Result<Vec<&'static str>, StoreError> {
        let artifacts = self.existing(video_id).await?;

        let pose = bulk.pose.filter(|p| !p.is_empty());
        let objects = bulk.objects.filter(|o| !o.is_empty());
        let mut actions = bulk.actions.filter(|a| !a.is_empty());

        for key in pose.iter().flat_map(|p| p.keys()) {
            self.indexing.index_of(key)?;
        }
        for key in objects.iter().flat_map(|o| o.keys()) {
            self.indexing.index_of(key)?;
        }
        for segment in actions.iter().flatten() {
            segment.validate()?;
        }

        let mut saved = Vec::new();
        if let Some(pose) = &pose {
            artifacts.write_pose(pose).await?;
            saved.push(ARTIFACT_POSE);
        }
        if let Some(objects) = &objects {
            artifacts.write_objects(objects).await?;
            saved.push(ARTIFACT_OBJECTS);
        }
        if let Some(actions) = actions.as_mut() {
            sort_by_start(actions);
            artifacts.write_actions(actions).await?;
            saved.push(ARTIFACT_ACTIONS);
        }

        tracing::info!(video_id, ?saved, "Saved annotations");
        Ok(saved)
    }
}

fn validate_video_id(video_id: &str) -> Result<(), CoreError> {
    let valid = !video_id.is_empty()
        && video_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Invalid video id '{video_id}'")))
    }
}
