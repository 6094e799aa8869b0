//! The three-stage extraction job: pose, then objects, then actions.
//!
//! Stages run strictly in order inside one task because action labeling
//! consumes both earlier outputs. Each stage's artifact is written as soon
//! as it is produced, so a failure in a later stage leaves the earlier
//! artifacts on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use humanosync_core::classifier::{label_frames, ClassifierKind};
use humanosync_core::error::CoreError;
use humanosync_core::extraction::ExtractionState;
use humanosync_core::frame::FrameIndexing;
use humanosync_core::pose::{ObjectMap, PoseMap};
use humanosync_core::segment::{consolidate, ActionSegment, SegmentConfidence};
use humanosync_core::summary::ProcessingSummary;
use humanosync_store::{StoreError, VideoArtifacts};
use tokio::task::JoinHandle;

use crate::detection::{DetectionError, DetectionSource};
use crate::status::StatusStore;

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct ExtractionOutput {
    pub pose: PoseMap,
    pub objects: ObjectMap,
    pub actions: Vec<ActionSegment>,
    pub summary: ProcessingSummary,
}

/// Extraction settings shared by every video in a deployment.
#[derive(Clone)]
pub struct ExtractionJob {
    source: Arc<dyn DetectionSource>,
    classifier: ClassifierKind,
    confidence: SegmentConfidence,
    indexing: FrameIndexing,
}

impl ExtractionJob {
    pub fn new(
        source: Arc<dyn DetectionSource>,
        classifier: ClassifierKind,
        confidence: SegmentConfidence,
        indexing: FrameIndexing,
    ) -> Self {
        Self {
            source,
            classifier,
            confidence,
            indexing,
        }
    }

    /// Run all stages for one video, recording every state transition in
    /// `status`. On failure the video's entry ends as `Failed(<error>)`.
    pub async fn run(
        &self,
        video_id: &str,
        video: &Path,
        artifacts: &VideoArtifacts,
        status: &StatusStore,
    ) -> Result<ExtractionOutput, JobError> {
        let mut state = ExtractionState::Queued;
        status.set(video_id, state.clone()).await;

        match self.stages(video_id, video, artifacts, status, &mut state).await {
            Ok(output) => {
                tracing::info!(
                    video_id,
                    frames = output.summary.total_frames_processed,
                    objects = output.summary.total_objects_detected,
                    actions = output.summary.total_actions_detected,
                    "Extraction completed",
                );
                Ok(output)
            }
            Err(err) => {
                let reason = err.to_string();
                tracing::error!(video_id, stage = ?state.stage(), error = %reason, "Extraction failed");
                let failed = state.fail(reason.clone()).unwrap_or(ExtractionState::Failed(reason));
                status.set(video_id, failed).await;
                Err(err)
            }
        }
    }

    async fn stages(
        &self,
        video_id: &str,
        video: &Path,
        artifacts: &VideoArtifacts,
        status: &StatusStore,
        state: &mut ExtractionState,
    ) -> Result<ExtractionOutput, JobError> {
        if !video.exists() {
            return Err(DetectionError::VideoNotFound(video.to_path_buf()).into());
        }
        artifacts.create().await?;

        self.advance(video_id, status, state).await?;
        let pose = self.source.extract_pose(video).await?;
        artifacts.write_pose(&pose).await?;
        tracing::debug!(video_id, frames = pose.len(), source = self.source.name(), "Pose extracted");

        self.advance(video_id, status, state).await?;
        let objects = self.source.extract_objects(video).await?;
        artifacts.write_objects(&objects).await?;
        tracing::debug!(video_id, frames = objects.len(), "Objects extracted");

        self.advance(video_id, status, state).await?;
        let mut classifier = self.classifier.build();
        let labels = label_frames(classifier.as_mut(), &pose, &objects, self.indexing);
        let actions = consolidate(&labels, self.confidence);
        artifacts.write_actions(&actions).await?;
        tracing::debug!(
            video_id,
            classifier = classifier.name(),
            vocabulary = ?classifier.vocabulary(),
            labeled = labels.len(),
            segments = actions.len(),
            "Actions extracted",
        );

        let summary = ProcessingSummary::from_artifacts(
            video.to_string_lossy(),
            artifacts.dir(),
            &pose,
            &objects,
            &actions,
        );
        artifacts.write_summary(&summary).await?;

        self.advance(video_id, status, state).await?;

        Ok(ExtractionOutput {
            pose,
            objects,
            actions,
            summary,
        })
    }

    async fn advance(
        &self,
        video_id: &str,
        status: &StatusStore,
        state: &mut ExtractionState,
    ) -> Result<(), CoreError> {
        *state = state.advance()?;
        match state.stage() {
            Some(stage) => {
                tracing::info!(video_id, stage = stage.as_str(), "Extraction stage started")
            }
            None => tracing::info!(video_id, status = %state.status(), "Extraction state changed"),
        }
        status.set(video_id, state.clone()).await;
        Ok(())
    }

    /// Run the job in a background task. The outcome is observable only
    /// through `status`, which always ends terminal: a panic or cancellation
    /// inside the run is recorded as `Failed` too.
    pub fn spawn(
        &self,
        video_id: String,
        video: PathBuf,
        artifacts: VideoArtifacts,
        status: Arc<StatusStore>,
    ) -> JoinHandle<()> {
        let job = self.clone();
        tokio::spawn(async move {
            let run = {
                let video_id = video_id.clone();
                let status = Arc::clone(&status);
                // Errors are recorded in the status store and logged by `run`.
                tokio::spawn(async move {
                    let _ = job.run(&video_id, &video, &artifacts, &status).await;
                })
            };

            if let Err(err) = run.await {
                let cause = if err.is_panic() {
                    "extraction task panicked"
                } else {
                    "extraction task was cancelled"
                };
                let reason = CoreError::Extraction(cause.to_string()).to_string();
                tracing::error!(video_id = %video_id, error = %reason, "Extraction aborted");
                status.set(&video_id, ExtractionState::Failed(reason)).await;
            }
        })
    }
}
