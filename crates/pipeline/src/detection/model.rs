//! Detection via an external inference program.
//!
//! The configured program is invoked as
//! `<program> [args...] <video> --task pose|objects` and must print a JSON
//! array of per-frame records on stdout:
//!
//! ```text
//! pose:    [{ "frame": 0, "keypoints": { "nose": [x, y, z] }, "visibility": { "nose": 0.9 } }]
//! objects: [{ "frame": 0, "detections": [{ "label": "cup", "bbox": [x1, y1, x2, y2], "confidence": 0.8 }] }]
//! ```
//!
//! `frame` is the zero-based decode position. Each position may appear at
//! most once per task, and must map to a valid frame index under the
//! configured origin.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use humanosync_core::frame::FrameIndexing;
use humanosync_core::pose::{Keypoint, ObjectDetection, ObjectMap, PoseMap, PoseRecord};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{DetectionError, DetectionSource};

#[derive(Debug, Deserialize)]
struct PoseFrame {
    frame: usize,
    #[serde(default)]
    keypoints: BTreeMap<String, Keypoint>,
    #[serde(default)]
    visibility: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct ObjectFrame {
    frame: usize,
    #[serde(default)]
    detections: Vec<ObjectDetection>,
}

#[derive(Debug, Clone)]
pub struct ModelBacked {
    program: String,
    args: Vec<String>,
    indexing: FrameIndexing,
}

impl ModelBacked {
    pub fn new(program: impl Into<String>, args: Vec<String>, indexing: FrameIndexing) -> Self {
        Self {
            program: program.into(),
            args,
            indexing,
        }
    }

    async fn run<T: DeserializeOwned>(&self, video: &Path, task: &str) -> Result<T, DetectionError> {
        if !video.exists() {
            return Err(DetectionError::VideoNotFound(video.to_path_buf()));
        }

        tracing::debug!(program = %self.program, task, video = %video.display(), "Running detection command");

        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(video)
            .args(["--task", task])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| DetectionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(DetectionError::CommandFailed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| DetectionError::MalformedOutput(format!("{task}: {e}")))
    }

    /// Key every `(position, value)` pair, rejecting positions outside the
    /// frame index range and positions reported twice.
    fn keyed<T>(
        &self,
        task: &str,
        frames: impl IntoIterator<Item = (usize, T)>,
    ) -> Result<BTreeMap<String, T>, DetectionError> {
        let mut keyed = BTreeMap::new();
        for (position, value) in frames {
            let key = self
                .indexing
                .key_at(position)
                .map_err(|e| DetectionError::MalformedOutput(format!("{task}: {e}")))?;
            if keyed.insert(key, value).is_some() {
                return Err(DetectionError::MalformedOutput(format!(
                    "{task}: frame {position} reported more than once"
                )));
            }
        }
        Ok(keyed)
    }

    /// Frames with no keypoints (detection failed) are dropped. Confidence is
    /// the mean visibility of the frame's keypoints.
    fn pose_from_frames(&self, frames: Vec<PoseFrame>) -> Result<PoseMap, DetectionError> {
        let records = frames.into_iter().map(|f| {
            let visibility = f.visibility;
            let record = (!f.keypoints.is_empty()).then(|| {
                PoseRecord::from_visibility(f.keypoints.into_iter().map(|(name, kp)| {
                    let v = visibility.get(&name).copied().unwrap_or(0.0);
                    (name, kp, v)
                }))
            });
            (f.frame, record)
        });

        Ok(self
            .keyed("pose", records)?
            .into_iter()
            .filter_map(|(key, record)| record.map(|r| (key, r)))
            .collect())
    }

    fn objects_from_frames(&self, frames: Vec<ObjectFrame>) -> Result<ObjectMap, DetectionError> {
        self.keyed("objects", frames.into_iter().map(|f| (f.frame, f.detections)))
    }
}

#[async_trait]
impl DetectionSource for ModelBacked {
    fn name(&self) -> &'static str {
        "model"
    }

    async fn extract_pose(&self, video: &Path) -> Result<PoseMap, DetectionError> {
        let frames: Vec<PoseFrame> = self.run(video, "pose").await?;
        self.pose_from_frames(frames)
    }

    async fn extract_objects(&self, video: &Path) -> Result<ObjectMap, DetectionError> {
        let frames: Vec<ObjectFrame> = self.run(video, "objects").await?;
        self.objects_from_frames(frames)
    }
}
