//! Read models and write payloads for the annotation store.

use serde::{Deserialize, Serialize};

use humanosync_core::pose::{ObjectDetection, ObjectMap, PoseMap, PoseRecord};
use humanosync_core::segment::ActionSegment;
use humanosync_core::types::FrameIndex;

/// Everything known about a single frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameView {
    pub frame: FrameIndex,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pose: Option<PoseRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objects: Option<Vec<ObjectDetection>>,
    /// Segments covering the frame; `None` when the video has no action list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<ActionSegment>>,
}

/// Which artifacts exist for a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArtifactPresence {
    pub has_pose: bool,
    pub has_objects: bool,
    pub has_actions: bool,
    /// Number of frames in the pose artifact (0 when absent).
    pub frame_count: usize,
}

/// Bulk replacement payload. Absent or empty artifacts are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkAnnotations {
    #[serde(default)]
    pub pose: Option<PoseMap>,
    #[serde(default)]
    pub objects: Option<ObjectMap>,
    #[serde(default)]
    pub actions: Option<Vec<ActionSegment>>,
}

/// Artifact names reported back from a bulk save.
pub const ARTIFACT_POSE: &str = "pose";
pub const ARTIFACT_OBJECTS: &str = "objects";
pub const ARTIFACT_ACTIONS: &str = "actions";
