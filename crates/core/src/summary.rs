//! Per-video processing summary persisted as `summary.json`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::pose::{ObjectMap, PoseMap};
use crate::segment::ActionSegment;
use crate::types::Timestamp;

pub const POSE_FILE: &str = "pose.json";
pub const OBJECTS_FILE: &str = "objects.json";
pub const ACTIONS_FILE: &str = "actions.json";
pub const SUMMARY_FILE: &str = "summary.json";

/// Paths of the three artifacts a run wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputFiles {
    pub pose: String,
    pub objects: String,
    pub actions: String,
}

impl OutputFiles {
    pub fn in_dir(dir: &Path) -> Self {
        let path = |name: &str| dir.join(name).to_string_lossy().into_owned();
        Self {
            pose: path(POSE_FILE),
            objects: path(OBJECTS_FILE),
            actions: path(ACTIONS_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub video_path: String,
    pub total_frames_processed: usize,
    pub total_objects_detected: usize,
    pub total_actions_detected: usize,
    pub output_files: OutputFiles,
    pub generated_at: Timestamp,
}

impl ProcessingSummary {
    pub fn from_artifacts(
        video_path: impl Into<String>,
        output_dir: &Path,
        pose: &PoseMap,
        objects: &ObjectMap,
        actions: &[ActionSegment],
    ) -> Self {
        Self {
            video_path: video_path.into(),
            total_frames_processed: pose.len(),
            total_objects_detected: objects.values().map(Vec::len).sum(),
            total_actions_detected: actions.len(),
            output_files: OutputFiles::in_dir(output_dir),
            generated_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::frame_key;
    use crate::pose::{ObjectDetection, PoseRecord};

    #[test]
    fn counts_frames_objects_and_segments() {
        let pose: PoseMap = (0..3).map(|i| (frame_key(i), PoseRecord::default())).collect();
        let mut objects = ObjectMap::new();
        objects.insert(
            frame_key(0),
            vec![
                ObjectDetection::new("cup", [0.0, 0.0, 1.0, 1.0], 0.9),
                ObjectDetection::new("book", [0.0, 0.0, 1.0, 1.0], 0.8),
            ],
        );
        objects.insert(frame_key(1), Vec::new());

        let summary = ProcessingSummary::from_artifacts(
            "uploads/a.mp4",
            Path::new("data/a"),
            &pose,
            &objects,
            &[],
        );
        assert_eq!(summary.total_frames_processed, 3);
        assert_eq!(summary.total_objects_detected, 2);
        assert_eq!(summary.total_actions_detected, 0);
        assert!(summary.output_files.actions.ends_with("actions.json"));
    }
}
