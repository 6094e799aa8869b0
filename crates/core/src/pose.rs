//! Per-frame detection records: keypoints, pose records, object detections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Landmark vocabulary
// ---------------------------------------------------------------------------

pub const LEFT_SHOULDER: &str = "left_shoulder";
pub const RIGHT_SHOULDER: &str = "right_shoulder";
pub const LEFT_WRIST: &str = "left_wrist";
pub const RIGHT_WRIST: &str = "right_wrist";
pub const LEFT_HIP: &str = "left_hip";
pub const RIGHT_HIP: &str = "right_hip";
pub const LEFT_ANKLE: &str = "left_ankle";
pub const RIGHT_ANKLE: &str = "right_ankle";

/// The 33 body landmarks a pose model reports, in model output order.
pub const LANDMARK_NAMES: [&str; 33] = [
    "nose",
    "left_eye_inner",
    "left_eye",
    "left_eye_outer",
    "right_eye_inner",
    "right_eye",
    "right_eye_outer",
    "left_ear",
    "right_ear",
    "mouth_left",
    "mouth_right",
    LEFT_SHOULDER,
    RIGHT_SHOULDER,
    "left_elbow",
    "right_elbow",
    LEFT_WRIST,
    RIGHT_WRIST,
    "left_pinky",
    "right_pinky",
    "left_index",
    "right_index",
    "left_thumb",
    "right_thumb",
    LEFT_HIP,
    RIGHT_HIP,
    "left_knee",
    "right_knee",
    LEFT_ANKLE,
    RIGHT_ANKLE,
    "left_heel",
    "right_heel",
    "left_foot_index",
    "right_foot_index",
];

// ---------------------------------------------------------------------------
// Keypoint
// ---------------------------------------------------------------------------

/// A landmark coordinate. Serialized as `[x, y]` or `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    /// Depth proxy, when the model provides one.
    pub z: Option<f64>,
}

impl Keypoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    pub fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    /// Euclidean distance to `(px, py)`, ignoring depth.
    pub fn distance_2d(&self, px: f64, py: f64) -> f64 {
        ((self.x - px).powi(2) + (self.y - py).powi(2)).sqrt()
    }
}

impl TryFrom<Vec<f64>> for Keypoint {
    type Error = String;

    fn try_from(coords: Vec<f64>) -> Result<Self, Self::Error> {
        match coords.as_slice() {
            [x, y] => Ok(Self::planar(*x, *y)),
            [x, y, z] => Ok(Self::new(*x, *y, *z)),
            other => Err(format!(
                "keypoint must have 2 or 3 coordinates, got {}",
                other.len()
            )),
        }
    }
}

impl From<Keypoint> for Vec<f64> {
    fn from(kp: Keypoint) -> Self {
        match kp.z {
            Some(z) => vec![kp.x, kp.y, z],
            None => vec![kp.x, kp.y],
        }
    }
}

// ---------------------------------------------------------------------------
// PoseRecord
// ---------------------------------------------------------------------------

/// One frame's keypoints plus the aggregate detection confidence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseRecord {
    pub keypoints: BTreeMap<String, Keypoint>,
    pub confidence: f64,
}

impl PoseRecord {
    /// Build a record whose confidence is the mean of the per-keypoint
    /// visibility scores (0.0 when there are none).
    pub fn from_visibility<I>(landmarks: I) -> Self
    where
        I: IntoIterator<Item = (String, Keypoint, f64)>,
    {
        let mut keypoints = BTreeMap::new();
        let mut total = 0.0;
        let mut count = 0usize;
        for (name, keypoint, visibility) in landmarks {
            keypoints.insert(name, keypoint);
            total += visibility;
            count += 1;
        }
        let confidence = if count == 0 { 0.0 } else { total / count as f64 };
        Self {
            keypoints,
            confidence,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Keypoint> {
        self.keypoints.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ObjectDetection
// ---------------------------------------------------------------------------

/// A labelled bounding box `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDetection {
    pub label: String,
    pub bbox: [f64; 4],
    pub confidence: f64,
}

impl ObjectDetection {
    pub fn new(label: impl Into<String>, bbox: [f64; 4], confidence: f64) -> Self {
        Self {
            label: label.into(),
            bbox,
            confidence,
        }
    }

    /// Center of the bounding box.
    pub fn center(&self) -> (f64, f64) {
        let [x1, y1, x2, y2] = self.bbox;
        ((x1 + x2) / 2.0, (y1 + y2) / 2.0)
    }
}

/// Frame key → pose record, as persisted in `pose.json`.
pub type PoseMap = BTreeMap<String, PoseRecord>;

/// Frame key → detections, as persisted in `objects.json`.
pub type ObjectMap = BTreeMap<String, Vec<ObjectDetection>>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
