//! Seeded synthetic detections for demos and tests.

use std::path::Path;

use async_trait::async_trait;
use humanosync_core::error::CoreError;
use humanosync_core::frame::FrameIndexing;
use humanosync_core::pose::{
    Keypoint, ObjectDetection, ObjectMap, PoseMap, PoseRecord, LANDMARK_NAMES,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{DetectionError, DetectionSource};

pub const DEFAULT_FRAME_COUNT: usize = 60;
pub const DEFAULT_SEED: u64 = 0x5eed;

/// Object labels drawn from when generating detections.
pub const SYNTHETIC_LABELS: &[&str] = &[
    "person", "cup", "table", "chair", "laptop", "bottle", "book",
];

/// Generates a fixed number of frames of plausible-looking data.
///
/// Output is a pure function of `(frames, seed, indexing)`; the video file
/// is never read.
#[derive(Debug, Clone)]
pub struct SyntheticFixture {
    frames: usize,
    seed: u64,
    indexing: FrameIndexing,
}

impl SyntheticFixture {
    pub fn new(indexing: FrameIndexing) -> Self {
        Self::with_seed(DEFAULT_FRAME_COUNT, DEFAULT_SEED, indexing)
    }

    pub fn with_seed(frames: usize, seed: u64, indexing: FrameIndexing) -> Self {
        Self {
            frames,
            seed,
            indexing,
        }
    }

    pub fn generate_pose(&self) -> Result<PoseMap, CoreError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.frames)
            .map(|pos| {
                // Body sways horizontally over time; landmarks stack downward.
                let base_x = 320.0 + (pos as f64 * 0.1).sin() * 20.0;
                let base_y = 240.0;
                let keypoints = LANDMARK_NAMES
                    .iter()
                    .enumerate()
                    .map(|(i, name)| {
                        let kp = Keypoint::new(
                            base_x + rng.random_range(-50.0..50.0),
                            base_y + i as f64 * 10.0 + rng.random_range(-5.0..5.0),
                            rng.random_range(-10.0..10.0),
                        );
                        (name.to_string(), kp)
                    })
                    .collect();
                let record = PoseRecord {
                    keypoints,
                    confidence: 0.85 + rng.random_range(0.0..0.15),
                };
                self.indexing.key_at(pos).map(|key| (key, record))
            })
            .collect()
    }

    pub fn generate_objects(&self) -> Result<ObjectMap, CoreError> {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(1));
        (0..self.frames)
            .map(|pos| {
                let count = rng.random_range(2..=4);
                let detections = (0..count)
                    .map(|_| {
                        let label =
                            SYNTHETIC_LABELS[rng.random_range(0..SYNTHETIC_LABELS.len())];
                        let x1 = rng.random_range(50.0..400.0);
                        let y1 = rng.random_range(50.0..300.0);
                        let x2 = x1 + rng.random_range(50.0..150.0);
                        let y2 = y1 + rng.random_range(50.0..150.0);
                        let confidence = 0.7 + rng.random_range(0.0..0.3);
                        ObjectDetection::new(label, [x1, y1, x2, y2], confidence)
                    })
                    .collect();
                self.indexing.key_at(pos).map(|key| (key, detections))
            })
            .collect()
    }
}

#[async_trait]
impl DetectionSource for SyntheticFixture {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn extract_pose(&self, _video: &Path) -> Result<PoseMap, DetectionError> {
        Ok(self.generate_pose()?)
    }

    async fn extract_objects(&self, _video: &Path) -> Result<ObjectMap, DetectionError> {
        Ok(self.generate_objects()?)
    }
}
