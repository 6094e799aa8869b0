use humanosync_core::classifier::ClassifierKind;
use humanosync_core::error::CoreError;
use humanosync_core::frame::FrameIndexing;
use humanosync_core::segment::SegmentConfidence;

use crate::detection::DetectionSourceKind;
use crate::job::ExtractionJob;

/// Extraction settings shared by the server and the batch binary.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub detection: DetectionSourceKind,
    pub classifier: ClassifierKind,
    pub confidence: SegmentConfidence,
    pub indexing: FrameIndexing,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            detection: DetectionSourceKind::Synthetic,
            classifier: ClassifierKind::default(),
            confidence: SegmentConfidence::default(),
            indexing: FrameIndexing::ZERO_BASED,
        }
    }
}

impl PipelineSettings {
    /// Load from environment variables.
    ///
    /// | Env Var              | Default           |
    /// |----------------------|-------------------|
    /// | `DETECTION_SOURCE`   | `synthetic`       |
    /// | `DETECTION_COMMAND`  | unset             |
    /// | `DETECTION_ARGS`     | unset             |
    /// | `ACTION_CLASSIFIER`  | `pose_and_object` |
    /// | `SEGMENT_CONFIDENCE` | `fixed`           |
    /// | `FRAME_INDEX_ORIGIN` | `0`               |
    ///
    /// `DETECTION_COMMAND` is a single program path and is not split, so it
    /// may contain spaces. Extra arguments go in `DETECTION_ARGS`, separated
    /// by whitespace.
    pub fn from_env() -> Result<Self, CoreError> {
        let var = |name: &str, default: &str| {
            std::env::var(name).unwrap_or_else(|_| default.to_string())
        };

        let detection = DetectionSourceKind::from_parts(
            &var("DETECTION_SOURCE", "synthetic"),
            std::env::var("DETECTION_COMMAND").ok(),
            std::env::var("DETECTION_ARGS").ok().as_deref(),
        )?;
        let classifier = ClassifierKind::parse(&var("ACTION_CLASSIFIER", "pose_and_object"))?;
        let confidence = SegmentConfidence::parse(&var("SEGMENT_CONFIDENCE", "fixed"))?;

        let origin = var("FRAME_INDEX_ORIGIN", "0");
        let origin = origin.trim().parse().map_err(|_| {
            CoreError::Validation(format!("FRAME_INDEX_ORIGIN must be 0 or 1, got '{origin}'"))
        })?;
        let indexing = FrameIndexing::new(origin)?;

        Ok(Self {
            detection,
            classifier,
            confidence,
            indexing,
        })
    }

    pub fn build_job(&self) -> ExtractionJob {
        ExtractionJob::new(
            self.detection.build(self.indexing),
            self.classifier,
            self.confidence,
            self.indexing,
        )
    }
}
