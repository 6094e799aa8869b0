//! File-backed annotation storage.
//!
//! One directory per video under a data root:
//!
//! ```text
//! <root>/<video_id>/pose.json      frame_key -> PoseRecord
//! <root>/<video_id>/objects.json   frame_key -> [ObjectDetection]
//! <root>/<video_id>/actions.json   [ActionSegment], sorted by start_frame
//! <root>/<video_id>/summary.json   ProcessingSummary
//! ```

pub mod annotation_store;
pub mod artifacts;
pub mod error;
pub mod models;

pub use annotation_store::AnnotationStore;
pub use artifacts::VideoArtifacts;
pub use error::StoreError;
