//! Annotation extraction: detection sources, the three-stage extraction
//! job and in-process job status tracking.

pub mod detection;
pub mod job;
pub mod settings;
pub mod status;

pub use detection::{DetectionError, DetectionSource, DetectionSourceKind};
pub use job::{ExtractionJob, ExtractionOutput, JobError};
pub use settings::PipelineSettings;
pub use status::StatusStore;
