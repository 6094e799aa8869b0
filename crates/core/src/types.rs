/// Opaque per-video identifier (a UUID string for uploaded videos).
pub type VideoId = String;

/// Non-negative frame index, interpreted through a [`crate::frame::FrameIndexing`].
pub type FrameIndex = u32;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
