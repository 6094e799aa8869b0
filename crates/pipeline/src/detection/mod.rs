//! Frame detection sources.
//!
//! A [`DetectionSource`] turns a video file into per-frame pose records and
//! object detections keyed by frame key. Which implementation runs is chosen
//! by configuration through [`DetectionSourceKind`].

pub mod model;
pub mod synthetic;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use humanosync_core::error::CoreError;
use humanosync_core::frame::FrameIndexing;
use humanosync_core::pose::{ObjectMap, PoseMap};

pub use model::ModelBacked;
pub use synthetic::SyntheticFixture;

/// Error type for detection sources.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("video file not found: {0}")]
    VideoNotFound(PathBuf),

    #[error("failed to start detection command '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("detection command failed (exit code {exit_code:?}): {stderr}")]
    CommandFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("malformed detection output: {0}")]
    MalformedOutput(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

#[async_trait]
pub trait DetectionSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn extract_pose(&self, video: &Path) -> Result<PoseMap, DetectionError>;

    async fn extract_objects(&self, video: &Path) -> Result<ObjectMap, DetectionError>;
}

/// Configured detection source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionSourceKind {
    Synthetic,
    /// `program` is run as-is (it may contain spaces); `args` go before the
    /// video path.
    Model { program: String, args: Vec<String> },
}

impl DetectionSourceKind {
    /// Build from `DETECTION_SOURCE`, `DETECTION_COMMAND` and
    /// `DETECTION_ARGS`. The command is a single program path; the arguments
    /// are split on whitespace and cannot themselves contain spaces.
    pub fn from_parts(
        source: &str,
        command: Option<String>,
        args: Option<&str>,
    ) -> Result<Self, CoreError> {
        match source {
            "synthetic" => Ok(Self::Synthetic),
            "model" => match command.filter(|c| !c.trim().is_empty()) {
                Some(program) => Ok(Self::Model {
                    program,
                    args: args
                        .unwrap_or_default()
                        .split_whitespace()
                        .map(str::to_string)
                        .collect(),
                }),
                None => Err(CoreError::Validation(
                    "DETECTION_COMMAND must be set when DETECTION_SOURCE=model".to_string(),
                )),
            },
            other => Err(CoreError::Validation(format!(
                "Invalid detection source '{other}'. Must be one of: synthetic, model"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Synthetic => "synthetic",
            Self::Model { .. } => "model",
        }
    }

    pub fn build(&self, indexing: FrameIndexing) -> Arc<dyn DetectionSource> {
        match self {
            Self::Synthetic => Arc::new(SyntheticFixture::new(indexing)),
            Self::Model { program, args } => {
                Arc::new(ModelBacked::new(program.clone(), args.clone(), indexing))
            }
        }
    }
}
