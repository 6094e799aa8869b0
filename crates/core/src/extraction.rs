//! Extraction job lifecycle.
//!
//! ```text
//! Queued → Processing(Pose) → Processing(Objects) → Processing(Actions) → Completed
//!    └──────────────┴───────────────┴──────────────────────┴──────→ Failed(reason)
//! ```
//!
//! `Completed` and `Failed` are terminal. Status strings match the public
//! API: `queued`, `processing`, `completed`, `error: <reason>`.

use serde::Serialize;

use crate::error::CoreError;

pub const STATUS_QUEUED: &str = "queued";
pub const STATUS_PROCESSING: &str = "processing";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_ERROR_PREFIX: &str = "error: ";

/// The three strictly ordered extraction stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStage {
    Pose,
    Objects,
    Actions,
}

impl ExtractionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pose => "pose",
            Self::Objects => "objects",
            Self::Actions => "actions",
        }
    }

    fn next(&self) -> Option<Self> {
        match self {
            Self::Pose => Some(Self::Objects),
            Self::Objects => Some(Self::Actions),
            Self::Actions => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionState {
    Queued,
    Processing(ExtractionStage),
    Completed,
    Failed(String),
}

impl ExtractionState {
    /// Move to the next state on success of the current one.
    pub fn advance(&self) -> Result<Self, CoreError> {
        match self {
            Self::Queued => Ok(Self::Processing(ExtractionStage::Pose)),
            Self::Processing(stage) => Ok(match stage.next() {
                Some(next) => Self::Processing(next),
                None => Self::Completed,
            }),
            Self::Completed | Self::Failed(_) => Err(self.terminal_error("advance")),
        }
    }

    /// Record a failure. Only non-terminal states can fail.
    pub fn fail(&self, reason: impl Into<String>) -> Result<Self, CoreError> {
        if self.is_terminal() {
            return Err(self.terminal_error("fail"));
        }
        Ok(Self::Failed(reason.into()))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_))
    }

    pub fn stage(&self) -> Option<ExtractionStage> {
        match self {
            Self::Processing(stage) => Some(*stage),
            _ => None,
        }
    }

    /// Status string reported to clients.
    pub fn status(&self) -> String {
        match self {
            Self::Queued => STATUS_QUEUED.to_string(),
            Self::Processing(_) => STATUS_PROCESSING.to_string(),
            Self::Completed => STATUS_COMPLETED.to_string(),
            Self::Failed(reason) => format!("{STATUS_ERROR_PREFIX}{reason}"),
        }
    }

    fn terminal_error(&self, action: &str) -> CoreError {
        CoreError::Validation(format!(
            "cannot {action} extraction in terminal state '{}'",
            self.status()
        ))
    }
}
