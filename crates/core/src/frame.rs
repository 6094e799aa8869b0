//! Frame keys and frame numbering.
//!
//! Persisted pose and object maps are keyed by `"frame_" + zero-padded
//! index` (at least three digits). The numbering origin (0 or 1) is a
//! deployment-wide setting carried by [`FrameIndexing`]; every component
//! that turns a frame position into a key goes through it.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::FrameIndex;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Prefix of every frame key.
pub const FRAME_KEY_PREFIX: &str = "frame_";

/// Minimum number of digits in a frame key (zero-padded).
pub const FRAME_KEY_DIGITS: usize = 3;

/// Frame rate assumed when converting frame indices to seconds.
pub const DEFAULT_FPS: f64 = 30.0;

// ---------------------------------------------------------------------------
// Key encoding
// ---------------------------------------------------------------------------

/// Encode a frame index as its canonical key, e.g. `7` → `"frame_007"`.
pub fn frame_key(index: FrameIndex) -> String {
    format!("{FRAME_KEY_PREFIX}{index:03}")
}

/// Decode a canonical frame key back into its index.
///
/// Only keys that [`frame_key`] would produce are accepted: `"frame_7"`,
/// `"frame_0007"` and `"Frame_007"` are all rejected rather than silently
/// matched to frame 7.
pub fn parse_frame_key(key: &str) -> Result<FrameIndex, CoreError> {
    let digits = key.strip_prefix(FRAME_KEY_PREFIX).ok_or_else(|| {
        CoreError::Validation(format!(
            "Malformed frame key '{key}': must start with '{FRAME_KEY_PREFIX}'"
        ))
    })?;

    if digits.len() < FRAME_KEY_DIGITS || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::Validation(format!(
            "Malformed frame key '{key}': expected at least {FRAME_KEY_DIGITS} digits"
        )));
    }

    let index: FrameIndex = digits.parse().map_err(|_| {
        CoreError::Validation(format!("Malformed frame key '{key}': index out of range"))
    })?;

    if frame_key(index) != key {
        return Err(CoreError::Validation(format!(
            "Malformed frame key '{key}': not zero-padded canonically"
        )));
    }

    Ok(index)
}

/// Convert a frame index to seconds at [`DEFAULT_FPS`].
pub fn frame_to_seconds(index: FrameIndex) -> f64 {
    f64::from(index) / DEFAULT_FPS
}

// ---------------------------------------------------------------------------
// FrameIndexing
// ---------------------------------------------------------------------------

/// Frame numbering origin shared by extraction, storage and lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameIndexing {
    /// Index assigned to the first decoded frame: 0 or 1.
    pub origin: FrameIndex,
}

impl FrameIndexing {
    pub const ZERO_BASED: Self = Self { origin: 0 };
    pub const ONE_BASED: Self = Self { origin: 1 };

    /// Build an indexing from an origin value, accepting only 0 or 1.
    pub fn new(origin: FrameIndex) -> Result<Self, CoreError> {
        match origin {
            0 | 1 => Ok(Self { origin }),
            other => Err(CoreError::Validation(format!(
                "Frame index origin must be 0 or 1, got {other}"
            ))),
        }
    }

    /// Index of the frame at zero-based decode `position`. Positions that
    /// do not fit a [`FrameIndex`] once offset by the origin are rejected.
    pub fn index_at(&self, position: usize) -> Result<FrameIndex, CoreError> {
        FrameIndex::try_from(position)
            .ok()
            .and_then(|p| p.checked_add(self.origin))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Frame position {position} is out of range for origin {}",
                    self.origin
                ))
            })
    }

    /// Key of the frame at zero-based decode `position`.
    pub fn key_at(&self, position: usize) -> Result<String, CoreError> {
        self.index_at(position).map(frame_key)
    }

    /// Key for a frame index, rejecting indices below the origin.
    pub fn key(&self, index: FrameIndex) -> Result<String, CoreError> {
        self.check(index)?;
        Ok(frame_key(index))
    }

    /// Parse a key and check the index is valid under this origin.
    pub fn index_of(&self, key: &str) -> Result<FrameIndex, CoreError> {
        let index = parse_frame_key(key)?;
        self.check(index)?;
        Ok(index)
    }

    fn check(&self, index: FrameIndex) -> Result<(), CoreError> {
        if index < self.origin {
            return Err(CoreError::Validation(format!(
                "Frame index {index} is below the configured origin {}",
                self.origin
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
