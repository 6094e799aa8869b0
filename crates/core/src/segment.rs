//! Action segments and the label-run consolidator.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::FrameIndex;

/// Confidence assigned to consolidated segments.
pub const DEFAULT_SEGMENT_CONFIDENCE: f64 = 0.85;

/// Half-width of the optional cosmetic jitter around the base confidence.
pub const DEFAULT_CONFIDENCE_SPREAD: f64 = 0.10;

/// A labeled, inclusive frame range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSegment {
    pub label: String,
    pub start_frame: FrameIndex,
    pub end_frame: FrameIndex,
    pub confidence: f64,
}

impl ActionSegment {
    /// Check the segment's own invariants (`start_frame <= end_frame`,
    /// non-empty label). Overlap with other segments is not checked.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.label.trim().is_empty() {
            return Err(CoreError::Validation(
                "action label must not be empty".to_string(),
            ));
        }
        if self.start_frame > self.end_frame {
            return Err(CoreError::Validation(format!(
                "start_frame ({}) must not exceed end_frame ({})",
                self.start_frame, self.end_frame
            )));
        }
        Ok(())
    }

    pub fn contains(&self, frame: FrameIndex) -> bool {
        self.start_frame <= frame && frame <= self.end_frame
    }
}

/// How consolidated segments get their confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentConfidence {
    Fixed(f64),
    /// `base` plus uniform noise in `[-spread, spread]`, clamped to `[0, 1]`.
    Jittered { base: f64, spread: f64 },
}

impl Default for SegmentConfidence {
    fn default() -> Self {
        Self::Fixed(DEFAULT_SEGMENT_CONFIDENCE)
    }
}

impl SegmentConfidence {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "fixed" => Ok(Self::Fixed(DEFAULT_SEGMENT_CONFIDENCE)),
            "jittered" => Ok(Self::Jittered {
                base: DEFAULT_SEGMENT_CONFIDENCE,
                spread: DEFAULT_CONFIDENCE_SPREAD,
            }),
            _ => Err(CoreError::Validation(format!(
                "Invalid segment confidence mode '{s}'. Must be one of: fixed, jittered"
            ))),
        }
    }

    fn sample(&self) -> f64 {
        match *self {
            Self::Fixed(value) => value,
            Self::Jittered { base, spread } if spread > 0.0 => {
                let noise = rand::rng().random_range(-spread..=spread);
                (base + noise).clamp(0.0, 1.0)
            }
            Self::Jittered { base, .. } => base,
        }
    }
}

/// Merge consecutive identical labels into segments.
///
/// Labels are scanned in frame order. A label change closes the open
/// segment at `current_frame - 1`, so a gap of unlabeled frames is absorbed
/// by the segment before it; the last segment closes at the last labeled
/// frame. If a frame index repeats, only its first label is used.
pub fn consolidate<L: AsRef<str>>(
    labels: &[(FrameIndex, L)],
    confidence: SegmentConfidence,
) -> Vec<ActionSegment> {
    let mut ordered: Vec<(FrameIndex, &str)> = labels
        .iter()
        .map(|(frame, label)| (*frame, label.as_ref()))
        .collect();
    ordered.sort_by_key(|(frame, _)| *frame);
    ordered.dedup_by_key(|(frame, _)| *frame);

    let mut segments = Vec::new();
    let mut open: Option<(&str, FrameIndex)> = None;

    for &(frame, label) in &ordered {
        match open {
            Some((current, _)) if current == label => {}
            Some((current, start)) => {
                segments.push(ActionSegment {
                    label: current.to_string(),
                    start_frame: start,
                    end_frame: frame - 1,
                    confidence: confidence.sample(),
                });
                open = Some((label, frame));
            }
            None => open = Some((label, frame)),
        }
    }

    if let (Some((label, start)), Some(&(last, _))) = (open, ordered.last()) {
        segments.push(ActionSegment {
            label: label.to_string(),
            start_frame: start,
            end_frame: last,
            confidence: confidence.sample(),
        });
    }

    segments
}

/// Expand segments back into one `(frame, label)` entry per covered frame.
pub fn expand(segments: &[ActionSegment]) -> Vec<(FrameIndex, String)> {
    segments
        .iter()
        .flat_map(|seg| (seg.start_frame..=seg.end_frame).map(move |f| (f, seg.label.clone())))
        .collect()
}

/// Stable sort by `start_frame` ascending.
pub fn sort_by_start(segments: &mut [ActionSegment]) {
    segments.sort_by_key(|seg| seg.start_frame);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(segments: &[ActionSegment]) -> Vec<(&str, FrameIndex, FrameIndex)> {
        segments
            .iter()
            .map(|s| (s.label.as_str(), s.start_frame, s.end_frame))
            .collect()
    }

    fn seg(label: &str, start: FrameIndex, end: FrameIndex) -> ActionSegment {
        ActionSegment {
            label: label.to_string(),
            start_frame: start,
            end_frame: end,
            confidence: DEFAULT_SEGMENT_CONFIDENCE,
        }
    }

    // -- consolidate ---------------------------------------------------------

    #[test]
    fn empty_labels_give_no_segments() {
        let labels: Vec<(FrameIndex, &str)> = Vec::new();
        assert!(consolidate(&labels, SegmentConfidence::default()).is_empty());
    }

    #[test]
    fn single_frame_gives_single_segment() {
        let segments = consolidate(&[(0, "idle")], SegmentConfidence::default());
        assert_eq!(bounds(&segments), vec![("idle", 0, 0)]);
        assert_eq!(segments[0].confidence, DEFAULT_SEGMENT_CONFIDENCE);
    }

    #[test]
    fn runs_become_segments() {
        let labels = [(0, "idle"), (1, "idle"), (2, "walk"), (3, "walk"), (4, "idle")];
        let segments = consolidate(&labels, SegmentConfidence::default());
        assert_eq!(
            bounds(&segments),
            vec![("idle", 0, 1), ("walk", 2, 3), ("idle", 4, 4)]
        );
    }

    #[test]
    fn gaps_are_absorbed_by_preceding_segment() {
        let labels = [(10, "stand"), (11, "stand"), (20, "wave"), (25, "wave")];
        let segments = consolidate(&labels, SegmentConfidence::default());
        assert_eq!(bounds(&segments), vec![("stand", 10, 19), ("wave", 20, 25)]);
    }

    #[test]
    fn unordered_input_is_scanned_in_frame_order() {
        let labels = [(2, "walk"), (0, "idle"), (1, "idle")];
        let segments = consolidate(&labels, SegmentConfidence::default());
        assert_eq!(bounds(&segments), vec![("idle", 0, 1), ("walk", 2, 2)]);
    }

    #[test]
    fn repeated_frame_keeps_first_label() {
        let labels = [(0, "idle"), (0, "walk"), (1, "idle")];
        let segments = consolidate(&labels, SegmentConfidence::default());
        assert_eq!(bounds(&segments), vec![("idle", 0, 1)]);
    }

    #[test]
    fn consolidate_is_idempotent_through_expand() {
        let labels = [
            (0, "idle"),
            (1, "reach"),
            (2, "reach"),
            (3, "pick"),
            (4, "pick"),
            (5, "pick"),
            (6, "idle"),
        ];
        let jitter = SegmentConfidence::Jittered {
            base: 0.85,
            spread: 0.1,
        };
        let first = consolidate(&labels, jitter);
        let second = consolidate(&expand(&first), jitter);
        assert_eq!(bounds(&first), bounds(&second));
    }

    #[test]
    fn jittered_confidence_stays_in_range() {
        let labels: Vec<(FrameIndex, &str)> = (0..200)
            .map(|i| (i, if i % 2 == 0 { "idle" } else { "walk" }))
            .collect();
        let confidence = SegmentConfidence::Jittered {
            base: 0.85,
            spread: 0.1,
        };
        for s in consolidate(&labels, confidence) {
            assert!(
                (0.75 - 1e-9..=0.95 + 1e-9).contains(&s.confidence),
                "got {}",
                s.confidence
            );
        }
    }

    #[test]
    fn confidence_mode_parse() {
        assert_eq!(
            SegmentConfidence::parse("fixed").unwrap(),
            SegmentConfidence::Fixed(DEFAULT_SEGMENT_CONFIDENCE)
        );
        assert!(matches!(
            SegmentConfidence::parse("jittered").unwrap(),
            SegmentConfidence::Jittered { .. }
        ));
        assert!(SegmentConfidence::parse("random").is_err());
    }

    // -- ActionSegment -------------------------------------------------------

    #[test]
    fn validate_rejects_inverted_range() {
        let err = seg("walk", 5, 4).validate().unwrap_err();
        assert!(err.to_string().contains("must not exceed"));
    }

    #[test]
    fn validate_rejects_blank_label() {
        assert!(seg("  ", 0, 4).validate().is_err());
    }

    #[test]
    fn validate_accepts_single_frame() {
        assert!(seg("wave", 3, 3).validate().is_ok());
    }

    #[test]
    fn contains_is_inclusive() {
        let s = seg("walk", 2, 4);
        assert!(s.contains(2) && s.contains(4));
        assert!(!s.contains(1) && !s.contains(5));
    }

    #[test]
    fn sort_is_stable() {
        let mut segments = vec![seg("b", 5, 6), seg("a", 0, 3), seg("c", 5, 9)];
        sort_by_start(&mut segments);
        assert_eq!(
            bounds(&segments),
            vec![("a", 0, 3), ("b", 5, 6), ("c", 5, 9)]
        );
    }
}
