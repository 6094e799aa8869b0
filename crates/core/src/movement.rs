//! Movement analysis over a sliding window of recent poses.
//!
//! Every predicate compares the oldest and newest record currently held in
//! the [`PoseBuffer`], so it measures drift across the whole window rather
//! than frame-to-frame velocity. Coordinates are image space: smaller `y`
//! is higher in the frame.

use std::collections::VecDeque;

use serde::Serialize;

use crate::pose::{PoseRecord, LEFT_HIP, RIGHT_HIP, RIGHT_SHOULDER, RIGHT_WRIST};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of poses retained (one second at 30 fps).
pub const POSE_BUFFER_CAPACITY: usize = 30;

/// Minimum number of buffered poses before movements are reported.
pub const MIN_POSES_FOR_ANALYSIS: usize = 10;

/// Wrist must be this far above the shoulder for `arm_raised`.
pub const ARM_RAISED_MARGIN: f64 = 50.0;

/// Horizontal hip drift across the window that counts as `walking`.
pub const WALKING_HIP_DRIFT: f64 = 30.0;

/// Horizontal wrist-to-shoulder offset that counts as `reaching`.
pub const REACHING_ARM_OFFSET: f64 = 100.0;

/// Wrist must be this far below the hip for `picking`.
pub const PICKING_MARGIN: f64 = 50.0;

/// Downward hip drift across the window that counts as `sitting`.
pub const SITTING_HIP_DROP: f64 = 50.0;

// ---------------------------------------------------------------------------
// Movements
// ---------------------------------------------------------------------------

/// Boolean movement predicates derived from a pose window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Movements {
    pub arm_raised: bool,
    pub walking: bool,
    pub reaching: bool,
    pub picking: bool,
    pub sitting: bool,
}

impl Movements {
    /// Evaluate all predicates between the window endpoints.
    ///
    /// A predicate whose keypoints are missing from the record it reads
    /// is false.
    pub fn between(first: &PoseRecord, last: &PoseRecord) -> Self {
        let right_wrist = last.get(RIGHT_WRIST);
        let right_shoulder = last.get(RIGHT_SHOULDER);

        let arm_raised = match (right_wrist, right_shoulder) {
            (Some(wrist), Some(shoulder)) => wrist.y < shoulder.y - ARM_RAISED_MARGIN,
            _ => false,
        };

        let reaching = match (right_wrist, right_shoulder) {
            (Some(wrist), Some(shoulder)) => (wrist.x - shoulder.x).abs() > REACHING_ARM_OFFSET,
            _ => false,
        };

        let picking = match (right_wrist, last.get(RIGHT_HIP)) {
            (Some(wrist), Some(hip)) => wrist.y > hip.y + PICKING_MARGIN,
            _ => false,
        };

        let (walking, sitting) = match (first.get(LEFT_HIP), last.get(LEFT_HIP)) {
            (Some(start), Some(end)) => (
                (start.x - end.x).abs() > WALKING_HIP_DRIFT,
                end.y - start.y > SITTING_HIP_DROP,
            ),
            _ => (false, false),
        };

        Self {
            arm_raised,
            walking,
            reaching,
            picking,
            sitting,
        }
    }
}

// ---------------------------------------------------------------------------
// PoseBuffer
// ---------------------------------------------------------------------------

/// FIFO window of the most recent poses, bounded at [`POSE_BUFFER_CAPACITY`].
#[derive(Debug, Clone)]
pub struct PoseBuffer {
    poses: VecDeque<PoseRecord>,
    capacity: usize,
}

impl PoseBuffer {
    pub fn new() -> Self {
        Self::with_capacity(POSE_BUFFER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            poses: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append the newest pose, evicting the oldest once over capacity.
    pub fn push(&mut self, pose: PoseRecord) {
        self.poses.push_back(pose);
        if self.poses.len() > self.capacity {
            self.poses.pop_front();
        }
    }

    /// Whether enough poses are buffered for [`PoseBuffer::movements`].
    pub fn is_ready(&self) -> bool {
        self.poses.len() >= MIN_POSES_FOR_ANALYSIS
    }

    /// Movement predicates over the buffered window, or `None` while fewer
    /// than [`MIN_POSES_FOR_ANALYSIS`] poses are held.
    pub fn movements(&self) -> Option<Movements> {
        if !self.is_ready() {
            return None;
        }
        let first = self.poses.front()?;
        let last = self.poses.back()?;
        Some(Movements::between(first, last))
    }
}

impl Default for PoseBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Keypoint;

    fn pose(points: &[(&str, f64, f64)]) -> PoseRecord {
        PoseRecord {
            keypoints: points
                .iter()
                .map(|(name, x, y)| (name.to_string(), Keypoint::planar(*x, *y)))
                .collect(),
            confidence: 1.0,
        }
    }

    fn neutral() -> PoseRecord {
        pose(&[
            (RIGHT_SHOULDER, 350.0, 140.0),
            (RIGHT_WRIST, 360.0, 240.0),
            (RIGHT_HIP, 340.0, 290.0),
            (LEFT_HIP, 300.0, 290.0),
        ])
    }

    // -- PoseBuffer ----------------------------------------------------------

    #[test]
    fn buffer_is_bounded_fifo() {
        let mut buffer = PoseBuffer::new();
        for i in 0..45 {
            buffer.push(pose(&[(LEFT_HIP, i as f64, 0.0)]));
        }
        assert_eq!(buffer.poses.len(), POSE_BUFFER_CAPACITY);
        // Oldest retained is the 16th pushed (index 15).
        assert_eq!(buffer.poses.front().unwrap().get(LEFT_HIP).unwrap().x, 15.0);
        assert_eq!(buffer.poses.back().unwrap().get(LEFT_HIP).unwrap().x, 44.0);
    }

    #[test]
    fn no_movements_below_minimum() {
        let mut buffer = PoseBuffer::new();
        for _ in 0..MIN_POSES_FOR_ANALYSIS - 1 {
            buffer.push(neutral());
        }
        assert!(buffer.movements().is_none());
        buffer.push(neutral());
        assert_eq!(buffer.movements(), Some(Movements::default()));
    }

    #[test]
    fn empty_buffer_reports_nothing() {
        assert!(PoseBuffer::new().movements().is_none());
    }

    // -- predicates ----------------------------------------------------------

    #[test]
    fn arm_raised_when_wrist_above_shoulder_margin() {
        let last = pose(&[(RIGHT_SHOULDER, 350.0, 140.0), (RIGHT_WRIST, 350.0, 89.0)]);
        assert!(Movements::between(&neutral(), &last).arm_raised);

        let last = pose(&[(RIGHT_SHOULDER, 350.0, 140.0), (RIGHT_WRIST, 350.0, 90.0)]);
        assert!(!Movements::between(&neutral(), &last).arm_raised);
    }

    #[test]
    fn walking_compares_window_endpoints() {
        let first = pose(&[(LEFT_HIP, 300.0, 290.0)]);
        let last = pose(&[(LEFT_HIP, 331.0, 290.0)]);
        assert!(Movements::between(&first, &last).walking);

        let last = pose(&[(LEFT_HIP, 330.0, 290.0)]);
        assert!(!Movements::between(&first, &last).walking);
    }

    #[test]
    fn reaching_uses_horizontal_offset() {
        let last = pose(&[(RIGHT_SHOULDER, 350.0, 140.0), (RIGHT_WRIST, 451.0, 140.0)]);
        assert!(Movements::between(&neutral(), &last).reaching);

        let last = pose(&[(RIGHT_SHOULDER, 350.0, 140.0), (RIGHT_WRIST, 249.0, 140.0)]);
        assert!(Movements::between(&neutral(), &last).reaching);
    }

    #[test]
    fn picking_when_wrist_below_hip_margin() {
        let last = pose(&[(RIGHT_HIP, 340.0, 290.0), (RIGHT_WRIST, 340.0, 341.0)]);
        assert!(Movements::between(&neutral(), &last).picking);

        let last = pose(&[(RIGHT_HIP, 340.0, 290.0), (RIGHT_WRIST, 340.0, 340.0)]);
        assert!(!Movements::between(&neutral(), &last).picking);
    }

    #[test]
    fn sitting_when_hip_drops() {
        let first = pose(&[(LEFT_HIP, 300.0, 290.0)]);
        let last = pose(&[(LEFT_HIP, 300.0, 341.0)]);
        assert!(Movements::between(&first, &last).sitting);

        // Rising is not sitting.
        let last = pose(&[(LEFT_HIP, 300.0, 200.0)]);
        assert!(!Movements::between(&first, &last).sitting);
    }

    #[test]
    fn missing_keypoints_default_to_false() {
        let empty = PoseRecord::default();
        assert_eq!(Movements::between(&empty, &empty), Movements::default());
        // Hip present only in the last record: window predicates stay false.
        let last = pose(&[(LEFT_HIP, 900.0, 900.0)]);
        let m = Movements::between(&empty, &last);
        assert!(!m.walking && !m.sitting);
    }

    #[test]
    fn window_drift_not_neighbor_velocity() {
        let mut buffer = PoseBuffer::new();
        // Hip creeps 2px per frame: never >30 between neighbours, 38px overall.
        for i in 0..20 {
            buffer.push(pose(&[(LEFT_HIP, 300.0 + 2.0 * i as f64, 290.0)]));
        }
        assert!(buffer.movements().unwrap().walking);
    }
}
