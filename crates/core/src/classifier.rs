//! Rule-based per-frame action classification.
//!
//! Two rule sets share the [`ActionClassifier`] interface:
//!
//! - [`PoseAndObjectClassifier`] looks at a single frame's pose and object
//!   detections (`reach`, `pick`, `place`, `walk`, `idle`).
//! - [`PoseOnlyClassifier`] accumulates poses in a [`PoseBuffer`] and labels
//!   from window movements (`wave`, `walk`, `reach`, `pick`, `sit`, `stand`).
//!
//! Both are first-match-wins over a fixed priority order.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::frame::FrameIndexing;
use crate::movement::{Movements, PoseBuffer};
use crate::pose::{
    ObjectDetection, ObjectMap, PoseMap, PoseRecord, LEFT_ANKLE, LEFT_SHOULDER, LEFT_WRIST,
    RIGHT_ANKLE, RIGHT_SHOULDER, RIGHT_WRIST,
};
use crate::types::FrameIndex;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Vertical wrist-to-shoulder offset that counts as reaching.
pub const REACH_VERTICAL_OFFSET: f64 = 100.0;

/// Wrist-to-object-center distance below which the object is being picked.
pub const PICK_DISTANCE: f64 = 50.0;

/// Horizontal ankle separation that counts as a walking stride.
pub const STRIDE_WIDTH: f64 = 50.0;

/// Object labels that can be picked up.
pub const PICKABLE_LABELS: &[&str] = &["cup", "bottle", "cell phone", "book"];

/// Object labels that things can be placed on.
pub const SURFACE_LABELS: &[&str] = &["table", "desk", "counter"];

const ARMS: [(&str, &str); 2] = [(LEFT_WRIST, LEFT_SHOULDER), (RIGHT_WRIST, RIGHT_SHOULDER)];
const WRISTS: [&str; 2] = [LEFT_WRIST, RIGHT_WRIST];

// ---------------------------------------------------------------------------
// ActionLabel
// ---------------------------------------------------------------------------

/// Every label either rule set can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionLabel {
    Idle,
    Reach,
    Pick,
    Place,
    Walk,
    Wave,
    Sit,
    Stand,
}

const VALID_LABEL_STRINGS: &[&str] = &[
    "idle", "reach", "pick", "place", "walk", "wave", "sit", "stand",
];

impl ActionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Reach => "reach",
            Self::Pick => "pick",
            Self::Place => "place",
            Self::Walk => "walk",
            Self::Wave => "wave",
            Self::Sit => "sit",
            Self::Stand => "stand",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "idle" => Ok(Self::Idle),
            "reach" => Ok(Self::Reach),
            "pick" => Ok(Self::Pick),
            "place" => Ok(Self::Place),
            "walk" => Ok(Self::Walk),
            "wave" => Ok(Self::Wave),
            "sit" => Ok(Self::Sit),
            "stand" => Ok(Self::Stand),
            _ => Err(CoreError::Validation(format!(
                "Invalid action label '{s}'. Must be one of: {}",
                VALID_LABEL_STRINGS.join(", ")
            ))),
        }
    }
}

impl AsRef<str> for ActionLabel {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

// ---------------------------------------------------------------------------
// ActionClassifier
// ---------------------------------------------------------------------------

/// A per-frame action labeler.
///
/// Frames are fed in ascending index order. Stateful classifiers may
/// return `None` until they have seen enough frames to decide.
pub trait ActionClassifier: Send {
    /// Short identifier used in logs and configuration.
    fn name(&self) -> &'static str;

    /// The closed set of labels this classifier can return.
    fn vocabulary(&self) -> &'static [ActionLabel];

    /// Label one frame.
    fn label_frame(&mut self, pose: &PoseRecord, objects: &[ObjectDetection])
        -> Option<ActionLabel>;
}

/// Which rule set a deployment runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    #[default]
    PoseAndObject,
    PoseOnly,
}

impl ClassifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PoseAndObject => "pose_and_object",
            Self::PoseOnly => "pose_only",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "pose_and_object" => Ok(Self::PoseAndObject),
            "pose_only" => Ok(Self::PoseOnly),
            _ => Err(CoreError::Validation(format!(
                "Invalid classifier '{s}'. Must be one of: pose_and_object, pose_only"
            ))),
        }
    }

    /// Fresh classifier instance; one per video since pose-only is stateful.
    pub fn build(&self) -> Box<dyn ActionClassifier> {
        match self {
            Self::PoseAndObject => Box::new(PoseAndObjectClassifier),
            Self::PoseOnly => Box::new(PoseOnlyClassifier::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// PoseAndObjectClassifier
// ---------------------------------------------------------------------------

/// Single-frame rules over pose and detected objects.
///
/// Priority: reach → pick → place → walk → idle.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoseAndObjectClassifier;

impl PoseAndObjectClassifier {
    pub const VOCABULARY: &'static [ActionLabel] = &[
        ActionLabel::Reach,
        ActionLabel::Pick,
        ActionLabel::Place,
        ActionLabel::Walk,
        ActionLabel::Idle,
    ];

    pub fn classify(pose: &PoseRecord, objects: &[ObjectDetection]) -> ActionLabel {
        if is_reaching(pose) {
            ActionLabel::Reach
        } else if is_picking(pose, objects) {
            ActionLabel::Pick
        } else if is_placing(pose, objects) {
            ActionLabel::Place
        } else if is_striding(pose) {
            ActionLabel::Walk
        } else {
            ActionLabel::Idle
        }
    }
}

impl ActionClassifier for PoseAndObjectClassifier {
    fn name(&self) -> &'static str {
        ClassifierKind::PoseAndObject.as_str()
    }

    fn vocabulary(&self) -> &'static [ActionLabel] {
        Self::VOCABULARY
    }

    fn label_frame(
        &mut self,
        pose: &PoseRecord,
        objects: &[ObjectDetection],
    ) -> Option<ActionLabel> {
        Some(Self::classify(pose, objects))
    }
}

/// Either arm's wrist is more than [`REACH_VERTICAL_OFFSET`] above or below
/// its shoulder. Only the vertical component is compared.
pub fn is_reaching(pose: &PoseRecord) -> bool {
    ARMS.iter().any(|(wrist, shoulder)| {
        match (pose.get(wrist), pose.get(shoulder)) {
            (Some(w), Some(s)) => (w.y - s.y).abs() > REACH_VERTICAL_OFFSET,
            _ => false,
        }
    })
}

/// Either wrist is strictly within [`PICK_DISTANCE`] of the center of a
/// pickable object.
pub fn is_picking(pose: &PoseRecord, objects: &[ObjectDetection]) -> bool {
    objects
        .iter()
        .filter(|obj| PICKABLE_LABELS.contains(&obj.label.as_str()))
        .any(|obj| {
            let (cx, cy) = obj.center();
            WRISTS
                .iter()
                .filter_map(|name| pose.get(name))
                .any(|wrist| wrist.distance_2d(cx, cy) < PICK_DISTANCE)
        })
}

/// Either wrist's `y` lies strictly between the top and bottom of a surface.
pub fn is_placing(pose: &PoseRecord, objects: &[ObjectDetection]) -> bool {
    objects
        .iter()
        .filter(|obj| SURFACE_LABELS.contains(&obj.label.as_str()))
        .any(|obj| {
            let (top, bottom) = (obj.bbox[1], obj.bbox[3]);
            WRISTS
                .iter()
                .filter_map(|name| pose.get(name))
                .any(|wrist| top < wrist.y && wrist.y < bottom)
        })
}

/// Ankles are more than [`STRIDE_WIDTH`] apart horizontally.
pub fn is_striding(pose: &PoseRecord) -> bool {
    match (pose.get(LEFT_ANKLE), pose.get(RIGHT_ANKLE)) {
        (Some(l), Some(r)) => (l.x - r.x).abs() > STRIDE_WIDTH,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// PoseOnlyClassifier
// ---------------------------------------------------------------------------

/// Window-movement rules over the recent pose history.
///
/// Priority: wave → walk → reach → pick → sit → stand.
#[derive(Debug, Clone, Default)]
pub struct PoseOnlyClassifier {
    buffer: PoseBuffer,
}

impl PoseOnlyClassifier {
    pub const VOCABULARY: &'static [ActionLabel] = &[
        ActionLabel::Wave,
        ActionLabel::Walk,
        ActionLabel::Reach,
        ActionLabel::Pick,
        ActionLabel::Sit,
        ActionLabel::Stand,
    ];

    pub fn new() -> Self {
        Self {
            buffer: PoseBuffer::new(),
        }
    }

    pub fn classify(movements: &Movements) -> ActionLabel {
        if movements.arm_raised {
            ActionLabel::Wave
        } else if movements.walking {
            ActionLabel::Walk
        } else if movements.reaching {
            ActionLabel::Reach
        } else if movements.picking {
            ActionLabel::Pick
        } else if movements.sitting {
            ActionLabel::Sit
        } else {
            ActionLabel::Stand
        }
    }
}

impl ActionClassifier for PoseOnlyClassifier {
    fn name(&self) -> &'static str {
        ClassifierKind::PoseOnly.as_str()
    }

    fn vocabulary(&self) -> &'static [ActionLabel] {
        Self::VOCABULARY
    }

    fn label_frame(
        &mut self,
        pose: &PoseRecord,
        _objects: &[ObjectDetection],
    ) -> Option<ActionLabel> {
        if pose.is_empty() {
            return None;
        }
        self.buffer.push(pose.clone());
        self.buffer.movements().map(|m| Self::classify(&m))
    }
}

// ---------------------------------------------------------------------------
// Frame labeling
// ---------------------------------------------------------------------------

/// Run `classifier` over every frame with a pose, in ascending index order.
///
/// Frames with no pose (detection failed) and keys that do not parse under
/// `indexing` are skipped. Objects are looked up by the same key; a frame
/// with no detections sees an empty list.
pub fn label_frames(
    classifier: &mut dyn ActionClassifier,
    poses: &PoseMap,
    objects: &ObjectMap,
    indexing: FrameIndexing,
) -> Vec<(FrameIndex, ActionLabel)> {
    let mut frames: Vec<(FrameIndex, &String, &PoseRecord)> = poses
        .iter()
        .filter_map(|(key, pose)| indexing.index_of(key).ok().map(|index| (index, key, pose)))
        .collect();
    frames.sort_by_key(|(index, _, _)| *index);

    frames
        .into_iter()
        .filter_map(|(index, key, pose)| {
            let detections = objects.get(key).map(Vec::as_slice).unwrap_or(&[]);
            classifier
                .label_frame(pose, detections)
                .map(|label| (index, label))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
