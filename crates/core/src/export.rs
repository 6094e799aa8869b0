//! Annotation export renderers (JSON, CSV, ROS-style YAML) and the export
//! availability summary.
//!
//! All renderers are pure transforms of an [`AnnotationBundle`]; frame
//! timestamps assume [`DEFAULT_FPS`](crate::frame::DEFAULT_FPS).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::frame::{frame_to_seconds, parse_frame_key};
use crate::pose::{Keypoint, ObjectMap, PoseMap};
use crate::segment::ActionSegment;
use crate::types::FrameIndex;

/// Formats accepted by the export endpoint.
pub const AVAILABLE_FORMATS: &[&str] = &["json", "csv", "yaml"];

const POSE_SECTION: &str = "=== POSE DATA ===\n";
const OBJECT_SECTION: &str = "=== OBJECT DATA ===\n";
const ACTION_SECTION: &str = "=== ACTION DATA ===\n";

// ---------------------------------------------------------------------------
// ExportFormat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Yaml,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "yaml" => Ok(Self::Yaml),
            _ => Err(CoreError::Validation(format!(
                "Unsupported format: {s}. Must be one of: {}",
                AVAILABLE_FORMATS.join(", ")
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Yaml => "yaml",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
            Self::Yaml => "text/yaml",
        }
    }

    /// Attachment file name for a video's export.
    pub fn file_name(&self, video_id: &str) -> String {
        format!("{video_id}_annotations.{}", self.extension())
    }
}

// ---------------------------------------------------------------------------
// AnnotationBundle
// ---------------------------------------------------------------------------

/// Whichever of a video's three artifacts exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose: Option<PoseMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects: Option<ObjectMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<ActionSegment>>,
}

/// Render `bundle` in `format`.
pub fn render(
    bundle: &AnnotationBundle,
    format: ExportFormat,
    video_id: &str,
) -> Result<String, CoreError> {
    match format {
        ExportFormat::Json => render_json(bundle),
        ExportFormat::Csv => render_csv(bundle),
        ExportFormat::Yaml => render_yaml(bundle, video_id),
    }
}

pub fn render_json(bundle: &AnnotationBundle) -> Result<String, CoreError> {
    serde_json::to_string_pretty(bundle).map_err(|e| CoreError::Internal(e.to_string()))
}

/// Frame entries of a map ordered by frame index, malformed keys last.
fn by_frame<T>(map: &BTreeMap<String, T>) -> Vec<(&String, &T)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by_key(|(key, _)| parse_frame_key(key).unwrap_or(FrameIndex::MAX));
    entries
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn csv_error(e: impl std::fmt::Display) -> CoreError {
    CoreError::Internal(format!("CSV export failed: {e}"))
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String, CoreError> {
    let bytes = writer.into_inner().map_err(csv_error)?;
    String::from_utf8(bytes).map_err(csv_error)
}

fn pose_csv(pose: &PoseMap) -> Result<Option<String>, CoreError> {
    if pose.is_empty() {
        return Ok(None);
    }

    // Column set is the union over all frames; z only where some frame has it.
    let mut columns: BTreeMap<&str, bool> = BTreeMap::new();
    for record in pose.values() {
        for (name, kp) in &record.keypoints {
            *columns.entry(name.as_str()).or_default() |= kp.z.is_some();
        }
    }

    let mut header = vec!["frame".to_string()];
    for (name, has_z) in &columns {
        header.push(format!("{name}_x"));
        header.push(format!("{name}_y"));
        if *has_z {
            header.push(format!("{name}_z"));
        }
    }
    header.push("confidence".to_string());

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&header).map_err(csv_error)?;

    for (key, record) in by_frame(pose) {
        let mut row = vec![key.clone()];
        for (name, has_z) in &columns {
            let kp: Option<&Keypoint> = record.get(name);
            row.push(kp.map(|k| k.x.to_string()).unwrap_or_default());
            row.push(kp.map(|k| k.y.to_string()).unwrap_or_default());
            if *has_z {
                row.push(kp.and_then(|k| k.z).map(|z| z.to_string()).unwrap_or_default());
            }
        }
        row.push(record.confidence.to_string());
        writer.write_record(&row).map_err(csv_error)?;
    }

    finish_csv(writer).map(Some)
}

fn objects_csv(objects: &ObjectMap) -> Result<Option<String>, CoreError> {
    if objects.values().all(Vec::is_empty) {
        return Ok(None);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["frame", "label", "x1", "y1", "x2", "y2", "confidence"])
        .map_err(csv_error)?;

    for (key, detections) in by_frame(objects) {
        for obj in detections {
            let [x1, y1, x2, y2] = obj.bbox;
            writer
                .write_record([
                    key.clone(),
                    obj.label.clone(),
                    x1.to_string(),
                    y1.to_string(),
                    x2.to_string(),
                    y2.to_string(),
                    obj.confidence.to_string(),
                ])
                .map_err(csv_error)?;
        }
    }

    finish_csv(writer).map(Some)
}

fn actions_csv(actions: &[ActionSegment]) -> Result<Option<String>, CoreError> {
    if actions.is_empty() {
        return Ok(None);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    for segment in actions {
        writer.serialize(segment).map_err(csv_error)?;
    }
    finish_csv(writer).map(Some)
}

/// One CSV document with a titled section per artifact present.
pub fn render_csv(bundle: &AnnotationBundle) -> Result<String, CoreError> {
    let mut out = String::new();

    if let Some(pose) = &bundle.pose {
        out.push_str(POSE_SECTION);
        if let Some(table) = pose_csv(pose)? {
            out.push_str(&table);
            out.push_str("\n\n");
        }
    }

    if let Some(objects) = &bundle.objects {
        out.push_str(OBJECT_SECTION);
        if let Some(table) = objects_csv(objects)? {
            out.push_str(&table);
            out.push_str("\n\n");
        }
    }

    if let Some(actions) = &bundle.actions {
        out.push_str(ACTION_SECTION);
        if let Some(table) = actions_csv(actions)? {
            out.push_str(&table);
        }
    }

    Ok(out)
}

// ---------------------------------------------------------------------------
// YAML
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct RosDocument<'a> {
    header: RosHeader<'a>,
    poses: Vec<RosPose<'a>>,
    objects: Vec<RosObject<'a>>,
    actions: Vec<RosAction<'a>>,
}

#[derive(Debug, Serialize)]
struct RosHeader<'a> {
    seq: u32,
    stamp: RosStamp,
    frame_id: &'a str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct RosStamp {
    secs: u32,
    nsecs: u32,
}

#[derive(Debug, Serialize)]
struct RosPose<'a> {
    frame: FrameIndex,
    timestamp: f64,
    joints: &'a BTreeMap<String, Keypoint>,
    confidence: f64,
}

#[derive(Debug, Serialize)]
struct RosObject<'a> {
    frame: FrameIndex,
    timestamp: f64,
    class: &'a str,
    bbox: RosBox,
    confidence: f64,
}

#[derive(Debug, Serialize)]
struct RosBox {
    x_min: f64,
    y_min: f64,
    x_max: f64,
    y_max: f64,
}

#[derive(Debug, Serialize)]
struct RosAction<'a> {
    action: &'a str,
    start_time: f64,
    end_time: f64,
    start_frame: FrameIndex,
    end_frame: FrameIndex,
    confidence: f64,
}

/// ROS-message-shaped YAML. Entries under malformed frame keys are skipped.
pub fn render_yaml(bundle: &AnnotationBundle, video_id: &str) -> Result<String, CoreError> {
    let mut doc = RosDocument {
        header: RosHeader {
            seq: 1,
            stamp: RosStamp { secs: 0, nsecs: 0 },
            frame_id: video_id,
            version: "1.0",
        },
        poses: Vec::new(),
        objects: Vec::new(),
        actions: Vec::new(),
    };

    if let Some(pose) = &bundle.pose {
        for (key, record) in by_frame(pose) {
            let Ok(frame) = parse_frame_key(key) else { continue };
            doc.poses.push(RosPose {
                frame,
                timestamp: frame_to_seconds(frame),
                joints: &record.keypoints,
                confidence: record.confidence,
            });
        }
    }

    if let Some(objects) = &bundle.objects {
        for (key, detections) in by_frame(objects) {
            let Ok(frame) = parse_frame_key(key) else { continue };
            for obj in detections {
                let [x_min, y_min, x_max, y_max] = obj.bbox;
                doc.objects.push(RosObject {
                    frame,
                    timestamp: frame_to_seconds(frame),
                    class: &obj.label,
                    bbox: RosBox {
                        x_min,
                        y_min,
                        x_max,
                        y_max,
                    },
                    confidence: obj.confidence,
                });
            }
        }
    }

    if let Some(actions) = &bundle.actions {
        doc.actions = actions
            .iter()
            .map(|a| RosAction {
                action: &a.label,
                start_time: frame_to_seconds(a.start_frame),
                end_time: frame_to_seconds(a.end_frame),
                start_frame: a.start_frame,
                end_frame: a.end_frame,
                confidence: a.confidence,
            })
            .collect();
    }

    serde_yaml::to_string(&doc).map_err(|e| CoreError::Internal(format!("YAML export failed: {e}")))
}

// ---------------------------------------------------------------------------
// Export summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoseAvailability {
    pub frame_count: usize,
    pub keypoint_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectAvailability {
    pub frame_count: usize,
    pub total_detections: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionAvailability {
    pub action_count: usize,
    pub action_types: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AvailableData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pose: Option<PoseAvailability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objects: Option<ObjectAvailability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<ActionAvailability>,
}

/// What a video can be exported as, and how much data each artifact holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    pub video_id: String,
    pub available_formats: Vec<&'static str>,
    pub available_data: AvailableData,
}

impl ExportSummary {
    pub fn from_bundle(video_id: &str, bundle: &AnnotationBundle) -> Self {
        let pose = bundle.pose.as_ref().map(|pose| PoseAvailability {
            frame_count: pose.len(),
            keypoint_count: pose.values().next().map_or(0, |r| r.keypoints.len()),
        });

        let objects = bundle.objects.as_ref().map(|objects| ObjectAvailability {
            frame_count: objects.len(),
            total_detections: objects.values().map(Vec::len).sum(),
        });

        let actions = bundle.actions.as_ref().map(|actions| ActionAvailability {
            action_count: actions.len(),
            action_types: actions
                .iter()
                .map(|a| a.label.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        });

        Self {
            video_id: video_id.to_string(),
            available_formats: AVAILABLE_FORMATS.to_vec(),
            available_data: AvailableData {
                pose,
                objects,
                actions,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
