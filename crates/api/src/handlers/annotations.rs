//! Handlers for reading and editing a video's annotations.
//!
//! Edits are read-modify-write on the stored artifact with no locking; two
//! clients editing the same artifact concurrently race and the last write
//! wins.

use axum::extract::{Path, State};
use axum::Json;
use humanosync_core::pose::{ObjectDetection, ObjectMap, PoseMap, PoseRecord};
use humanosync_core::segment::{ActionSegment, DEFAULT_SEGMENT_CONFIDENCE};
use humanosync_core::types::{FrameIndex, VideoId};
use humanosync_store::models::{BulkAnnotations, FrameView};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::MessageResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /actions`. Confidence defaults to the segment default.
#[derive(Debug, Deserialize)]
pub struct CreateActionSegment {
    pub label: String,
    pub start_frame: FrameIndex,
    pub end_frame: FrameIndex,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    DEFAULT_SEGMENT_CONFIDENCE
}

impl From<CreateActionSegment> for ActionSegment {
    fn from(input: CreateActionSegment) -> Self {
        Self {
            label: input.label,
            start_frame: input.start_frame,
            end_frame: input.end_frame,
            confidence: input.confidence,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SaveAnnotationsResponse {
    pub message: String,
    pub saved: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ActionAddedResponse {
    pub message: String,
    pub action_count: usize,
}

#[derive(Debug, Serialize)]
pub struct ActionDeletedResponse {
    pub message: String,
    pub removed: ActionSegment,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/video/{id}/pose
pub async fn get_pose(
    State(state): State<AppState>,
    Path(video_id): Path<VideoId>,
) -> AppResult<Json<PoseMap>> {
    Ok(Json(state.store.load_pose(&video_id).await?))
}

/// GET /api/video/{id}/objects
pub async fn get_objects(
    State(state): State<AppState>,
    Path(video_id): Path<VideoId>,
) -> AppResult<Json<ObjectMap>> {
    Ok(Json(state.store.load_objects(&video_id).await?))
}

/// GET /api/video/{id}/actions
pub async fn get_actions(
    State(state): State<AppState>,
    Path(video_id): Path<VideoId>,
) -> AppResult<Json<Vec<ActionSegment>>> {
    Ok(Json(state.store.load_actions(&video_id).await?))
}

/// GET /api/video/{id}/frame/{frame}
///
/// Pose and detections at the frame plus every action segment covering it.
/// `frame` is interpreted in the configured frame numbering.
pub async fn get_frame(
    State(state): State<AppState>,
    Path((video_id, frame)): Path<(VideoId, FrameIndex)>,
) -> AppResult<Json<FrameView>> {
    Ok(Json(state.store.frame_view(&video_id, frame).await?))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// POST /api/video/{id}/annotations
///
/// Replaces each non-empty artifact in the body wholesale.
pub async fn save_annotations(
    State(state): State<AppState>,
    Path(video_id): Path<VideoId>,
    Json(input): Json<BulkAnnotations>,
) -> AppResult<Json<SaveAnnotationsResponse>> {
    let saved = state.store.save_bulk(&video_id, input).await?;
    Ok(Json(SaveAnnotationsResponse {
        message: format!("Saved {} annotation set(s)", saved.len()),
        saved,
    }))
}

/// PUT /api/video/{id}/pose/{frame_key}
pub async fn update_pose_frame(
    State(state): State<AppState>,
    Path((video_id, frame_key)): Path<(VideoId, String)>,
    Json(record): Json<PoseRecord>,
) -> AppResult<Json<MessageResponse>> {
    state
        .store
        .upsert_pose_frame(&video_id, &frame_key, record)
        .await?;
    Ok(Json(MessageResponse::new(format!(
        "Pose updated for {frame_key}"
    ))))
}

/// PUT /api/video/{id}/objects/{frame_key}
pub async fn update_objects_frame(
    State(state): State<AppState>,
    Path((video_id, frame_key)): Path<(VideoId, String)>,
    Json(detections): Json<Vec<ObjectDetection>>,
) -> AppResult<Json<MessageResponse>> {
    state
        .store
        .upsert_objects_frame(&video_id, &frame_key, detections)
        .await?;
    Ok(Json(MessageResponse::new(format!(
        "Objects updated for {frame_key}"
    ))))
}

/// POST /api/video/{id}/actions
///
/// Appends a segment; the stored list stays sorted by `start_frame`.
pub async fn add_action(
    State(state): State<AppState>,
    Path(video_id): Path<VideoId>,
    Json(input): Json<CreateActionSegment>,
) -> AppResult<Json<ActionAddedResponse>> {
    let label = input.label.clone();
    let actions = state.store.append_action(&video_id, input.into()).await?;
    Ok(Json(ActionAddedResponse {
        message: format!("Action '{label}' added"),
        action_count: actions.len(),
    }))
}

/// DELETE /api/video/{id}/actions/{index}
///
/// `index` is a zero-based position in the stored order.
pub async fn delete_action(
    State(state): State<AppState>,
    Path((video_id, index)): Path<(VideoId, usize)>,
) -> AppResult<Json<ActionDeletedResponse>> {
    let removed = state.store.delete_action(&video_id, index).await?;
    Ok(Json(ActionDeletedResponse {
        message: format!("Action '{}' deleted", removed.label),
        removed,
    }))
}
