//! Handlers for video upload, extraction status and the uploaded file.

use std::path::{Path as FsPath, PathBuf};

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use humanosync_core::error::CoreError;
use humanosync_core::extraction::ExtractionState;
use humanosync_core::types::VideoId;
use serde::Serialize;
use tokio_util::io::ReaderStream;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Accepted upload extensions (lower-case, without the dot).
pub const SUPPORTED_VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov"];

/// Multipart field carrying the video.
const VIDEO_FIELD: &str = "video";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub video_id: VideoId,
    pub filename: String,
    pub status: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub video_id: VideoId,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub video_id: VideoId,
    pub has_pose: bool,
    pub has_objects: bool,
    pub has_actions: bool,
    pub frame_count: usize,
    pub status: String,
}

fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "mp4" => "video/mp4",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

/// Lower-cased extension of `filename` if it is a supported video type.
fn supported_extension(filename: &str) -> Option<String> {
    let ext = FsPath::new(filename).extension()?.to_str()?.to_lowercase();
    SUPPORTED_VIDEO_EXTENSIONS
        .contains(&ext.as_str())
        .then_some(ext)
}

/// Stored upload for `video_id`, whatever its extension.
async fn find_upload(upload_dir: &FsPath, video_id: &str) -> AppResult<Option<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(upload_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(AppError::InternalError(e.to_string())),
    };

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
    {
        let path = entry.path();
        if path.file_stem().and_then(|s| s.to_str()) == Some(video_id) {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

/// POST /api/upload
///
/// Accepts a multipart form with a required `video` field (.mp4, .avi or
/// .mov). The file is stored as `<UPLOAD_DIR>/<video_id>.<ext>` and the
/// extraction job is spawned in the background; the response returns
/// immediately with status `queued`.
pub async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let mut file_data: Option<(String, axum::body::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        file_data = Some((filename, data));
    }

    let (filename, data) = file_data
        .ok_or_else(|| AppError::BadRequest("Missing required 'video' field".into()))?;

    let ext = supported_extension(&filename).ok_or_else(|| {
        AppError::BadRequest("Invalid file type. Only .mp4, .avi, .mov are supported".into())
    })?;

    let video_id = uuid::Uuid::new_v4().to_string();
    let upload_dir = &state.config.upload_dir;
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let video_path = upload_dir.join(format!("{video_id}.{ext}"));
    tokio::fs::write(&video_path, &data)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let artifacts = state.store.artifacts(&video_id)?;
    artifacts.create().await?;
    state.status.set(&video_id, ExtractionState::Queued).await;

    tracing::info!(
        video_id = %video_id,
        filename = %filename,
        bytes = data.len(),
        "Video uploaded, starting extraction",
    );

    state.job.spawn(
        video_id.clone(),
        video_path,
        artifacts,
        state.status.clone(),
    );

    Ok(Json(UploadResponse {
        video_id,
        filename,
        status: ExtractionState::Queued.status(),
        message: "Video uploaded successfully. Processing started.",
    }))
}

/// GET /api/video/{id}/status
///
/// Returns the extraction status. Ids with no status entry (never uploaded,
/// or uploaded before a restart) are 404.
pub async fn get_status(
    State(state): State<AppState>,
    Path(video_id): Path<VideoId>,
) -> AppResult<Json<StatusResponse>> {
    let entry = state
        .status
        .get(&video_id)
        .await
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Video status",
                id: video_id.clone(),
            })
        })?;

    Ok(Json(StatusResponse {
        status: entry.state.status(),
        stage: entry.state.stage().map(|s| s.as_str()),
        video_id,
    }))
}

/// GET /api/video/{id}/info
///
/// Which artifacts exist, the pose frame count and the extraction status
/// (`unknown` when no entry is held).
pub async fn get_info(
    State(state): State<AppState>,
    Path(video_id): Path<VideoId>,
) -> AppResult<Json<InfoResponse>> {
    let presence = state.store.presence(&video_id).await?;
    let status = state
        .status
        .get(&video_id)
        .await
        .map_or_else(|| "unknown".to_string(), |entry| entry.state.status());

    Ok(Json(InfoResponse {
        video_id,
        has_pose: presence.has_pose,
        has_objects: presence.has_objects,
        has_actions: presence.has_actions,
        frame_count: presence.frame_count,
        status,
    }))
}

/// GET /api/video/{id}/file
///
/// Streams the uploaded video.
pub async fn get_video_file(
    State(state): State<AppState>,
    Path(video_id): Path<VideoId>,
) -> AppResult<Response> {
    let path = find_upload(&state.config.upload_dir, &video_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Video file",
                id: video_id.clone(),
            })
        })?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    let file_size = file
        .metadata()
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .len();
    let stream = ReaderStream::new(file);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&ext))
        .header(header::CONTENT_LENGTH, file_size.to_string())
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::InternalError(e.to_string()))
}
