//! Handlers for annotation export.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use humanosync_core::export::{render, ExportFormat, ExportSummary};
use humanosync_core::types::VideoId;
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
}

/// GET /api/video/{id}/export?format=json|csv|yaml
///
/// Renders whichever artifacts exist as an attachment. `format` defaults
/// to `json`.
pub async fn export_annotations(
    State(state): State<AppState>,
    Path(video_id): Path<VideoId>,
    Query(params): Query<ExportParams>,
) -> AppResult<impl IntoResponse> {
    let format = ExportFormat::parse(params.format.as_deref().unwrap_or("json"))?;
    let bundle = state.store.bundle(&video_id).await?;
    let body = render(&bundle, format, &video_id)?;

    tracing::info!(video_id = %video_id, format = format.extension(), "Exported annotations");

    let disposition = format!("attachment; filename={}", format.file_name(&video_id));
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// GET /api/video/{id}/export/summary
pub async fn export_summary(
    State(state): State<AppState>,
    Path(video_id): Path<VideoId>,
) -> AppResult<Json<ExportSummary>> {
    let bundle = state.store.bundle(&video_id).await?;
    Ok(Json(ExportSummary::from_bundle(&video_id, &bundle)))
}
