pub mod health;
pub mod video;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /upload                                  upload video, start extraction (POST)
///
/// /video/{id}/status                       extraction status
/// /video/{id}/file                         uploaded video file
/// /video/{id}/info                         artifact presence + status
/// /video/{id}/pose                         pose artifact
/// /video/{id}/pose/{frame_key}             replace one frame (PUT)
/// /video/{id}/objects                      object artifact
/// /video/{id}/objects/{frame_key}          replace one frame (PUT)
/// /video/{id}/actions                      action list, append (POST)
/// /video/{id}/actions/{index}              delete by position (DELETE)
/// /video/{id}/frame/{frame}                everything for one frame
/// /video/{id}/annotations                  bulk save (POST)
/// /video/{id}/export?format=json|csv|yaml  download annotations
/// /video/{id}/export/summary               export availability
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(handlers::upload::upload_video))
        .nest("/video", video::router())
}
