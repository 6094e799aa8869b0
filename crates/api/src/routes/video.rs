use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{annotations, export, upload};
use crate::state::AppState;

/// Routes mounted at `/api/video`.
///
/// ```text
/// GET    /{id}/status
/// GET    /{id}/file
/// GET    /{id}/info
/// GET    /{id}/pose
/// PUT    /{id}/pose/{frame_key}
/// GET    /{id}/objects
/// PUT    /{id}/objects/{frame_key}
/// GET    /{id}/actions
/// POST   /{id}/actions
/// DELETE /{id}/actions/{index}
/// GET    /{id}/frame/{frame}
/// POST   /{id}/annotations
/// GET    /{id}/export
/// GET    /{id}/export/summary
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/status", get(upload::get_status))
        .route("/{id}/file", get(upload::get_video_file))
        .route("/{id}/info", get(upload::get_info))
        .route("/{id}/pose", get(annotations::get_pose))
        .route("/{id}/pose/{frame_key}", put(annotations::update_pose_frame))
        .route("/{id}/objects", get(annotations::get_objects))
        .route(
            "/{id}/objects/{frame_key}",
            put(annotations::update_objects_frame),
        )
        .route(
            "/{id}/actions",
            get(annotations::get_actions).post(annotations::add_action),
        )
        .route("/{id}/actions/{index}", delete(annotations::delete_action))
        .route("/{id}/frame/{frame}", get(annotations::get_frame))
        .route("/{id}/annotations", post(annotations::save_annotations))
        .route("/{id}/export", get(export::export_annotations))
        .route("/{id}/export/summary", get(export::export_summary))
}
