#![allow(dead_code)]

use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use humanosync_api::config::ServerConfig;
use humanosync_api::router::build_app_router;
use humanosync_api::state::AppState;
use humanosync_core::frame::frame_key;
use humanosync_core::pose::{Keypoint, ObjectDetection, ObjectMap, PoseMap, PoseRecord};
use humanosync_core::segment::ActionSegment;
use humanosync_pipeline::PipelineSettings;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Build a test `ServerConfig` rooted in `root`.
///
/// Synthetic detections, zero-based frames and a 30-second timeout.
pub fn test_config(root: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_dir: root.path().join("uploads"),
        data_dir: root.path().join("data"),
        max_upload_bytes: 10 * 1024 * 1024,
        pipeline: PipelineSettings::default(),
    }
}

/// The application under test plus the state it was built from, so tests
/// can seed artifacts directly.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _root: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_pipeline(PipelineSettings::default())
    }

    pub fn with_pipeline(pipeline: PipelineSettings) -> Self {
        let root = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            pipeline,
            ..test_config(&root)
        };
        let state = AppState::new(config.clone());
        let router = build_app_router(state.clone(), &config);
        Self {
            router,
            state,
            _root: root,
        }
    }

    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Write pose, objects and actions for `video_id`.
    pub async fn seed(&self, video_id: &str) {
        let artifacts = self.state.store.artifacts(video_id).unwrap();
        artifacts.write_pose(&sample_pose()).await.unwrap();
        artifacts.write_objects(&sample_objects()).await.unwrap();
        artifacts.write_actions(&sample_actions()).await.unwrap();
    }

    /// Create an empty annotation directory for `video_id`.
    pub async fn seed_empty(&self, video_id: &str) {
        let artifacts = self.state.store.artifacts(video_id).unwrap();
        artifacts.create().await.unwrap();
    }

    /// Poll the status endpoint until extraction leaves the queue and
    /// processing states.
    pub async fn wait_for_terminal_status(&self, video_id: &str) -> String {
        for _ in 0..200 {
            let response = get(self.app(), &format!("/api/video/{video_id}/status")).await;
            let json = body_json(response).await;
            let status = json["status"].as_str().unwrap_or_default().to_string();
            if status != "queued" && status != "processing" {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("extraction for {video_id} did not finish");
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Two frames of pose, `frame_000` and `frame_001`.
pub fn sample_pose() -> PoseMap {
    (0..2)
        .map(|i: u32| {
            let offset = f64::from(i) * 5.0;
            let record = PoseRecord {
                keypoints: [
                    ("left_wrist".to_string(), Keypoint::new(100.0 + offset, 200.0, -1.0)),
                    ("nose".to_string(), Keypoint::new(120.0 + offset, 80.0, 0.5)),
                ]
                .into_iter()
                .collect(),
                confidence: 0.9,
            };
            (frame_key(i), record)
        })
        .collect()
}

pub fn sample_objects() -> ObjectMap {
    [
        (
            frame_key(0),
            vec![ObjectDetection::new("cup", [90.0, 190.0, 130.0, 230.0], 0.8)],
        ),
        (
            frame_key(1),
            vec![
                ObjectDetection::new("cup", [95.0, 190.0, 135.0, 230.0], 0.82),
                ObjectDetection::new("person", [50.0, 20.0, 250.0, 460.0], 0.95),
            ],
        ),
    ]
    .into_iter()
    .collect()
}

pub fn sample_actions() -> Vec<ActionSegment> {
    vec![
        ActionSegment {
            label: "idle".into(),
            start_frame: 0,
            end_frame: 0,
            confidence: 0.85,
        },
        ActionSegment {
            label: "reach".into(),
            start_frame: 1,
            end_frame: 1,
            confidence: 0.85,
        },
    ]
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn send_json(app: Router, method: Method, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

const BOUNDARY: &str = "humanosync-test-boundary";

/// POST a single-file multipart form to `/api/upload`.
pub async fn upload(app: Router, field: &str, filename: &str, data: &[u8]) -> Response<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
