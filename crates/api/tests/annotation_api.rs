//! Integration tests for annotation reads and edits.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, delete, get, send_json, TestApp};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: artifact reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reads_return_stored_artifacts() {
    let test = TestApp::new();
    test.seed("vid-1").await;

    let pose = body_json(get(test.app(), "/api/video/vid-1/pose").await).await;
    assert_eq!(pose["frame_001"]["keypoints"]["nose"], json!([125.0, 80.0, 0.5]));
    assert_eq!(pose["frame_001"]["confidence"], 0.9);

    let objects = body_json(get(test.app(), "/api/video/vid-1/objects").await).await;
    assert_eq!(objects["frame_001"].as_array().unwrap().len(), 2);
    assert_eq!(objects["frame_000"][0]["label"], "cup");

    let actions = body_json(get(test.app(), "/api/video/vid-1/actions").await).await;
    assert_eq!(actions[1]["label"], "reach");
}

#[tokio::test]
async fn reads_of_unknown_video_are_404() {
    let test = TestApp::new();
    for artifact in ["pose", "objects", "actions", "info"] {
        let response = get(test.app(), &format!("/api/video/missing/{artifact}")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{artifact}");
    }
}

#[tokio::test]
async fn missing_artifact_of_known_video_is_404() {
    let test = TestApp::new();
    test.seed_empty("empty").await;

    let response = get(test.app(), "/api/video/empty/pose").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn malformed_video_id_is_rejected() {
    let test = TestApp::new();
    let response = get(test.app(), "/api/video/bad.id/pose").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Test: frame view
// ---------------------------------------------------------------------------

#[tokio::test]
async fn frame_view_combines_artifacts() {
    let test = TestApp::new();
    test.seed("vid-1").await;

    let response = get(test.app(), "/api/video/vid-1/frame/1").await;
    assert_eq!(response.status(), StatusCode::OK);

    let frame = body_json(response).await;
    assert_eq!(frame["frame"], 1);
    assert!(frame["pose"]["keypoints"]["left_wrist"].is_array());
    assert_eq!(frame["objects"].as_array().unwrap().len(), 2);
    assert_eq!(frame["actions"], json!([{
        "label": "reach",
        "start_frame": 1,
        "end_frame": 1,
        "confidence": 0.85,
    }]));
}

#[tokio::test]
async fn frame_view_past_the_end_omits_pose_and_objects() {
    let test = TestApp::new();
    test.seed("vid-1").await;

    let frame = body_json(get(test.app(), "/api/video/vid-1/frame/500").await).await;
    assert_eq!(frame["frame"], 500);
    assert!(frame.get("pose").is_none());
    assert!(frame.get("objects").is_none());
    assert_eq!(frame["actions"], json!([]));
}

// ---------------------------------------------------------------------------
// Test: per-frame edits
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pose_frame_update_replaces_record() {
    let test = TestApp::new();
    test.seed("vid-1").await;

    let body = json!({ "keypoints": { "nose": [1.0, 2.0] }, "confidence": 0.5 });
    let response = send_json(test.app(), Method::PUT, "/api/video/vid-1/pose/frame_000", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["message"].is_string());

    let pose = body_json(get(test.app(), "/api/video/vid-1/pose").await).await;
    assert_eq!(pose["frame_000"]["keypoints"], json!({ "nose": [1.0, 2.0] }));
    assert_eq!(pose["frame_000"]["confidence"], 0.5);
    assert_eq!(pose["frame_001"]["confidence"], 0.9);
}

#[tokio::test]
async fn pose_frame_update_adds_new_frame() {
    let test = TestApp::new();
    test.seed("vid-1").await;

    let body = json!({ "keypoints": {}, "confidence": 0.0 });
    let response = send_json(test.app(), Method::PUT, "/api/video/vid-1/pose/frame_007", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let pose = body_json(get(test.app(), "/api/video/vid-1/pose").await).await;
    assert_eq!(pose.as_object().unwrap().len(), 3);
}

#[tokio::test]
async fn pose_frame_update_rejects_malformed_key() {
    let test = TestApp::new();
    test.seed("vid-1").await;

    let body = json!({ "keypoints": {}, "confidence": 0.0 });
    let response = send_json(test.app(), Method::PUT, "/api/video/vid-1/pose/frame_x", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pose_frame_update_without_pose_artifact_is_404() {
    let test = TestApp::new();
    test.seed_empty("empty").await;

    let body = json!({ "keypoints": {}, "confidence": 0.0 });
    let response = send_json(test.app(), Method::PUT, "/api/video/empty/pose/frame_000", body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn objects_frame_update_replaces_detections() {
    let test = TestApp::new();
    test.seed("vid-1").await;

    let body = json!([{ "label": "bottle", "bbox": [0.0, 0.0, 10.0, 10.0], "confidence": 0.7 }]);
    let response =
        send_json(test.app(), Method::PUT, "/api/video/vid-1/objects/frame_001", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let objects = body_json(get(test.app(), "/api/video/vid-1/objects").await).await;
    assert_eq!(objects["frame_001"].as_array().unwrap().len(), 1);
    assert_eq!(objects["frame_001"][0]["label"], "bottle");
}

// ---------------------------------------------------------------------------
// Test: action segments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn added_action_is_sorted_with_default_confidence() {
    let test = TestApp::new();
    test.seed("vid-1").await;

    let body = json!({ "label": "wave", "start_frame": 0, "end_frame": 0 });
    let response = send_json(test.app(), Method::POST, "/api/video/vid-1/actions", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["action_count"], 3);

    let body = json!({ "label": "sit", "start_frame": 20, "end_frame": 30, "confidence": 0.4 });
    send_json(test.app(), Method::POST, "/api/video/vid-1/actions", body).await;

    let actions = body_json(get(test.app(), "/api/video/vid-1/actions").await).await;
    let starts: Vec<u64> = actions
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["start_frame"].as_u64().unwrap())
        .collect();
    assert_eq!(starts, vec![0, 0, 1, 20]);
    assert_eq!(actions[3]["confidence"], 0.4);

    let wave = actions
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["label"] == "wave")
        .unwrap();
    assert_eq!(wave["confidence"], 0.85);
}

#[tokio::test]
async fn action_can_be_added_to_video_without_actions() {
    let test = TestApp::new();
    test.seed_empty("empty").await;

    let body = json!({ "label": "idle", "start_frame": 0, "end_frame": 10 });
    let response = send_json(test.app(), Method::POST, "/api/video/empty/actions", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["action_count"], 1);
}

#[tokio::test]
async fn inverted_action_is_rejected() {
    let test = TestApp::new();
    test.seed("vid-1").await;

    let body = json!({ "label": "wave", "start_frame": 9, "end_frame": 3 });
    let response = send_json(test.app(), Method::POST, "/api/video/vid-1/actions", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn action_for_unknown_video_is_404() {
    let test = TestApp::new();
    let body = json!({ "label": "wave", "start_frame": 0, "end_frame": 3 });
    let response = send_json(test.app(), Method::POST, "/api/video/ghost/actions", body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_action_by_index() {
    let test = TestApp::new();
    test.seed("vid-1").await;

    let response = delete(test.app(), "/api/video/vid-1/actions/0").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["removed"]["label"], "idle");
    assert!(json["message"].as_str().unwrap().contains("idle"));

    let actions = body_json(get(test.app(), "/api/video/vid-1/actions").await).await;
    assert_eq!(actions.as_array().unwrap().len(), 1);
    assert_eq!(actions[0]["label"], "reach");
}

#[tokio::test]
async fn delete_action_out_of_range_leaves_list_intact() {
    let test = TestApp::new();
    test.seed("vid-1").await;

    let response = delete(test.app(), "/api/video/vid-1/actions/2").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "OUT_OF_RANGE");

    let actions = body_json(get(test.app(), "/api/video/vid-1/actions").await).await;
    assert_eq!(actions.as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Test: bulk save
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bulk_save_skips_empty_artifacts() {
    let test = TestApp::new();
    test.seed("vid-1").await;

    let body = json!({
        "pose": {},
        "actions": [
            { "label": "b", "start_frame": 5, "end_frame": 6, "confidence": 0.9 },
            { "label": "a", "start_frame": 0, "end_frame": 4, "confidence": 0.9 },
        ],
    });
    let response = send_json(test.app(), Method::POST, "/api/video/vid-1/annotations", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["saved"], json!(["actions"]));

    let actions = body_json(get(test.app(), "/api/video/vid-1/actions").await).await;
    assert_eq!(actions[0]["label"], "a");

    let pose = body_json(get(test.app(), "/api/video/vid-1/pose").await).await;
    assert_eq!(pose.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn bulk_save_with_bad_key_writes_nothing() {
    let test = TestApp::new();
    test.seed("vid-1").await;

    let body = json!({
        "objects": { "bogus": [] },
        "actions": [{ "label": "a", "start_frame": 0, "end_frame": 0, "confidence": 0.9 }],
    });
    let response = send_json(test.app(), Method::POST, "/api/video/vid-1/annotations", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let actions = body_json(get(test.app(), "/api/video/vid-1/actions").await).await;
    assert_eq!(actions.as_array().unwrap().len(), 2);
}
