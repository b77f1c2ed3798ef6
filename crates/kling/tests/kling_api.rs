//! Integration tests for the Kling client against a mock HTTP server.

use std::time::Duration;

use assert_matches::assert_matches;
use mockito::Matcher;
use serde_json::json;

use fabula_core::error::AnimatorError;
use fabula_core::ports::SceneAnimator;
use fabula_core::scene::SceneInput;
use fabula_kling::client::{KlingClient, TaskHandle};
use fabula_kling::config::KlingConfig;

/// Client config pointed at the mock server, with an instant poll interval
/// so tests never actually wait.
fn test_config(base_url: String) -> KlingConfig {
    KlingConfig {
        base_url,
        access_key: "ak-test".to_string(),
        secret_key: "sk-test".to_string(),
        model_name: "kling-v1".to_string(),
        mode: "std".to_string(),
        video_duration: "5".to_string(),
        token_ttl_secs: 1800,
        token_skew_secs: 5,
        poll_attempts: 3,
        poll_interval: Duration::ZERO,
    }
}

fn scene_input() -> SceneInput {
    SceneInput {
        image_url: "https://img.example/scene-1.png".to_string(),
        motion_prompt: "clouds roll over the hills".to_string(),
    }
}

fn poll_handle() -> TaskHandle {
    TaskHandle {
        task_id: "task-123".to_string(),
        token: "test-token".to_string(),
    }
}

fn submitted_body() -> String {
    json!({
        "code": 0,
        "message": "SUCCEED",
        "request_id": "req-1",
        "data": {"task_id": "task-123", "task_status": "submitted"}
    })
    .to_string()
}

fn processing_body() -> String {
    json!({
        "code": 0,
        "message": "SUCCEED",
        "request_id": "req-2",
        "data": {"task_id": "task-123", "task_status": "processing"}
    })
    .to_string()
}

fn succeed_body() -> String {
    json!({
        "code": 0,
        "message": "SUCCEED",
        "request_id": "req-3",
        "data": {
            "task_id": "task-123",
            "task_status": "succeed",
            "task_result": {
                "videos": [
                    {"id": "vid-1", "url": "https://cdn.example/vid-1.mp4", "duration": "5.1"}
                ]
            }
        }
    })
    .to_string()
}

// ---------------------------------------------------------------------------
// Test: submit posts a signed request and returns the task handle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_signs_and_posts_the_scene() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/videos/image2video")
        .match_header("authorization", Matcher::Regex("^Bearer .+".to_string()))
        .match_body(Matcher::PartialJson(json!({
            "model_name": "kling-v1",
            "image": "https://img.example/scene-1.png",
            "prompt": "clouds roll over the hills",
            "mode": "std",
            "duration": "5"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(submitted_body())
        .expect(1)
        .create_async()
        .await;

    let client = KlingClient::new(test_config(server.url()));
    let handle = client.submit(&scene_input()).await.unwrap();

    assert_eq!(handle.task_id, "task-123");
    mock.assert_async().await;
}

// ---------------------------------------------------------------------------
// Test: a task that never finishes is queried exactly `poll_attempts` times
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poll_makes_exactly_the_budgeted_attempts() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/videos/image2video/task-123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(processing_body())
        .expect(3)
        .create_async()
        .await;

    let client = KlingClient::new(test_config(server.url()));
    let err = client.poll(&poll_handle()).await.unwrap_err();

    assert_matches!(err, AnimatorError::Timeout { attempts: 3 });
    mock.assert_async().await;
}

// ---------------------------------------------------------------------------
// Test: poll returns the artifact once the task succeeds
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poll_returns_artifact_when_the_task_succeeds() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/videos/image2video/task-123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(succeed_body())
        .expect(1)
        .create_async()
        .await;

    let client = KlingClient::new(test_config(server.url()));
    let artifact = client.poll(&poll_handle()).await.unwrap();

    assert_eq!(artifact.video_url, "https://cdn.example/vid-1.mp4");
    assert_eq!(artifact.remote_task_id, "task-123");
    assert_eq!(artifact.duration_secs, Some(5.1));
    mock.assert_async().await;
}

// ---------------------------------------------------------------------------
// Test: a failed task stops polling immediately and carries the message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poll_stops_on_failed_task() {
    let mut server = mockito::Server::new_async().await;
    let body = json!({
        "code": 0,
        "message": "SUCCEED",
        "request_id": "req-4",
        "data": {
            "task_id": "task-123",
            "task_status": "failed",
            "task_status_msg": "content moderation rejected the image"
        }
    })
    .to_string();

    let mock = server
        .mock("GET", "/v1/videos/image2video/task-123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(1)
        .create_async()
        .await;

    let client = KlingClient::new(test_config(server.url()));
    let err = client.poll(&poll_handle()).await.unwrap_err();

    assert_matches!(err, AnimatorError::TaskFailed(msg) => {
        assert!(msg.contains("content moderation"));
    });
    mock.assert_async().await;
}

// ---------------------------------------------------------------------------
// Test: an auth rejection aborts the poll loop on the first attempt
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poll_aborts_on_auth_rejection() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/videos/image2video/task-123")
        .with_status(401)
        .with_body("unauthorized")
        .expect(1)
        .create_async()
        .await;

    let client = KlingClient::new(test_config(server.url()));
    let err = client.poll(&poll_handle()).await.unwrap_err();

    assert_matches!(err, AnimatorError::Auth(_));
    mock.assert_async().await;
}

// ---------------------------------------------------------------------------
// Test: transient server errors consume attempts instead of aborting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn transient_server_errors_consume_attempts() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/videos/image2video/task-123")
        .with_status(500)
        .with_body("internal error")
        .expect(2)
        .create_async()
        .await;

    let mut config = test_config(server.url());
    config.poll_attempts = 2;

    let client = KlingClient::new(config);
    let err = client.poll(&poll_handle()).await.unwrap_err();

    assert_matches!(err, AnimatorError::Timeout { attempts: 2 });
    mock.assert_async().await;
}

// ---------------------------------------------------------------------------
// Test: generate runs submit and poll end to end
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_submits_then_polls_to_completion() {
    let mut server = mockito::Server::new_async().await;
    let submit_mock = server
        .mock("POST", "/v1/videos/image2video")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(submitted_body())
        .expect(1)
        .create_async()
        .await;
    let status_mock = server
        .mock("GET", "/v1/videos/image2video/task-123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(succeed_body())
        .expect(1)
        .create_async()
        .await;

    let client = KlingClient::new(test_config(server.url()));
    let artifact = client.generate(&scene_input()).await.unwrap();

    assert_eq!(artifact.video_url, "https://cdn.example/vid-1.mp4");
    submit_mock.assert_async().await;
    status_mock.assert_async().await;
}
