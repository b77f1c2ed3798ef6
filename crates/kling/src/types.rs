//! Kling API request and response types.
//!
//! Every endpoint wraps its payload in `{code, message, request_id, data}`.
//! `code` 0 is success; anything else is a service-level error even when the
//! HTTP status is 200.

use serde::{Deserialize, Serialize};

/// Service envelope around every response body.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    pub message: String,
    pub request_id: String,
    pub data: Option<T>,
}

/// Body for `POST /v1/videos/image2video`.
#[derive(Debug, Serialize)]
pub struct CreateTaskRequest {
    pub model_name: String,
    /// URL of the source illustration.
    pub image: String,
    /// Motion description for the generated clip.
    pub prompt: String,
    pub mode: String,
    pub duration: String,
    /// Client-chosen id echoed back by the service; lets support trace a
    /// scene to its remote task.
    pub external_task_id: String,
}

/// `data` payload of task creation and status queries.
#[derive(Debug, Deserialize)]
pub struct TaskData {
    pub task_id: String,
    pub task_status: TaskStatus,
    /// Failure detail once `task_status` is `failed`.
    #[serde(default)]
    pub task_status_msg: Option<String>,
    #[serde(default)]
    pub task_result: Option<TaskResult>,
}

/// Remote task lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Submitted,
    Processing,
    Succeed,
    Failed,
    /// Any status string this client does not know; treated as still
    /// pending.
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// True for the two states that end polling.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Succeed | TaskStatus::Failed)
    }
}

/// `task_result` payload once a task succeeds.
#[derive(Debug, Deserialize)]
pub struct TaskResult {
    pub videos: Vec<VideoOutput>,
}

/// One generated video.
#[derive(Debug, Deserialize)]
pub struct VideoOutput {
    pub id: String,
    pub url: String,
    /// Clip length reported as a decimal string, e.g. `"5.1"`.
    #[serde(default)]
    pub duration: Option<String>,
}
