//! Submit-then-poll client for scene animation.
//!
//! `submit` mints a request token, posts the scene, and returns a handle;
//! `poll` queries the task at a fixed interval until it reaches a terminal
//! state or the attempt budget runs out. One `generate` call covers one
//! scene end to end and never waits longer than `attempts x interval`.

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use fabula_core::error::AnimatorError;
use fabula_core::ports::SceneAnimator;
use fabula_core::scene::{AnimationArtifact, SceneInput};

use crate::api::{KlingApi, KlingApiError};
use crate::auth;
use crate::config::KlingConfig;
use crate::types::{CreateTaskRequest, TaskData, TaskStatus};

/// One in-flight remote task: its id plus the token that created it.
///
/// Never persisted. If the process dies mid-poll, the scene is replayed
/// from the checkpoint with a fresh submission.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    pub task_id: String,
    pub token: String,
}

/// Kling-backed scene animator.
pub struct KlingClient {
    api: KlingApi,
    config: KlingConfig,
}

impl KlingClient {
    pub fn new(config: KlingConfig) -> Self {
        Self {
            api: KlingApi::new(config.base_url.clone()),
            config,
        }
    }

    /// Submit one scene for animation, returning the handle to poll.
    pub async fn submit(&self, input: &SceneInput) -> Result<TaskHandle, AnimatorError> {
        let token = auth::mint_token(
            &self.config.access_key,
            &self.config.secret_key,
            self.config.token_ttl_secs,
            self.config.token_skew_secs,
        )
        .map_err(|e| AnimatorError::Auth(e.to_string()))?;

        let request = CreateTaskRequest {
            model_name: self.config.model_name.clone(),
            image: input.image_url.clone(),
            prompt: input.motion_prompt.clone(),
            mode: self.config.mode.clone(),
            duration: self.config.video_duration.clone(),
            external_task_id: Uuid::new_v4().to_string(),
        };

        let task = self
            .api
            .create_task(&token, &request)
            .await
            .map_err(classify_api_error)?;

        debug!(task_id = %task.task_id, "animation task submitted");
        Ok(TaskHandle {
            task_id: task.task_id,
            token,
        })
    }

    /// Poll one task until it is terminal, bounded by the attempt budget.
    ///
    /// Makes at most `poll_attempts` status queries with `poll_interval`
    /// between consecutive ones. A transient query failure consumes an
    /// attempt and polling continues; an auth rejection aborts immediately.
    /// Exhausting the budget yields [`AnimatorError::Timeout`].
    pub async fn poll(&self, handle: &TaskHandle) -> Result<AnimationArtifact, AnimatorError> {
        let attempts = self.config.poll_attempts;

        for attempt in 1..=attempts {
            match self.api.query_task(&handle.token, &handle.task_id).await {
                Ok(task) => match task.task_status {
                    TaskStatus::Succeed => return artifact_from_task(task),
                    TaskStatus::Failed => {
                        return Err(AnimatorError::TaskFailed(
                            task.task_status_msg
                                .unwrap_or_else(|| "no failure message".to_string()),
                        ));
                    }
                    TaskStatus::Submitted | TaskStatus::Processing | TaskStatus::Unknown => {
                        debug!(task_id = %handle.task_id, attempt, "animation task still pending");
                    }
                },
                Err(err) => {
                    let classified = classify_api_error(err);
                    if matches!(classified, AnimatorError::Auth(_)) {
                        return Err(classified);
                    }
                    warn!(task_id = %handle.task_id, attempt, error = %classified, "status query failed");
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }

        Err(AnimatorError::Timeout { attempts })
    }
}

#[async_trait]
impl SceneAnimator for KlingClient {
    async fn generate(&self, input: &SceneInput) -> Result<AnimationArtifact, AnimatorError> {
        let handle = self.submit(input).await?;
        self.poll(&handle).await
    }
}

/// Extract the artifact from a task in `succeed` state.
fn artifact_from_task(task: TaskData) -> Result<AnimationArtifact, AnimatorError> {
    let result = task
        .task_result
        .ok_or_else(|| AnimatorError::Service("succeeded task has no result".to_string()))?;
    let video = result
        .videos
        .into_iter()
        .next()
        .ok_or_else(|| AnimatorError::Service("succeeded task has no videos".to_string()))?;

    let duration_secs = video.duration.as_deref().and_then(|d| d.parse::<f64>().ok());

    Ok(AnimationArtifact {
        video_url: video.url,
        remote_task_id: task.task_id,
        duration_secs,
    })
}

/// Map REST-layer failures onto the animator error taxonomy.
///
/// HTTP 401/403 and the 1000-series service codes are credential problems;
/// HTTP 429 and service codes 1302-1304 are throttling.
fn classify_api_error(err: KlingApiError) -> AnimatorError {
    let message = err.to_string();
    match &err {
        KlingApiError::Http { status, .. } if matches!(status, 401 | 403) => {
            AnimatorError::Auth(message)
        }
        KlingApiError::Http { status: 429, .. } => AnimatorError::RateLimited(message),
        KlingApiError::Service { code, .. } if (1000..=1004).contains(code) => {
            AnimatorError::Auth(message)
        }
        KlingApiError::Service { code, .. } if matches!(code, 1302 | 1303 | 1304) => {
            AnimatorError::RateLimited(message)
        }
        _ => AnimatorError::Service(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn http_401_is_an_auth_error() {
        let err = KlingApiError::Http {
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert_matches!(classify_api_error(err), AnimatorError::Auth(_));
    }

    #[test]
    fn http_429_is_rate_limited() {
        let err = KlingApiError::Http {
            status: 429,
            body: "too many requests".to_string(),
        };
        assert_matches!(classify_api_error(err), AnimatorError::RateLimited(_));
    }

    #[test]
    fn service_code_1002_is_an_auth_error() {
        let err = KlingApiError::Service {
            code: 1002,
            message: "authorization is invalid".to_string(),
        };
        assert_matches!(classify_api_error(err), AnimatorError::Auth(_));
    }

    #[test]
    fn service_code_1303_is_rate_limited() {
        let err = KlingApiError::Service {
            code: 1303,
            message: "concurrency limit reached".to_string(),
        };
        assert_matches!(classify_api_error(err), AnimatorError::RateLimited(_));
    }

    #[test]
    fn other_failures_are_service_errors() {
        let err = KlingApiError::Service {
            code: 5000,
            message: "internal error".to_string(),
        };
        assert_matches!(classify_api_error(err), AnimatorError::Service(_));

        assert_matches!(
            classify_api_error(KlingApiError::MissingData),
            AnimatorError::Service(_)
        );
    }

    #[test]
    fn artifact_extraction_parses_duration() {
        let task = TaskData {
            task_id: "task-9".to_string(),
            task_status: TaskStatus::Succeed,
            task_status_msg: None,
            task_result: Some(crate::types::TaskResult {
                videos: vec![crate::types::VideoOutput {
                    id: "vid-1".to_string(),
                    url: "https://cdn.example/vid-1.mp4".to_string(),
                    duration: Some("5.1".to_string()),
                }],
            }),
        };

        let artifact = artifact_from_task(task).unwrap();
        assert_eq!(artifact.video_url, "https://cdn.example/vid-1.mp4");
        assert_eq!(artifact.remote_task_id, "task-9");
        assert_eq!(artifact.duration_secs, Some(5.1));
    }

    #[test]
    fn artifact_extraction_rejects_empty_result() {
        let task = TaskData {
            task_id: "task-9".to_string(),
            task_status: TaskStatus::Succeed,
            task_status_msg: None,
            task_result: None,
        };
        assert_matches!(artifact_from_task(task), Err(AnimatorError::Service(_)));
    }
}
