//! REST client for the Kling image-to-video endpoints.
//!
//! Wraps task creation and status queries using [`reqwest`]. Responses are
//! unwrapped from the service envelope here, so callers only see payloads or
//! classified errors.

use serde::de::DeserializeOwned;

use crate::types::{ApiEnvelope, CreateTaskRequest, TaskData};

/// Path of the image-to-video resource under the base URL.
const IMAGE2VIDEO_PATH: &str = "/v1/videos/image2video";

/// HTTP client for the Kling open API.
pub struct KlingApi {
    client: reqwest::Client,
    base_url: String,
}

/// Errors from the Kling REST layer.
#[derive(Debug, thiserror::Error)]
pub enum KlingApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Kling API error ({status}): {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// HTTP success but a non-zero `code` in the service envelope.
    #[error("Kling service error (code {code}): {message}")]
    Service { code: i64, message: String },

    /// HTTP success and `code` 0, but no `data` payload.
    #[error("Kling response missing data payload")]
    MissingData,
}

impl KlingApi {
    /// Create a new API client.
    ///
    /// * `base_url` - Base HTTP URL, e.g. `https://api-singapore.klingai.com`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Submit an image-to-video task.
    ///
    /// Sends `POST /v1/videos/image2video` with the bearer token and typed
    /// request body. Returns the created task in `submitted` state.
    pub async fn create_task(
        &self,
        token: &str,
        request: &CreateTaskRequest,
    ) -> Result<TaskData, KlingApiError> {
        let response = self
            .client
            .post(format!("{}{IMAGE2VIDEO_PATH}", self.base_url))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        Self::parse_envelope(response).await
    }

    /// Query the current state of one task.
    ///
    /// Sends `GET /v1/videos/image2video/{task_id}`.
    pub async fn query_task(&self, token: &str, task_id: &str) -> Result<TaskData, KlingApiError> {
        let response = self
            .client
            .get(format!("{}{IMAGE2VIDEO_PATH}/{task_id}", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        Self::parse_envelope(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or a [`KlingApiError::Http`] containing the
    /// status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, KlingApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(KlingApiError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Unwrap the service envelope of a successful HTTP response.
    async fn parse_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, KlingApiError> {
        let response = Self::ensure_success(response).await?;
        let envelope = response.json::<ApiEnvelope<T>>().await?;

        if envelope.code != 0 {
            return Err(KlingApiError::Service {
                code: envelope.code,
                message: envelope.message,
            });
        }
        envelope.data.ok_or(KlingApiError::MissingData)
    }
}
