//! Kling client configuration.

use std::time::Duration;

/// Default public endpoint for the Kling open API.
const DEFAULT_BASE_URL: &str = "https://api-singapore.klingai.com";

/// Default generation model.
const DEFAULT_MODEL_NAME: &str = "kling-v1";

/// Default generation mode (`std` or `pro`).
const DEFAULT_MODE: &str = "std";

/// Default clip length in seconds, as the string enum the API expects.
const DEFAULT_VIDEO_DURATION: &str = "5";

/// Request tokens are valid this long (30 minutes).
const TOKEN_TTL_SECS: i64 = 1800;

/// `nbf` is backdated by this much to absorb clock skew against the service.
const TOKEN_SKEW_SECS: i64 = 5;

/// Default status-poll budget: 30 attempts x 10 s is roughly five minutes,
/// which still fits one execution window with headroom.
const DEFAULT_POLL_ATTEMPTS: u32 = 30;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Settings for the Kling video-generation client.
#[derive(Debug, Clone)]
pub struct KlingConfig {
    /// Base HTTP URL of the service.
    pub base_url: String,
    /// Account access key; becomes the `iss` claim of request tokens.
    pub access_key: String,
    /// Account secret key; signs request tokens.
    pub secret_key: String,
    /// Generation model name.
    pub model_name: String,
    /// Generation mode (`std` or `pro`).
    pub mode: String,
    /// Clip length in seconds, as the string enum the API expects.
    pub video_duration: String,
    /// Request-token lifetime in seconds.
    pub token_ttl_secs: i64,
    /// Negative clock-skew allowance on the token's `nbf` claim, in seconds.
    pub token_skew_secs: i64,
    /// Maximum number of status queries per task.
    pub poll_attempts: u32,
    /// Delay between consecutive status queries.
    pub poll_interval: Duration,
}

impl KlingConfig {
    /// Load the Kling configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default                              |
    /// |----------------------------|----------|--------------------------------------|
    /// | `KLING_ACCESS_KEY`         | **yes**  | --                                   |
    /// | `KLING_SECRET_KEY`         | **yes**  | --                                   |
    /// | `KLING_BASE_URL`           | no       | `https://api-singapore.klingai.com`  |
    /// | `KLING_MODEL_NAME`         | no       | `kling-v1`                           |
    /// | `KLING_MODE`               | no       | `std`                                |
    /// | `KLING_VIDEO_DURATION`     | no       | `5`                                  |
    /// | `KLING_POLL_ATTEMPTS`      | no       | `30`                                 |
    /// | `KLING_POLL_INTERVAL_SECS` | no       | `10`                                 |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing or a numeric one fails to
    /// parse.
    pub fn from_env() -> Self {
        let access_key =
            std::env::var("KLING_ACCESS_KEY").expect("KLING_ACCESS_KEY must be set");
        let secret_key =
            std::env::var("KLING_SECRET_KEY").expect("KLING_SECRET_KEY must be set");
        assert!(!access_key.is_empty(), "KLING_ACCESS_KEY must not be empty");
        assert!(!secret_key.is_empty(), "KLING_SECRET_KEY must not be empty");

        let base_url =
            std::env::var("KLING_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model_name =
            std::env::var("KLING_MODEL_NAME").unwrap_or_else(|_| DEFAULT_MODEL_NAME.to_string());
        let mode = std::env::var("KLING_MODE").unwrap_or_else(|_| DEFAULT_MODE.to_string());
        let video_duration = std::env::var("KLING_VIDEO_DURATION")
            .unwrap_or_else(|_| DEFAULT_VIDEO_DURATION.to_string());

        let poll_attempts: u32 = std::env::var("KLING_POLL_ATTEMPTS")
            .unwrap_or_else(|_| DEFAULT_POLL_ATTEMPTS.to_string())
            .parse()
            .expect("KLING_POLL_ATTEMPTS must be a valid u32");

        let poll_interval_secs: u64 = std::env::var("KLING_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL_SECS.to_string())
            .parse()
            .expect("KLING_POLL_INTERVAL_SECS must be a valid u64");

        Self {
            base_url,
            access_key,
            secret_key,
            model_name,
            mode,
            video_duration,
            token_ttl_secs: TOKEN_TTL_SECS,
            token_skew_secs: TOKEN_SKEW_SECS,
            poll_attempts,
            poll_interval: Duration::from_secs(poll_interval_secs),
        }
    }
}
