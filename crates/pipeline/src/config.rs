//! Pipeline tuning knobs.

use std::time::Duration;

/// Default spacing between scheduled step invocations, in seconds.
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 300;

/// How a scene-level failure affects the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure on the checkpoint and move to the next scene.
    #[default]
    Continue,
    /// Stop the run and keep the checkpoint for operator inspection.
    Halt,
}

impl FailurePolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "continue" => Some(Self::Continue),
            "halt" => Some(Self::Halt),
            _ => None,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Spacing between timer-driven step invocations.
    pub tick_interval: Duration,
    /// What to do when a single scene fails.
    pub failure_policy: FailurePolicy,
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default | Meaning |
    /// |----------|---------|---------|
    /// | `PIPELINE_TICK_INTERVAL_SECS` | `300` | Seconds between scheduled step invocations |
    /// | `PIPELINE_FAILURE_POLICY` | `continue` | `continue` or `halt` on a scene failure |
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let tick_interval = std::env::var("PIPELINE_TICK_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TICK_INTERVAL_SECS));

        let failure_policy = std::env::var("PIPELINE_FAILURE_POLICY")
            .ok()
            .and_then(|v| FailurePolicy::parse(&v))
            .unwrap_or_default();

        Self {
            tick_interval,
            failure_policy,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(DEFAULT_TICK_INTERVAL_SECS),
            failure_policy: FailurePolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_parses_known_names() {
        assert_eq!(
            FailurePolicy::parse("continue"),
            Some(FailurePolicy::Continue)
        );
        assert_eq!(FailurePolicy::parse("halt"), Some(FailurePolicy::Halt));
        assert_eq!(FailurePolicy::parse("HALT"), Some(FailurePolicy::Halt));
        assert_eq!(FailurePolicy::parse("retry"), None);
    }

    #[test]
    fn default_config_continues_on_failure() {
        let config = PipelineConfig::default();
        assert_eq!(config.failure_policy, FailurePolicy::Continue);
        assert_eq!(
            config.tick_interval,
            Duration::from_secs(DEFAULT_TICK_INTERVAL_SECS)
        );
    }
}
