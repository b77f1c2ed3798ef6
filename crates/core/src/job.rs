//! The durable animation-job checkpoint and its state machine.
//!
//! At most one `AnimationJob` exists system-wide. It is persisted after every
//! processing step so a killed invocation resumes from the last checkpoint
//! instead of restarting the story from scene one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle of the singleton animation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Scenes remain; the continuation timer is expected to drive steps.
    Running,
    /// Every scene was visited. Terminal.
    Done,
    /// Halted for operator inspection. Terminal until the checkpoint is
    /// cleared out-of-band.
    Error,
}

impl JobStatus {
    /// Stable lowercase name, matching the persisted representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
        }
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Allowed status transitions for the animation job.
///
/// `Done` and `Error` are terminal: recovering from `Error` means an operator
/// clears the checkpoint and starts a fresh job, not a transition.
pub mod transitions {
    use super::JobStatus;

    /// Returns the set of valid target statuses reachable from `from`.
    pub fn valid_transitions(from: JobStatus) -> &'static [JobStatus] {
        match from {
            JobStatus::Running => &[JobStatus::Done, JobStatus::Error],
            JobStatus::Done | JobStatus::Error => &[],
        }
    }

    /// Check whether a transition from `from` to `to` is valid.
    pub fn can_transition(from: JobStatus, to: JobStatus) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Validate a transition, returning an error message for invalid ones.
    pub fn validate_transition(from: JobStatus, to: JobStatus) -> Result<(), String> {
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(format!(
                "invalid status transition: {} -> {}",
                from.as_str(),
                to.as_str()
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Checkpoint
// ---------------------------------------------------------------------------

/// Persisted checkpoint for the singleton animation job.
///
/// Serialized to JSON and stored under the well-known checkpoint slot; every
/// field a resumed invocation needs lives here, never in process memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationJob {
    /// Story being animated.
    pub story_id: String,
    /// Language edition of the story.
    pub language: String,
    /// 1-based index of the next scene to process.
    pub cursor: u32,
    /// Number of scene inputs discovered at start. Immutable afterwards.
    pub total_scenes: u32,
    /// Scene indices with a stored artifact, in completion order.
    pub completed_scenes: Vec<u32>,
    pub status: JobStatus,
    /// Most recent per-scene failure message.
    pub last_error: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl AnimationJob {
    /// Fresh checkpoint positioned at scene 1.
    pub fn new(
        story_id: impl Into<String>,
        language: impl Into<String>,
        total_scenes: u32,
    ) -> Self {
        Self {
            story_id: story_id.into(),
            language: language.into(),
            cursor: 1,
            total_scenes,
            completed_scenes: Vec::new(),
            status: JobStatus::Running,
            last_error: None,
            started_at: Utc::now(),
        }
    }

    /// 1-based index of the next scene, or `None` once every scene was
    /// visited.
    pub fn next_scene(&self) -> Option<u32> {
        if self.cursor <= self.total_scenes {
            Some(self.cursor)
        } else {
            None
        }
    }

    /// True once the cursor has moved past the last scene.
    pub fn all_scenes_visited(&self) -> bool {
        self.cursor > self.total_scenes
    }

    /// Move the cursor past the current scene.
    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    /// Record `scene` as completed. Duplicates are ignored so a replayed
    /// step stays idempotent.
    pub fn mark_completed(&mut self, scene: u32) {
        if !self.completed_scenes.contains(&scene) {
            self.completed_scenes.push(scene);
        }
    }

    /// Remember the most recent per-scene failure.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    /// Apply a status transition after checking it against the state machine.
    pub fn transition_to(&mut self, to: JobStatus) -> Result<(), String> {
        transitions::validate_transition(self.status, to)?;
        self.status = to;
        Ok(())
    }

    /// Check the checkpoint invariants.
    ///
    /// A loaded checkpoint that fails this was corrupted in storage or
    /// written by incompatible code; processing it would corrupt the story.
    pub fn validate(&self) -> Result<(), String> {
        if self.cursor < 1 || self.cursor > self.total_scenes + 1 {
            return Err(format!(
                "cursor {} outside 1..={}",
                self.cursor,
                self.total_scenes + 1
            ));
        }
        if let Some(&scene) = self
            .completed_scenes
            .iter()
            .find(|&&s| s < 1 || s > self.total_scenes)
        {
            return Err(format!(
                "completed scene {scene} outside 1..={}",
                self.total_scenes
            ));
        }
        if self.status == JobStatus::Done && self.cursor != self.total_scenes + 1 {
            return Err(format!(
                "status done but cursor {} != {}",
                self.cursor,
                self.total_scenes + 1
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
