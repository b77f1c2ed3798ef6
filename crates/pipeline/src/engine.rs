//! The step engine: one bounded unit of work per invocation.
//!
//! Every invocation of [`AnimationPipeline::run_next`] loads the
//! checkpoint, handles at most one scene, persists the checkpoint, and
//! returns. All progress lives in the [`CheckpointStore`], so the process
//! can be killed between invocations (or crash mid-step) and the next
//! invocation resumes without re-submitting finished scenes.

use std::sync::{Arc, Weak};

use serde::Serialize;
use tokio::sync::Mutex;

use fabula_core::error::{CheckpointError, PipelineError};
use fabula_core::job::{AnimationJob, JobStatus};
use fabula_core::ports::{AssetLocator, CheckpointStore, SceneAnimator};
use fabula_core::scene::SceneInput;

use crate::config::{FailurePolicy, PipelineConfig};
use crate::scheduler::StepScheduler;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What a single `run_next` invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "scene", rename_all = "snake_case")]
pub enum StepOutcome {
    /// No runnable job: nothing is checkpointed, or the checkpoint is
    /// halted awaiting an operator.
    Idle,
    /// The scene had no input and was skipped.
    SkippedMissing(u32),
    /// The scene's artifact already existed; counted as complete without
    /// touching the remote service.
    SkippedExisting(u32),
    /// The scene was animated and its artifact stored.
    Generated(u32),
    /// The scene failed and the run moved on (continue policy).
    Failed(u32),
    /// The scene failed and the run stopped (halt policy).
    Halted(u32),
    /// Every scene is visited; the checkpoint was cleared and the timer
    /// removed.
    Completed,
}

impl StepOutcome {
    /// Whether the run is over from the timer's point of view.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepOutcome::Idle | StepOutcome::Halted(_) | StepOutcome::Completed
        )
    }
}

/// Summary returned by [`AnimationPipeline::start`].
#[derive(Debug, Clone, Serialize)]
pub struct StartedJob {
    pub story_id: String,
    pub language: String,
    pub total_scenes: u32,
    /// Outcome of the first step, which runs before `start` returns.
    pub first_step: StepOutcome,
    /// Whether a continuation timer was armed for the remaining scenes.
    pub scheduled: bool,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Drives one story edition through the animator, one scene per step.
pub struct AnimationPipeline {
    store: Arc<dyn CheckpointStore>,
    assets: Arc<dyn AssetLocator>,
    animator: Arc<dyn SceneAnimator>,
    config: PipelineConfig,
    scheduler: StepScheduler,
    /// Serializes step bodies so a timer fire and a direct call cannot
    /// interleave their read-modify-write of the checkpoint.
    step_lock: Mutex<()>,
    /// Self-reference handed to the timer closure; a dead `Weak` ends the
    /// timer.
    weak: Weak<AnimationPipeline>,
}

impl AnimationPipeline {
    pub fn new(
        store: Arc<dyn CheckpointStore>,
        assets: Arc<dyn AssetLocator>,
        animator: Arc<dyn SceneAnimator>,
        config: PipelineConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            store,
            assets,
            animator,
            config,
            scheduler: StepScheduler::new(),
            step_lock: Mutex::new(()),
            weak: weak.clone(),
        })
    }

    /// Begin a run for one story edition and process scene 1 synchronously.
    ///
    /// Fails with [`PipelineError::Conflict`] while any run is checkpointed
    /// and with [`PipelineError::NoInputs`] when the edition has no scenes.
    /// When more work (or a retryable failure) remains afterwards, the
    /// continuation timer is armed before this returns, so a failed first
    /// step does not strand the run.
    pub async fn start(
        &self,
        story_id: &str,
        language: &str,
    ) -> Result<StartedJob, PipelineError> {
        let total = {
            let _step = self.step_lock.lock().await;

            if let Some(active) = self.store.get().await? {
                return Err(PipelineError::Conflict {
                    story_id: active.story_id,
                    language: active.language,
                });
            }

            let total = self.assets.count_inputs(story_id, language).await?;
            if total == 0 {
                return Err(PipelineError::NoInputs {
                    story_id: story_id.to_string(),
                    language: language.to_string(),
                });
            }

            self.store
                .save(&AnimationJob::new(story_id, language, total))
                .await?;
            total
        };

        tracing::info!(story_id, language, total_scenes = total, "Animation run started");

        let first_step = self.run_next().await;

        let scheduled = match &first_step {
            Ok(outcome) => !outcome.is_terminal(),
            // A failed first step keeps the timer so a later tick retries.
            Err(_) => true,
        };
        if scheduled {
            self.arm_timer().await;
        }
        let first_step = first_step?;

        Ok(StartedJob {
            story_id: story_id.to_string(),
            language: language.to_string(),
            total_scenes: total,
            first_step,
            scheduled,
        })
    }

    /// Execute one step: at most one scene attempt plus checkpoint updates.
    ///
    /// Idempotent with respect to finished scenes: an artifact that already
    /// exists is counted as complete without another remote submission, so
    /// replaying a step after a crash never double-bills.
    pub async fn run_next(&self) -> Result<StepOutcome, PipelineError> {
        let _step = self.step_lock.lock().await;

        let checkpoint = match self.store.get().await {
            Ok(checkpoint) => checkpoint,
            Err(err) => {
                if matches!(err, CheckpointError::Corrupt(_)) {
                    // An unreadable checkpoint cannot heal on a later tick.
                    self.scheduler.remove().await;
                }
                return Err(err.into());
            }
        };
        let Some(mut job) = checkpoint else {
            tracing::debug!("Step invoked with no active job");
            return Ok(StepOutcome::Idle);
        };

        if let Err(reason) = job.validate() {
            self.scheduler.remove().await;
            return Err(PipelineError::InvalidState(reason));
        }
        if job.status == JobStatus::Error {
            tracing::info!(
                story_id = %job.story_id,
                language = %job.language,
                "Halted job awaits operator cleanup; step skipped"
            );
            return Ok(StepOutcome::Idle);
        }

        let Some(scene) = job.next_scene() else {
            // A crash after the final save can leave a finished cursor
            // behind; complete the terminal transition now.
            return self.finalize(job).await;
        };

        let input = match self
            .assets
            .get_input(&job.story_id, &job.language, scene)
            .await?
        {
            Some(input) => input,
            None => {
                tracing::warn!(
                    story_id = %job.story_id,
                    language = %job.language,
                    scene,
                    "No input for scene; skipped"
                );
                job.advance();
                self.store.save(&job).await?;
                return Ok(StepOutcome::SkippedMissing(scene));
            }
        };

        if self
            .assets
            .output_exists(&job.story_id, &job.language, scene)
            .await?
        {
            tracing::info!(
                story_id = %job.story_id,
                language = %job.language,
                scene,
                "Artifact already present; counted as complete"
            );
            job.mark_completed(scene);
            job.advance();
            self.store.save(&job).await?;
            return Ok(StepOutcome::SkippedExisting(scene));
        }

        match self.produce_scene(&job, scene, &input).await {
            Ok(()) => {
                job.mark_completed(scene);
                job.advance();
                self.store.save(&job).await?;
                if job.all_scenes_visited() {
                    return self.finalize(job).await;
                }
                Ok(StepOutcome::Generated(scene))
            }
            Err(message) => self.handle_scene_failure(job, scene, message).await,
        }
    }

    /// Read-only snapshot of the active job, if any.
    pub async fn status(&self) -> Result<Option<AnimationJob>, PipelineError> {
        Ok(self.store.get().await?)
    }

    /// Operator escape hatch: drop the checkpoint and disarm the timer.
    ///
    /// Returns whether a job was actually abandoned. An in-flight remote
    /// task keeps running on the service side; only local tracking stops.
    /// A record that no longer decodes still counts as abandoned and is
    /// cleared like any other.
    pub async fn abort(&self) -> Result<bool, PipelineError> {
        let _step = self.step_lock.lock().await;
        self.scheduler.remove().await;
        let existed = match self.store.get().await {
            Ok(checkpoint) => checkpoint.is_some(),
            // An unreadable record still occupies the slot.
            Err(CheckpointError::Corrupt(_)) => true,
            Err(err) => return Err(err.into()),
        };
        self.store.clear().await?;
        if existed {
            tracing::warn!("Animation run abandoned by operator");
        }
        Ok(existed)
    }

    /// Whether the continuation timer is currently armed.
    pub async fn timer_armed(&self) -> bool {
        self.scheduler.is_armed().await
    }

    /// Disarm the timer and wait briefly for an in-flight tick to end.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
    }

    // ---- private helpers ----

    /// Animate one scene and record the artifact. Any failure comes back
    /// as the message to store in `last_error`.
    async fn produce_scene(
        &self,
        job: &AnimationJob,
        scene: u32,
        input: &SceneInput,
    ) -> Result<(), String> {
        let artifact = self
            .animator
            .generate(input)
            .await
            .map_err(|e| e.to_string())?;
        let artifact_id = self
            .assets
            .store(&job.story_id, &job.language, scene, &artifact)
            .await
            .map_err(|e| e.to_string())?;
        tracing::info!(
            story_id = %job.story_id,
            language = %job.language,
            scene,
            artifact_id,
            video_url = %artifact.video_url,
            "Scene animated"
        );
        Ok(())
    }

    async fn handle_scene_failure(
        &self,
        mut job: AnimationJob,
        scene: u32,
        message: String,
    ) -> Result<StepOutcome, PipelineError> {
        tracing::error!(
            story_id = %job.story_id,
            language = %job.language,
            scene,
            error = %message,
            "Scene animation failed"
        );
        job.record_error(message);

        match self.config.failure_policy {
            FailurePolicy::Continue => {
                job.advance();
                self.store.save(&job).await?;
                if job.all_scenes_visited() {
                    return self.finalize(job).await;
                }
                Ok(StepOutcome::Failed(scene))
            }
            FailurePolicy::Halt => {
                job.transition_to(JobStatus::Error)
                    .map_err(PipelineError::InvalidState)?;
                self.store.save(&job).await?;
                self.scheduler.remove().await;
                Ok(StepOutcome::Halted(scene))
            }
        }
    }

    /// Terminal transition: mark done, drop the checkpoint, disarm the
    /// timer.
    async fn finalize(&self, mut job: AnimationJob) -> Result<StepOutcome, PipelineError> {
        if job.status != JobStatus::Done {
            job.transition_to(JobStatus::Done)
                .map_err(PipelineError::InvalidState)?;
        }
        self.store.clear().await?;
        self.scheduler.remove().await;
        tracing::info!(
            story_id = %job.story_id,
            language = %job.language,
            completed = job.completed_scenes.len(),
            total_scenes = job.total_scenes,
            "Animation run complete"
        );
        Ok(StepOutcome::Completed)
    }

    /// Arm (or re-arm) the continuation timer.
    async fn arm_timer(&self) {
        let weak = self.weak.clone();
        self.scheduler
            .install(self.config.tick_interval, move || {
                let weak = weak.clone();
                async move {
                    match weak.upgrade() {
                        Some(pipeline) => pipeline.timer_tick().await,
                        None => false,
                    }
                }
            })
            .await;
    }

    /// One timer-driven step. Returns whether the timer should stay armed.
    async fn timer_tick(&self) -> bool {
        match self.run_next().await {
            Ok(outcome) => {
                tracing::debug!(?outcome, "Scheduled step finished");
                !outcome.is_terminal()
            }
            Err(err) => {
                // Recoverable failures retry on a later tick; unrecoverable
                // ones already disarmed the timer inside run_next.
                tracing::error!(error = %err, "Scheduled step failed");
                true
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_outcomes() {
        assert!(StepOutcome::Idle.is_terminal());
        assert!(StepOutcome::Completed.is_terminal());
        assert!(StepOutcome::Halted(2).is_terminal());
        assert!(!StepOutcome::Generated(1).is_terminal());
        assert!(!StepOutcome::SkippedMissing(1).is_terminal());
        assert!(!StepOutcome::SkippedExisting(1).is_terminal());
        assert!(!StepOutcome::Failed(1).is_terminal());
    }

    #[test]
    fn outcome_serializes_with_kind_and_scene() {
        assert_eq!(
            serde_json::to_value(StepOutcome::Generated(3)).unwrap(),
            serde_json::json!({"kind": "generated", "scene": 3})
        );
        assert_eq!(
            serde_json::to_value(StepOutcome::Completed).unwrap(),
            serde_json::json!({"kind": "completed"})
        );
    }
}
