//! Resumable scene-animation pipeline.
//!
//! The engine processes exactly one scene per invocation and checkpoints
//! between invocations, trading throughput for the ability to survive a
//! hard kill at any point in a run. A single-slot continuation timer
//! re-invokes the step function until every scene is visited or the run
//! is halted.

pub mod config;
pub mod engine;
pub mod scheduler;
