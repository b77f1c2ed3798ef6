//! Domain types for the fabula animation pipeline.
//!
//! Everything here is storage- and transport-agnostic: the durable job
//! checkpoint, scene input/artifact types, the error taxonomy, and the async
//! ports implemented by the `db`, `assets`, and `kling` crates.

pub mod error;
pub mod job;
pub mod ports;
pub mod scene;
