//! Kling video-generation client.
//!
//! Implements the submit-then-poll flow against the Kling image-to-video
//! API: short-lived signed request tokens, task creation, and a bounded
//! status poll that turns an arbitrarily slow remote job into a result that
//! fits inside one pipeline step.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod types;
