//! Library exports for the coaching binary and integration tests.
/// Application directory helpers.
pub mod app_dirs;
/// TOML configuration.
pub mod config;
/// Exercise definitions and the rep-counting state machine.
pub mod exercise;
/// Speech and haptic feedback workers.
pub mod feedback;
/// JSON-lines frame and command input.
pub mod frame_source;
/// Shared HTTP agents.
pub(crate) mod http_client;
/// Logging setup.
pub mod logging;
/// Body landmarks and joint angles.
pub mod pose;
/// Randomized rep scoring.
pub mod scoring;
/// Session gating, the frame driver and metrics.
pub mod session;
