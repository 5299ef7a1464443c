//! Session gating, the per-frame driver and end-of-session metrics.

mod controller;
mod driver;
mod metrics;
mod timer;


use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use controller::{SessionController, SessionFrame};
pub use driver::{SessionDriver, Step};
pub use metrics::{
    ExerciseSummary, METRICS_FILE_NAME, METRICS_HEADER, MetricsError, MetricsLog,
    PerformanceMetrics, SessionSummary,
};
pub use timer::{SessionTimer, Stage};

/// How evaluation is started and stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Countdown, then evaluate until rest persists long enough to end.
    Solo,
    /// A second person starts and pauses evaluation.
    Assisted,
}

impl SessionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionMode::Solo => "solo",
            SessionMode::Assisted => "assisted",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "solo" => Ok(SessionMode::Solo),
            "assisted" => Ok(SessionMode::Assisted),
            other => Err(format!("unknown session mode '{other}' (expected solo or assisted)")),
        }
    }
}
