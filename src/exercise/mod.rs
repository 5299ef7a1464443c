//! Per-exercise rep counting and form classification.
//!
//! Each [`Exercise`] resolves once to a static [`ExerciseConfig`]; the
//! [`ExerciseStateMachine`] folds a stream of joint angles into an
//! [`ExerciseState`], emitting feedback commands as reps complete or fail.

mod config;
mod machine;
mod report;
mod state;


use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use config::{Direction, ExerciseConfig, JointTriples, RestCheck};
pub use machine::{
    END_AFTER_REST_SECS, Evaluation, ExerciseStateMachine, READY_FRAMES, STOP_AFTER_REST_SECS,
    STOP_CUE_INTERVAL_FRAMES, VIBRATE_AFTER_ERROR_FRAMES,
};
pub use report::{FormStatus, FrameReport, NOT_READY_FEEDBACK};
pub use state::{ExerciseState, Phase};

/// Supported physiotherapy exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exercise {
    Squat,
    Abduction,
    Elbow,
    #[serde(rename = "hipflex")]
    HipFlex,
    #[serde(rename = "wristext")]
    WristExt,
}

impl Exercise {
    /// All variants in the order they are summarized.
    pub const ALL: [Exercise; 5] = [
        Exercise::Squat,
        Exercise::Abduction,
        Exercise::Elbow,
        Exercise::HipFlex,
        Exercise::WristExt,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Exercise::Squat => "squat",
            Exercise::Abduction => "abduction",
            Exercise::Elbow => "elbow",
            Exercise::HipFlex => "hipflex",
            Exercise::WristExt => "wristext",
        }
    }

    /// Human-readable title used in banners and summaries.
    pub fn title(self) -> &'static str {
        match self {
            Exercise::Squat => "Squats",
            Exercise::Abduction => "Shoulder Abduction",
            Exercise::Elbow => "Elbow Flexion",
            Exercise::HipFlex => "Hip Flexion",
            Exercise::WristExt => "Wrist Extension",
        }
    }

    pub fn config(self) -> &'static ExerciseConfig {
        config::lookup(self)
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown exercise name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown exercise '{0}'")]
pub struct UnknownExercise(pub String);

impl FromStr for Exercise {
    type Err = UnknownExercise;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Exercise::ALL
            .into_iter()
            .find(|exercise| exercise.name() == normalized)
            .ok_or(UnknownExercise(normalized))
    }
}
