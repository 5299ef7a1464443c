use crate::pose::Side;

use super::state::{ExerciseState, Phase};

/// Feedback shown while waiting for the starting posture.
pub const NOT_READY_FEEDBACK: &str = "Get into starting position.";

/// Form classification for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    None,
    Perfect,
    Correct,
    Incorrect,
    Stopped,
}

impl FormStatus {
    pub fn label(self) -> &'static str {
        match self {
            FormStatus::None => "NONE",
            FormStatus::Perfect => "PERFECT",
            FormStatus::Correct => "CORRECT",
            FormStatus::Incorrect => "INCORRECT",
            FormStatus::Stopped => "YOU STOPPED",
        }
    }
}

/// What one evaluated (or skipped) frame looks like to the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub angle: f32,
    pub tracked_side: Option<Side>,
    pub repcount: u32,
    /// Phase label, or `NONE` before the starting posture is confirmed.
    pub phase: &'static str,
    pub correct_form: bool,
    pub form_status: FormStatus,
    pub last_score: Option<u8>,
    pub average_score: f32,
    pub feedback: &'static str,
}

impl FrameReport {
    /// Neutral report for frames that are captured but not evaluated.
    pub fn idle(state: &ExerciseState) -> Self {
        Self {
            angle: 0.0,
            tracked_side: None,
            repcount: state.repcount,
            phase: "NONE",
            correct_form: false,
            form_status: FormStatus::None,
            last_score: None,
            average_score: state.average_score(),
            feedback: "",
        }
    }

    pub(super) fn not_ready(angle: f32, side: Side) -> Self {
        Self {
            angle,
            tracked_side: Some(side),
            repcount: 0,
            phase: "NONE",
            correct_form: false,
            form_status: FormStatus::None,
            last_score: None,
            average_score: 0.0,
            feedback: NOT_READY_FEEDBACK,
        }
    }

    pub(super) fn evaluated(
        state: &ExerciseState,
        angle: f32,
        correct_form: bool,
        form_status: FormStatus,
    ) -> Self {
        debug_assert!(state.phase != Phase::NotReady);
        Self {
            angle,
            tracked_side: state.tracked_side,
            repcount: state.repcount,
            phase: state.phase_label(),
            correct_form,
            form_status,
            last_score: state.last_score(),
            average_score: state.average_score(),
            feedback: "",
        }
    }
}
