use crate::pose::Side;
use crate::scoring::{RepOutcome, RepScore};

use super::Exercise;

/// Posture phase of an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the user to hold the starting posture.
    NotReady,
    Active,
    Rest,
}

/// Mutable progress for one exercise, owned by the session controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseState {
    pub exercise: Exercise,
    pub repcount: u32,
    pub phase: Phase,
    /// Consecutive frames spent in the starting posture while not ready.
    pub start_frames: u32,
    /// Completed reps and failed attempts, in order.
    pub rep_scores: Vec<RepScore>,
    pub perfect_frames: u32,
    pub standard_frames: u32,
    pub best_angle: f32,
    pub rest_frames: u32,
    pub error_frames: u32,
    pub incorrect_attempt: bool,
    pub perfect_cue_sent: bool,
    pub correct_cue_sent: bool,
    pub get_ready_cue_sent: bool,
    pub session_start_cue_sent: bool,
    /// Solo-mode terminal flag; cleared only by [`ExerciseState::reset`].
    pub ended: bool,
    pub frame_counter: u64,
    /// Frame at which "you stopped" was last spoken; 0 when re-armed.
    pub last_stopped_frame: u64,
    pub tracked_side: Option<Side>,
}

impl ExerciseState {
    pub fn new(exercise: Exercise) -> Self {
        Self {
            exercise,
            repcount: 0,
            phase: Phase::NotReady,
            start_frames: 0,
            rep_scores: Vec::new(),
            perfect_frames: 0,
            standard_frames: 0,
            best_angle: exercise.config().default_best_angle(),
            rest_frames: 0,
            error_frames: 0,
            incorrect_attempt: false,
            perfect_cue_sent: false,
            correct_cue_sent: false,
            get_ready_cue_sent: false,
            session_start_cue_sent: false,
            ended: false,
            frame_counter: 0,
            last_stopped_frame: 0,
            tracked_side: None,
        }
    }

    /// Return to the initial state for this exercise.
    pub fn reset(&mut self) {
        *self = Self::new(self.exercise);
    }

    pub fn is_ready(&self) -> bool {
        self.phase != Phase::NotReady
    }

    /// Phase label as shown to the user.
    pub fn phase_label(&self) -> &'static str {
        let config = self.exercise.config();
        match self.phase {
            Phase::NotReady => "none",
            Phase::Active => config.active_phase,
            Phase::Rest => config.rest_phase,
        }
    }

    pub fn failed_attempts(&self) -> usize {
        self.rep_scores
            .iter()
            .filter(|score| score.outcome == RepOutcome::Failed)
            .count()
    }

    pub fn last_score(&self) -> Option<u8> {
        self.rep_scores.last().map(|score| score.value)
    }

    /// Mean over completed and failed scores; 0 when nothing was scored.
    pub fn average_score(&self) -> f32 {
        if self.rep_scores.is_empty() {
            return 0.0;
        }
        let total: u32 = self.rep_scores.iter().map(|score| u32::from(score.value)).sum();
        total as f32 / self.rep_scores.len() as f32
    }

    pub fn has_activity(&self) -> bool {
        self.repcount > 0 || !self.rep_scores.is_empty()
    }

    pub(super) fn reset_best_angle(&mut self) {
        self.best_angle = self.exercise.config().default_best_angle();
    }

    pub(super) fn best_angle_is_default(&self) -> bool {
        self.best_angle == self.exercise.config().default_best_angle()
    }
}
