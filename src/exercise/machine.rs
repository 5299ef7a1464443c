use rand::Rng;
use tracing::debug;

use crate::feedback::{FeedbackCommand, cues};
use crate::pose::{BilateralAngles, Landmark, Side, bilateral_angles};
use crate::scoring::{ScoringEngine, quality_ratio};
use crate::session::SessionMode;

use super::config::ExerciseConfig;
use super::report::{FormStatus, FrameReport};
use super::state::{ExerciseState, Phase};

/// Consecutive starting-posture frames required before counting begins.
pub const READY_FRAMES: u32 = 12;
/// Seconds of uninterrupted rest before the user is told they stopped.
pub const STOP_AFTER_REST_SECS: u32 = 5;
/// Seconds of uninterrupted rest before a solo session ends for the exercise.
pub const END_AFTER_REST_SECS: u32 = 15;
/// Minimum frame spacing between repeated "you stopped" cues.
pub const STOP_CUE_INTERVAL_FRAMES: u64 = 150;
/// The incorrect-form frame on which the haptic pulse fires.
pub const VIBRATE_AFTER_ERROR_FRAMES: u32 = 5;

const HAPTIC_PULSE_MS: u32 = 250;
const HAPTIC_INTENSITY: u8 = 255;

/// Result of evaluating one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub report: FrameReport,
    /// Feedback to dispatch, in the order it was raised.
    pub commands: Vec<FeedbackCommand>,
    pub rep_completed: bool,
    pub failed_attempt_logged: bool,
    /// The solo-mode terminal transition fired on this frame.
    pub session_ended: bool,
}

/// Frame-by-frame rep counter shared by every exercise.
///
/// Holds no per-exercise state; everything mutable lives in [`ExerciseState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseStateMachine {
    frame_rate: u32,
    mode: SessionMode,
}

impl ExerciseStateMachine {
    pub fn new(frame_rate: u32, mode: SessionMode) -> Self {
        Self {
            frame_rate: frame_rate.max(1),
            mode,
        }
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    fn stop_after_frames(&self) -> u32 {
        STOP_AFTER_REST_SECS * self.frame_rate
    }

    fn end_after_frames(&self) -> u32 {
        END_AFTER_REST_SECS * self.frame_rate
    }

    /// Measure the exercise's joints on a landmark set and evaluate the result.
    pub fn evaluate<R: Rng>(
        &self,
        state: &mut ExerciseState,
        landmarks: &[Landmark],
        scoring: &mut ScoringEngine<R>,
    ) -> Evaluation {
        let angles = bilateral_angles(landmarks, state.exercise);
        self.evaluate_angles(state, angles, scoring)
    }

    /// Advance the state by one frame of already-measured joint angles.
    pub fn evaluate_angles<R: Rng>(
        &self,
        state: &mut ExerciseState,
        angles: BilateralAngles,
        scoring: &mut ScoringEngine<R>,
    ) -> Evaluation {
        let config = state.exercise.config();
        state.frame_counter += 1;
        let tracked = angles.tracked(config.direction);
        state.tracked_side = Some(tracked.side);
        let angle = tracked.angle;

        if !state.is_ready() {
            self.await_start_position(state, config, angles);
            return Evaluation {
                report: FrameReport::not_ready(angle, tracked.side),
                commands: Vec::new(),
                rep_completed: false,
                failed_attempt_logged: false,
                session_ended: false,
            };
        }

        let mut frame = FrameOutcome::default();
        let is_correct = config.is_correct(angle);
        let is_perfect = config.is_perfect(angle);
        let in_rest = config.in_rest(angles.left, angles.right, angle);

        let previous = state.phase;
        if config.enters_active(angle) {
            state.phase = Phase::Active;
        } else if previous == Phase::Active && in_rest {
            state.phase = Phase::Rest;
            frame.rep_completed = true;
        }

        let in_active = state.phase == Phase::Active;
        if in_active && previous != Phase::Active {
            state.perfect_frames = 0;
            state.standard_frames = 0;
            state.perfect_cue_sent = false;
            state.correct_cue_sent = false;
        }
        if in_active {
            if is_perfect {
                state.perfect_frames += 1;
            } else if is_correct {
                state.standard_frames += 1;
            }
        }

        if frame.rep_completed {
            self.complete_rep(state, scoring, &mut frame);
        }

        let passes = is_correct || is_perfect;
        let mut stopped = false;
        let mut holding_incorrect = false;
        if in_rest {
            stopped = self.rest_frame(state, config, scoring, &mut frame);
        } else if !passes {
            holding_incorrect = true;
            self.incorrect_frame(state, config, angle, &mut frame);
        } else {
            state.rest_frames = 0;
            state.error_frames = 0;
            state.last_stopped_frame = 0;
            if state.incorrect_attempt {
                state.incorrect_attempt = false;
                state.reset_best_angle();
            }
        }

        let form_status = if stopped {
            FormStatus::Stopped
        } else if is_perfect {
            FormStatus::Perfect
        } else if is_correct {
            FormStatus::Correct
        } else if holding_incorrect {
            FormStatus::Incorrect
        } else {
            FormStatus::None
        };

        if in_active {
            if is_perfect {
                if !state.perfect_cue_sent {
                    frame.speak(cues::PERFECT);
                    state.perfect_cue_sent = true;
                    state.correct_cue_sent = true;
                }
            } else if is_correct && !state.correct_cue_sent {
                frame.speak(cues::GOOD);
                state.correct_cue_sent = true;
            }
        }

        Evaluation {
            report: FrameReport::evaluated(state, angle, is_correct, form_status),
            commands: frame.commands,
            rep_completed: frame.rep_completed,
            failed_attempt_logged: frame.failed_attempt_logged,
            session_ended: frame.session_ended,
        }
    }

    fn await_start_position(
        &self,
        state: &mut ExerciseState,
        config: &ExerciseConfig,
        angles: BilateralAngles,
    ) {
        if !config.in_start_position(angles.left, angles.right) {
            state.start_frames = 0;
            return;
        }
        state.start_frames += 1;
        if state.start_frames >= READY_FRAMES {
            state.phase = Phase::Rest;
            state.reset_best_angle();
            debug!(exercise = %state.exercise, "Starting posture held; counting reps");
        }
    }

    fn complete_rep<R: Rng>(
        &self,
        state: &mut ExerciseState,
        scoring: &mut ScoringEngine<R>,
        frame: &mut FrameOutcome,
    ) {
        state.repcount += 1;
        let ratio = quality_ratio(state.perfect_frames, state.standard_frames);
        let score = scoring.completed_rep(ratio);
        state.rep_scores.push(score);
        debug!(
            exercise = %state.exercise,
            rep = state.repcount,
            ratio,
            score = score.value,
            "Rep completed"
        );
        frame.speak(state.repcount.to_string());

        state.perfect_frames = 0;
        state.standard_frames = 0;
        state.reset_best_angle();
        state.incorrect_attempt = false;
    }

    /// Rest-phase bookkeeping. Returns true when the user is reported as stopped.
    fn rest_frame<R: Rng>(
        &self,
        state: &mut ExerciseState,
        config: &ExerciseConfig,
        scoring: &mut ScoringEngine<R>,
        frame: &mut FrameOutcome,
    ) -> bool {
        state.rest_frames += 1;
        state.error_frames = 0;

        if state.incorrect_attempt {
            frame.failed_attempt_logged = log_failed_rep(state, config, scoring);
            frame.speak(cues::TRY_AGAIN);
            state.incorrect_attempt = false;
            state.reset_best_angle();
        }

        if self.mode == SessionMode::Solo && state.rest_frames >= self.end_after_frames() {
            if !state.ended {
                state.ended = true;
                state.rest_frames = 0;
                frame.session_ended = true;
                frame.speak(cues::SESSION_ENDED);
                debug!(exercise = %state.exercise, "Rest held too long; exercise ended");
            }
            return false;
        }

        if state.rest_frames >= self.stop_after_frames() {
            if state.frame_counter - state.last_stopped_frame >= STOP_CUE_INTERVAL_FRAMES {
                frame.speak(cues::YOU_STOPPED);
                state.last_stopped_frame = state.frame_counter;
            }
            return true;
        }
        false
    }

    fn incorrect_frame(
        &self,
        state: &mut ExerciseState,
        config: &ExerciseConfig,
        angle: f32,
        frame: &mut FrameOutcome,
    ) {
        state.incorrect_attempt = true;
        state.rest_frames = 0;
        state.last_stopped_frame = 0;
        state.best_angle = config.closer_to_active(state.best_angle, angle);

        state.error_frames += 1;
        if state.error_frames == VIBRATE_AFTER_ERROR_FRAMES {
            let side = state.tracked_side.unwrap_or(Side::Both);
            frame
                .commands
                .push(FeedbackCommand::vibrate(side, HAPTIC_PULSE_MS, HAPTIC_INTENSITY));
        }
    }
}

/// Score an abandoned attempt. Skipped when no real attempt was tracked.
fn log_failed_rep<R: Rng>(
    state: &mut ExerciseState,
    config: &ExerciseConfig,
    scoring: &mut ScoringEngine<R>,
) -> bool {
    if state.best_angle_is_default() {
        return false;
    }
    let shortfall = config.shortfall(state.best_angle);
    let score = scoring.failed_attempt(shortfall);
    state.rep_scores.push(score);
    debug!(
        exercise = %state.exercise,
        best_angle = state.best_angle,
        shortfall,
        score = score.value,
        "Failed attempt logged"
    );
    true
}

#[derive(Default)]
struct FrameOutcome {
    commands: Vec<FeedbackCommand>,
    rep_completed: bool,
    failed_attempt_logged: bool,
    session_ended: bool,
}

impl FrameOutcome {
    fn speak(&mut self, text: impl Into<String>) {
        self.commands.push(FeedbackCommand::speak(text));
    }
}
