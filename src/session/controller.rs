use std::collections::HashMap;
use std::time::Instant;

use rand::Rng;
use rand::rngs::StdRng;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::exercise::{Exercise, ExerciseState, ExerciseStateMachine, FrameReport};
use crate::feedback::{FeedbackCommand, FeedbackSink, cues};
use crate::pose::PoseFrame;
use crate::scoring::ScoringEngine;

use super::SessionMode;
use super::metrics::{ExerciseSummary, PerformanceMetrics, SessionSummary};
use super::timer::{SessionTimer, Stage};

/// Result of one frame passed through the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionFrame {
    pub exercise: Exercise,
    pub stage: Stage,
    pub banner: Option<String>,
    /// Whether the frame went through the rep counter.
    pub evaluated: bool,
    pub pose_detected: bool,
    pub report: FrameReport,
}

/// Single owner of every exercise's progress; drives evaluation frame by frame.
///
/// All state mutation happens on the caller's thread. Feedback leaves only
/// through the non-blocking sink.
pub struct SessionController<S: FeedbackSink, R: Rng = StdRng> {
    machine: ExerciseStateMachine,
    scoring: ScoringEngine<R>,
    sink: S,
    timer: SessionTimer,
    exercises: HashMap<Exercise, ExerciseState>,
    current: Exercise,
    metrics: PerformanceMetrics,
}

impl<S: FeedbackSink, R: Rng> SessionController<S, R> {
    pub fn new(
        config: &AppConfig,
        exercise: Exercise,
        sink: S,
        scoring: ScoringEngine<R>,
        now: Instant,
    ) -> Self {
        let mode = config.session.mode;
        let exercises = Exercise::ALL
            .into_iter()
            .map(|exercise| (exercise, ExerciseState::new(exercise)))
            .collect();
        info!(mode = %mode, exercise = %exercise, "Session created");
        Self {
            machine: ExerciseStateMachine::new(config.frame_rate, mode),
            scoring,
            sink,
            timer: SessionTimer::new(mode, &config.session, now),
            exercises,
            current: exercise,
            metrics: PerformanceMetrics::default(),
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.timer.mode()
    }

    pub fn current_exercise(&self) -> Exercise {
        self.current
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_active()
    }

    pub fn state(&self, exercise: Exercise) -> &ExerciseState {
        &self.exercises[&exercise]
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Reset `exercise` to its initial state and make it current.
    ///
    /// The gate restarts too: a fresh countdown in solo mode, paused in
    /// assisted mode.
    pub fn switch_exercise(&mut self, exercise: Exercise, now: Instant) {
        info!(from = %self.current, to = %exercise, "Switching exercise");
        self.current = exercise;
        self.reset(exercise);
        self.timer.restart(now);
    }

    pub fn reset(&mut self, exercise: Exercise) {
        if let Some(state) = self.exercises.get_mut(&exercise) {
            state.reset();
        }
    }

    /// Assisted-mode start. Returns whether the command was accepted.
    pub fn start(&mut self, now: Instant) -> bool {
        self.toggle(true, now)
    }

    /// Assisted-mode pause. Returns whether the command was accepted.
    pub fn pause(&mut self, now: Instant) -> bool {
        self.toggle(false, now)
    }

    fn toggle(&mut self, active: bool, now: Instant) -> bool {
        if !self.timer.toggle(active, now) {
            debug!(active, "Toggle ignored");
            return false;
        }
        let cue = if active {
            cues::SESSION_RESUMED
        } else {
            cues::SESSION_PAUSED
        };
        info!(active, "Session toggled");
        self.sink.submit(FeedbackCommand::speak(cue));
        true
    }

    /// Gate, evaluate and report one captured frame.
    pub fn process_frame(&mut self, frame: &PoseFrame, now: Instant) -> SessionFrame {
        let started = Instant::now();
        self.metrics.frame_captured();

        let current = self.current;
        let state = self
            .exercises
            .entry(current)
            .or_insert_with(|| ExerciseState::new(current));
        let mut stage = self.timer.update(now, state.ended);
        match stage {
            Stage::Countdown(_) if !state.get_ready_cue_sent => {
                state.get_ready_cue_sent = true;
                self.sink.submit(FeedbackCommand::speak(cues::GET_READY));
            }
            Stage::Starting if !state.session_start_cue_sent => {
                state.session_start_cue_sent = true;
                self.sink.submit(FeedbackCommand::speak(cues::SESSION_START));
            }
            _ => {}
        }

        let pose_detected = frame.has_pose();
        let mut evaluated = false;
        let report = match frame.landmarks.as_deref() {
            Some(landmarks) if pose_detected => {
                self.metrics.frame_processed();
                if self.timer.is_active() {
                    evaluated = true;
                    let evaluation = self.machine.evaluate(state, landmarks, &mut self.scoring);
                    for command in evaluation.commands {
                        self.sink.submit(command);
                    }
                    if evaluation.session_ended {
                        self.timer.end();
                        stage = Stage::Ended;
                        info!(exercise = %current, "Exercise session ended");
                    }
                    evaluation.report
                } else {
                    FrameReport::idle(state)
                }
            }
            _ => FrameReport::idle(state),
        };

        self.metrics.record_latency(started.elapsed());
        SessionFrame {
            exercise: current,
            stage,
            banner: stage.banner(),
            evaluated,
            pose_detected,
            report,
        }
    }

    /// Per-exercise totals for every exercise that recorded a rep or a score.
    pub fn summary(&self, finished_at: OffsetDateTime) -> SessionSummary {
        SessionSummary {
            finished_at,
            mode: self.mode(),
            exercises: Exercise::ALL
                .iter()
                .map(|exercise| &self.exercises[exercise])
                .filter(|state| state.has_activity())
                .map(ExerciseSummary::from_state)
                .collect(),
            average_latency_secs: self.metrics.average_latency_secs(),
            efficiency_percent: self.metrics.efficiency_percent(),
        }
    }
}
