use std::time::{Duration, Instant};

use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, error, info, warn};

use crate::feedback::FeedbackSink;
use crate::frame_source::{FrameSourceError, OperatorCommand, SourceEvent};

use super::controller::{SessionController, SessionFrame};

/// What handling one source event did.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Frame(SessionFrame),
    Command(OperatorCommand),
    Quit,
}

/// Feeds source events into a session on a single clock.
///
/// Recorded frames carry their offset from `started`; commands are stamped
/// with the time of the last recorded frame so switches, toggles and status
/// holds are measured in stream time. Untimed input runs on the wall clock.
pub struct SessionDriver<S: FeedbackSink, R: Rng = StdRng> {
    session: SessionController<S, R>,
    started: Instant,
    clock: Instant,
    recorded: bool,
    last_banner: Option<String>,
    last_reps: u32,
}

impl<S: FeedbackSink, R: Rng> SessionDriver<S, R> {
    pub fn new(session: SessionController<S, R>, started: Instant) -> Self {
        Self {
            session,
            started,
            clock: started,
            recorded: false,
            last_banner: None,
            last_reps: 0,
        }
    }

    pub fn session(&self) -> &SessionController<S, R> {
        &self.session
    }

    pub fn into_session(self) -> SessionController<S, R> {
        self.session
    }

    /// Time the next command would be stamped with.
    pub fn command_time(&self) -> Instant {
        if self.recorded {
            self.clock
        } else {
            Instant::now()
        }
    }

    fn frame_time(&mut self, offset: Option<Duration>) -> Instant {
        let now = match offset {
            Some(offset) => {
                self.recorded = true;
                (self.started + offset).max(self.clock)
            }
            None => {
                self.recorded = false;
                Instant::now()
            }
        };
        self.clock = now;
        now
    }

    pub fn handle(&mut self, event: SourceEvent) -> Step {
        match event {
            SourceEvent::Frame { offset, frame } => {
                let now = self.frame_time(offset);
                let result = self.session.process_frame(&frame, now);
                self.log_frame(&result);
                Step::Frame(result)
            }
            SourceEvent::Command(OperatorCommand::Quit) => {
                info!("Quit requested");
                Step::Quit
            }
            SourceEvent::Command(command) => {
                let now = self.command_time();
                match command {
                    OperatorCommand::Start => {
                        self.session.start(now);
                    }
                    OperatorCommand::Pause => {
                        self.session.pause(now);
                    }
                    OperatorCommand::Switch(next) => {
                        self.session.switch_exercise(next, now);
                        self.last_reps = 0;
                    }
                    OperatorCommand::Quit => {}
                }
                Step::Command(command)
            }
        }
    }

    /// Drain a source until it ends, fails, or asks to quit.
    pub fn run<I>(&mut self, events: I) -> usize
    where
        I: IntoIterator<Item = Result<SourceEvent, FrameSourceError>>,
    {
        let mut frames = 0;
        for event in events {
            let event = match event {
                Ok(event) => event,
                Err(err) if err.is_recoverable() => {
                    warn!("Skipping input: {err}");
                    continue;
                }
                Err(err) => {
                    error!("Frame source failed: {err}");
                    break;
                }
            };
            match self.handle(event) {
                Step::Frame(_) => frames += 1,
                Step::Command(_) => {}
                Step::Quit => break,
            }
        }
        frames
    }

    fn log_frame(&mut self, result: &SessionFrame) {
        if result.banner != self.last_banner {
            if let Some(banner) = &result.banner {
                info!("{banner}");
            }
            self.last_banner = result.banner.clone();
        }
        let report = &result.report;
        if result.evaluated && report.repcount != self.last_reps {
            info!(
                exercise = result.exercise.title(),
                reps = report.repcount,
                last_score = ?report.last_score,
                average_score = %format!("{:.1}", report.average_score),
                "Rep counted"
            );
        }
        self.last_reps = report.repcount;
        debug!(
            angle = %format!("{:.1}", report.angle),
            phase = report.phase,
            form = report.form_status.label(),
            feedback = report.feedback,
            pose = result.pose_detected,
            "Frame"
        );
    }
}
