use std::time::{Duration, Instant};

use crate::config::SessionSettings;
use crate::feedback::cues;

use super::SessionMode;

const ENDED_BANNER: &str = "SESSION ENDED";

/// What the session looks like on a given frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Solo countdown; whole seconds left.
    Countdown(u64),
    /// Countdown finished and the start banner is still up.
    Starting,
    Running,
    Paused,
    /// An assisted toggle banner is still up.
    Toggled(&'static str),
    /// Solo evaluation ended for the current exercise.
    Ended,
}

impl Stage {
    /// Banner text drawn over the frame, if any.
    pub fn banner(self) -> Option<String> {
        match self {
            Stage::Countdown(remaining) => Some(format!("{}: {remaining}", cues::GET_READY)),
            Stage::Starting => Some(cues::SESSION_START.to_string()),
            Stage::Running => None,
            Stage::Paused => Some(cues::SESSION_PAUSED.to_string()),
            Stage::Toggled(status) => Some(status.to_string()),
            Stage::Ended => Some(ENDED_BANNER.to_string()),
        }
    }
}

/// Decides when frames are evaluated: solo countdown or assisted toggles.
///
/// Time is always passed in, never read, so the timer is deterministic.
#[derive(Debug, Clone)]
pub struct SessionTimer {
    mode: SessionMode,
    countdown: Duration,
    toggle_debounce: Duration,
    status_hold: Duration,
    active: bool,
    started_at: Instant,
    last_toggle: Option<Instant>,
    status: &'static str,
}

impl SessionTimer {
    pub fn new(mode: SessionMode, settings: &SessionSettings, now: Instant) -> Self {
        let mut timer = Self {
            mode,
            countdown: settings.countdown(),
            toggle_debounce: settings.toggle_debounce(),
            status_hold: settings.status_hold(),
            active: false,
            started_at: now,
            last_toggle: None,
            status: cues::SESSION_PAUSED,
        };
        timer.restart(now);
        timer
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Back to the initial gate: a fresh countdown, or paused.
    pub fn restart(&mut self, now: Instant) {
        self.active = false;
        self.started_at = now;
        self.status = cues::SESSION_PAUSED;
    }

    /// Accept an assisted start (`true`) or pause (`false`).
    ///
    /// Ignored in solo mode and inside the debounce window after the last
    /// accepted toggle. Returns whether the toggle was accepted.
    pub fn toggle(&mut self, active: bool, now: Instant) -> bool {
        if self.mode != SessionMode::Assisted {
            return false;
        }
        if self
            .last_toggle
            .is_some_and(|last| now.saturating_duration_since(last) < self.toggle_debounce)
        {
            return false;
        }
        self.active = active;
        self.status = if active {
            cues::SESSION_RESUMED
        } else {
            cues::SESSION_PAUSED
        };
        self.last_toggle = Some(now);
        true
    }

    /// Advance the gate to `now`. `ended` is the current exercise's terminal flag.
    pub fn update(&mut self, now: Instant, ended: bool) -> Stage {
        match self.mode {
            SessionMode::Solo => self.update_solo(now, ended),
            SessionMode::Assisted => self.update_assisted(now),
        }
    }

    /// Stop evaluating after the terminal transition, without waiting a frame.
    pub fn end(&mut self) {
        if self.mode == SessionMode::Solo {
            self.active = false;
        }
    }

    fn update_solo(&mut self, now: Instant, ended: bool) -> Stage {
        if ended {
            self.active = false;
            return Stage::Ended;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        if !self.active {
            let remaining = self.countdown.as_secs().saturating_sub(elapsed.as_secs());
            if remaining > 0 {
                return Stage::Countdown(remaining);
            }
            self.active = true;
        }
        if elapsed <= self.countdown + self.status_hold {
            Stage::Starting
        } else {
            Stage::Running
        }
    }

    fn update_assisted(&mut self, now: Instant) -> Stage {
        let holding = self
            .last_toggle
            .is_some_and(|last| now.saturating_duration_since(last) < self.status_hold);
        if holding {
            Stage::Toggled(self.status)
        } else if self.active {
            Stage::Running
        } else {
            Stage::Paused
        }
    }
}
