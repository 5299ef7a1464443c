use crate::pose::Side;

/// A single haptic pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VibrateCommand {
    pub side: Side,
    pub duration_ms: u32,
    pub intensity: u8,
}

/// Feedback raised by evaluation, consumed once by the matching worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackCommand {
    Speak(String),
    Vibrate(VibrateCommand),
}

impl FeedbackCommand {
    pub fn speak(text: impl Into<String>) -> Self {
        FeedbackCommand::Speak(text.into())
    }

    pub fn vibrate(side: Side, duration_ms: u32, intensity: u8) -> Self {
        FeedbackCommand::Vibrate(VibrateCommand {
            side,
            duration_ms,
            intensity,
        })
    }

    pub fn spoken_text(&self) -> Option<&str> {
        match self {
            FeedbackCommand::Speak(text) => Some(text),
            FeedbackCommand::Vibrate(_) => None,
        }
    }
}
