//! Best-effort speech and haptic feedback.
//!
//! Evaluation never waits on feedback I/O. Commands are pushed into bounded
//! drop-oldest queues, each drained by one dedicated worker thread that owns
//! the slow side (synthesis, playback, network) and swallows its failures.

mod channel;
mod command;
pub mod cues;
mod dispatcher;
mod haptic;
mod queue;
pub mod speech;

pub use channel::{ChannelSettings, Delivery, DeliveryError, FeedbackChannel, ShutdownOutcome};
pub use command::{FeedbackCommand, VibrateCommand};
pub use dispatcher::{FeedbackDispatcher, FeedbackSink};
pub use haptic::{HapticClient, VibratePayload};
pub use queue::DropOldestQueue;
pub use speech::{SpeechDelivery, SpeechError};
