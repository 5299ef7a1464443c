use std::time::Duration;

use tracing::{debug, info, warn};

use crate::app_dirs;
use crate::config::AppConfig;

use super::channel::{ChannelSettings, Delivery, FeedbackChannel, ShutdownOutcome};
use super::command::{FeedbackCommand, VibrateCommand};
use super::cues;
use super::haptic::HapticClient;
use super::speech::{
    HttpSynthesizer, PhraseCache, Player, RodioPlayer, SilentPlayer, SpeechDelivery,
};

/// Where evaluation hands off its feedback. Must never block.
pub trait FeedbackSink {
    fn submit(&mut self, command: FeedbackCommand);
}

/// Collects commands in memory; used to inspect feedback without workers.
impl FeedbackSink for Vec<FeedbackCommand> {
    fn submit(&mut self, command: FeedbackCommand) {
        self.push(command);
    }
}

/// Routes commands to the speech and haptic workers.
///
/// A channel that is disabled or failed to start simply drops its commands.
pub struct FeedbackDispatcher {
    speech: Option<FeedbackChannel<String>>,
    haptic: Option<FeedbackChannel<VibrateCommand>>,
    shutdown_timeout: Duration,
}

impl FeedbackDispatcher {
    /// Start the workers enabled in `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        let speech = if config.speech.enabled {
            spawn_speech(config)
        } else {
            info!("Speech feedback disabled");
            None
        };
        let haptic = if config.haptic.enabled {
            let settings = ChannelSettings {
                capacity: config.haptic.queue_capacity,
                poll_interval: config.haptic.poll_interval(),
            };
            let host = config.haptic.host.clone();
            let timeout = config.haptic.timeout();
            info!(host = %host, "Haptic feedback enabled");
            spawn_or_warn("haptic", settings, move || HapticClient::new(&host, timeout))
        } else {
            info!("Haptic feedback disabled");
            None
        };
        Self::with_channels(speech, haptic, config.shutdown_timeout())
    }

    pub fn with_channels(
        speech: Option<FeedbackChannel<String>>,
        haptic: Option<FeedbackChannel<VibrateCommand>>,
        shutdown_timeout: Duration,
    ) -> Self {
        Self {
            speech,
            haptic,
            shutdown_timeout,
        }
    }

    /// No workers; every command is dropped.
    pub fn disabled() -> Self {
        Self::with_channels(None, None, Duration::ZERO)
    }

    pub fn speech_enabled(&self) -> bool {
        self.speech.is_some()
    }

    pub fn haptic_enabled(&self) -> bool {
        self.haptic.is_some()
    }

    /// Stop both workers, waiting a bounded time for each.
    pub fn shutdown(&mut self) {
        let timeout = self.shutdown_timeout;
        if let Some(channel) = self.speech.as_mut() {
            log_shutdown(channel.name(), channel.shutdown(timeout));
        }
        if let Some(channel) = self.haptic.as_mut() {
            log_shutdown(channel.name(), channel.shutdown(timeout));
        }
    }
}

impl FeedbackSink for FeedbackDispatcher {
    fn submit(&mut self, command: FeedbackCommand) {
        match command {
            FeedbackCommand::Speak(text) => match &self.speech {
                Some(channel) => {
                    channel.enqueue(text);
                }
                None => debug!(text = %text, "Speech disabled; cue dropped"),
            },
            FeedbackCommand::Vibrate(pulse) => match &self.haptic {
                Some(channel) => {
                    channel.enqueue(pulse);
                }
                None => debug!(side = pulse.side.as_str(), "No haptic client; pulse dropped"),
            },
        }
    }
}

impl Drop for FeedbackDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_speech(config: &AppConfig) -> Option<FeedbackChannel<String>> {
    let cache_dir = match app_dirs::speech_cache_dir() {
        Ok(dir) => dir,
        Err(err) => {
            warn!("Speech feedback disabled: {err}");
            return None;
        }
    };
    let synthesizer =
        match HttpSynthesizer::new(&config.speech.provider_url, &config.speech.language) {
            Ok(synthesizer) => synthesizer,
            Err(err) => {
                warn!("Speech feedback disabled: {err}");
                return None;
            }
        };
    let language = config.speech.language.clone();
    let settings = ChannelSettings {
        capacity: config.speech.queue_capacity,
        poll_interval: config.speech.poll_interval(),
    };
    spawn_or_warn("speech", settings, move || {
        let player: Box<dyn Player> = match RodioPlayer::open_default() {
            Ok(player) => Box::new(player),
            Err(err) => {
                warn!("Spoken cues will not be audible: {err}");
                Box::new(SilentPlayer)
            }
        };
        let mut delivery = SpeechDelivery::new(
            PhraseCache::new(cache_dir, &language),
            Box::new(synthesizer),
            player,
        );
        delivery.prewarm(cues::prewarm_phrases());
        delivery
    })
}

fn spawn_or_warn<T, D, F>(
    name: &'static str,
    settings: ChannelSettings,
    make_delivery: F,
) -> Option<FeedbackChannel<T>>
where
    T: Send + 'static,
    D: Delivery<T>,
    F: FnOnce() -> D + Send + 'static,
{
    match FeedbackChannel::spawn(name, settings, make_delivery) {
        Ok(channel) => Some(channel),
        Err(err) => {
            warn!(channel = name, "Failed to start feedback worker: {err}");
            None
        }
    }
}

fn log_shutdown(name: &str, outcome: ShutdownOutcome) {
    match outcome {
        ShutdownOutcome::Joined => debug!(channel = name, "Feedback worker joined"),
        ShutdownOutcome::TimedOut => warn!(channel = name, "Feedback worker did not stop in time"),
        ShutdownOutcome::AlreadyStopped => {}
    }
}
