use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::session::SessionMode;

use super::defaults::{
    clamp_capacity, clamp_frame_rate, default_countdown_secs, default_frame_rate,
    default_haptic_capacity, default_haptic_host, default_haptic_poll_ms,
    default_haptic_timeout_ms, default_language, default_mode, default_provider_url,
    default_shutdown_timeout_ms, default_speech_capacity, default_speech_poll_ms,
    default_status_hold_ms, default_toggle_debounce_ms, default_true,
};

/// Top-level settings loaded from `config.toml`.
///
/// Config keys (TOML): `frame_rate`, `shutdown_timeout_ms`, `session`, `haptic`,
/// `speech`, `metrics`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Nominal camera frame rate; scales the stop and end persistence windows.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Bounded wait for each feedback worker at shutdown.
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub haptic: HapticSettings,
    #[serde(default)]
    pub speech: SpeechSettings,
    #[serde(default)]
    pub metrics: MetricsSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            session: SessionSettings::default(),
            haptic: HapticSettings::default(),
            speech: SpeechSettings::default(),
            metrics: MetricsSettings::default(),
        }
    }
}

impl AppConfig {
    pub(super) fn normalized(mut self) -> Self {
        self.frame_rate = clamp_frame_rate(self.frame_rate);
        self.haptic.queue_capacity = clamp_capacity(self.haptic.queue_capacity);
        self.speech.queue_capacity = clamp_capacity(self.speech.queue_capacity);
        self.haptic.host = self.haptic.host.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

/// Session gating options.
///
/// Config keys: `mode`, `countdown_secs`, `toggle_debounce_ms`, `status_hold_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_mode")]
    pub mode: SessionMode,
    /// Solo-mode countdown before evaluation begins.
    #[serde(default = "default_countdown_secs")]
    pub countdown_secs: u64,
    /// Minimum spacing between accepted assisted-mode toggles.
    #[serde(default = "default_toggle_debounce_ms")]
    pub toggle_debounce_ms: u64,
    /// How long a toggle banner stays up before it reverts.
    #[serde(default = "default_status_hold_ms")]
    pub status_hold_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            countdown_secs: default_countdown_secs(),
            toggle_debounce_ms: default_toggle_debounce_ms(),
            status_hold_ms: default_status_hold_ms(),
        }
    }
}

impl SessionSettings {
    pub fn countdown(&self) -> Duration {
        Duration::from_secs(self.countdown_secs)
    }

    pub fn toggle_debounce(&self) -> Duration {
        Duration::from_millis(self.toggle_debounce_ms)
    }

    pub fn status_hold(&self) -> Duration {
        Duration::from_millis(self.status_hold_ms)
    }
}

/// Wearable haptic actuator options.
///
/// Config keys: `enabled`, `host`, `queue_capacity`, `timeout_ms`, `poll_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HapticSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Base URL of the actuator; requests go to `<host>/vibrate`.
    #[serde(default = "default_haptic_host")]
    pub host: String,
    #[serde(default = "default_haptic_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_haptic_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_haptic_poll_ms")]
    pub poll_ms: u64,
}

impl Default for HapticSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_haptic_host(),
            queue_capacity: default_haptic_capacity(),
            timeout_ms: default_haptic_timeout_ms(),
            poll_ms: default_haptic_poll_ms(),
        }
    }
}

impl HapticSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }
}

/// Spoken cue options.
///
/// Config keys: `enabled`, `queue_capacity`, `poll_ms`, `language`, `provider_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_speech_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_speech_poll_ms")]
    pub poll_ms: u64,
    #[serde(default = "default_language")]
    pub language: String,
    /// Text-to-speech endpoint; `q` and `tl` query parameters are appended.
    #[serde(default = "default_provider_url")]
    pub provider_url: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            queue_capacity: default_speech_capacity(),
            poll_ms: default_speech_poll_ms(),
            language: default_language(),
            provider_url: default_provider_url(),
        }
    }
}

impl SpeechSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }
}

/// Metrics log location.
///
/// Config keys: `path`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// Overrides `<app dir>/session_metrics/performance_log.csv`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}
