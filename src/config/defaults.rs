use crate::session::SessionMode;

pub(super) const MAX_FRAME_RATE: u32 = 240;

pub(super) fn default_true() -> bool {
    true
}

pub(super) fn default_frame_rate() -> u32 {
    30
}

pub(super) fn clamp_frame_rate(value: u32) -> u32 {
    value.clamp(1, MAX_FRAME_RATE)
}

pub(super) fn clamp_capacity(value: usize) -> usize {
    value.max(1)
}

pub(super) fn default_mode() -> SessionMode {
    SessionMode::Solo
}

pub(super) fn default_countdown_secs() -> u64 {
    15
}

pub(super) fn default_toggle_debounce_ms() -> u64 {
    500
}

pub(super) fn default_status_hold_ms() -> u64 {
    1_000
}

pub(super) fn default_haptic_host() -> String {
    "http://esp32-haptic.local".into()
}

pub(super) fn default_haptic_capacity() -> usize {
    50
}

pub(super) fn default_haptic_timeout_ms() -> u64 {
    crate::http_client::DEFAULT_ACTUATOR_TIMEOUT.as_millis() as u64
}

pub(super) fn default_haptic_poll_ms() -> u64 {
    50
}

pub(super) fn default_speech_capacity() -> usize {
    2
}

pub(super) fn default_speech_poll_ms() -> u64 {
    10
}

pub(super) fn default_language() -> String {
    "en".into()
}

pub(super) fn default_provider_url() -> String {
    "https://translate.google.com/translate_tts?ie=UTF-8&client=tw-ob".into()
}

pub(super) fn default_shutdown_timeout_ms() -> u64 {
    1_000
}
