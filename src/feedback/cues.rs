//! Fixed spoken phrases.

pub const GOOD: &str = "Good";
pub const PERFECT: &str = "Perfect";
pub const TRY_AGAIN: &str = "Try again";
pub const YOU_STOPPED: &str = "You stopped";
pub const SESSION_ENDED: &str = "Session ended";
pub const SESSION_START: &str = "SESSION START";
pub const SESSION_PAUSED: &str = "SESSION PAUSED";
pub const SESSION_RESUMED: &str = "SESSION RESUMED";
pub const GET_READY: &str = "GET READY";

/// Rep counts above this are synthesized on demand.
pub const PREWARMED_COUNT_MAX: u32 = 50;

const FIXED: [&str; 9] = [
    GOOD,
    PERFECT,
    TRY_AGAIN,
    YOU_STOPPED,
    SESSION_ENDED,
    SESSION_START,
    SESSION_PAUSED,
    GET_READY,
    SESSION_RESUMED,
];

/// Phrases synthesized at startup: the fixed cues, then the counts 1 to 50.
pub fn prewarm_phrases() -> Vec<String> {
    FIXED
        .iter()
        .map(|phrase| phrase.to_string())
        .chain((1..=PREWARMED_COUNT_MAX).map(|count| count.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prewarm_covers_cues_and_counts() {
        let phrases = prewarm_phrases();
        assert_eq!(phrases.len(), FIXED.len() + 50);
        assert!(phrases.iter().any(|phrase| phrase == TRY_AGAIN));
        assert_eq!(phrases.last().map(String::as_str), Some("50"));
        assert!(!phrases.iter().any(|phrase| phrase == "0" || phrase == "51"));
    }
}
