//! Spoken cues: cached synthesis plus local playback.

mod cache;
mod player;
mod synth;

use std::path::PathBuf;

use tracing::{info, warn};

use super::channel::{Delivery, DeliveryError};

pub use cache::PhraseCache;
pub use player::{Player, RodioPlayer, SilentPlayer};
pub use synth::{HttpSynthesizer, MAX_CLIP_BYTES, Synthesizer};

/// Failures while turning a phrase into sound.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("Speech request failed: {0}")]
    Request(String),
    #[error("Speech provider returned HTTP {0}")]
    Status(u16),
    #[error("Invalid speech provider URL: {0}")]
    ProviderUrl(#[from] url::ParseError),
    #[error("Speech provider returned an empty clip for '{0}'")]
    EmptyClip(String),
    #[error("Failed to write cached clip {path}: {source}")]
    CacheWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to open clip {path}: {source}")]
    OpenClip {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Audio output unavailable: {0}")]
    Output(String),
    #[error("Failed to decode clip {path}: {message}")]
    Decode { path: PathBuf, message: String },
}

/// Speech worker side: resolve the phrase to a clip, then play it to the end.
pub struct SpeechDelivery {
    cache: PhraseCache,
    synthesizer: Box<dyn Synthesizer>,
    player: Box<dyn Player>,
}

impl SpeechDelivery {
    pub fn new(
        cache: PhraseCache,
        synthesizer: Box<dyn Synthesizer>,
        player: Box<dyn Player>,
    ) -> Self {
        Self {
            cache,
            synthesizer,
            player,
        }
    }

    /// Synthesize `phrases` ahead of time. Stops at the first failure, since a
    /// provider that is down for one phrase is down for all of them.
    pub fn prewarm<I, S>(&mut self, phrases: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match self.cache.prewarm(self.synthesizer.as_ref(), phrases) {
            Ok(count) => {
                info!(phrases = count, "Speech cache warmed");
                count
            }
            Err((count, err)) => {
                warn!(phrases = count, "Speech prewarm stopped early: {err}");
                count
            }
        }
    }

    pub fn cache(&self) -> &PhraseCache {
        &self.cache
    }
}

impl Delivery<String> for SpeechDelivery {
    fn deliver(&mut self, text: String) -> Result<(), DeliveryError> {
        info!(text = %text, "Speaking");
        let clip = self
            .cache
            .get_or_synthesize(&text, self.synthesizer.as_ref())?;
        self.player.play(&clip)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    struct EchoSynth;

    impl Synthesizer for EchoSynth {
        fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
            Ok(text.as_bytes().to_vec())
        }
    }

    struct RecordingPlayer(Arc<Mutex<Vec<Vec<u8>>>>);

    impl Player for RecordingPlayer {
        fn play(&mut self, clip: &Path) -> Result<(), SpeechError> {
            self.0.lock().unwrap().push(std::fs::read(clip).unwrap());
            Ok(())
        }
    }

    #[test]
    fn delivery_plays_the_synthesized_clip() {
        let dir = tempdir().unwrap();
        let played = Arc::new(Mutex::new(Vec::new()));
        let mut delivery = SpeechDelivery::new(
            PhraseCache::new(dir.path(), "en"),
            Box::new(EchoSynth),
            Box::new(RecordingPlayer(Arc::clone(&played))),
        );
        delivery.deliver("GOOD".to_string()).unwrap();
        delivery.deliver("GOOD".to_string()).unwrap();
        assert_eq!(*played.lock().unwrap(), vec![b"GOOD".to_vec(), b"GOOD".to_vec()]);
        assert!(delivery.cache().contains("GOOD"));
    }
}
