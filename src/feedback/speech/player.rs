use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use tracing::debug;

use super::SpeechError;

/// Plays a clip to completion on the calling thread.
pub trait Player {
    fn play(&mut self, clip: &Path) -> Result<(), SpeechError>;
}

/// Playback through the default output device.
pub struct RodioPlayer {
    stream: OutputStream,
}

impl RodioPlayer {
    pub fn open_default() -> Result<Self, SpeechError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|err| SpeechError::Output(err.to_string()))?;
        stream.log_on_drop(false);
        Ok(Self { stream })
    }
}

impl Player for RodioPlayer {
    fn play(&mut self, clip: &Path) -> Result<(), SpeechError> {
        let file = File::open(clip).map_err(|source| SpeechError::OpenClip {
            path: clip.to_path_buf(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|err| SpeechError::Decode {
            path: clip.to_path_buf(),
            message: err.to_string(),
        })?;
        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        sink.sleep_until_end();
        Ok(())
    }
}

/// Stand-in used when no output device is available; cues are logged only.
pub struct SilentPlayer;

impl Player for SilentPlayer {
    fn play(&mut self, clip: &Path) -> Result<(), SpeechError> {
        debug!(clip = %clip.display(), "No audio output; cue not played");
        Ok(())
    }
}
