use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::SpeechError;
use super::synth::Synthesizer;

/// On-disk phrase to clip map, so repeated cues skip synthesis.
///
/// Clips are named by a blake3 hash of language and phrase, which keeps the
/// cache valid across runs and across language changes.
pub struct PhraseCache {
    dir: PathBuf,
    language: String,
    entries: HashMap<String, PathBuf>,
}

impl PhraseCache {
    pub fn new(dir: impl Into<PathBuf>, language: &str) -> Self {
        Self {
            dir: dir.into(),
            language: language.to_string(),
            entries: HashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Clip location for `phrase`, whether or not it exists yet.
    pub fn path_for(&self, phrase: &str) -> PathBuf {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.language.as_bytes());
        hasher.update(b"\0");
        hasher.update(phrase.as_bytes());
        self.dir.join(format!("{}.mp3", hasher.finalize().to_hex()))
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.entries.contains_key(phrase) || self.path_for(phrase).is_file()
    }

    /// Return the cached clip, synthesizing and persisting it on a miss.
    pub fn get_or_synthesize(
        &mut self,
        phrase: &str,
        synthesizer: &dyn Synthesizer,
    ) -> Result<PathBuf, SpeechError> {
        if let Some(path) = self.entries.get(phrase) {
            return Ok(path.clone());
        }
        let path = self.path_for(phrase);
        if !path.is_file() {
            let bytes = synthesizer.synthesize(phrase)?;
            write_atomic(&path, &bytes)?;
            debug!(phrase, path = %path.display(), "Speech clip cached");
        }
        self.entries.insert(phrase.to_string(), path.clone());
        Ok(path)
    }

    /// Cache every phrase. On failure, returns how many succeeded alongside the error.
    pub fn prewarm<I, S>(
        &mut self,
        synthesizer: &dyn Synthesizer,
        phrases: I,
    ) -> Result<usize, (usize, SpeechError)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut count = 0;
        for phrase in phrases {
            self.get_or_synthesize(phrase.as_ref(), synthesizer)
                .map_err(|err| (count, err))?;
            count += 1;
        }
        Ok(count)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), SpeechError> {
    let to_error = |source| SpeechError::CacheWrite {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    let tmp = path.with_extension("mp3.tmp");
    fs::write(&tmp, bytes).map_err(to_error)?;
    fs::rename(&tmp, path).map_err(to_error)
}
