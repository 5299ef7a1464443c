//! JSON-lines stand-in for the camera and pose estimator.
//!
//! Each line is either a frame, `{"t": 1.25, "landmarks": [{"x":..,"y":..,"visibility":..}, ..]}`
//! with `landmarks` null when no body was found, or an operator command such
//! as `{"command": "pause"}`.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::exercise::Exercise;
use crate::pose::{Landmark, PoseFrame};

#[derive(Debug, thiserror::Error)]
pub enum FrameSourceError {
    #[error("Failed to open frame source {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("Failed to read frame source: {0}")]
    Read(#[from] io::Error),
    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },
}

impl FrameSourceError {
    /// A single bad line; the stream itself is still readable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FrameSourceError::Parse { .. } | FrameSourceError::UnknownCommand { .. }
        )
    }
}

/// Keyboard-equivalent controls issued by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    /// Reset the exercise and make it current.
    Switch(Exercise),
    Start,
    Pause,
    Quit,
}

impl OperatorCommand {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "start" => Some(OperatorCommand::Start),
            "pause" => Some(OperatorCommand::Pause),
            "quit" => Some(OperatorCommand::Quit),
            other => other.parse().ok().map(OperatorCommand::Switch),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    Frame {
        /// Capture time relative to the start of the stream, when recorded.
        offset: Option<Duration>,
        frame: PoseFrame,
    },
    Command(OperatorCommand),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Line {
    Command {
        command: String,
    },
    Frame {
        #[serde(default)]
        t: Option<f64>,
        #[serde(default)]
        landmarks: Option<Vec<Landmark>>,
    },
}

/// Iterator over the events of a JSON-lines stream. Blank lines are skipped.
pub struct FrameSource<R> {
    reader: R,
    line: usize,
    buffer: String,
}

impl FrameSource<Box<dyn BufRead>> {
    /// Open `path`, or stdin when `None` or `-`. Failure here is fatal to a run.
    pub fn open(path: Option<&Path>) -> Result<Self, FrameSourceError> {
        let reader: Box<dyn BufRead> = match path {
            None => Box::new(BufReader::new(io::stdin())),
            Some(path) if path == Path::new("-") => Box::new(BufReader::new(io::stdin())),
            Some(path) => {
                let file = File::open(path).map_err(|source| FrameSourceError::Open {
                    path: path.to_path_buf(),
                    source,
                })?;
                Box::new(BufReader::new(file))
            }
        };
        Ok(Self::new(reader))
    }
}

impl<R: BufRead> FrameSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buffer: String::new(),
        }
    }

    fn parse_line(&self, text: &str) -> Result<SourceEvent, FrameSourceError> {
        let parsed: Line = serde_json::from_str(text).map_err(|err| FrameSourceError::Parse {
            line: self.line,
            message: err.to_string(),
        })?;
        match parsed {
            Line::Command { command } => OperatorCommand::parse(&command)
                .map(SourceEvent::Command)
                .ok_or(FrameSourceError::UnknownCommand {
                    line: self.line,
                    command,
                }),
            Line::Frame { t, landmarks } => {
                let offset = match t {
                    Some(secs) => Some(Duration::try_from_secs_f64(secs).map_err(|err| {
                        FrameSourceError::Parse {
                            line: self.line,
                            message: format!("invalid timestamp {secs}: {err}"),
                        }
                    })?),
                    None => None,
                };
                Ok(SourceEvent::Frame {
                    offset,
                    frame: PoseFrame { landmarks },
                })
            }
        }
    }
}

impl<R: BufRead> Iterator for FrameSource<R> {
    type Item = Result<SourceEvent, FrameSourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buffer.clear();
            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => return Some(Err(FrameSourceError::Read(err))),
            }
            self.line += 1;
            let text = self.buffer.trim();
            if text.is_empty() {
                continue;
            }
            return Some(self.parse_line(text));
        }
    }
}
