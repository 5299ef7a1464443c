use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;
use tracing::info;

use crate::app_dirs::{self, AppDirError};
use crate::exercise::{Exercise, ExerciseState};

use super::SessionMode;

/// Default metrics file name inside the metrics directory.
pub const METRICS_FILE_NAME: &str = "performance_log.csv";
/// Column header written once, when the log file is created.
pub const METRICS_HEADER: &str = "Timestamp,SessionMode,Exercise,TotalReps,AverageScore,RepScores,AvgLatency_sec,FrameProcessingEfficiency_Percent";

const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Metrics directory unavailable: {0}")]
    AppDir(#[from] AppDirError),
    #[error("Failed to create metrics directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write metrics log {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format metrics timestamp: {0}")]
    FormatTime(#[from] time::error::Format),
}

/// Frame throughput counters for the whole run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceMetrics {
    frames_captured: u64,
    frames_processed: u64,
    total_latency: Duration,
    latency_samples: u64,
}

impl PerformanceMetrics {
    pub fn frame_captured(&mut self) {
        self.frames_captured += 1;
    }

    /// A frame in which a pose was detected.
    pub fn frame_processed(&mut self) {
        self.frames_processed += 1;
    }

    pub fn record_latency(&mut self, latency: Duration) {
        self.total_latency += latency;
        self.latency_samples += 1;
    }

    pub fn frames_captured(&self) -> u64 {
        self.frames_captured
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn average_latency_secs(&self) -> f64 {
        if self.latency_samples == 0 {
            return 0.0;
        }
        self.total_latency.as_secs_f64() / self.latency_samples as f64
    }

    /// Share of captured frames that had a pose, as a percentage.
    pub fn efficiency_percent(&self) -> f64 {
        if self.frames_captured == 0 {
            return 0.0;
        }
        self.frames_processed as f64 / self.frames_captured as f64 * 100.0
    }
}

/// Totals for one exercise that saw activity.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSummary {
    pub exercise: Exercise,
    pub total_reps: u32,
    /// Completed and failed scores in the order they were recorded.
    pub scores: Vec<u8>,
    pub average_score: f32,
}

impl ExerciseSummary {
    pub fn from_state(state: &ExerciseState) -> Self {
        Self {
            exercise: state.exercise,
            total_reps: state.repcount,
            scores: state.rep_scores.iter().map(|score| score.value).collect(),
            average_score: state.average_score(),
        }
    }

    /// Scores as `[a, b, c]`.
    pub fn scores_label(&self) -> String {
        let joined = self
            .scores
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("[{joined}]")
    }
}

/// Everything written out when the session closes.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub finished_at: OffsetDateTime,
    pub mode: SessionMode,
    pub exercises: Vec<ExerciseSummary>,
    pub average_latency_secs: f64,
    pub efficiency_percent: f64,
}

impl SessionSummary {
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn log(&self) {
        for summary in &self.exercises {
            info!(
                exercise = summary.exercise.title(),
                total_reps = summary.total_reps,
                scores = %summary.scores_label(),
                average_score = %format!("{:.1}", summary.average_score),
                "Session summary"
            );
        }
        info!(
            mode = %self.mode,
            average_latency_secs = %format!("{:.3}", self.average_latency_secs),
            efficiency_percent = %format!("{:.2}", self.efficiency_percent),
            "Frame processing"
        );
    }

    /// One CSV row per exercise, without a trailing newline.
    pub fn csv_rows(&self) -> Result<Vec<String>, MetricsError> {
        let timestamp = self.finished_at.format(TIMESTAMP_FORMAT)?;
        Ok(self
            .exercises
            .iter()
            .map(|summary| {
                [
                    timestamp.clone(),
                    self.mode.as_str().to_string(),
                    summary.exercise.name().to_string(),
                    summary.total_reps.to_string(),
                    format!("{:.2}", summary.average_score),
                    summary.scores_label(),
                    format!("{:.2}", self.average_latency_secs),
                    format!("{:.2}", self.efficiency_percent),
                ]
                .iter()
                .map(|field| csv_field(field))
                .collect::<Vec<_>>()
                .join(",")
            })
            .collect())
    }
}

/// Append-only CSV log of session results.
#[derive(Debug, Clone)]
pub struct MetricsLog {
    path: PathBuf,
}

impl MetricsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<app dir>/session_metrics/performance_log.csv`.
    pub fn default_location() -> Result<Self, MetricsError> {
        Ok(Self::new(app_dirs::metrics_dir()?.join(METRICS_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row per summarized exercise. Returns the number of rows.
    pub fn append(&self, summary: &SessionSummary) -> Result<usize, MetricsError> {
        let rows = summary.csv_rows()?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| MetricsError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let is_new = !self.path.is_file();
        let to_error = |source| MetricsError::Write {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(to_error)?;
        let mut text = String::new();
        if is_new {
            text.push_str(METRICS_HEADER);
            text.push('\n');
        }
        for row in &rows {
            text.push_str(row);
            text.push('\n');
        }
        file.write_all(text.as_bytes()).map_err(to_error)?;
        Ok(rows.len())
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn summary(scores: Vec<u8>) -> SessionSummary {
        SessionSummary {
            finished_at: OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
            mode: SessionMode::Solo,
            exercises: vec![ExerciseSummary {
                exercise: Exercise::Squat,
                total_reps: 2,
                average_score: 91.5,
                scores,
            }],
            average_latency_secs: 0.0333,
            efficiency_percent: 97.5,
        }
    }

    #[test]
    fn efficiency_and_latency_handle_empty_runs() {
        let metrics = PerformanceMetrics::default();
        assert_eq!(metrics.average_latency_secs(), 0.0);
        assert_eq!(metrics.efficiency_percent(), 0.0);
    }

    #[test]
    fn efficiency_is_processed_over_captured() {
        let mut metrics = PerformanceMetrics::default();
        for idx in 0..4 {
            metrics.frame_captured();
            if idx != 0 {
                metrics.frame_processed();
            }
            metrics.record_latency(Duration::from_millis(20));
        }
        assert_eq!(metrics.efficiency_percent(), 75.0);
        assert!((metrics.average_latency_secs() - 0.02).abs() < 1e-9);
    }

    #[test]
    fn row_matches_column_layout() {
        let rows = summary(vec![95, 88]).csv_rows().unwrap();
        assert_eq!(
            rows,
            vec!["2023-11-14 22:13:20,solo,squat,2,91.50,\"[95, 88]\",0.03,97.50".to_string()]
        );
    }

    #[test]
    fn single_score_is_not_quoted() {
        let rows = summary(vec![95]).csv_rows().unwrap();
        assert!(rows[0].contains(",[95],"));
    }

    #[test]
    fn header_is_written_only_for_a_new_file() {
        let dir = tempdir().unwrap();
        let log = MetricsLog::new(dir.path().join("nested").join(METRICS_FILE_NAME));
        assert_eq!(log.append(&summary(vec![95, 88])).unwrap(), 1);
        assert_eq!(log.append(&summary(vec![70])).unwrap(), 1);

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], METRICS_HEADER);
        assert_eq!(contents.matches("Timestamp,").count(), 1);
        assert!(lines[2].contains("[70]"));
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempdir().unwrap();
        let log = MetricsLog::new(dir.path());
        assert!(matches!(
            log.append(&summary(vec![80])),
            Err(MetricsError::Write { .. })
        ));
    }
}
