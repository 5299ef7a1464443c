//! Replays pose frames through a coaching session and reports the results.

use std::path::PathBuf;
use std::time::Instant;

use physio_coach::config::{self, AppConfig};
use physio_coach::exercise::Exercise;
use physio_coach::feedback::FeedbackDispatcher;
use physio_coach::frame_source::FrameSource;
use physio_coach::logging::{self, LogOptions};
use physio_coach::scoring::ScoringEngine;
use physio_coach::session::{MetricsLog, SessionController, SessionDriver, SessionMode};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    if let Err(err) = logging::init(&LogOptions::default()) {
        eprintln!("Logging disabled: {err}");
    }

    let config = load_config(&options)?;
    let exercise = resolve_exercise(options.exercise.as_deref());
    let source = FrameSource::open(options.input.as_deref()).map_err(|err| err.to_string())?;

    let started = Instant::now();
    let dispatcher = FeedbackDispatcher::from_config(&config);
    let session = SessionController::new(
        &config,
        exercise,
        dispatcher,
        ScoringEngine::from_os_rng(),
        started,
    );
    info!(
        mode = %session.mode(),
        exercise = exercise.title(),
        frame_rate = config.frame_rate,
        "Session started"
    );

    let mut driver = SessionDriver::new(session, started);
    let frames = driver.run(source);
    debug!(frames, "Frame source drained");

    let session = driver.into_session();
    let summary = session.summary(now_local_or_utc());
    let mut dispatcher = session.into_sink();
    dispatcher.shutdown();
    summary.log();
    if summary.is_empty() {
        info!("No reps recorded; metrics log unchanged");
        return Ok(());
    }
    let log = match &config.metrics.path {
        Some(path) => Ok(MetricsLog::new(path)),
        None => MetricsLog::default_location(),
    };
    match log.and_then(|log| log.append(&summary).map(|rows| (log, rows))) {
        Ok((log, rows)) => info!(path = %log.path().display(), rows, "Metrics appended"),
        Err(err) => warn!("Metrics not saved: {err}"),
    }
    Ok(())
}

fn load_config(options: &CliOptions) -> Result<AppConfig, String> {
    let mut config = match &options.config_path {
        Some(path) => config::load_from_path(path),
        None => config::load_or_default(),
    }
    .map_err(|err| err.to_string())?;
    if let Some(mode) = options.mode {
        config.session.mode = mode;
    }
    if options.no_haptic {
        config.haptic.enabled = false;
    }
    if options.no_speech {
        config.speech.enabled = false;
    }
    Ok(config)
}

fn resolve_exercise(name: Option<&str>) -> Exercise {
    let Some(name) = name else {
        return Exercise::Squat;
    };
    name.parse().unwrap_or_else(|err| {
        warn!("{err}; defaulting to squat");
        Exercise::Squat
    })
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

#[derive(Debug, Clone, Default, PartialEq)]
struct CliOptions {
    mode: Option<SessionMode>,
    exercise: Option<String>,
    input: Option<PathBuf>,
    config_path: Option<PathBuf>,
    no_haptic: bool,
    no_speech: bool,
}

fn parse_args(args: Vec<String>) -> Result<Option<CliOptions>, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => {
                println!("{}", help_text());
                return Ok(None);
            }
            "--mode" => {
                let value = take_value(&args, &mut idx, "--mode")?;
                options.mode = Some(value.parse()?);
            }
            "--exercise" => {
                options.exercise = Some(take_value(&args, &mut idx, "--exercise")?.to_string());
            }
            "--input" => {
                options.input = Some(PathBuf::from(take_value(&args, &mut idx, "--input")?));
            }
            "--config" => {
                options.config_path = Some(PathBuf::from(take_value(&args, &mut idx, "--config")?));
            }
            "--no-haptic" => options.no_haptic = true,
            "--no-speech" => options.no_speech = true,
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(Some(options))
}

fn take_value<'a>(args: &'a [String], idx: &mut usize, flag: &str) -> Result<&'a str, String> {
    *idx += 1;
    args.get(*idx)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn help_text() -> String {
    [
        "physio-coach",
        "",
        "Usage:",
        "  physio-coach [--mode solo|assisted] [--exercise NAME] [--input PATH]",
        "               [--config PATH] [--no-haptic] [--no-speech]",
        "",
        "Exercises: squat, abduction, elbow, hipflex, wristext",
        "Input is JSON lines on stdin unless --input is given. Each line is a frame",
        "  {\"t\": 0.033, \"landmarks\": [{\"x\": 0.5, \"y\": 0.4, \"visibility\": 0.98}, ...]}",
        "or a command {\"command\": \"squat|abduction|elbow|hipflex|wristext|start|pause|quit\"}.",
    ]
    .join("\n")
}
