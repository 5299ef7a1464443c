//! Application directory helpers anchored to a single `.physio_coach` folder.
//!
//! Config, logs, the speech phrase cache and the metrics log all live under
//! this root. The OS config directory is used by default and
//! `PHYSIO_COACH_CONFIG_HOME` overrides it for tests or portable setups.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use directories::BaseDirs;
use thiserror::Error;

/// Name of the application directory that lives under the OS config root.
pub const APP_DIR_NAME: &str = ".physio_coach";
/// Environment variable that replaces the OS config root.
pub const CONFIG_HOME_ENV: &str = "PHYSIO_COACH_CONFIG_HOME";

/// Errors that can occur while resolving or preparing application directories.
#[derive(Debug, Error)]
pub enum AppDirError {
    /// No suitable base config directory could be resolved.
    #[error("No suitable base config directory available for application files")]
    NoBaseDir,
    /// Failed to create the application directory.
    #[error("Failed to create application directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Return the root `.physio_coach` directory, creating it if needed.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    let base = config_base_dir().ok_or(AppDirError::NoBaseDir)?;
    let path = base.join(APP_DIR_NAME);
    create_dir(&path)?;
    Ok(path)
}

/// Return the logs directory inside the app root, creating it if needed.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    sub_dir("logs")
}

/// Directory holding synthesized speech clips keyed by phrase hash.
pub fn speech_cache_dir() -> Result<PathBuf, AppDirError> {
    sub_dir("speech_cache")
}

/// Directory holding the append-only session metrics log.
pub fn metrics_dir() -> Result<PathBuf, AppDirError> {
    sub_dir("session_metrics")
}

fn sub_dir(name: &str) -> Result<PathBuf, AppDirError> {
    let path = app_root_dir()?.join(name);
    create_dir(&path)?;
    Ok(path)
}

fn create_dir(path: &Path) -> Result<(), AppDirError> {
    std::fs::create_dir_all(path).map_err(|source| AppDirError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn config_base_dir() -> Option<PathBuf> {
    base_dir_from(std::env::var_os(CONFIG_HOME_ENV))
}

/// An explicit, non-empty override wins over the OS config directory.
fn base_dir_from(config_home: Option<OsString>) -> Option<PathBuf> {
    match config_home {
        Some(home) if !home.is_empty() => Some(PathBuf::from(home)),
        _ => BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_home_replaces_os_base() {
        let base = base_dir_from(Some(OsString::from("/tmp/coach-home")));
        assert_eq!(base, Some(PathBuf::from("/tmp/coach-home")));
    }

    #[test]
    fn empty_config_home_falls_back_to_os_base() {
        let expected = BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf());
        assert_eq!(base_dir_from(Some(OsString::new())), expected);
        assert_eq!(base_dir_from(None), expected);
    }
}
