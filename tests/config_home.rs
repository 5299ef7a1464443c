mod support;

use physio_coach::app_dirs::{self, APP_DIR_NAME};
use physio_coach::config::{self, AppConfig, CONFIG_FILE_NAME};
use physio_coach::session::SessionMode;
use support::env::ConfigHomeGuard;

#[test]
fn config_round_trips_through_the_app_dir() {
    let temp = tempfile::tempdir().unwrap();
    let _guard = ConfigHomeGuard::set(temp.path().to_path_buf());

    let path = config::config_path().unwrap();
    assert_eq!(path, temp.path().join(APP_DIR_NAME).join(CONFIG_FILE_NAME));
    assert_eq!(config::load_or_default().unwrap().frame_rate, 30);

    let mut saved = AppConfig::default();
    saved.frame_rate = 24;
    saved.session.mode = SessionMode::Assisted;
    saved.haptic.enabled = false;
    config::save_to_path(&saved, &path).unwrap();

    let loaded = config::load_or_default().unwrap();
    assert_eq!(loaded.frame_rate, 24);
    assert_eq!(loaded.session.mode, SessionMode::Assisted);
    assert!(!loaded.haptic.enabled);
}

#[test]
fn sub_dirs_are_created_under_the_override() {
    let temp = tempfile::tempdir().unwrap();
    let _guard = ConfigHomeGuard::set(temp.path().to_path_buf());
    for dir in [
        app_dirs::logs_dir().unwrap(),
        app_dirs::speech_cache_dir().unwrap(),
        app_dirs::metrics_dir().unwrap(),
    ] {
        assert!(dir.is_dir());
        assert!(dir.starts_with(temp.path().join(APP_DIR_NAME)));
    }
}
