//! Tests for configuration files

use eye_care_monitor::{
    config::{Config, EXAMPLE_CONFIG},
    monitor::EyeMonitor,
    Error,
};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

#[test]
fn test_config_file_round_trip() {
    let mut config = Config::default();
    config.timers.open_secs = 12.0;
    config.smoothing.kind = "median".to_string();
    config.smoothing.window = 3;
    config.alarm.sound = PathBuf::from("/usr/share/sounds/alarm.ogg");
    config.display.flip_x = true;

    let file = NamedTempFile::new().unwrap();
    config.to_file(file.path()).unwrap();

    let loaded = Config::from_file(file.path()).unwrap();
    assert_eq!(loaded.timers.open_secs, 12.0);
    assert_eq!(loaded.smoothing.kind, "median");
    assert_eq!(loaded.smoothing.window, 3);
    assert_eq!(loaded.alarm.sound, PathBuf::from("/usr/share/sounds/alarm.ogg"));
    assert!(loaded.display.flip_x);
    assert!(loaded.validate().is_ok());
    assert_eq!(loaded.create_filter().unwrap().name(), "MedianFilter");
}

#[test]
fn test_example_config_file_loads() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(EXAMPLE_CONFIG.as_bytes()).unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert!(config.validate().is_ok());
    assert!(EyeMonitor::from_config(&config).is_ok());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::from_file(dir.path().join("missing.yaml"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_unknown_smoothing_rejected() {
    let config = Config::from_yaml("smoothing:\n  kind: kalman\n").unwrap();
    assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    assert!(EyeMonitor::from_config(&config).is_err());
}

#[test]
fn test_out_of_range_timer_is_error_not_panic() {
    for yaml in [
        "timers:\n  open_secs: 1.0e20\n",
        "timers:\n  closed_secs: -1.0\n",
        "timers:\n  open_secs: .nan\n",
    ] {
        let config = Config::from_yaml(yaml).unwrap();
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))), "{yaml}");

        let built = std::panic::catch_unwind(|| EyeMonitor::from_config(&config).is_err());
        assert!(matches!(built, Ok(true)), "building a monitor from {yaml:?} must fail with an error");
    }
}

#[test]
fn test_custom_thresholds_drive_monitor() {
    let yaml = "thresholds:\n  open: 40.0\n  closed: 10.0\ntimers:\n  open_secs: 1.0\n";
    let config = Config::from_yaml(yaml).unwrap();
    assert!(config.validate().is_ok());

    let mut monitor = EyeMonitor::from_config(&config).unwrap();
    let start = std::time::Instant::now();

    // 30 is neither above 40 nor below 10
    for frame in 0..120u64 {
        let now = start + std::time::Duration::from_millis(frame * 33);
        let outcome = monitor.process_sample(30.0, now, Default::default());
        assert!(outcome.triggers.is_empty());
    }
}
