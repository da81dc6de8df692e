use std::fs;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use vidgrab_host::{ConfigError, HostConfig, LogDestination, MediaBackend};

#[test]
fn missing_file_yields_defaults() {
    let temp = TempDir::new().unwrap();
    let config = HostConfig::load(&temp.path().join("absent.ron")).unwrap();
    assert_eq!(config, HostConfig::default());
    assert_eq!(
        config.media,
        MediaBackend::Simulated { delay_ms: 1500 }
    );
}

#[test]
fn empty_file_yields_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("vidgrab.ron");
    fs::write(&path, "\n").unwrap();
    assert_eq!(HostConfig::load(&path).unwrap(), HostConfig::default());
}

#[test]
fn partial_file_keeps_other_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("vidgrab.ron");
    fs::write(
        &path,
        r#"(
            media: Http(base_url: "https://media.example.com/api/"),
            poll: (interval_ms: 100),
            log: (destination: Both, level: "debug"),
        )"#,
    )
    .unwrap();

    let config = HostConfig::load(&path).unwrap();
    assert_eq!(
        config.media,
        MediaBackend::Http {
            base_url: "https://media.example.com/api/".to_string(),
            request_timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
        }
    );
    assert_eq!(config.log.destination, LogDestination::Both);
    assert_eq!(config.log.level_filter().unwrap(), log::LevelFilter::Debug);

    let settings = config.engine_settings();
    assert_eq!(settings.poll.interval, Duration::from_millis(100));
    assert_eq!(settings.poll.max_wait, Duration::from_secs(300));
    assert_eq!(settings.retry.max_attempts, 4);
    assert!(config.build_media().is_ok());
}

#[test]
fn malformed_file_is_a_parse_error() {
    let err = HostConfig::parse("(media: Carrier(pigeons: 3))").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn unknown_log_level_is_rejected() {
    let err = HostConfig::parse(r#"(log: (level: "chatty"))"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidLevel(level) if level == "chatty"));
}

#[test]
fn bad_base_url_is_reported_when_building_media() {
    let config = HostConfig::parse(r#"(media: Http(base_url: "not a url"))"#).unwrap();
    let err = config.build_media().err().expect("invalid base url");
    assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
}

#[test]
fn zero_attempts_still_tries_once() {
    let config = HostConfig::parse("(retry: (max_attempts: 0))").unwrap();
    assert_eq!(config.engine_settings().retry.max_attempts, 1);
}
