//! Host configuration, read from a RON file.
//!
//! Every field has a default, so an empty file (or none at all) yields a host
//! that talks to the simulated media service.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use vidgrab_engine::{
    EngineSettings, HttpMediaService, HttpSettings, MediaService, PollSettings, RetryPolicy,
    ServiceError, SimulatedMediaService, SIMULATED_DELAY,
};

use crate::logging::LogDestination;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid media base url {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid log level {0:?}")]
    InvalidLevel(String),
    #[error("media backend unavailable: {0}")]
    Backend(ServiceError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaBackend {
    Simulated {
        delay_ms: u64,
    },
    Http {
        base_url: String,
        #[serde(default = "default_request_timeout_ms")]
        request_timeout_ms: u64,
        #[serde(default = "default_connect_timeout_ms")]
        connect_timeout_ms: u64,
    },
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

impl Default for MediaBackend {
    fn default() -> Self {
        MediaBackend::Simulated {
            delay_ms: SIMULATED_DELAY.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_ms: u64,
    pub max_wait_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        let defaults = PollSettings::default();
        Self {
            interval_ms: defaults.interval.as_millis() as u64,
            max_wait_ms: defaults.max_wait.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let defaults = RetryPolicy::default();
        Self {
            max_attempts: defaults.max_attempts,
            initial_backoff_ms: defaults.initial_backoff.as_millis() as u64,
            max_backoff_ms: defaults.max_backoff.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub destination: LogDestination,
    pub level: String,
    pub file: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            destination: LogDestination::Terminal,
            level: "info".to_string(),
            file: PathBuf::from("./vidgrab.log"),
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(self.level.trim())
            .map_err(|_| ConfigError::InvalidLevel(self.level.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub media: MediaBackend,
    pub poll: PollConfig,
    pub retry: RetryConfig,
    pub log: LogConfig,
}

impl HostConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: HostConfig = ron::from_str(text)?;
        config.log.level_filter()?;
        Ok(config)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            poll: PollSettings {
                interval: Duration::from_millis(self.poll.interval_ms),
                max_wait: Duration::from_millis(self.poll.max_wait_ms),
            },
            retry: RetryPolicy {
                max_attempts: self.retry.max_attempts.max(1),
                initial_backoff: Duration::from_millis(self.retry.initial_backoff_ms),
                max_backoff: Duration::from_millis(self.retry.max_backoff_ms),
            },
        }
    }

    pub fn build_media(&self) -> Result<Arc<dyn MediaService>, ConfigError> {
        match &self.media {
            MediaBackend::Simulated { delay_ms } => Ok(Arc::new(SimulatedMediaService::new(
                Duration::from_millis(*delay_ms),
            ))),
            MediaBackend::Http {
                base_url,
                request_timeout_ms,
                connect_timeout_ms,
            } => {
                let url = Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl {
                    url: base_url.clone(),
                    source,
                })?;
                let settings = HttpSettings {
                    base_url: url,
                    connect_timeout: Duration::from_millis(*connect_timeout_ms),
                    request_timeout: Duration::from_millis(*request_timeout_ms),
                };
                let service = HttpMediaService::new(settings).map_err(ConfigError::Backend)?;
                Ok(Arc::new(service))
            }
        }
    }
}
